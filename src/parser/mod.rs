// Brush gesture script parser

pub mod ast;
pub mod gesture;
pub mod lexer;

// Public API re-exports
pub use ast::{Gesture, GestureAction, PanelRef};
pub use gesture::{parse_gesture, parse_gestures};
