use crate::ir::Panel;

/// Which panel a gesture targets.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelRef {
    /// Position in the grid, `#0` is leftmost.
    Index(usize),
    /// The panel's value column.
    Column(String),
}

impl PanelRef {
    /// Grid index of the referenced panel, if it exists.
    pub fn resolve(&self, panels: &[Panel]) -> Option<usize> {
        match self {
            PanelRef::Index(idx) => (*idx < panels.len()).then_some(*idx),
            PanelRef::Column(name) => panels.iter().position(|p| &p.value.name == name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureAction {
    /// Press at `from`, drag to `to`, release. Panel-local pixels.
    Drag { from: (f64, f64), to: (f64, f64) },
    /// Press and release without moving.
    Clear,
}

/// One scripted brush gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub panel: PanelRef,
    pub action: GestureAction,
}
