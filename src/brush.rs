//! Linked brushing across panels.
//!
//! A single controller serves every panel. At most one panel owns a brush at a
//! time; starting a brush elsewhere drops the previous extent first. While a
//! panel is being brushed, every point in every panel is reclassified against
//! that panel's columns, since all panels draw the same rows.

use crate::data::Dataset;
use crate::ir::{Highlight, Panel, ResolvedColumns};
use crate::scale::LinearScale;
use tracing::trace;

/// Data-space rectangle `[[xmin, ymin], [xmax, ymax]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: (f64, f64),
    pub max: (f64, f64),
}

impl Extent {
    /// Normalise two arbitrary corners.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min: (a.0.min(b.0), a.1.min(b.1)),
            max: (a.0.max(b.0), a.1.max(b.1)),
        }
    }

    /// Inclusive containment. Always false for `NaN` coordinates.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.min.0 <= x && x <= self.max.0 && self.min.1 <= y && y <= self.max.1
    }
}

/// Pointer-drag rectangle in panel-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl PixelRect {
    pub fn new(from: (f64, f64), to: (f64, f64)) -> Self {
        Self { from, to }
    }

    /// Zero pixel width or height. Such a drag selects nothing.
    pub fn is_empty(&self) -> bool {
        self.from.0 == self.to.0 || self.from.1 == self.to.1
    }

    /// Clip both corners to the given horizontal and vertical pixel ranges.
    pub fn clamp(self, x: (f64, f64), y: (f64, f64)) -> Self {
        let clip = |v: f64, (a, b): (f64, f64)| v.clamp(a.min(b), a.max(b));
        Self {
            from: (clip(self.from.0, x), clip(self.from.1, y)),
            to: (clip(self.to.0, x), clip(self.to.1, y)),
        }
    }

    /// Top-left and bottom-right corners.
    pub fn corners(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.from.0.min(self.to.0), self.from.1.min(self.to.1)),
            (self.from.0.max(self.to.0), self.from.1.max(self.to.1)),
        )
    }

    /// Data-space extent covered by this rectangle under `x` and `y`.
    pub fn invert(&self, x: &LinearScale, y: &LinearScale) -> Extent {
        Extent::from_corners(
            (x.invert(self.from.0), y.invert(self.from.1)),
            (x.invert(self.to.0), y.invert(self.to.1)),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrushState {
    Idle,
    Brushing {
        panel: Panel,
        /// Scales of `panel`, used to invert pixel drags.
        x: LinearScale,
        y: LinearScale,
        /// Last drag, clipped to the panel.
        rect: Option<PixelRect>,
        /// Whether the current gesture has moved since it started.
        moved: bool,
    },
}

/// What a brush input did, for the caller to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A gesture began on `panel`; `cleared` names the panel whose extent was dropped.
    Started { panel: usize, cleared: Option<usize> },
    /// The extent changed; highlights must be recomputed.
    Updated { extent: Extent },
    /// The gesture ended with nothing selected; highlights must be reset.
    Cleared,
    /// The gesture ended with a usable selection.
    Selected { extent: Extent },
    /// Input for a panel that is not being brushed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrushController {
    state: BrushState,
}

impl Default for BrushController {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushController {
    pub fn new() -> Self {
        Self {
            state: BrushState::Idle,
        }
    }

    pub fn state(&self) -> &BrushState {
        &self.state
    }

    /// Panel currently owning the brush, if any.
    pub fn active_panel(&self) -> Option<&Panel> {
        match &self.state {
            BrushState::Idle => None,
            BrushState::Brushing { panel, .. } => Some(panel),
        }
    }

    /// Current non-empty drag rectangle, if any.
    pub fn rect(&self) -> Option<PixelRect> {
        match &self.state {
            BrushState::Brushing {
                rect: Some(rect), ..
            } if !rect.is_empty() => Some(*rect),
            _ => None,
        }
    }

    /// Current non-empty extent, if any.
    pub fn extent(&self) -> Option<Extent> {
        match &self.state {
            BrushState::Brushing {
                x,
                y,
                rect: Some(rect),
                ..
            } if !rect.is_empty() => Some(rect.invert(x, y)),
            _ => None,
        }
    }

    /// Begin a gesture on `panel`, bound to its scales.
    pub fn start(&mut self, panel: &Panel, x: LinearScale, y: LinearScale) -> Transition {
        match &mut self.state {
            BrushState::Brushing {
                panel: active,
                moved,
                ..
            } if active == panel => {
                *moved = false;
                trace!(panel = panel.index, "brush restarted");
                Transition::Started {
                    panel: panel.index,
                    cleared: None,
                }
            }
            state => {
                let cleared = match &*state {
                    BrushState::Brushing { panel: previous, .. } => Some(previous.index),
                    BrushState::Idle => None,
                };
                *state = BrushState::Brushing {
                    panel: panel.clone(),
                    x,
                    y,
                    rect: None,
                    moved: false,
                };
                trace!(panel = panel.index, ?cleared, "brush started");
                Transition::Started {
                    panel: panel.index,
                    cleared,
                }
            }
        }
    }

    /// Replace the drag on `panel`. The rectangle is clipped to the panel's
    /// pixel range before it is inverted.
    pub fn update(&mut self, panel: &Panel, rect: PixelRect) -> Transition {
        match &mut self.state {
            BrushState::Brushing {
                panel: active,
                x,
                y,
                rect: current,
                moved,
            } if active == panel => {
                let clipped = rect.clamp(x.range, y.range);
                let extent = clipped.invert(x, y);
                *current = Some(clipped);
                *moved = true;
                trace!(panel = panel.index, ?extent, "brush updated");
                Transition::Updated { extent }
            }
            _ => Transition::Ignored,
        }
    }

    /// Finish the gesture on `panel`. A drag with no pixel area, or no drag
    /// at all, clears the brush and returns to idle.
    pub fn end(&mut self, panel: &Panel) -> Transition {
        let selected = match &self.state {
            BrushState::Brushing {
                panel: active,
                x,
                y,
                rect,
                moved,
            } if active == panel => match rect {
                Some(rect) if *moved && !rect.is_empty() => Some(rect.invert(x, y)),
                _ => None,
            },
            _ => return Transition::Ignored,
        };

        match selected {
            Some(extent) => {
                trace!(panel = panel.index, ?extent, "brush selected");
                Transition::Selected { extent }
            }
            None => {
                self.state = BrushState::Idle;
                trace!(panel = panel.index, "brush cleared");
                Transition::Cleared
            }
        }
    }

    /// Drop any brush, e.g. when the plot is redrawn.
    pub fn reset(&mut self) {
        self.state = BrushState::Idle;
    }
}

/// Every row tagged with its own group: the unbrushed coloring.
pub fn base_highlights(data: &Dataset, columns: &ResolvedColumns) -> Vec<Highlight> {
    data.rows()
        .iter()
        .map(|row| columns.group_index(row.group_key()))
        .collect()
}

/// Rows inside `extent` on `panel`'s columns keep their group; all others lose it.
pub fn classify(
    data: &Dataset,
    columns: &ResolvedColumns,
    panel: &Panel,
    extent: &Extent,
) -> Vec<Highlight> {
    data.rows()
        .iter()
        .map(|row| {
            let x = row.number(panel.value.index);
            let y = row.number(panel.primary.index);
            if extent.contains(x, y) {
                columns.group_index(row.group_key())
            } else {
                None
            }
        })
        .collect()
}
