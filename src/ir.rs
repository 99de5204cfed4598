use crate::scale::LinearScale;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// Column roles as configured by the host. Never mutated after construction;
/// every draw resolves a fresh `ResolvedColumns` from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnConfig {
    pub factors: Vec<String>,
    pub values: Vec<String>,
}

/// A column name together with its position in the dataset header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub name: String,
    pub index: usize,
}

/// Effective column roles for one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub primary: ColumnRef,
    pub factors: Vec<ColumnRef>,
    /// Plotted against the primary, one panel each. Never contains the primary.
    pub values: Vec<ColumnRef>,
    /// Sorted distinct group keys.
    pub groups: Vec<String>,
}

impl ResolvedColumns {
    pub fn value_names(&self) -> Vec<&str> {
        self.values.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn factor_names(&self) -> Vec<&str> {
        self.factors.iter().map(|c| c.name.as_str()).collect()
    }

    /// Index of a group key within `groups`.
    pub fn group_index(&self, key: &str) -> Option<usize> {
        self.groups.binary_search_by(|g| g.as_str().cmp(key)).ok()
    }
}

// =============================================================================
// Phase 2: Scaling
// =============================================================================

/// One position scale per plotted column.
#[derive(Debug, Clone)]
pub struct ScaleSet {
    /// Vertical scale shared by every panel; domain is reversed.
    pub primary: LinearScale,
    /// Horizontal scales, parallel to `ResolvedColumns::values`.
    pub values: Vec<LinearScale>,
}

// =============================================================================
// Phase 3: Layout
// =============================================================================

/// One scatter sub-plot: a value column against the primary column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Panel {
    pub value: ColumnRef,
    pub primary: ColumnRef,
    pub index: usize,
}

impl Panel {
    /// Horizontal pixel offset of the panel within the grid.
    pub fn x_offset(&self, size: u32) -> f64 {
        (self.index as f64) * f64::from(size)
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }
}

/// Per-row highlight: the group index the point is tagged with, or `None`
/// when the point lies outside the active brush.
pub type Highlight = Option<usize>;

/// Everything derived from the dataset by one draw, plus the per-row display state.
#[derive(Debug, Clone)]
pub struct PlotState {
    pub columns: ResolvedColumns,
    pub scales: ScaleSet,
    pub panels: Vec<Panel>,
    /// Parallel to the dataset rows.
    pub highlights: Vec<Highlight>,
}

// =============================================================================
// Phase 4: Compilation (Scene Graph)
// =============================================================================

/// Primitive drawing commands in absolute pixel space.
/// The backend executes these blindly.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub panels: Vec<PanelScene>,
    /// Axes, titles and legend.
    pub decorations: Vec<DrawCommand>,
}

#[derive(Debug, Clone)]
pub struct PanelScene {
    pub panel: Panel,
    pub commands: Vec<DrawCommand>,
}

impl PanelScene {
    /// Point commands of this panel, in row order.
    pub fn points(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Point { .. }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Panel outline. Top-left, bottom-right.
    Frame { tl: (f64, f64), br: (f64, f64) },
    /// One data point. `class` selects the color; `None` is unhighlighted.
    Point {
        row: usize,
        center: (f64, f64),
        radius: f64,
        class: Highlight,
    },
    /// Axis domain lines and ticks.
    Line { points: Vec<(f64, f64)> },
    Text {
        pos: (f64, f64),
        text: String,
        anchor: TextAnchor,
        size: f64,
    },
    /// Legend swatch for one group.
    Swatch {
        center: (f64, f64),
        radius: f64,
        class: usize,
    },
    /// Active brush rectangle.
    Brush { tl: (f64, f64), br: (f64, f64) },
}
