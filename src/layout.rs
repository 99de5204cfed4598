use crate::ir::{ColumnRef, Panel, ResolvedColumns};

/// Lay out one panel per value column against the primary.
///
/// The cross product of `values` (outer) and `[primary]` (inner) keeps the
/// value columns in order; each panel remembers its position.
pub fn build_panels(columns: &ResolvedColumns) -> Vec<Panel> {
    cross(&columns.values, std::slice::from_ref(&columns.primary))
        .into_iter()
        .enumerate()
        .map(|(index, (value, primary))| Panel {
            value: value.clone(),
            primary: primary.clone(),
            index,
        })
        .collect()
}

fn cross<'a>(a: &'a [ColumnRef], b: &'a [ColumnRef]) -> Vec<(&'a ColumnRef, &'a ColumnRef)> {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| (x, y)))
        .collect()
}

/// Total pixel extent of a grid of `n` panels: (width, height).
pub fn grid_extent(n: usize, size: u32) -> (f64, f64) {
    (n as f64 * f64::from(size), f64::from(size))
}
