use crate::data::Dataset;
use crate::ir::{ResolvedColumns, ScaleSet};
use tracing::debug;

/// Linear map from a data domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64), // Data endpoints, in mapping order
    pub range: (f64, f64),  // Pixel endpoints
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Same scale with the domain endpoints swapped.
    pub fn reversed(self) -> Self {
        Self {
            domain: (self.domain.1, self.domain.0),
            range: self.range,
        }
    }

    fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }

    /// Map a data value to pixels. A collapsed domain maps everything to the
    /// middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Map a pixel back to data space.
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() || r0 == r1 {
            return d0;
        }
        let t = (pixel - r0) / (r1 - r0);
        // Exact at both range endpoints
        d0 * (1.0 - t) + d1 * t
    }

    /// Evenly spaced round values covering the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let lo = self.domain.0.min(self.domain.1);
        let hi = self.domain.0.max(self.domain.1);
        if !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if hi == lo || count == 0 {
            return vec![lo];
        }

        let step = tick_step(lo, hi, count);
        let start = (lo / step).ceil() as i64;
        let stop = (hi / step).floor() as i64;
        (start..=stop).map(|i| i as f64 * step).collect()
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let err = raw / power;
    let factor = if err >= 50f64.sqrt() {
        10.0
    } else if err >= 10f64.sqrt() {
        5.0
    } else if err >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Pixel extent of one panel and the inset around its plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub size: u32,
    pub padding: u32,
}

impl PanelGeometry {
    /// Output range shared by every scale: the panel minus half the padding on each side.
    pub fn range(&self) -> (f64, f64) {
        let half = f64::from(self.padding) / 2.0;
        (half, f64::from(self.size) - half)
    }
}

/// Build one scale per plotted column. Recomputed in full on every draw.
pub fn build_scales(data: &Dataset, columns: &ResolvedColumns, geometry: PanelGeometry) -> ScaleSet {
    let range = geometry.range();

    let values = columns
        .values
        .iter()
        .map(|column| {
            let domain = observed_domain(data, column.index);
            debug!(column = %column.name, ?domain, "x scale");
            LinearScale::new(domain, range)
        })
        .collect();

    let domain = observed_domain(data, columns.primary.index);
    debug!(column = %columns.primary.name, ?domain, "y scale");
    let primary = LinearScale::new(domain, range).reversed();

    ScaleSet { primary, values }
}

/// `[min, max]` of a column's numeric values, ignoring `NaN`.
/// A column with no numbers at all collapses to `(0, 0)`.
pub fn observed_domain(data: &Dataset, column: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for val in data.numbers(column) {
        if val.is_nan() {
            continue;
        }
        if val < min { min = val; }
        if val > max { max = val; }
    }

    // Handle empty case
    if min == f64::INFINITY {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}
