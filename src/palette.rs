use plotters::style::RGBColor;

/// Categorical colors assigned to groups in sorted-key order.
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Fill for points outside the active brush.
pub const UNSELECTED: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// Frame, axis and label ink.
pub const INK: RGBColor = RGBColor(0x33, 0x33, 0x33);

/// Brush rectangle fill.
pub const BRUSH: RGBColor = RGBColor(0x77, 0x77, 0x77);

#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<RGBColor>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            colors: CATEGORY10.to_vec(),
        }
    }
}

impl ColorPalette {
    pub fn new(colors: Vec<RGBColor>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    /// Color for a group index, cycling when there are more groups than colors.
    pub fn group(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }

    /// Color for a highlight class; unhighlighted points are grey.
    pub fn class(&self, class: Option<usize>) -> RGBColor {
        class.map_or(UNSELECTED, |idx| self.group(idx))
    }
}
