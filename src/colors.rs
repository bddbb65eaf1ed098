use crate::merge::JoinedRow;

/// Sequential yellow-orange-red palette, 9 stops (ColorBrewer YlOrRd).
pub const YL_OR_RD: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xcc),
    (0xff, 0xed, 0xa0),
    (0xfe, 0xd9, 0x76),
    (0xfe, 0xb2, 0x4c),
    (0xfd, 0x8d, 0x3c),
    (0xfc, 0x4e, 0x2a),
    (0xe3, 0x1a, 0x1c),
    (0xbd, 0x00, 0x26),
    (0x80, 0x00, 0x26),
];

/// Continuous linear color scale over `[min, max]`.
/// One global scale is shared by every state and date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scale spanning the global min/max of `cumul_full`. `None` for no rows.
    pub fn from_rows(rows: &[JoinedRow]) -> Option<Self> {
        let mut values = rows.iter().map(|r| r.cumul_full).filter(|v| v.is_finite());
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self::new(min, max))
    }

    /// Position of `value` within the scale, clamped to 0..=1.
    fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !value.is_finite() || span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn rgb(&self, value: f64) -> (u8, u8, u8) {
        let scaled = self.position(value) * (YL_OR_RD.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(YL_OR_RD.len() - 2);
        let t = scaled - idx as f64;
        let (a, b) = (YL_OR_RD[idx], YL_OR_RD[idx + 1]);
        (lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
    }

    /// `#rrggbb` for `value`.
    pub fn color(&self, value: f64) -> String {
        hex(self.rgb(value))
    }

    /// `n` evenly spaced values from min to max, for legend labels.
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => (0..n)
                .map(|i| self.min + (self.max - self.min) * i as f64 / (n - 1) as f64)
                .collect(),
        }
    }

    /// Palette stops as CSS colors, for the legend gradient.
    pub fn stops() -> Vec<String> {
        YL_OR_RD.iter().copied().map(hex).collect()
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

pub fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}
