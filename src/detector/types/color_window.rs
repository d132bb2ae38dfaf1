use serde::Deserialize;

use super::hsv::Hsv;

/// A named, inclusive HSV box. Hue uses the 0–179 scale and does not wrap, so
/// colors straddling hue 0 (true red) cannot be expressed as a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWindow {
    pub name: &'static str,
    pub lower: Hsv,
    pub upper: Hsv,
    /// Study year whose ID band carries this color.
    pub academic_year: Option<u8>,
}

impl ColorWindow {
    pub const fn new(name: &'static str, lower: (u8, u8, u8), upper: (u8, u8, u8)) -> Self {
        Self {
            name,
            lower: Hsv::new(lower.0, lower.1, lower.2),
            upper: Hsv::new(upper.0, upper.1, upper.2),
            academic_year: None,
        }
    }

    pub const fn for_year(self, year: u8) -> Self {
        Self {
            academic_year: Some(year),
            ..self
        }
    }

    pub fn contains(&self, hsv: &Hsv) -> bool {
        hsv.within(&self.lower, &self.upper)
    }
}

// ID bands: brown is first year, green second, blue third, yellow fourth.
pub static STANDARD_WINDOWS: [ColorWindow; 4] = [
    ColorWindow::new("yellow", (20, 100, 100), (30, 255, 255)).for_year(4),
    ColorWindow::new("brown", (10, 100, 20), (20, 255, 200)).for_year(1),
    ColorWindow::new("green", (35, 50, 50), (85, 255, 255)).for_year(2),
    ColorWindow::new("blue", (90, 50, 50), (130, 255, 255)).for_year(3),
];

pub static LEGACY_WINDOWS: [ColorWindow; 4] = [
    ColorWindow::new("yellow", (20, 100, 100), (30, 255, 255)).for_year(4),
    ColorWindow::new("brown", (10, 50, 50), (20, 255, 255)).for_year(1),
    ColorWindow::new("green", (40, 50, 50), (80, 255, 255)).for_year(2),
    ColorWindow::new("blue", (100, 50, 50), (140, 255, 255)).for_year(3),
];

/// Which fixed window table the classifier evaluates. Chosen once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Standard,
    /// Wider brown/blue and narrower green bounds from the older lookup helper.
    Legacy,
}

impl Palette {
    pub fn table(self) -> WindowTable {
        match self {
            Palette::Standard => WindowTable::new(&STANDARD_WINDOWS),
            Palette::Legacy => WindowTable::new(&LEGACY_WINDOWS),
        }
    }
}

/// Ordered, immutable set of windows. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowTable {
    windows: &'static [ColorWindow],
}

impl WindowTable {
    pub const fn new(windows: &'static [ColorWindow]) -> Self {
        Self { windows }
    }

    /// Case-insensitive lookup by color name.
    pub fn get(&self, name: &str) -> Option<&ColorWindow> {
        self.windows
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
    }

    /// Study year for a detected label. `None` for unknown or unlisted labels.
    pub fn academic_year(&self, label: &str) -> Option<u8> {
        self.get(label).and_then(|w| w.academic_year)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorWindow> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for WindowTable {
    fn default() -> Self {
        Palette::Standard.table()
    }
}

impl<'a> IntoIterator for &'a WindowTable {
    type Item = &'a ColorWindow;
    type IntoIter = std::slice::Iter<'a, ColorWindow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
