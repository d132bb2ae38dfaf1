use image::Rgb;

/// Exclusive upper bound of the hue channel. Hue is stored as degrees / 2 so
/// it fits a byte, the same 0–179 scale OpenCV uses for 8-bit images.
pub const HUE_RANGE: u16 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = (max - min) as f32;

        let s = if max == 0 {
            0
        } else {
            (delta * 255.0 / max as f32).round() as u8
        };

        let degrees = if delta == 0.0 {
            0.0
        } else if max == r {
            let h = 60.0 * (g as f32 - b as f32) / delta;
            if h < 0.0 {
                h + 360.0
            } else {
                h
            }
        } else if max == g {
            60.0 * (b as f32 - r as f32) / delta + 120.0
        } else {
            60.0 * (r as f32 - g as f32) / delta + 240.0
        };

        // 359.x degrees rounds up to 180, which is the same hue as 0.
        let h = ((degrees / 2.0).round() as u16 % HUE_RANGE) as u8;

        Self { h, s, v: max }
    }

    /// Componentwise `lower <= self <= upper`, inclusive on every channel.
    pub fn within(&self, lower: &Hsv, upper: &Hsv) -> bool {
        (lower.h..=upper.h).contains(&self.h)
            && (lower.s..=upper.s).contains(&self.s)
            && (lower.v..=upper.v).contains(&self.v)
    }
}

impl From<&Rgb<u8>> for Hsv {
    fn from(px: &Rgb<u8>) -> Self {
        Hsv::from_rgb(px[0], px[1], px[2])
    }
}
