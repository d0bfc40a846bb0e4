use palette::{FromColor, Hsv, Srgb};

/// A single LED color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert from HSV (hue in degrees, saturation/value in 0..=1).
    ///
    /// Used by animated effects that sweep through hues.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let rgb = Srgb::from_color(Hsv::new_srgb(hue, saturation, value)).into_format::<u8>();
        Self::new(rgb.red, rgb.green, rgb.blue)
    }

    /// Scale brightness by `factor` (clamped to 0..=1).
    pub fn scale(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self::new(
            (self.r as f32 * f) as u8,
            (self.g as f32 * f) as u8,
            (self.b as f32 * f) as u8,
        )
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_clamps() {
        let c = Rgb::new(100, 200, 50);
        assert_eq!(c.scale(2.0), c);
        assert_eq!(c.scale(0.0), Rgb::BLACK);
        assert_eq!(c.scale(0.5), Rgb::new(50, 100, 25));
    }

    #[test]
    fn test_from_hsv_primaries() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hsv(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsv(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsv(0.0, 0.0, 0.0), Rgb::BLACK);
    }
}
