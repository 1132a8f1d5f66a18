//! Colors for drawing noise fields
//!
//! Loudness is mapped onto a heat gradient for single-source output, and
//! onto per-source tints when several sources are shown at once.

/// RGBA color with floating point components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RGBA {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        RGBA { r, g, b, a }
    }

    pub fn black() -> Self {
        RGBA { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }

    pub fn wall() -> Self {
        RGBA { r: 0.25, g: 0.25, b: 0.25, a: 1.0 }
    }

    /// Multiply the color channels by `s`, keeping alpha
    pub fn scaled(self, s: f32) -> Self {
        RGBA::new(self.r * s, self.g * s, self.b * s, self.a)
    }

    /// Pack into 0x00RRGGBB as minifb expects
    pub fn to_u32(self) -> u32 {
        let r = to_byte(self.r) as u32;
        let g = to_byte(self.g) as u32;
        let b = to_byte(self.b) as u32;
        (r << 16) | (g << 8) | b
    }
}

/// Convert a float value (0.0-1.0) to a byte (0-255)
#[inline]
pub fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Heat gradient: black at 0, through red and orange, to pale yellow at 1.
pub fn heat(t: f32) -> RGBA {
    let t = t.clamp(0.0, 1.0);
    RGBA::new(
        (t * 3.0).min(1.0),
        (t * 3.0 - 1.0).clamp(0.0, 1.0),
        (t * 3.0 - 2.0).clamp(0.0, 1.0),
        1.0,
    )
}

const TINTS: [(f32, f32, f32); 6] = [
    (1.0, 0.8, 0.4), // warm
    (0.4, 0.7, 1.0), // cold
    (0.5, 1.0, 0.5),
    (1.0, 0.4, 0.8),
    (1.0, 1.0, 0.3),
    (0.6, 0.5, 1.0),
];

/// Distinct tint for the `index`-th source, wrapping after six.
pub fn source_tint(index: usize) -> RGBA {
    let (r, g, b) = TINTS[index % TINTS.len()];
    RGBA::new(r, g, b, 1.0)
}

/// Color of a tile given its loudness relative to `max_intensity`.
/// Tiles with no entry stay black.
pub fn noise_color(level: Option<f64>, max_intensity: f64, tint: RGBA) -> RGBA {
    match level {
        Some(v) if max_intensity > 0.0 && v > 0.0 => {
            tint.scaled((v / max_intensity).min(1.0) as f32)
        }
        _ => RGBA::black(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_basics() {
        let color = RGBA::new(0.5, 0.75, 0.25, 0.9);
        assert_eq!((color.r, color.g, color.b, color.a), (0.5, 0.75, 0.25, 0.9));

        let black = RGBA::black();
        assert_eq!((black.r, black.g, black.b, black.a), (0.0, 0.0, 0.0, 1.0));
        assert_eq!(RGBA::new(1.0, 0.0, 1.0, 1.0).to_u32(), 0x00FF00FF);
    }

    #[test]
    fn test_heat_endpoints() {
        assert_eq!(heat(0.0), RGBA::black());
        assert_eq!(heat(1.0), RGBA::new(1.0, 1.0, 1.0, 1.0));
        // Out of range clamps
        assert_eq!(heat(-3.0), heat(0.0));
        let mid = heat(0.5);
        assert!(mid.r > mid.g && mid.g > mid.b);
    }

    #[test]
    fn test_noise_color() {
        let tint = source_tint(0);
        assert_eq!(noise_color(None, 4.0, tint), RGBA::black());
        assert_eq!(noise_color(Some(4.0), 4.0, tint), tint);
        assert_eq!(noise_color(Some(2.0), 4.0, tint), tint.scaled(0.5));
        assert_eq!(source_tint(6), source_tint(0));
    }
}
