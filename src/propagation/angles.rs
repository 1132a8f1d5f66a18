//! Whole-degree sine/cosine lookup tables.

use std::sync::LazyLock;

/// Number of rays in a full cast, one per degree.
pub const DEGREES: usize = 360;

static SHARED: LazyLock<AngleTables> = LazyLock::new(AngleTables::new);

/// Sine and cosine of every whole degree in `0..360`.
#[derive(Debug, Clone)]
pub struct AngleTables {
    sin: [f64; DEGREES],
    cos: [f64; DEGREES],
}

impl Default for AngleTables {
    fn default() -> Self {
        Self::new()
    }
}

impl AngleTables {
    /// Build both tables.
    pub fn new() -> Self {
        let mut sin = [0.0f64; DEGREES];
        let mut cos = [0.0f64; DEGREES];
        for deg in 0..DEGREES {
            let radians = deg as f64 / (180.0 / std::f64::consts::PI);
            sin[deg] = radians.sin();
            cos[deg] = radians.cos();
        }
        AngleTables { sin, cos }
    }

    /// Process-wide tables, built on first access.
    pub fn shared() -> &'static AngleTables {
        &SHARED
    }

    #[inline]
    pub fn sin(&self, deg: usize) -> f64 {
        self.sin[deg % DEGREES]
    }

    #[inline]
    pub fn cos(&self, deg: usize) -> f64 {
        self.cos[deg % DEGREES]
    }

    /// `(sin, cos)` for `deg`
    #[inline]
    pub fn direction(&self, deg: usize) -> (f64, f64) {
        (self.sin(deg), self.cos(deg))
    }
}
