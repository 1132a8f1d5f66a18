//! Error types for noise propagation.

use thiserror::Error;

/// Precondition failures reported by [`crate::NoiseCaster`] before any tile is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    /// The grid has zero width or height
    #[error("Invalid grid: {width}x{height} has no tiles")]
    EmptyGrid { width: usize, height: usize },

    /// The source position is not a tile of the grid
    #[error("Invalid origin ({x}, {y}) for {width}x{height} grid")]
    InvalidOrigin {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// NaN or infinite intensity
    #[error("Invalid intensity: {0}")]
    InvalidIntensity(f64),

    /// A text layout row does not match the width of the first row
    #[error("Malformed layout: row {row} has {found} tiles, expected {expected}")]
    MalformedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PropagationError::InvalidOrigin { x: 12, y: 3, width: 10, height: 10 };
        assert_eq!(err.to_string(), "Invalid origin (12, 3) for 10x10 grid");

        let err = PropagationError::EmptyGrid { width: 0, height: 4 };
        assert_eq!(err.to_string(), "Invalid grid: 0x4 has no tiles");
    }
}
