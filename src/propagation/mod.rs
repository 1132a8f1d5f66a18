//! Sound propagation over a tile grid
//!
//! `angles` holds the per-degree trig tables, `caster` walks the rays.
//! Propagation models implement the `SoundPropagation` trait.

pub mod angles;
pub mod caster;

pub use angles::AngleTables;
pub use caster::{CastSummary, NoiseCaster, NoiseEvent, RayEnd};

use crate::error::PropagationError;
use crate::grid::SoundGrid;

/// Trait for sound propagation models.
///
/// Implementations write, for every tile the sound reaches, how loud the
/// event's source is on that tile.
pub trait SoundPropagation<S> {
    /// Propagate one event into `grid`.
    ///
    /// # Arguments
    /// * `event` - Source id, origin tile and intensity of the sound
    /// * `grid` - Grid providing occlusion flags and receiving noise values
    fn propagate<G: SoundGrid<S>>(
        &self,
        event: &NoiseEvent<S>,
        grid: &mut G,
    ) -> Result<CastSummary, PropagationError>;
}

impl<S: Copy> SoundPropagation<S> for NoiseCaster<'_> {
    fn propagate<G: SoundGrid<S>>(
        &self,
        event: &NoiseEvent<S>,
        grid: &mut G,
    ) -> Result<CastSummary, PropagationError> {
        self.cast(event.source, event.origin, event.intensity, grid)
    }
}
