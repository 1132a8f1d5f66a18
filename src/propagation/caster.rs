//! Radial ray casting of a sound over a tile grid.
//!
//! One ray per whole degree walks outward from the source in unit steps,
//! losing one point of intensity per step. Each ray writes the remaining
//! intensity into the tile nearest its position until it leaves the grid,
//! hits a sound-blocking tile, or runs out of intensity.

use std::hash::Hash;

use log::{debug, trace};
use rayon::prelude::*;

use super::angles::{AngleTables, DEGREES};
use crate::error::PropagationError;
use crate::grid::{NoiseLayer, SoundGrid, TileMap};

/// One sound to cast: who made it, where, and how loud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEvent<S> {
    pub source: S,
    pub origin: (usize, usize),
    pub intensity: f64,
}

impl<S> NoiseEvent<S> {
    pub fn new(source: S, origin: (usize, usize), intensity: f64) -> Self {
        NoiseEvent { source, origin, intensity }
    }
}

/// Why a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayEnd {
    /// Stepped past the edge of the grid; nothing written for that step
    OutOfBounds,
    /// Wrote into a sound-blocking tile and stopped there
    Occluded,
    /// Intensity ran down to zero
    Exhausted,
}

/// Per-cast tally of ray endings and tile writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastSummary {
    pub out_of_bounds: usize,
    pub occluded: usize,
    pub exhausted: usize,
    /// Tile writes including the origin, counting overwrites
    pub tiles_written: usize,
}

impl CastSummary {
    /// Total rays accounted for (360 for every successful cast)
    pub fn rays(&self) -> usize {
        self.out_of_bounds + self.occluded + self.exhausted
    }

    fn record(&mut self, end: RayEnd, writes: usize) {
        match end {
            RayEnd::OutOfBounds => self.out_of_bounds += 1,
            RayEnd::Occluded => self.occluded += 1,
            RayEnd::Exhausted => self.exhausted += 1,
        }
        self.tiles_written += writes;
    }
}

/// Round half up, so that 2.5 lands on tile 3 and -0.5 on tile 0.
#[inline]
fn round_to_tile(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Casts sounds using a borrowed set of angle tables.
#[derive(Debug, Clone, Copy)]
pub struct NoiseCaster<'t> {
    tables: &'t AngleTables,
}

impl Default for NoiseCaster<'static> {
    fn default() -> Self {
        NoiseCaster::new(AngleTables::shared())
    }
}

impl<'t> NoiseCaster<'t> {
    pub fn new(tables: &'t AngleTables) -> Self {
        NoiseCaster { tables }
    }

    /// Check a cast's preconditions against grid extents without touching the grid.
    pub fn validate(
        &self,
        (width, height): (usize, usize),
        origin: (usize, usize),
        intensity: f64,
    ) -> Result<(), PropagationError> {
        if width == 0 || height == 0 {
            return Err(PropagationError::EmptyGrid { width, height });
        }
        let (x, y) = origin;
        if x >= width || y >= height {
            return Err(PropagationError::InvalidOrigin { x, y, width, height });
        }
        if !intensity.is_finite() {
            return Err(PropagationError::InvalidIntensity(intensity));
        }
        Ok(())
    }

    /// Propagate a sound of `intensity` from `origin` across `grid`.
    ///
    /// The origin tile always receives the full `intensity`. Every other tile a
    /// ray reaches receives the intensity left after the steps taken to get
    /// there. Where rays converge on the same tile, the ray with the highest
    /// degree wins. An intensity of 1 or less only marks the origin.
    pub fn cast<S: Copy, G: SoundGrid<S>>(
        &self,
        source: S,
        origin: (usize, usize),
        intensity: f64,
        grid: &mut G,
    ) -> Result<CastSummary, PropagationError> {
        self.validate((grid.width(), grid.height()), origin, intensity)?;

        grid.record_noise(origin.0, origin.1, source, intensity);

        let mut summary = CastSummary { tiles_written: 1, ..CastSummary::default() };
        for deg in 0..DEGREES {
            let (end, writes) = self.cast_ray(deg, source, origin, intensity, grid);
            trace!("ray {deg}: {end:?} after {writes} writes");
            summary.record(end, writes);
        }

        debug!(
            "cast from ({}, {}) at {intensity}: {} out of bounds, {} occluded, {} exhausted, {} writes",
            origin.0,
            origin.1,
            summary.out_of_bounds,
            summary.occluded,
            summary.exhausted,
            summary.tiles_written
        );
        Ok(summary)
    }

    /// Walk a single ray. Returns how it ended and how many tiles it wrote.
    fn cast_ray<S: Copy, G: SoundGrid<S>>(
        &self,
        deg: usize,
        source: S,
        origin: (usize, usize),
        intensity: f64,
        grid: &mut G,
    ) -> (RayEnd, usize) {
        let (ax, ay) = self.tables.direction(deg);
        let max_x = (grid.width() - 1) as f64;
        let max_y = (grid.height() - 1) as f64;

        let mut x = origin.0 as f64;
        let mut y = origin.1 as f64;
        let mut remaining = intensity - 1.0;
        let mut writes = 0;

        while remaining > 0.0 {
            // Rays travel against the table direction; keep the accumulated
            // float position so tile selection matches step by step.
            x -= ax;
            y -= ay;

            if x < 0.0 || x > max_x || y < 0.0 || y > max_y {
                return (RayEnd::OutOfBounds, writes);
            }

            let tx = round_to_tile(x) as usize;
            let ty = round_to_tile(y) as usize;
            grid.record_noise(tx, ty, source, remaining);
            writes += 1;

            if grid.blocks_sound(tx, ty) {
                return (RayEnd::Occluded, writes);
            }
            remaining -= 1.0;
        }

        (RayEnd::Exhausted, writes)
    }

    /// Cast several events one after another into the same map.
    ///
    /// All events are validated first; nothing is written if any is invalid.
    pub fn cast_all<S: Copy + Eq + Hash>(
        &self,
        events: &[NoiseEvent<S>],
        map: &mut TileMap<S>,
    ) -> Result<Vec<CastSummary>, PropagationError> {
        let extents = (map.width(), map.height());
        for event in events {
            self.validate(extents, event.origin, event.intensity)?;
        }
        events
            .iter()
            .map(|e| self.cast(e.source, e.origin, e.intensity, map))
            .collect()
    }

    /// Cast several events on the rayon pool, then merge them into `map`.
    ///
    /// Each event is cast into its own [`NoiseLayer`] sharing the map's
    /// occlusion flags. Layers are merged in event order, so the result is the
    /// same as [`NoiseCaster::cast_all`].
    pub fn cast_parallel<S: Copy + Eq + Hash + Send + Sync>(
        &self,
        events: &[NoiseEvent<S>],
        map: &mut TileMap<S>,
    ) -> Result<Vec<CastSummary>, PropagationError> {
        let (width, height) = (map.width(), map.height());
        for event in events {
            self.validate((width, height), event.origin, event.intensity)?;
        }

        let occlusion = map.occlusion_mask();

        let layers: Vec<(NoiseLayer<'_>, CastSummary)> = events
            .par_iter()
            .map(|e| {
                let mut layer = NoiseLayer::new(width, height, &occlusion);
                let summary = self.cast(e.source, e.origin, e.intensity, &mut layer)?;
                Ok::<_, PropagationError>((layer, summary))
            })
            .collect::<Result<_, PropagationError>>()?;

        let mut summaries = Vec::with_capacity(layers.len());
        for (event, (layer, summary)) in events.iter().zip(layers.iter()) {
            map.apply_layer(event.source, layer);
            summaries.push(*summary);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_to_tile(2.5), 3.0);
        assert_eq!(round_to_tile(2.4999), 2.0);
        assert_eq!(round_to_tile(-0.0), 0.0);
        assert_eq!(round_to_tile(3.5), 4.0);
    }

    #[test]
    fn test_rejects_bad_origin() {
        let mut map: TileMap<u8> = TileMap::new(4, 4);
        let caster = NoiseCaster::default();
        let err = caster.cast(1, (4, 0), 3.0, &mut map).unwrap_err();
        assert_eq!(err, PropagationError::InvalidOrigin { x: 4, y: 0, width: 4, height: 4 });
        assert_eq!(map.heard_count(1), 0);
    }

    #[test]
    fn test_rejects_empty_grid_and_nan() {
        let caster = NoiseCaster::default();
        let mut empty: TileMap<u8> = TileMap::new(0, 3);
        assert!(matches!(
            caster.cast(1, (0, 0), 3.0, &mut empty),
            Err(PropagationError::EmptyGrid { width: 0, height: 3 })
        ));

        let mut map: TileMap<u8> = TileMap::new(3, 3);
        assert!(matches!(
            caster.cast(1, (1, 1), f64::NAN, &mut map),
            Err(PropagationError::InvalidIntensity(_))
        ));
        assert!(matches!(
            caster.cast(1, (1, 1), f64::INFINITY, &mut map),
            Err(PropagationError::InvalidIntensity(_))
        ));
    }

    #[test]
    fn test_summary_counts_every_ray() {
        let mut map: TileMap<u8> = TileMap::new(5, 5);
        let summary = NoiseCaster::default().cast(0, (2, 2), 10.0, &mut map).unwrap();
        assert_eq!(summary.rays(), DEGREES);
        // Every ray leaves a 5x5 grid long before 9 steps
        assert_eq!(summary.out_of_bounds, DEGREES);
        assert!(summary.tiles_written > DEGREES);
    }

    #[test]
    fn test_summary_exhausted_on_large_grid() {
        let mut map: TileMap<u8> = TileMap::new(21, 21);
        let summary = NoiseCaster::default().cast(0, (10, 10), 3.0, &mut map).unwrap();
        assert_eq!(summary.exhausted, DEGREES);
        assert_eq!(summary.tiles_written, 1 + DEGREES * 2);
    }

    #[test]
    fn test_occluded_rays() {
        // Wall directly above the source; degree 0 steps toward -y
        let mut map: TileMap<u8> = TileMap::from_ascii(&[
            ".....",
            "..#..",
            ".....",
            ".....",
            ".....",
        ])
        .unwrap();
        let summary = NoiseCaster::default().cast(0, (2, 2), 5.0, &mut map).unwrap();
        assert!(summary.occluded > 0);
        assert_eq!(map.noise_at(2, 1, 0), Some(4.0));
        assert_eq!(map.noise_at(2, 0, 0), None);
    }

    #[test]
    fn test_cast_all_validates_before_writing() {
        let mut map: TileMap<u8> = TileMap::new(6, 6);
        let events = [NoiseEvent::new(1, (2, 2), 3.0), NoiseEvent::new(2, (9, 9), 3.0)];
        assert!(NoiseCaster::default().cast_all(&events, &mut map).is_err());
        assert_eq!(map.heard_count(1), 0);
    }
}
