//! Tile grid consumed by the noise caster.
//!
//! Tiles are stored flat in row-major order: index = y * width + x.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::PropagationError;

/// What the caster needs from a grid: extents, occlusion and a place to write noise.
pub trait SoundGrid<S> {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// True if sound stops at this tile (the tile itself still hears it).
    fn blocks_sound(&self, x: usize, y: usize) -> bool;

    /// Overwrite the noise value `source` left on this tile.
    fn record_noise(&mut self, x: usize, y: usize, source: S, intensity: f64);
}

/// A single map tile
#[derive(Debug, Clone)]
pub struct Tile<S> {
    pub blocks_sound: bool,
    /// Loudness heard on this tile, keyed by the source that made it
    pub noises: HashMap<S, f64>,
}

impl<S> Default for Tile<S> {
    fn default() -> Self {
        Tile {
            blocks_sound: false,
            noises: HashMap::new(),
        }
    }
}

/// Rectangular map of tiles, each holding an occlusion flag and a per-source noise map.
#[derive(Debug, Clone)]
pub struct TileMap<S> {
    width: usize,
    height: usize,
    tiles: Vec<Tile<S>>,
}

impl<S: Copy + Eq + Hash> TileMap<S> {
    /// Create an open map with no walls and no noise.
    pub fn new(width: usize, height: usize) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        tiles.resize_with(width * height, Tile::default);
        TileMap { width, height, tiles }
    }

    /// Build a map from text rows, one character per tile. `#` blocks sound.
    pub fn from_ascii(rows: &[&str]) -> Result<Self, PropagationError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(PropagationError::EmptyGrid { width, height });
        }

        let mut map = TileMap::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(PropagationError::MalformedLayout { row: y, expected: width, found });
            }
            for (x, c) in row.chars().enumerate() {
                map.set_blocks_sound(x, y, c == '#');
            }
        }
        Ok(map)
    }

    /// Flat index of `(x, y)`. Panics if the tile is outside the map, so a bad
    /// x never wraps onto the next row.
    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn tile(&self, x: usize, y: usize) -> &Tile<S> {
        &self.tiles[self.idx(x, y)]
    }

    pub fn set_blocks_sound(&mut self, x: usize, y: usize, blocks: bool) {
        let idx = self.idx(x, y);
        self.tiles[idx].blocks_sound = blocks;
    }

    pub fn toggle_blocks_sound(&mut self, x: usize, y: usize) {
        let idx = self.idx(x, y);
        self.tiles[idx].blocks_sound = !self.tiles[idx].blocks_sound;
    }

    /// Remove every wall
    pub fn clear_walls(&mut self) {
        for tile in &mut self.tiles {
            tile.blocks_sound = false;
        }
    }

    /// Noise `source` left on the tile, if any. `None` outside the map.
    pub fn noise_at(&self, x: usize, y: usize, source: S) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tile(x, y).noises.get(&source).copied()
    }

    /// Number of tiles holding an entry for `source`.
    pub fn heard_count(&self, source: S) -> usize {
        self.tiles.iter().filter(|t| t.noises.contains_key(&source)).count()
    }

    /// Drop all noise entries, typically at the start of a turn.
    pub fn clear_noises(&mut self) {
        for tile in &mut self.tiles {
            tile.noises.clear();
        }
    }

    /// Drop the entries of one source, leaving other sources untouched.
    pub fn clear_source(&mut self, source: S) {
        for tile in &mut self.tiles {
            tile.noises.remove(&source);
        }
    }

    /// Flat copy of the occlusion flags (row-major).
    pub fn occlusion_mask(&self) -> Vec<bool> {
        self.tiles.iter().map(|t| t.blocks_sound).collect()
    }

    /// Copy every value written into `layer` into this map under `source`.
    pub fn apply_layer(&mut self, source: S, layer: &NoiseLayer<'_>) {
        debug_assert_eq!((layer.width, layer.height), (self.width, self.height));
        for (tile, value) in self.tiles.iter_mut().zip(layer.values.iter()) {
            if let Some(v) = value {
                tile.noises.insert(source, *v);
            }
        }
    }
}

impl<S: Copy + Eq + Hash> SoundGrid<S> for TileMap<S> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn blocks_sound(&self, x: usize, y: usize) -> bool {
        self.tiles[self.idx(x, y)].blocks_sound
    }

    fn record_noise(&mut self, x: usize, y: usize, source: S, intensity: f64) {
        let idx = self.idx(x, y);
        self.tiles[idx].noises.insert(source, intensity);
    }
}

/// Noise field of a single cast, written into a flat buffer.
///
/// Layers borrow the occlusion flags of a [`TileMap`] so several casts can run
/// on separate threads and be merged afterwards with [`TileMap::apply_layer`].
#[derive(Debug, Clone)]
pub struct NoiseLayer<'a> {
    width: usize,
    height: usize,
    occlusion: &'a [bool],
    values: Vec<Option<f64>>,
}

impl<'a> NoiseLayer<'a> {
    pub fn new(width: usize, height: usize, occlusion: &'a [bool]) -> Self {
        debug_assert_eq!(occlusion.len(), width * height);
        NoiseLayer {
            width,
            height,
            occlusion,
            values: vec![None; width * height],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} layer",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Value written on the tile, if any. `None` outside the layer.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values[self.idx(x, y)]
    }

    /// Number of tiles written
    pub fn heard_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl<S> SoundGrid<S> for NoiseLayer<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn blocks_sound(&self, x: usize, y: usize) -> bool {
        self.occlusion[self.idx(x, y)]
    }

    fn record_noise(&mut self, x: usize, y: usize, _source: S, intensity: f64) {
        let idx = self.idx(x, y);
        self.values[idx] = Some(intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ascii() {
        let map: TileMap<u32> = TileMap::from_ascii(&["..#", "#..", "..."]).unwrap();
        assert_eq!((map.width(), map.height()), (3, 3));
        assert!(map.blocks_sound(2, 0));
        assert!(map.blocks_sound(0, 1));
        assert!(!map.blocks_sound(1, 1));
    }

    #[test]
    fn test_from_ascii_rejects_bad_layouts() {
        assert!(matches!(
            TileMap::<u32>::from_ascii(&["...", ".."]),
            Err(PropagationError::MalformedLayout { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            TileMap::<u32>::from_ascii(&[]),
            Err(PropagationError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_last_write_wins_per_source() {
        let mut map: TileMap<u32> = TileMap::new(2, 2);
        map.record_noise(1, 1, 7, 3.0);
        map.record_noise(1, 1, 7, 1.0);
        map.record_noise(1, 1, 8, 5.0);

        assert_eq!(map.noise_at(1, 1, 7), Some(1.0));
        assert_eq!(map.noise_at(1, 1, 8), Some(5.0));
        assert_eq!(map.noise_at(0, 0, 7), None);
    }

    #[test]
    fn test_clear_source_keeps_others() {
        let mut map: TileMap<u32> = TileMap::new(3, 1);
        map.record_noise(0, 0, 1, 2.0);
        map.record_noise(0, 0, 2, 4.0);
        map.record_noise(2, 0, 1, 1.0);

        map.clear_source(1);
        assert_eq!(map.heard_count(1), 0);
        assert_eq!(map.noise_at(0, 0, 2), Some(4.0));

        map.clear_noises();
        assert_eq!(map.heard_count(2), 0);
    }

    #[test]
    fn test_out_of_range_x_does_not_wrap() {
        let mut map: TileMap<u32> = TileMap::new(10, 10);

        let wall = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            map.set_blocks_sound(10, 0, true);
        }));
        assert!(wall.is_err());
        let noise = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            map.record_noise(12, 3, 1, 7.0);
        }));
        assert!(noise.is_err());

        // Neighbouring row untouched
        assert!(!map.blocks_sound(0, 1));
        assert_eq!(map.noise_at(2, 4, 1), None);
        assert_eq!(map.heard_count(1), 0);
        assert_eq!(map.noise_at(12, 3, 1), None);
    }

    #[test]
    #[should_panic(expected = "outside 3x1 layer")]
    fn test_layer_rejects_out_of_range_write() {
        let mask = vec![false; 3];
        let mut layer = NoiseLayer::new(3, 1, &mask);
        SoundGrid::<u32>::record_noise(&mut layer, 3, 0, 0, 1.0);
    }

    #[test]
    fn test_layer_merge() {
        let mut map: TileMap<u32> = TileMap::new(3, 1);
        map.set_blocks_sound(2, 0, true);
        map.record_noise(0, 0, 1, 9.0);
        map.record_noise(1, 0, 1, 9.0);

        let mask = map.occlusion_mask();
        assert_eq!(mask, vec![false, false, true]);

        let mut layer = NoiseLayer::new(3, 1, &mask);
        assert!(SoundGrid::<u32>::blocks_sound(&layer, 2, 0));
        SoundGrid::<u32>::record_noise(&mut layer, 1, 0, 0, 2.0);

        map.apply_layer(1, &layer);
        // Untouched tiles keep their old entry
        assert_eq!(map.noise_at(0, 0, 1), Some(9.0));
        assert_eq!(map.noise_at(1, 0, 1), Some(2.0));
        assert_eq!(map.noise_at(2, 0, 1), None);
    }
}
