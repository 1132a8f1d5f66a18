//! Text and PPM output of a source's noise field

use std::fmt::Write as _;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufWriter, Write};

use crate::color::{RGBA, heat, to_byte};
use crate::grid::{SoundGrid, TileMap};

/// Formats one source's noise field as a text grid for debugging.
///
/// Each tile is four characters wide: the value, `#` for a silent wall, or
/// `.` where the source was not heard.
pub fn noise_to_string<S: Copy + Eq + Hash>(map: &TileMap<S>, source: S) -> String {
    let mut result = String::new();

    // Print y going down (top to bottom)
    for y in 0..map.height() {
        for x in 0..map.width() {
            match map.noise_at(x, y, source) {
                Some(v) => {
                    let _ = write!(result, "{:4}", v);
                }
                None if map.blocks_sound(x, y) => result.push_str("   #"),
                None => result.push_str("   ."),
            }
        }
        result.push('\n');
    }
    result
}

/// Heat-map color per tile, walls drawn gray. Row-major.
pub fn noise_heat_grid<S: Copy + Eq + Hash>(
    map: &TileMap<S>,
    source: S,
    max_intensity: f64,
) -> Vec<RGBA> {
    let mut pixels = Vec::with_capacity(map.width() * map.height());
    for y in 0..map.height() {
        for x in 0..map.width() {
            let pixel = if map.blocks_sound(x, y) {
                RGBA::wall()
            } else {
                match map.noise_at(x, y, source) {
                    Some(v) if max_intensity > 0.0 => heat((v / max_intensity) as f32),
                    _ => RGBA::black(),
                }
            };
            pixels.push(pixel);
        }
    }
    pixels
}

/// Write a row-major RGBA grid as a plain (P3) PPM, each tile `scale` pixels wide.
pub fn write_ppm<W: Write>(
    out: &mut W,
    pixels: &[RGBA],
    width: usize,
    height: usize,
    scale: usize,
) -> io::Result<()> {
    let img_width = width * scale;
    let img_height = height * scale;

    writeln!(out, "P3")?;
    writeln!(out, "{} {}", img_width, img_height)?;
    writeln!(out, "255")?;

    for img_y in 0..img_height {
        for img_x in 0..img_width {
            let x = img_x / scale;
            let y = img_y / scale;
            let pixel = &pixels[y * width + x];
            write!(out, "{} {} {} ", to_byte(pixel.r), to_byte(pixel.g), to_byte(pixel.b))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Save one source's noise field to a PPM file
pub fn save_noise_ppm<S: Copy + Eq + Hash>(
    map: &TileMap<S>,
    source: S,
    max_intensity: f64,
    filename: &str,
    scale: usize,
) -> io::Result<()> {
    let pixels = noise_heat_grid(map, source, max_intensity);
    let mut file = BufWriter::new(File::create(filename)?);
    write_ppm(&mut file, &pixels, map.width(), map.height(), scale)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_to_string() {
        let mut map: TileMap<u8> = TileMap::from_ascii(&["..#", "..."]).unwrap();
        map.record_noise(0, 0, 1, 3.0);
        map.record_noise(1, 1, 1, 1.5);

        assert_eq!(noise_to_string(&map, 1), "   3   .   #\n   . 1.5   .\n");
    }

    #[test]
    fn test_write_ppm_header_and_scale() {
        let pixels = vec![RGBA::black(), RGBA::new(1.0, 1.0, 1.0, 1.0)];
        let mut out = Vec::new();
        write_ppm(&mut out, &pixels, 2, 1, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(&lines[..3], &["P3", "4 2", "255"]);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3].trim_end(), "0 0 0 0 0 0 255 255 255 255 255 255");
    }

    #[test]
    fn test_heat_grid_marks_walls() {
        let mut map: TileMap<u8> = TileMap::from_ascii(&[".#"]).unwrap();
        map.record_noise(0, 0, 0, 2.0);
        map.record_noise(1, 0, 0, 1.0);
        let grid = noise_heat_grid(&map, 0, 2.0);
        assert_eq!(grid[0], heat(1.0));
        assert_eq!(grid[1], RGBA::wall());
    }
}
