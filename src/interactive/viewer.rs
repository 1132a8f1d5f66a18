//! Interactive noise viewer - mouse moves the listener's footsteps in real-time

use log::{info, warn};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::color::{RGBA, noise_color, source_tint};
use crate::grid::{SoundGrid, TileMap};
use crate::propagation::{NoiseCaster, NoiseEvent, SoundPropagation};

/// Source id of the sound that follows the mouse
const FOOTSTEPS: usize = 0;
/// Source id of the sound placed with right click
const ALARM: usize = 1;

/// Configuration for the interactive viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Grid size (width x height in tiles)
    pub grid_size: (usize, usize),
    /// Pixel scale factor (each tile = scale x scale pixels)
    pub scale: usize,
    /// Intensity of the sound following the mouse
    pub intensity: f64,
    /// Intensity of the stationary sound
    pub alarm_intensity: f64,
    /// Surround the map with sound-blocking walls
    pub border_walls: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            grid_size: (64, 48),
            scale: 12,
            intensity: 12.0,
            alarm_intensity: 20.0,
            border_walls: true,
        }
    }
}

/// Interactive viewer for testing sound propagation
pub struct InteractiveViewer {
    config: ViewerConfig,
    map: TileMap<usize>,
    caster: NoiseCaster<'static>,
    alarm: Option<(usize, usize)>,
    last_wall_pos: Option<(usize, usize)>,
    window: Window,
    buffer: Vec<u32>,
}

impl InteractiveViewer {
    /// Create a new interactive viewer with the given configuration
    pub fn new(config: ViewerConfig) -> Result<Self, String> {
        let (grid_w, grid_h) = config.grid_size;
        if grid_w == 0 || grid_h == 0 || config.scale == 0 {
            return Err(format!("Invalid viewer size {}x{} at scale {}", grid_w, grid_h, config.scale));
        }
        let window_w = grid_w * config.scale;
        let window_h = grid_h * config.scale;

        let window = Window::new(
            "Noise Test - Interactive Viewer (ESC to exit)",
            window_w,
            window_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        let mut viewer = Self {
            map: TileMap::new(grid_w, grid_h),
            caster: NoiseCaster::default(),
            alarm: None,
            last_wall_pos: None,
            buffer: vec![0u32; window_w * window_h],
            window,
            config,
        };
        viewer.reset_walls();
        Ok(viewer)
    }

    /// Run the interactive viewer loop
    pub fn run(&mut self) -> Result<(), String> {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;

        self.window.set_target_fps(60);

        println!("=== Interactive Noise Viewer ===");
        println!("Controls:");
        println!("  Mouse       - Move footsteps");
        println!("  Left Click  - Toggle wall");
        println!("  Right Click - Place alarm");
        println!("  +/-         - Adjust footstep intensity");
        println!("  X           - Remove alarm");
        println!("  C           - Clear walls");
        println!("  ESC         - Exit");
        println!();

        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            if self.window.is_key_pressed(Key::Equal, KeyRepeat::Yes)
                || self.window.is_key_pressed(Key::NumPadPlus, KeyRepeat::Yes)
            {
                self.config.intensity = (self.config.intensity + 1.0).min(64.0);
                info!("Footstep intensity: {}", self.config.intensity);
            }
            if self.window.is_key_pressed(Key::Minus, KeyRepeat::Yes)
                || self.window.is_key_pressed(Key::NumPadMinus, KeyRepeat::Yes)
            {
                self.config.intensity = (self.config.intensity - 1.0).max(1.0);
                info!("Footstep intensity: {}", self.config.intensity);
            }
            if self.window.is_key_pressed(Key::X, KeyRepeat::No) {
                self.alarm = None;
                self.map.clear_source(ALARM);
                info!("Alarm removed");
            }
            if self.window.is_key_pressed(Key::C, KeyRepeat::No) {
                self.reset_walls();
                info!("Walls cleared");
            }

            if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
                let grid_x = (mx as usize / scale).min(grid_w - 1);
                let grid_y = (my as usize / scale).min(grid_h - 1);

                // Toggle once per tile while the button is held
                if self.window.get_mouse_down(MouseButton::Left) {
                    if self.last_wall_pos != Some((grid_x, grid_y)) {
                        self.map.toggle_blocks_sound(grid_x, grid_y);
                        self.last_wall_pos = Some((grid_x, grid_y));
                    }
                } else {
                    self.last_wall_pos = None;
                }

                if self.window.get_mouse_down(MouseButton::Right) && self.alarm != Some((grid_x, grid_y)) {
                    self.alarm = Some((grid_x, grid_y));
                    info!("Alarm at ({}, {})", grid_x, grid_y);
                }

                self.render_noise(grid_x, grid_y);
            }

            self.window
                .update_with_buffer(&self.buffer, grid_w * scale, grid_h * scale)
                .map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Clear all walls, then restore the border if configured
    fn reset_walls(&mut self) {
        self.map.clear_walls();
        if !self.config.border_walls {
            return;
        }
        let (grid_w, grid_h) = self.config.grid_size;
        for x in 0..grid_w {
            self.map.set_blocks_sound(x, 0, true);
            self.map.set_blocks_sound(x, grid_h - 1, true);
        }
        for y in 0..grid_h {
            self.map.set_blocks_sound(0, y, true);
            self.map.set_blocks_sound(grid_w - 1, y, true);
        }
    }

    /// Recast this frame's sounds and draw them
    fn render_noise(&mut self, listener_x: usize, listener_y: usize) {
        self.map.clear_noises();

        let footsteps = NoiseEvent::new(FOOTSTEPS, (listener_x, listener_y), self.config.intensity);
        let result = match self.alarm {
            Some(pos) => {
                let events = [footsteps, NoiseEvent::new(ALARM, pos, self.config.alarm_intensity)];
                self.caster.cast_parallel(&events, &mut self.map).map(|_| ())
            }
            None => self.caster.propagate(&footsteps, &mut self.map).map(|_| ()),
        };
        if let Err(e) = result {
            warn!("Skipping frame: {}", e);
            return;
        }

        self.render_map_to_buffer();
    }

    /// Draw each tile in the tint of its loudest source
    fn render_map_to_buffer(&mut self) {
        let (grid_w, grid_h) = self.config.grid_size;
        let scale = self.config.scale;
        let sources = [
            (FOOTSTEPS, self.config.intensity),
            (ALARM, self.config.alarm_intensity),
        ];

        for gy in 0..grid_h {
            for gx in 0..grid_w {
                let color = if self.map.blocks_sound(gx, gy) {
                    RGBA::wall()
                } else {
                    sources
                        .iter()
                        .map(|&(id, max)| noise_color(self.map.noise_at(gx, gy, id), max, source_tint(id)))
                        .max_by(|a, b| (a.r + a.g + a.b).total_cmp(&(b.r + b.g + b.b)))
                        .unwrap_or_else(RGBA::black)
                };
                let color_u32 = color.to_u32();

                // Fill scaled pixels
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = gx * scale + sx;
                        let py = gy * scale + sy;
                        self.buffer[py * (grid_w * scale) + px] = color_u32;
                    }
                }
            }
        }
    }
}
