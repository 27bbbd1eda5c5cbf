//! Decoded sprite images and a half-block renderer for them

use image::imageops::{self, FilterType};
use image::RgbaImage;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const ALPHA_CUTOFF: u8 = 128;
const UPPER_HALF: &str = "\u{2580}";
const LOWER_HALF: &str = "\u{2584}";

/// RGBA pixels, row-major, cropped to the opaque area of the source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Sprite {
    /// Decode PNG/GIF/etc. bytes, crop transparent margins and scale down so
    /// the longest side is at most `max_side` pixels.
    pub fn decode(bytes: &[u8], max_side: u32) -> Result<Sprite, String> {
        let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
        let rgba = image.to_rgba8();
        let Some((x, y, width, height)) = opaque_bounds(&rgba) else {
            return Err("image has no visible pixels".to_string());
        };
        let cropped = imageops::crop_imm(&rgba, x, y, width, height).to_image();

        let max_side = max_side.max(1);
        let scaled = if width.max(height) > max_side {
            let (new_width, new_height) = if width >= height {
                (max_side, (height * max_side / width).max(1))
            } else {
                ((width * max_side / height).max(1), max_side)
            };
            imageops::resize(&cropped, new_width, new_height, FilterType::Triangle)
        } else {
            cropped
        };

        let (width, height) = scaled.dimensions();
        Ok(Sprite {
            width,
            height,
            pixels: scaled.into_raw(),
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Columns and rows the sprite occupies inside `max_cols` x `max_rows`.
    /// Sprites are scaled down to fit, never up.
    pub fn fit(&self, max_cols: u16, max_rows: u16) -> (u16, u16) {
        if self.width == 0 || self.height == 0 || max_cols == 0 || max_rows == 0 {
            return (0, 0);
        }
        let scale = (max_cols as f32 / self.width as f32)
            .min((max_rows as f32 * 2.0) / self.height as f32)
            .min(1.0);
        let cols = (self.width as f32 * scale).round().max(1.0) as u16;
        let rows = ((self.height as f32 * scale) / 2.0).ceil().max(1.0) as u16;
        (cols.min(max_cols), rows.min(max_rows))
    }
}

fn opaque_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = image.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] >= ALPHA_CUTOFF {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x || min_y > max_y {
        return None;
    }
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Draws a sprite centred in its area, two pixels per cell.
pub struct SpriteView<'a> {
    sprite: &'a Sprite,
}

impl<'a> SpriteView<'a> {
    pub fn new(sprite: &'a Sprite) -> Self {
        Self { sprite }
    }
}

impl Widget for SpriteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sprite = self.sprite;
        let (cols, rows) = sprite.fit(area.width, area.height);
        if cols == 0 || rows == 0 {
            return;
        }
        let offset_x = area.x + (area.width - cols) / 2;
        let offset_y = area.y + (area.height - rows) / 2;
        let px_rows = rows as u32 * 2;

        let sample = |col: u16, px_row: u32| -> Option<Color> {
            let x = col as u32 * sprite.width / cols as u32;
            let y = px_row * sprite.height / px_rows;
            let [r, g, b, a] = sprite.pixel(x, y)?;
            (a >= ALPHA_CUTOFF).then_some(Color::Rgb(r, g, b))
        };

        for row in 0..rows {
            for col in 0..cols {
                let top = sample(col, row as u32 * 2);
                let bottom = sample(col, row as u32 * 2 + 1);
                let Some(cell) = buf.cell_mut((offset_x + col, offset_y + row)) else {
                    continue;
                };
                match (top, bottom) {
                    (Some(top), Some(bottom)) => {
                        cell.set_symbol(UPPER_HALF).set_fg(top).set_bg(bottom);
                    }
                    (Some(top), None) => {
                        cell.set_symbol(UPPER_HALF).set_fg(top);
                    }
                    (None, Some(bottom)) => {
                        cell.set_symbol(LOWER_HALF).set_fg(bottom);
                    }
                    (None, None) => {}
                }
            }
        }
    }
}
