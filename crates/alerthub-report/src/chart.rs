//! PNG chart rendering.
//!
//! Charts carry no text; labels live in the tables next to them, keyed
//! by the palette colors returned from [`palette_color`].

use std::f64::consts::PI;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};

use alerthub_core::error::AppError;
use alerthub_core::result::AppResult;

use crate::aggregate::{CountRow, DailyCount};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([64, 64, 64]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const TREND: Rgb<u8> = Rgb([31, 119, 180]);
const MIN_SIDE: u32 = 64;

const PALETTE: [[u8; 3]; 10] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

/// Color of the `index`-th slice or bar.
pub fn palette_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// An encoded chart image.
#[derive(Debug, Clone)]
pub struct Chart {
    /// Alt text.
    pub title: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

impl Chart {
    /// `data:` URI for inline embedding.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Draws the three report charts at a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl ChartRenderer {
    /// Create a renderer.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Category proportions. `None` when there is nothing to draw.
    pub fn category_pie(&self, rows: &[CountRow]) -> AppResult<Option<Chart>> {
        let total: u64 = rows.iter().map(|r| r.count).sum();
        if total == 0 {
            return Ok(None);
        }
        let mut img = self.canvas()?;

        let cx = self.width as f64 / 2.0;
        let cy = self.height as f64 / 2.0;
        let radius = (self.width.min(self.height) as f64 / 2.0) * 0.85;

        // Cumulative slice boundaries as fractions of a turn.
        let mut bounds = Vec::with_capacity(rows.len());
        let mut acc = 0.0;
        for row in rows {
            acc += row.count as f64 / total as f64;
            bounds.push(acc);
        }

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            // Clockwise from twelve o'clock.
            let turn = (dx.atan2(-dy) / (2.0 * PI)).rem_euclid(1.0);
            let slice = bounds.iter().position(|b| turn < *b).unwrap_or(rows.len() - 1);
            *pixel = Rgb(palette_color(slice));
        }

        encode("Crimes by Category", img).map(Some)
    }

    /// Status counts. `None` when there is nothing to draw.
    pub fn status_bar(&self, rows: &[CountRow]) -> AppResult<Option<Chart>> {
        let max = rows.iter().map(|r| r.count).max().unwrap_or(0);
        if max == 0 {
            return Ok(None);
        }
        let mut img = self.canvas()?;
        let (left, top, right, bottom) = self.plot_area();
        draw_axes(&mut img, left, top, right, bottom);

        let slot = ((right - left) / rows.len() as u32).max(1);
        let bar_width = (slot * 3 / 5).max(1);
        let plot_height = (bottom - top) as f64;

        for (i, row) in rows.iter().enumerate() {
            let bar_height = (row.count as f64 / max as f64 * plot_height).round() as u32;
            let x0 = left + 1 + slot * i as u32 + (slot - bar_width) / 2;
            let color = Rgb(palette_color(i));
            for x in x0..(x0 + bar_width).min(right) {
                for y in (bottom - bar_height)..bottom {
                    img.put_pixel(x, y, color);
                }
            }
        }

        encode("Crime Status", img).map(Some)
    }

    /// Daily trend across every day of the month, zero days included.
    pub fn daily_line(&self, days: &[DailyCount]) -> AppResult<Chart> {
        let mut img = self.canvas()?;
        let (left, top, right, bottom) = self.plot_area();

        let max = days.iter().map(|d| d.count).max().unwrap_or(0).max(1);
        for step in 1..=4u32 {
            let y = bottom - (bottom - top) * step / 4;
            for x in left..right {
                img.put_pixel(x, y, GRID);
            }
        }
        draw_axes(&mut img, left, top, right, bottom);

        let span = (right - left - 1) as f64;
        let plot_height = (bottom - top) as f64;
        let points: Vec<(i64, i64)> = days
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let fx = if days.len() > 1 {
                    i as f64 / (days.len() - 1) as f64
                } else {
                    0.5
                };
                let x = left as f64 + 1.0 + fx * span;
                let y = bottom as f64 - 1.0 - d.count as f64 / max as f64 * (plot_height - 1.0);
                (x.round() as i64, y.round() as i64)
            })
            .collect();

        for pair in points.windows(2) {
            draw_line(&mut img, pair[0], pair[1], TREND);
        }
        for &(x, y) in &points {
            for dx in -2..=2 {
                for dy in -2..=2 {
                    put(&mut img, x + dx, y + dy, TREND);
                }
            }
        }

        encode("Daily Crime Trend", img)
    }

    fn canvas(&self) -> AppResult<RgbImage> {
        if self.width < MIN_SIDE || self.height < MIN_SIDE {
            return Err(AppError::render(format!(
                "Chart size {}x{} is below the {MIN_SIDE}px minimum",
                self.width, self.height
            )));
        }
        Ok(RgbImage::from_pixel(self.width, self.height, BACKGROUND))
    }

    fn plot_area(&self) -> (u32, u32, u32, u32) {
        let margin_x = self.width / 12;
        let margin_y = self.height / 10;
        (
            margin_x,
            margin_y,
            self.width - margin_x,
            self.height - margin_y,
        )
    }
}

fn draw_axes(img: &mut RgbImage, left: u32, top: u32, right: u32, bottom: u32) {
    for x in left..right {
        img.put_pixel(x, bottom, AXIS);
    }
    for y in top..=bottom {
        img.put_pixel(left, y, AXIS);
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x, y, color);
        put(img, x, y + 1, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn encode(title: &str, img: RgbImage) -> AppResult<Chart> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AppError::render(format!("Failed to encode {title} chart: {e}")))?;
    Ok(Chart {
        title: title.to_string(),
        png,
    })
}
