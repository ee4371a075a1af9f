use image::{Rgba, RgbaImage};

use super::font::{self, ADVANCE, GLYPH_HEIGHT};

/// Opaque RGB color.
pub type Color = [u8; 3];

/// Raster surface with anti-aliased primitives and bitmap text.
pub(super) struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub(super) fn new(width: u32, height: u32, background: Color) -> Self {
        let [r, g, b] = background;
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    pub(super) fn into_image(self) -> RgbaImage {
        self.image
    }

    fn width(&self) -> i64 {
        i64::from(self.image.width())
    }

    fn height(&self) -> i64 {
        i64::from(self.image.height())
    }

    /// Blend `color` over the pixel at `(x, y)` with the given coverage.
    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        let inside = (0..self.width()).contains(&x) && (0..self.height()).contains(&y);
        if !inside || !coverage.is_finite() || coverage <= 0.0 {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for channel in 0..3 {
            let existing = f32::from(pixel.0[channel]);
            let target = f32::from(color[channel]);
            pixel.0[channel] = (existing + (target - existing) * alpha).round() as u8;
        }
        pixel.0[3] = 255;
    }

    pub(super) fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Color) {
        for py in y..y + height {
            for px in x..x + width {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    pub(super) fn stroke_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Color) {
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y + height - 1, width, 1, color);
        self.fill_rect(x, y, 1, height, color);
        self.fill_rect(x + width - 1, y, 1, height, color);
    }

    /// Vertical dashed line from `y0` to `y1` at column `x`.
    pub(super) fn dashed_vline(&mut self, x: f32, y0: f32, y1: f32, dash: i64, color: Color) {
        let column = x.round() as i64;
        let (top, bottom) = (y0.min(y1).round() as i64, y0.max(y1).round() as i64);
        let period = dash.max(1) * 2;
        for y in top..=bottom {
            if (y - top) % period < dash.max(1) {
                self.blend_pixel(column, y, color, 1.0);
                self.blend_pixel(column + 1, y, color, 0.5);
            }
        }
    }

    /// Connected line segments through `points`, `thickness` pixels wide.
    ///
    /// Points with a non-finite coordinate are left out and break the line.
    pub(super) fn polyline(&mut self, points: &[(f32, f32)], thickness: u32, color: Color) {
        let thickness = thickness.max(1);
        let offsets: Vec<f32> = (0..thickness)
            .map(|step| (step as i64 - i64::from((thickness - 1) / 2)) as f32)
            .collect();
        for run in points.split(|(x, y)| !x.is_finite() || !y.is_finite()) {
            if let [(x, y)] = run {
                for offset in &offsets {
                    self.blend_pixel(x.round() as i64, (y + offset).round() as i64, color, 1.0);
                }
                continue;
            }
            for pair in run.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                for offset in &offsets {
                    self.line_aa(x0, y0 + offset, x1, y1 + offset, color);
                }
            }
        }
    }

    /// Xiaolin Wu anti-aliased line.
    ///
    /// Lines with a non-finite endpoint are not drawn.
    pub(super) fn line_aa(&mut self, mut x0: f32, mut y0: f32, mut x1: f32, mut y1: f32, color: Color) {
        if ![x0, y0, x1, y1].iter().all(|value| value.is_finite()) {
            return;
        }
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }
        let dx = x1 - x0;
        let dy = y1 - y0;
        if dx.abs() < f32::EPSILON {
            self.plot_aa(steep, x0.round() as i64, y0.round() as i64, color, 1.0);
            return;
        }
        let gradient = dy / dx;

        let xend = x0.round();
        let yend = y0 + gradient * (xend - x0);
        let xgap = 1.0 - (x0 + 0.5).fract();
        let xpxl1 = xend as i64;
        let ypxl1 = yend.floor() as i64;
        self.plot_aa(steep, xpxl1, ypxl1, color, (1.0 - yend.fract()) * xgap);
        self.plot_aa(steep, xpxl1, ypxl1 + 1, color, yend.fract() * xgap);
        let first_y = yend;

        let xend = x1.round();
        let yend = y1 + gradient * (xend - x1);
        let xgap = (x1 + 0.5).fract();
        let xpxl2 = xend as i64;
        let ypxl2 = yend.floor() as i64;

        // Only walk the columns (or rows, when steep) that can land on the image.
        let extent = if steep { self.height() } else { self.width() };
        let start = (xpxl1 + 1).max(-1);
        let end = xpxl2.min(extent + 1);
        let mut intery = first_y + gradient * (start - xpxl1) as f32;
        for x in start..end {
            let y = intery.floor() as i64;
            let frac = intery.fract();
            self.plot_aa(steep, x, y, color, 1.0 - frac);
            self.plot_aa(steep, x, y + 1, color, frac);
            intery += gradient;
        }

        self.plot_aa(steep, xpxl2, ypxl2, color, (1.0 - yend.fract()) * xgap);
        self.plot_aa(steep, xpxl2, ypxl2 + 1, color, yend.fract() * xgap);
    }

    fn plot_aa(&mut self, steep: bool, major: i64, minor: i64, color: Color, coverage: f32) {
        if steep {
            self.blend_pixel(minor, major, color, coverage);
        } else {
            self.blend_pixel(major, minor, color, coverage);
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub(super) fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Color) {
        let scale = i64::from(scale.max(1));
        let mut cursor = x;
        for ch in text.chars() {
            for (column, bits) in font::glyph(ch).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT as i64 {
                    if bits & (1 << row) != 0 {
                        self.fill_rect(
                            cursor + column as i64 * scale,
                            y + row * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
            cursor += i64::from(ADVANCE) * scale;
        }
    }
}
