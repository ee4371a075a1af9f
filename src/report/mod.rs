//! Loss-curve report rendering.
//!
//! A [`LogRecord`] becomes one PNG: training and validation loss per epoch
//! on shared axes, a dashed marker at the best epoch, and label/value
//! annotations at fixed axes-relative positions. Annotation text and
//! placement depend only on the record, so two renders of the same record
//! carry identical annotations.

mod canvas;
mod font;
mod layout;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::training_log::{self, ExtractError, LogRecord, format_duration};
use canvas::{Canvas, Color};
use layout::{PlotLayout, epoch_ticks, format_tick, nice_ticks};

const BACKGROUND: Color = [255, 255, 255];
const INK: Color = [30, 30, 30];
const GRID: Color = [225, 225, 225];
const TRAIN_COLOR: Color = [31, 119, 180];
const VALID_COLOR: Color = [255, 127, 14];
const BEST_COLOR: Color = [120, 120, 120];

/// Output size bounds; requests outside them are clamped.
const MIN_WIDTH: u32 = 240;
const MIN_HEIGHT: u32 = 180;
pub const MAX_WIDTH: u32 = 4096;
pub const MAX_HEIGHT: u32 = 4096;
/// Horizontal axes-relative position shared by every annotation line.
const ANNOTATION_X: f32 = 0.3;

/// Errors produced while writing a report image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write report image {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Errors from the extract-then-render report flow.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// One label/value line placed in axes coordinates (origin bottom-left, 0..1).
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// What [`generate_report`] did.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The image was rendered from the freshly extracted record.
    Written { path: PathBuf, record: LogRecord },
    /// An image already existed and was left untouched.
    Skipped { path: PathBuf },
}

/// Path of the report image for a log: the log path with `.png` appended.
pub fn output_path(log_path: &Path) -> PathBuf {
    let mut name = OsString::from(log_path.as_os_str());
    name.push(".png");
    PathBuf::from(name)
}

/// Annotation lines for a record, in drawing order.
///
/// Optional fields that are unknown simply omit their line.
pub fn annotations(record: &LogRecord) -> Vec<Annotation> {
    let mut lines = vec![
        Annotation {
            text: format!("Batch_size = {}", record.batch_size),
            x: ANNOTATION_X,
            y: 0.30,
        },
        Annotation {
            text: format!("Hit@1 = {}", record.hit_at_1),
            x: ANNOTATION_X,
            y: 0.25,
        },
        Annotation {
            text: format!("Best epoch = {}", record.best_epoch),
            x: ANNOTATION_X,
            y: 0.20,
        },
    ];
    if let Some(total) = record.total_duration() {
        lines.push(Annotation {
            text: format!("Training time = {}", format_duration(total)),
            x: ANNOTATION_X,
            y: 0.15,
        });
    }
    lines
}

/// Rasterizes loss-curve reports at a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    width: u32,
    height: u32,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl ReportRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Render `record` to an in-memory RGBA image.
    ///
    /// Infinite or NaN losses are not plotted; the curve resumes at the next
    /// finite epoch.
    pub fn render_image(&self, record: &LogRecord) -> RgbaImage {
        let layout = PlotLayout::new(self.width, self.height, &record.epoch_series);
        let mut canvas = Canvas::new(self.width, self.height, BACKGROUND);
        let scale = if self.width >= 600 { 2 } else { 1 };

        self.draw_axes(&mut canvas, &layout, record, scale);

        let best_x = layout.x_for_epoch(record.best_epoch as f64);
        canvas.dashed_vline(best_x, layout.top, layout.bottom, 6, BEST_COLOR);

        let train: Vec<(f32, f32)> = record
            .epoch_series
            .iter()
            .enumerate()
            .map(|(idx, loss)| (layout.x_for_epoch((idx + 1) as f64), layout.y_for_loss(loss.train)))
            .collect();
        let valid: Vec<(f32, f32)> = record
            .epoch_series
            .iter()
            .enumerate()
            .map(|(idx, loss)| (layout.x_for_epoch((idx + 1) as f64), layout.y_for_loss(loss.valid)))
            .collect();
        canvas.polyline(&train, 2, TRAIN_COLOR);
        canvas.polyline(&valid, 2, VALID_COLOR);

        for annotation in annotations(record) {
            let (x, y) = layout.relative(annotation.x, annotation.y);
            canvas.text(x.round() as i64, y.round() as i64, &annotation.text, scale, INK);
        }
        draw_legend(&mut canvas, &layout, scale);
        canvas.into_image()
    }

    /// Render `record` and write it as PNG to `path`, replacing any existing file.
    pub fn render_to_file(&self, record: &LogRecord, path: &Path) -> Result<(), RenderError> {
        let image = self.render_image(record);
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| RenderError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!("Wrote report {}", path.display());
        Ok(())
    }

    fn draw_axes(&self, canvas: &mut Canvas, layout: &PlotLayout, record: &LogRecord, scale: u32) {
        let glyph_h = i64::from(font::GLYPH_HEIGHT * scale);
        let (left, top, right, bottom) = (
            layout.left.round() as i64,
            layout.top.round() as i64,
            layout.right.round() as i64,
            layout.bottom.round() as i64,
        );

        let (y_min, y_max) = layout.y_range();
        let (y_ticks, y_step) = nice_ticks(y_min, y_max, 6);
        for value in y_ticks {
            let y = layout.y_for_loss(value).round() as i64;
            canvas.fill_rect(left + 1, y, right - left - 1, 1, GRID);
            canvas.fill_rect(left - 5, y, 5, 1, INK);
            let label = format_tick(value, y_step);
            let width = i64::from(font::text_width(&label, 1));
            canvas.text(left - 8 - width, y - 3, &label, 1, INK);
        }
        for epoch in epoch_ticks(record.epoch_series.len(), 8) {
            let x = layout.x_for_epoch(epoch as f64).round() as i64;
            canvas.fill_rect(x, bottom, 1, 5, INK);
            let label = epoch.to_string();
            let width = i64::from(font::text_width(&label, 1));
            canvas.text(x - width / 2, bottom + 8, &label, 1, INK);
        }
        canvas.stroke_rect(left, top, right - left + 1, bottom - top + 1, INK);

        let title_width = i64::from(font::text_width(&record.source_name, scale));
        let center = (left + right) / 2;
        canvas.text(center - title_width / 2, (top - glyph_h) / 2, &record.source_name, scale, INK);

        let x_label = "epochs";
        let x_label_width = i64::from(font::text_width(x_label, scale));
        canvas.text(center - x_label_width / 2, bottom + 22, x_label, scale, INK);
        canvas.text(4, top - glyph_h - 4, "loss", scale, INK);
    }
}

fn draw_legend(canvas: &mut Canvas, layout: &PlotLayout, scale: u32) {
    let entries = [("training loss", TRAIN_COLOR), ("validation loss", VALID_COLOR)];
    let line_height = i64::from(font::GLYPH_HEIGHT * scale) + 6;
    let text_width = entries
        .iter()
        .map(|(label, _)| i64::from(font::text_width(label, scale)))
        .max()
        .unwrap_or_default();
    let swatch = 24;
    let box_width = swatch + 16 + text_width;
    let box_height = line_height * entries.len() as i64 + 8;
    let x = layout.right.round() as i64 - box_width - 8;
    let y = layout.top.round() as i64 + 8;
    canvas.fill_rect(x, y, box_width, box_height, BACKGROUND);
    canvas.stroke_rect(x, y, box_width, box_height, GRID);
    for (idx, (label, color)) in entries.iter().enumerate() {
        let row = y + 6 + idx as i64 * line_height;
        let mid = (row + i64::from(font::GLYPH_HEIGHT * scale) / 2) as f32;
        canvas.polyline(&[((x + 6) as f32, mid), ((x + 6 + swatch) as f32, mid)], 2, *color);
        canvas.text(x + 12 + swatch, row, label, scale, INK);
    }
}

/// Extract `log_path` and render `<log_path>.png` unless that image already exists.
///
/// `force` re-renders over an existing image.
pub fn generate_report(
    log_path: &Path,
    renderer: &ReportRenderer,
    force: bool,
) -> Result<RenderOutcome, ReportError> {
    let path = output_path(log_path);
    if path.exists() && !force {
        tracing::info!("Report {} already exists; skipping", path.display());
        return Ok(RenderOutcome::Skipped { path });
    }
    let record = training_log::extract_log(log_path)?;
    renderer.render_to_file(&record, &path)?;
    Ok(RenderOutcome::Written { path, record })
}
