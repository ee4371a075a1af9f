//! Data-to-pixel mapping and axis ticks for the loss plot.

use crate::training_log::EpochLoss;

const MARGIN_LEFT: f32 = 72.0;
const MARGIN_RIGHT: f32 = 24.0;
const MARGIN_TOP: f32 = 44.0;
const MARGIN_BOTTOM: f32 = 52.0;
/// Fraction of the loss range added above and below the data.
const Y_PADDING: f64 = 0.05;

/// Plot rectangle in pixels plus the data ranges it shows.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlotLayout {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl PlotLayout {
    pub(super) fn new(width: u32, height: u32, series: &[EpochLoss]) -> Self {
        let left = MARGIN_LEFT.min(width as f32 / 3.0);
        let right = (width as f32 - MARGIN_RIGHT.min(width as f32 / 6.0)).max(left + 1.0);
        let top = MARGIN_TOP.min(height as f32 / 4.0);
        let bottom = (height as f32 - MARGIN_BOTTOM.min(height as f32 / 4.0)).max(top + 1.0);
        Self {
            left,
            top,
            right,
            bottom,
            x_range: epoch_range(series.len()),
            y_range: loss_range(series),
        }
    }

    pub(super) fn y_range(&self) -> (f64, f64) {
        self.y_range
    }

    /// Pixel column for a 1-based epoch index.
    pub(super) fn x_for_epoch(&self, epoch: f64) -> f32 {
        let (min, max) = self.x_range;
        let t = (epoch - min) / (max - min);
        self.left + (t as f32) * (self.right - self.left)
    }

    /// Pixel row for a loss value; larger losses sit higher.
    pub(super) fn y_for_loss(&self, loss: f64) -> f32 {
        let (min, max) = self.y_range;
        let t = (loss - min) / (max - min);
        self.bottom - (t as f32) * (self.bottom - self.top)
    }

    /// Pixel position for axes-relative coordinates, origin bottom-left.
    pub(super) fn relative(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.left + x * (self.right - self.left),
            self.bottom - y * (self.bottom - self.top),
        )
    }
}

fn epoch_range(len: usize) -> (f64, f64) {
    if len <= 1 {
        (0.0, 2.0)
    } else {
        (1.0, len as f64)
    }
}

fn loss_range(series: &[EpochLoss]) -> (f64, f64) {
    let values = series
        .iter()
        .flat_map(|loss| [loss.train, loss.valid])
        .filter(|value| value.is_finite());
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * Y_PADDING;
    (min - pad, max + pad)
}

/// Evenly spaced "nice" tick values (1, 2 or 5 times a power of ten) within `[min, max]`.
pub(super) fn nice_ticks(min: f64, max: f64, target: usize) -> (Vec<f64>, f64) {
    if !(max > min) || target == 0 {
        return (vec![min], 1.0);
    }
    let raw = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    let ticks = (first..=last).map(|idx| idx as f64 * step).collect();
    (ticks, step)
}

/// Integer epoch ticks, at least one epoch apart.
pub(super) fn epoch_ticks(count: usize, target: usize) -> Vec<usize> {
    if count <= 1 {
        return vec![1];
    }
    let (_, step) = nice_ticks(1.0, count as f64, target);
    let step = (step.round() as usize).max(1);
    let mut ticks: Vec<usize> = (1..=count).filter(|epoch| epoch % step == 0).collect();
    if ticks.first() != Some(&1) {
        ticks.insert(0, 1);
    }
    ticks
}

/// Format a tick value with just enough decimals for `step`.
pub(super) fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()).clamp(0.0, 6.0) as usize
    };
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(f64, f64)]) -> Vec<EpochLoss> {
        pairs
            .iter()
            .map(|&(train, valid)| EpochLoss { train, valid })
            .collect()
    }

    #[test]
    fn maps_first_and_last_epoch_to_plot_edges() {
        let layout = PlotLayout::new(800, 600, &series(&[(1.0, 2.0), (0.5, 1.0), (0.2, 0.8)]));
        assert_eq!(layout.x_for_epoch(1.0), layout.left);
        assert_eq!(layout.x_for_epoch(3.0), layout.right);
        let (min, max) = layout.y_range();
        assert!(min < 0.2 && max > 2.0);
        assert!(layout.y_for_loss(2.0) < layout.y_for_loss(0.2));
    }

    #[test]
    fn single_epoch_sits_mid_plot() {
        let layout = PlotLayout::new(400, 300, &series(&[(0.5, 0.5)]));
        let mid = (layout.left + layout.right) / 2.0;
        assert!((layout.x_for_epoch(1.0) - mid).abs() < 1e-3);
        assert_eq!(layout.y_range(), (0.0, 1.0));
    }

    #[test]
    fn non_finite_losses_do_not_break_the_range() {
        let layout = PlotLayout::new(400, 300, &series(&[(f64::NAN, f64::INFINITY)]));
        assert_eq!(layout.y_range(), (0.0, 1.0));
    }

    #[test]
    fn relative_origin_is_bottom_left() {
        let layout = PlotLayout::new(800, 600, &series(&[(1.0, 1.0), (0.5, 0.5)]));
        assert_eq!(layout.relative(0.0, 0.0), (layout.left, layout.bottom));
        assert_eq!(layout.relative(1.0, 1.0), (layout.right, layout.top));
    }

    #[test]
    fn ticks_use_round_steps() {
        let (ticks, step) = nice_ticks(0.13, 0.97, 5);
        assert_eq!(step, 0.2);
        assert_eq!(ticks.len(), 4);
        assert_eq!(format_tick(ticks[0], step), "0.2");
        assert_eq!(epoch_ticks(100, 5), vec![1, 20, 40, 60, 80, 100]);
        assert_eq!(epoch_ticks(3, 5), vec![1, 2, 3]);
        assert_eq!(epoch_ticks(1, 5), vec![1]);
    }
}
