//! Text rendering of a single metric over time.
//!
//! Points are placed on a character grid by date (x) and value (y), with
//! consecutive points joined by a dotted line. The y axis carries the
//! max/mid/min values and the x axis the first and last dates.

use crate::{MeasurementRecord, Metric, DATE_FORMAT};
use chrono::NaiveDate;

pub const MIN_CHART_WIDTH: usize = 10;
pub const MIN_CHART_HEIGHT: usize = 3;

const POINT: char = '●';
const TRACE: char = '·';

/// Size of the plotting area, excluding axes and labels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: usize,
    pub height: usize,
}

impl ChartOptions {
    /// Clamp to the smallest grid that can still show an axis
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(MIN_CHART_WIDTH),
            height: height.max(MIN_CHART_HEIGHT),
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::new(60, 15)
    }
}

/// Render `metric` from `records` against date.
///
/// Records are plotted in date order whatever order they are given in.
/// Returns `None` when there is nothing to plot.
pub fn render(
    records: &[MeasurementRecord],
    metric: Metric,
    options: &ChartOptions,
) -> Option<String> {
    let mut points: Vec<(NaiveDate, f64)> = records
        .iter()
        .map(|record| (record.date, record.value(metric)))
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|(date, _)| *date);

    let (width, height) = (options.width, options.height);
    let first_date = points[0].0;
    let last_date = points[points.len() - 1].0;
    let span_days = (last_date - first_date).num_days();

    let (mut y_min, mut y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    if y_max - y_min < 1e-9 {
        // Flat series: centre it
        y_min -= 1.0;
        y_max += 1.0;
    }

    let column = |date: NaiveDate| -> usize {
        if span_days == 0 {
            return 0;
        }
        let offset = (date - first_date).num_days() as f64 / span_days as f64;
        (offset * (width - 1) as f64).round() as usize
    };
    let row = |value: f64| -> usize {
        let fraction = (y_max - value) / (y_max - y_min);
        (fraction * (height - 1) as f64).round() as usize
    };

    let mut grid = vec![vec![' '; width]; height];
    let cells: Vec<(usize, usize)> = points
        .iter()
        .map(|(date, value)| (column(*date), row(*value)))
        .collect();

    for pair in cells.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x1 <= x0 + 1 {
            continue;
        }
        for x in (x0 + 1)..x1 {
            let t = (x - x0) as f64 / (x1 - x0) as f64;
            let y = (y0 as f64 + t * (y1 as f64 - y0 as f64)).round() as usize;
            grid[y][x] = TRACE;
        }
    }
    for &(x, y) in &cells {
        grid[y][x] = POINT;
    }

    let y_mid = (y_min + y_max) / 2.0;
    let mid_row = (height - 1) / 2;
    let labels: Vec<String> = (0..height)
        .map(|r| {
            if r == 0 {
                format!("{:.1}", y_max)
            } else if r == height - 1 {
                format!("{:.1}", y_min)
            } else if r == mid_row {
                format!("{:.1}", y_mid)
            } else {
                String::new()
            }
        })
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("Progress of {}\n", metric.label()));
    for (label, cells) in labels.iter().zip(&grid) {
        let tick = if label.is_empty() { '│' } else { '┤' };
        let line: String = cells.iter().collect();
        out.push_str(&format!(
            "{:>w$} {}{}\n",
            label,
            tick,
            line.trim_end(),
            w = label_width
        ));
    }
    out.push_str(&format!(
        "{:>w$} └{}\n",
        "",
        "─".repeat(width),
        w = label_width
    ));

    let first = first_date.format(DATE_FORMAT).to_string();
    let mut dates = format!("{:>w$}  {}", "", first, w = label_width);
    if span_days > 0 {
        let last = last_date.format(DATE_FORMAT).to_string();
        let gap = width.saturating_sub(first.len() + last.len()).max(1);
        dates.push_str(&" ".repeat(gap));
        dates.push_str(&last);
    }
    out.push_str(&dates);
    out.push('\n');

    Some(out)
}
