#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stacked bar chart of per-street distances.
//!
//! One bar per street, in the order of [`Analysis::records`]. The lower
//! segment is the "before" distance; the upper segment is the reconciled
//! increase stacked on top, so each bar's full height is the "after"
//! distance. Distances are drawn in miles.

use std::path::Path;

use ltn_distance_reconcile::{Analysis, meters_to_miles};
use ltn_distance_street_models::Destination;
use plotters::prelude::*;
use thiserror::Error;

const CHART_SIZE: (u32, u32) = (1400, 900);
const HEADER_HEIGHT: i32 = 90;
const BEFORE_COLOR: RGBColor = RGBColor(31, 119, 180);
const AFTER_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Errors from chart rendering.
#[derive(Debug, Error)]
pub enum ChartError {
    /// The plotting backend failed.
    #[error("Drawing error: {message}")]
    Drawing {
        /// Backend error text.
        message: String,
    },

    /// There are no streets to draw.
    #[error("No streets to plot")]
    NoData,
}

fn drawing<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing {
        message: err.to_string(),
    }
}

/// Text describing what the chart measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    /// Destination name, e.g. "Templars Shopping Park".
    pub destination: String,
    /// Where trips start, e.g. "Littlemore streets".
    pub origin_area: String,
}

impl ChartLabels {
    #[must_use]
    pub fn for_destination(destination: &Destination) -> Self {
        Self {
            destination: destination.name.clone(),
            origin_area: destination.origin_area.clone(),
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!(
            "Driving distance to {} from {}",
            self.destination, self.origin_area
        )
    }
}

/// One bar, in miles.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub street_name: String,
    pub before_miles: f64,
    pub delta_miles: f64,
}

impl StackedBar {
    #[must_use]
    pub fn top(&self) -> f64 {
        self.before_miles + self.delta_miles
    }
}

/// Converts analysed records to bars, keeping their order.
#[must_use]
pub fn stacked_bars(analysis: &Analysis) -> Vec<StackedBar> {
    analysis
        .records
        .iter()
        .map(|r| StackedBar {
            street_name: r.street_name.clone(),
            before_miles: meters_to_miles(r.distance_before),
            delta_miles: meters_to_miles(r.delta),
        })
        .collect()
}

/// Upper bound of the y axis: the tallest bar plus headroom for the legend.
#[must_use]
pub fn y_axis_max(bars: &[StackedBar]) -> f64 {
    let tallest = bars.iter().map(StackedBar::top).fold(0.0_f64, f64::max);
    if tallest > 0.0 { tallest * 1.15 } else { 1.0 }
}

#[must_use]
pub fn average_annotation(mean_delta_miles: f64) -> String {
    format!("Average distance increase: {mean_delta_miles:.2} miles")
}

fn segment(index: usize, from: f64, to: f64, color: RGBColor) -> Rectangle<(SegmentValue<usize>, f64)> {
    let mut bar = Rectangle::new(
        [
            (SegmentValue::Exact(index), from),
            (SegmentValue::Exact(index + 1), to),
        ],
        color.filled(),
    );
    bar.set_margin(0, 0, 4, 4);
    bar
}

/// Renders the stacked distance chart to a PNG at `path`.
///
/// # Errors
///
/// * [`ChartError::NoData`] if the analysis has no records.
/// * [`ChartError::Drawing`] if the backend cannot draw or write the file.
pub fn render_stacked_distances(
    path: &Path,
    analysis: &Analysis,
    labels: &ChartLabels,
) -> Result<(), ChartError> {
    let bars = stacked_bars(analysis);
    if bars.is_empty() {
        return Err(ChartError::NoData);
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;

    let (header, body) = root.split_vertically(HEADER_HEIGHT);
    header
        .draw_text(
            &labels.title(),
            &TextStyle::from(("sans-serif", 30).into_font()).color(&BLACK),
            (30, 15),
        )
        .map_err(drawing)?;
    header
        .draw_text(
            &average_annotation(analysis.mean_delta_miles()),
            &TextStyle::from(("sans-serif", 20).into_font()).color(&BLACK),
            (30, 55),
        )
        .map_err(drawing)?;

    let mut chart = ChartBuilder::on(&body)
        .margin(20)
        .x_label_area_size(180)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0.0..y_axis_max(&bars))
        .map_err(drawing)?;

    let street_label = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) => bars
            .get(*i)
            .map(|bar| bar.street_name.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&street_label)
        .x_label_style(("sans-serif", 13).into_font().transform(FontTransform::Rotate90))
        .x_desc("Streets")
        .y_desc("Driving distance (miles)")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(
            bars.iter()
                .enumerate()
                .map(|(i, bar)| segment(i, 0.0, bar.before_miles, BEFORE_COLOR)),
        )
        .map_err(drawing)?
        .label("Before LTN")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], BEFORE_COLOR.filled()));

    chart
        .draw_series(
            bars.iter()
                .enumerate()
                .map(|(i, bar)| segment(i, bar.before_miles, bar.top(), AFTER_COLOR)),
        )
        .map_err(drawing)?
        .label("After LTN")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], AFTER_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(drawing)?;

    root.present().map_err(drawing)?;
    log::debug!("Rendered {} bars to {}", bars.len(), path.display());

    Ok(())
}
