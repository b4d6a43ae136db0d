use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points, Polygon};

use crate::color::{ColorScale, Scheme, extent};
use crate::data::boundary::BoundaryStatus;
use crate::data::model::{Listing, ListingDataset};
use crate::state::AppState;

/// Distinct colours per continuous scale; points are batched per colour.
const COLOR_STEPS: u32 = 24;

// ---------------------------------------------------------------------------
// Point sizing
// ---------------------------------------------------------------------------

/// Maps price onto a circle area range in px², the way a declarative
/// `size` encoding does (zero-based linear domain).
#[derive(Debug, Clone, Copy)]
pub struct SizeScale {
    max_value: f64,
    area: (f64, f64),
}

impl SizeScale {
    pub fn fit(values: impl IntoIterator<Item = f64>, area: (f64, f64)) -> Self {
        let max_value = extent(values).map(|(_, hi)| hi).unwrap_or(1.0);
        Self { max_value, area }
    }

    /// Radius in points, rounded to half a point.
    pub fn radius(&self, value: f64) -> f32 {
        let t = if self.max_value > 0.0 {
            (value / self.max_value).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let area = self.area.0 + t * (self.area.1 - self.area.0);
        let r = (area / std::f64::consts::PI).sqrt();
        ((r * 2.0).round() / 2.0) as f32
    }
}

// ---------------------------------------------------------------------------
// Hover lookup
// ---------------------------------------------------------------------------

/// Index of the point nearest to `target`, measuring distance relative to
/// the visible `span` of each axis. Points further than `max_distance`
/// (in those relative units) are ignored.
pub fn nearest_point(
    points: &[[f64; 2]],
    target: [f64; 2],
    span: [f64; 2],
    max_distance: f64,
) -> Option<usize> {
    let sx = if span[0] > 0.0 { span[0] } else { 1.0 };
    let sy = if span[1] > 0.0 { span[1] } else { 1.0 };
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let dx = (p[0] - target[0]) / sx;
            let dy = (p[1] - target[1]) / sy;
            (i, dx * dx + dy * dy)
        })
        .filter(|(_, d)| *d <= max_distance * max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Scatter batching
// ---------------------------------------------------------------------------

/// A listing placed on a chart.
struct Marker {
    pos: [f64; 2],
    listing: usize,
    color: Color32,
    radius: f32,
    series: String,
}

/// Draw markers grouped into one `Points` item per (series, colour, size),
/// and return the hovered listing, if any.
fn draw_markers(plot_ui: &mut egui_plot::PlotUi, markers: &[Marker]) -> Option<usize> {
    let mut groups: BTreeMap<(&str, [u8; 4], u32), Vec<[f64; 2]>> = BTreeMap::new();
    for m in markers {
        let key = (m.series.as_str(), m.color.to_array(), (m.radius * 2.0) as u32);
        groups.entry(key).or_default().push(m.pos);
    }

    for ((series, rgba, half_radius), positions) in groups {
        let [r, g, b, a] = rgba;
        let mut points = Points::new(PlotPoints::from(positions))
            .radius(half_radius as f32 / 2.0)
            .filled(true)
            .color(Color32::from_rgba_premultiplied(r, g, b, a));
        if !series.is_empty() {
            points = points.name(series);
        }
        plot_ui.points(points);
    }

    let pointer = plot_ui.pointer_coordinate()?;
    let bounds = plot_ui.plot_bounds();
    let positions: Vec<[f64; 2]> = markers.iter().map(|m| m.pos).collect();
    nearest_point(
        &positions,
        [pointer.x, pointer.y],
        [bounds.width(), bounds.height()],
        0.02,
    )
    .map(|i| markers[i].listing)
}

fn with_alpha(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, _] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (opacity * 255.0) as u8)
}

fn empty_note(ui: &mut Ui, state: &AppState) {
    if state.views.filtered.is_empty() {
        ui.weak("No listings match the current filters.");
    }
}

fn listing_tooltip(ui: &mut Ui, listing: &Listing, rows: &[(&str, String)]) {
    ui.strong(if listing.name.is_empty() {
        "(unnamed listing)"
    } else {
        listing.name.as_str()
    });
    for (label, value) in rows {
        ui.label(format!("{label}: {value}"));
    }
}

fn count_label(value: Option<u32>) -> String {
    value.map_or_else(|| "–".to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// 1. Average price by neighbourhood
// ---------------------------------------------------------------------------

pub fn price_by_neighborhood_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Average Price by Neighborhood");
    empty_note(ui, state);

    let summary = &state.views.price_summary;
    let scale = ColorScale::fit(Scheme::Reds, summary.iter().map(|s| s.mean_price));

    let bars: Vec<Bar> = summary
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Bar::new(i as f64, s.mean_price)
                .width(0.7)
                .fill(scale.color_for(s.mean_price))
                .name(format!("{}\n{} listings", s.name, s.count))
        })
        .collect();
    let labels: Vec<String> = summary.iter().map(|s| s.name.clone()).collect();

    Plot::new("price_by_neighborhood")
        .height(400.0)
        .x_axis_label("Neighborhood")
        .y_axis_label("Average Price ($)")
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).element_formatter(Box::new(|bar: &Bar, _: &BarChart| {
                format!("{}\nmean price ${:.2}", bar.name, bar.value)
            })));
        });
}

// ---------------------------------------------------------------------------
// 2. Availability vs revenue
// ---------------------------------------------------------------------------

pub fn availability_revenue_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Availability vs Revenue");
    empty_note(ui, state);
    let Some(ds) = &state.dataset else { return };

    let filtered = &state.views.filtered;
    let prices = || filtered.iter().map(|&i| ds.listings[i].price);
    let color = ColorScale::fit(Scheme::Viridis, prices());
    let size = SizeScale::fit(prices(), (10.0, 200.0));

    let markers: Vec<Marker> = filtered
        .iter()
        .filter_map(|&i| {
            let l = &ds.listings[i];
            Some(Marker {
                pos: [l.availability_365? as f64, l.revenue],
                listing: i,
                color: with_alpha(color.stepped_color(l.price, COLOR_STEPS), 0.5),
                radius: size.radius(l.price),
                series: String::new(),
            })
        })
        .collect();

    let (min, max) = color.domain();
    ui.weak(format!("Color and size: price (${min:.0} – ${max:.0})"));

    let response = Plot::new("availability_revenue")
        .height(400.0)
        .x_axis_label("Availability (Days)")
        .y_axis_label("Revenue ($)")
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| draw_markers(plot_ui, &markers));

    if let Some(i) = response.inner {
        let l = &ds.listings[i];
        response.response.on_hover_ui_at_pointer(|ui| {
            listing_tooltip(
                ui,
                l,
                &[
                    ("Price", format!("${:.2}", l.price)),
                    ("Availability", count_label(l.availability_365)),
                    ("Revenue", format!("${:.0}", l.revenue)),
                ],
            );
        });
    }
}

// ---------------------------------------------------------------------------
// 3. Reviews vs revenue
// ---------------------------------------------------------------------------

pub fn reviews_revenue_chart(ui: &mut Ui, state: &AppState) {
    ui.heading("Reviews vs Revenue");
    empty_note(ui, state);
    let Some(ds) = &state.dataset else { return };

    let filtered = &state.views.filtered;
    let size = SizeScale::fit(filtered.iter().map(|&i| ds.listings[i].price), (10.0, 300.0));

    let markers: Vec<Marker> = filtered
        .iter()
        .filter_map(|&i| {
            let l = &ds.listings[i];
            let base = state
                .room_colors
                .as_ref()
                .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(&l.room_type));
            Some(Marker {
                pos: [l.number_of_reviews? as f64, l.revenue],
                listing: i,
                color: with_alpha(base, 0.6),
                radius: size.radius(l.price),
                series: l.room_type.clone(),
            })
        })
        .collect();

    let response = Plot::new("reviews_revenue")
        .height(400.0)
        .legend(Legend::default())
        .x_axis_label("Number of Reviews")
        .y_axis_label("Revenue ($)")
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| draw_markers(plot_ui, &markers));

    if let Some(i) = response.inner {
        let l = &ds.listings[i];
        response.response.on_hover_ui_at_pointer(|ui| {
            listing_tooltip(
                ui,
                l,
                &[
                    ("Price", format!("${:.2}", l.price)),
                    ("Reviews", count_label(l.number_of_reviews)),
                    ("Revenue", format!("${:.0}", l.revenue)),
                ],
            );
        });
    }
}

// ---------------------------------------------------------------------------
// 4. Map of listings
// ---------------------------------------------------------------------------

pub fn listings_map(ui: &mut Ui, state: &AppState) {
    ui.heading("Map of Listings");
    let Some(ds) = &state.dataset else { return };

    let boundaries = match state.boundaries.status() {
        BoundaryStatus::Ready(set) => {
            if set.is_empty() {
                ui.weak("Boundary file contained no polygons.");
            }
            Some(set)
        }
        BoundaryStatus::Pending => {
            ui.weak("Loading neighborhood boundaries…");
            None
        }
        BoundaryStatus::Failed(msg) => {
            ui.label(
                RichText::new(format!("Neighborhood boundaries unavailable: {msg}"))
                    .color(Color32::RED),
            );
            None
        }
        BoundaryStatus::Disabled => None,
    };
    if state.views.geo.is_empty() {
        ui.weak("No listings with coordinates match the current filters.");
    }

    let markers = map_markers(ds, &state.views.geo);
    let fill = Color32::from_rgba_unmultiplied(211, 211, 211, 38);

    let response = Plot::new("listings_map")
        .height(600.0)
        .data_aspect(1.0)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for polygon in boundaries.iter().flat_map(|set| &set.polygons) {
                for ring in polygon.rings.iter().take(1) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(ring.clone()))
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }
            }
            draw_markers(plot_ui, &markers)
        });

    if let Some(i) = response.inner {
        let l = &ds.listings[i];
        response.response.on_hover_ui_at_pointer(|ui| {
            listing_tooltip(
                ui,
                l,
                &[
                    ("Neighborhood", l.neighbourhood.clone()),
                    ("Price", format!("${:.2}", l.price)),
                ],
            );
        });
    }
}

fn map_markers(ds: &ListingDataset, geo: &[usize]) -> Vec<Marker> {
    let prices = || geo.iter().map(|&i| ds.listings[i].price);
    let color = ColorScale::fit(Scheme::RedYellowGreen, prices());
    let size = SizeScale::fit(prices(), (10.0, 300.0));

    geo.iter()
        .filter_map(|&i| {
            let l = &ds.listings[i];
            Some(Marker {
                pos: l.position()?,
                listing: i,
                color: color.stepped_color(l.price, COLOR_STEPS),
                radius: size.radius(l.price),
                series: String::new(),
            })
        })
        .collect()
}

/// Colour legend for the room-type scatter, drawn beside the side panel
/// filters so it stays visible while scrolling.
pub fn room_type_legend(ui: &mut Ui, state: &AppState) {
    let Some(cm) = &state.room_colors else { return };
    ui.strong("Room types");
    for (label, color) in cm.legend_entries() {
        ui.horizontal(|ui: &mut Ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 5.0, color);
            ui.label(label);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_scale_is_zero_based() {
        let scale = SizeScale::fit([50.0, 200.0], (10.0, 200.0));
        let smallest = scale.radius(0.0);
        let largest = scale.radius(200.0);
        assert!(smallest < scale.radius(50.0));
        assert!(scale.radius(50.0) < largest);
        assert_eq!(largest, scale.radius(10_000.0));
        assert_eq!(largest, 8.0);
    }

    #[test]
    fn nearest_point_respects_span_and_threshold() {
        let points = [[0.0, 0.0], [10.0, 1000.0], [20.0, 0.0]];
        // y spans 1000, so a 10-unit y offset is tiny relative to x.
        assert_eq!(
            nearest_point(&points, [9.0, 990.0], [20.0, 1000.0], 0.1),
            Some(1)
        );
        assert_eq!(nearest_point(&points, [10.0, 500.0], [20.0, 1000.0], 0.1), None);
        assert_eq!(nearest_point(&[], [0.0, 0.0], [1.0, 1.0], 1.0), None);
    }
}
