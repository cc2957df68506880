use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{pos2, vec2, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::{origin_color, SequentialBlues, BAR_COLOR, LINE_COLOR, MARKER_COLOR};
use crate::data::model::Origin;
use crate::data::series::{extent, DashboardSeries, PieSlice, ScatterPoint};
use crate::refresh::{DashboardEvent, ViewRefresh};

// ---------------------------------------------------------------------------
// Pie geometry
// ---------------------------------------------------------------------------

/// Angular extent of one slice. Angles run clockwise from 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub origin: Origin,
    pub count: usize,
    pub start: f64,
    pub end: f64,
}

/// Lay slices out around the unit circle in series order.
pub fn pie_layout(slices: &[PieSlice]) -> Vec<Wedge> {
    let total: usize = slices.iter().map(|s| s.count).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut angle = 0.0;
    slices
        .iter()
        .filter(|s| s.count > 0)
        .map(|s| {
            let start = angle;
            angle += TAU * s.count as f64 / total as f64;
            Wedge {
                origin: s.origin,
                count: s.count,
                start,
                end: angle,
            }
        })
        .collect()
}

/// Slice under `point` (plot coordinates, unit radius), if any.
pub fn wedge_at(wedges: &[Wedge], point: [f64; 2]) -> Option<Origin> {
    let [x, y] = point;
    if x.hypot(y) > 1.0 {
        return None;
    }
    let theta = x.atan2(y).rem_euclid(TAU);
    wedges
        .iter()
        .find(|w| theta >= w.start && theta < w.end)
        .map(|w| w.origin)
}

fn polar(theta: f64, radius: f64) -> [f64; 2] {
    [radius * theta.sin(), radius * theta.cos()]
}

/// Convex pieces (at most a quarter turn each) so the filled polygons render
/// correctly for slices wider than half the pie.
fn wedge_polygons(w: &Wedge) -> Vec<Vec<[f64; 2]>> {
    let pieces = ((w.end - w.start) / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = (w.end - w.start) / pieces as f64;

    (0..pieces)
        .map(|p| {
            let a0 = w.start + step * p as f64;
            let arc_steps = 24;
            let mut pts = vec![[0.0, 0.0]];
            pts.extend(
                (0..=arc_steps).map(|i| polar(a0 + step * i as f64 / arc_steps as f64, 1.0)),
            );
            pts
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Vehicle count per origin. Returns a click event when a slice is hit.
pub fn pie_chart(ui: &mut Ui, refresh: &ViewRefresh, height: f32) -> Option<DashboardEvent> {
    let wedges = pie_layout(&refresh.series.pie);
    let highlight = refresh.highlight();
    let outline = Color32::from_rgb(0x0d, 0x11, 0x17);
    let total = refresh.series.pie_total();

    let response = Plot::new("pie_chart")
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.1)
        .include_x(1.1)
        .include_y(-1.1)
        .include_y(1.1)
        .label_formatter(|_, value| {
            wedge_at(&wedges, [value.x, value.y])
                .and_then(|o| wedges.iter().find(|w| w.origin == o))
                .map(|w| format!("{}: {} of {total} cars", w.origin, w.count))
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for w in &wedges {
                let selected = highlight == Some(w.origin);
                let mut fill = origin_color(w.origin);
                let mut stroke_width: f32 = 2.0;
                if let Some(h) = highlight {
                    if h != w.origin {
                        fill = fill.gamma_multiply(0.3);
                    }
                }
                if selected {
                    stroke_width = 4.0;
                }

                for piece in wedge_polygons(w) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .fill_color(fill)
                            .stroke(Stroke::new(stroke_width, outline)),
                    );
                }

                let mid = polar((w.start + w.end) / 2.0, 0.6);
                plot_ui.text(Text::new(
                    PlotPoint::new(mid[0], mid[1]),
                    RichText::new(format!("{}\n{}", w.origin, w.count)).color(Color32::WHITE),
                ));
            }
            plot_ui.pointer_coordinate()
        });

    if !response.response.clicked() {
        return None;
    }
    let pointer = response.inner?;
    wedge_at(&wedges, [pointer.x, pointer.y]).map(DashboardEvent::SliceClicked)
}

/// Mean MPG per model year.
pub fn line_chart(ui: &mut Ui, series: &DashboardSeries, height: f32) {
    let points: Vec<[f64; 2]> = series
        .line
        .iter()
        .map(|&(year, mpg)| [year as f64, mpg])
        .collect();

    Plot::new("line_chart")
        .height(height)
        .x_axis_label("Model Year")
        .y_axis_label("Average MPG")
        .include_y(0.0)
        .label_formatter(|_, value| format!("Year: {:.0}\nAvg MPG: {:.2}", value.x, value.y))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(LINE_COLOR)
                    .width(2.0)
                    .name("Average MPG"),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(5.0)
                    .color(MARKER_COLOR),
            );
        });
}

/// Horsepower against weight, coloured by origin.
pub fn scatter_chart(ui: &mut Ui, series: &DashboardSeries, height: f32) {
    let hp_extent = extent(series.scatter.iter().map(|p| p.horsepower));
    let weight_extent = extent(series.scatter.iter().map(|p| p.weight));
    // Normalised nearest-neighbour lookup for the hover label.
    let span = |e: Option<(f64, f64)>| e.map(|(lo, hi)| (hi - lo).max(1.0)).unwrap_or(1.0);
    let (hp_span, weight_span) = (span(hp_extent), span(weight_extent));

    Plot::new("scatter_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Horsepower")
        .y_axis_label("Weight")
        .label_formatter(|_, value| {
            series
                .scatter
                .iter()
                .min_by(|a, b| {
                    let dist = |p: &ScatterPoint| {
                        let dx = (p.horsepower - value.x) / hp_span;
                        dx.hypot((p.weight - value.y) / weight_span)
                    };
                    dist(a).total_cmp(&dist(b))
                })
                .map(|p| {
                    format!(
                        "{}\nHorsepower: {}\nMPG: {}\nWeight: {}",
                        p.name, p.horsepower, p.mpg, p.weight
                    )
                })
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for origin in Origin::ALL {
                let points: Vec<[f64; 2]> = series
                    .scatter
                    .iter()
                    .filter(|p| p.origin == origin)
                    .map(|p| [p.horsepower, p.weight])
                    .collect();
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .radius(3.0)
                        .color(origin_color(origin).gamma_multiply(0.7))
                        .name(origin.as_str()),
                );
            }
        });
}

/// Vehicle count per cylinder count.
pub fn bar_chart(ui: &mut Ui, series: &DashboardSeries, height: f32) {
    let bars: Vec<Bar> = series
        .bars
        .iter()
        .map(|&(cyl, count)| {
            Bar::new(cyl as f64, count as f64)
                .width(0.8)
                .fill(BAR_COLOR)
                .name(format!("{cyl} cylinders"))
        })
        .collect();

    Plot::new("bar_chart")
        .height(height)
        .x_axis_label("Cylinders")
        .y_axis_label("Car Count")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
        });
}

const LEGEND_TICKS: usize = 5;
const LEGEND_HEIGHT: f32 = 30.0;

/// Evenly spaced legend labels from 0 to `max`, both ends included.
pub fn legend_ticks(max: f64) -> Vec<f64> {
    (0..LEGEND_TICKS)
        .map(|i| max * i as f64 / (LEGEND_TICKS - 1) as f64)
        .collect()
}

/// Mean MPG per model year and origin, with a colour legend underneath.
pub fn heatmap_chart(ui: &mut Ui, series: &DashboardSeries, height: f32) {
    let heatmap = &series.heatmap;
    let max = heatmap.max_mean();
    let scale = SequentialBlues::new(max);
    let row_of = |origin: Origin| (Origin::ALL.len() - 1 - origin as usize) as f64;

    let mut plot = Plot::new("heatmap_chart").height((height - LEGEND_HEIGHT).max(80.0));
    if let (Some(first), Some(last)) = (heatmap.years.first(), heatmap.years.last()) {
        plot = plot.include_x(*first as f64 - 0.5).include_x(*last as f64 + 0.5);
    }

    plot
        .x_axis_label("Model Year")
        .y_axis_label("Region")
        .show_grid(false)
        .y_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            Origin::ALL
                .into_iter()
                .find(|&o| (row_of(o) - mark.value).abs() < 1e-6)
                .map(|o| o.to_string())
                .unwrap_or_default()
        })
        .label_formatter(|_, value| {
            heatmap
                .cells
                .iter()
                .find(|c| {
                    (c.a as f64 - value.x).abs() <= 0.5 && (row_of(c.b) - value.y).abs() <= 0.5
                })
                .map(|c| format!("Region: {}\nYear: {}\nAvg MPG: {:.2}", c.b, c.a, c.mean))
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for cell in &heatmap.cells {
                let (x, y) = (cell.a as f64, row_of(cell.b));
                let h = 0.475;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(vec![
                        [x - h, y - h],
                        [x + h, y - h],
                        [x + h, y + h],
                        [x - h, y + h],
                    ]))
                    .fill_color(scale.color_for(cell.mean))
                    .stroke(Stroke::new(1.0, Color32::from_gray(0x22))),
                );
            }
        });

    if max > 0.0 {
        heatmap_legend(ui, &scale, max);
    }
}

/// Gradient bar over `[0, max]` with tick labels.
fn heatmap_legend(ui: &mut Ui, scale: &SequentialBlues, max: f64) {
    let width = ui.available_width().min(360.0);
    let (rect, _) = ui.allocate_exact_size(vec2(width, LEGEND_HEIGHT), Sense::hover());
    // Inset so the outer tick labels are not clipped.
    let bar = Rect::from_min_max(
        pos2(rect.left() + 16.0, rect.top() + 2.0),
        pos2(rect.right() - 16.0, rect.top() + 14.0),
    );
    let painter = ui.painter_at(rect);

    let steps = 64;
    for i in 0..steps {
        let x0 = bar.left() + bar.width() * i as f32 / steps as f32;
        let x1 = bar.left() + bar.width() * (i + 1) as f32 / steps as f32;
        let value = max * (i as f64 + 0.5) / steps as f64;
        painter.rect_filled(
            Rect::from_min_max(pos2(x0, bar.top()), pos2(x1, bar.bottom())),
            0.0,
            scale.color_for(value),
        );
    }

    let text_color = ui.visuals().text_color();
    for value in legend_ticks(max) {
        let x = bar.left() + bar.width() * (value / max) as f32;
        painter.line_segment(
            [pos2(x, bar.bottom()), pos2(x, bar.bottom() + 3.0)],
            Stroke::new(1.0, text_color),
        );
        painter.text(
            pos2(x, bar.bottom() + 3.0),
            Align2::CENTER_TOP,
            format!("{value:.1}"),
            FontId::proportional(10.0),
            text_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices(counts: [usize; 3]) -> Vec<PieSlice> {
        Origin::ALL
            .into_iter()
            .zip(counts)
            .map(|(origin, count)| PieSlice { origin, count })
            .collect()
    }

    #[test]
    fn layout_covers_full_circle_proportionally() {
        let wedges = pie_layout(&slices([2, 1, 1]));
        assert_eq!(wedges.len(), 3);
        assert_eq!(wedges[0].start, 0.0);
        assert!((wedges[0].end - TAU / 2.0).abs() < 1e-12);
        assert!((wedges[2].end - TAU).abs() < 1e-12);
    }

    #[test]
    fn empty_slices_are_skipped() {
        let wedges = pie_layout(&slices([3, 0, 1]));
        assert_eq!(wedges.len(), 2);
        assert!(pie_layout(&slices([0, 0, 0])).is_empty());
    }

    #[test]
    fn hit_testing_finds_the_clicked_slice() {
        // American: right half, European: bottom-left, Japanese: top-left.
        let wedges = pie_layout(&slices([2, 1, 1]));
        assert_eq!(wedge_at(&wedges, [0.5, 0.1]), Some(Origin::American));
        assert_eq!(wedge_at(&wedges, [-0.5, -0.5]), Some(Origin::European));
        assert_eq!(wedge_at(&wedges, [-0.5, 0.5]), Some(Origin::Japanese));
        assert_eq!(wedge_at(&wedges, [0.9, 0.9]), None);
    }

    #[test]
    fn legend_ticks_span_zero_to_max() {
        let ticks = legend_ticks(32.0);
        assert_eq!(ticks, vec![0.0, 8.0, 16.0, 24.0, 32.0]);
        let labels: Vec<String> = legend_ticks(27.3).iter().map(|v| format!("{v:.1}")).collect();
        assert_eq!(labels.first().map(String::as_str), Some("0.0"));
        assert_eq!(labels.last().map(String::as_str), Some("27.3"));
    }

    #[test]
    fn wide_wedges_split_into_convex_pieces() {
        let wedges = pie_layout(&slices([5, 0, 1]));
        assert_eq!(wedge_polygons(&wedges[0]).len(), 4);
        assert_eq!(wedge_polygons(&wedges[1]).len(), 1);
    }
}
