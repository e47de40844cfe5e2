//! Plotters-powered radar chart widget for Ratatui.
//!
//! Chart space is the one used by `geometry::polar` (origin at the center,
//! `+y` down). Plotters' cartesian space has `+y` up, so every point is
//! flipped on the way in. `ChartViewport` maps terminal cells back to chart
//! space for mouse dragging.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{AttributeVector, AxisId};
use crate::geometry::{ChartGeometry, ChartPoint};
use crate::report::{MANUAL_COLOR, Rgb};

/// Visible half-width of the chart, as a multiple of the radius.
const EXTENT_FACTOR: f64 = 1.15;

/// Guide ring fractions.
const RINGS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// Handle cross half-size, as a fraction of the radius.
const HANDLE_SIZE: f64 = 0.035;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: u16 = 2;

/// The square-ish cell rectangle the chart occupies, and its chart-space extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartViewport {
    pub area: Rect,
    pub extent: f64,
}

impl ChartViewport {
    /// Largest centered rect inside `inner` that keeps the chart round.
    pub fn fit(inner: Rect, geometry: &ChartGeometry) -> Self {
        let height = inner.height.min(inner.width / CELL_ASPECT);
        let width = height * CELL_ASPECT;
        let area = Rect {
            x: inner.x + (inner.width - width) / 2,
            y: inner.y + (inner.height - height) / 2,
            width,
            height,
        };
        Self {
            area,
            extent: geometry.radius() * EXTENT_FACTOR,
        }
    }

    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.area.x
            && col < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }

    /// Chart-space position of a cell center.
    pub fn to_chart(&self, col: u16, row: u16) -> ChartPoint {
        let u = (f64::from(col) - f64::from(self.area.x) + 0.5) / f64::from(self.area.width.max(1));
        let v = (f64::from(row) - f64::from(self.area.y) + 0.5) / f64::from(self.area.height.max(1));
        ChartPoint::new(-self.extent + u * 2.0 * self.extent, -self.extent + v * 2.0 * self.extent)
    }

    /// Cell containing a chart-space point, if it is inside the viewport.
    pub fn to_cell(&self, p: ChartPoint) -> Option<(u16, u16)> {
        let u = (p.x + self.extent) / (2.0 * self.extent);
        let v = (p.y + self.extent) / (2.0 * self.extent);
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        let col = self.area.x + (u * f64::from(self.area.width)).floor() as u16;
        let row = self.area.y + (v * f64::from(self.area.height)).floor() as u16;
        Some((col, row))
    }

    /// Chart-space length of one cell, horizontally.
    pub fn cell_size(&self) -> f64 {
        2.0 * self.extent / f64::from(self.area.width.max(1))
    }
}

/// A render-only radar chart description.
pub struct RadarChart<'a> {
    pub geometry: ChartGeometry,
    pub extent: f64,
    /// Manual applicant profile, when shown.
    pub manual: Option<&'a AttributeVector>,
    /// Draw drag handles on the manual polygon.
    pub handles: bool,
    /// Axis whose handle is highlighted.
    pub focus: Option<AxisId>,
    /// Selected customers with their overlay colors, in selection order.
    pub customers: &'a [(AttributeVector, Rgb)],
}

impl<'a> Widget for RadarChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let extent = self.extent;
        let geometry = self.geometry;
        let rings: Vec<Vec<(f64, f64)>> = RINGS
            .iter()
            .map(|&f| geometry.ring(f, 72).iter().map(flip).collect())
            .collect();
        let outer = closed(&geometry.outer_polygon());
        let spokes: Vec<[(f64, f64); 2]> = geometry
            .outer_polygon()
            .iter()
            .map(|tip| [(0.0, 0.0), flip(tip)])
            .collect();
        let overlays: Vec<(Vec<(f64, f64)>, RGBColor)> = self
            .customers
            .iter()
            .map(|(values, c)| (closed(&geometry.polygon(values)), rgb(*c)))
            .collect();
        let manual = self.manual.map(|values| {
            let vertices = geometry.polygon(values);
            (closed(&vertices), vertices.map(|p| flip(&p)))
        });
        let handles = self.handles;
        let focus = self.focus;
        let arm = geometry.radius() * HANDLE_SIZE;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(0)
                .build_cartesian_2d(-extent..extent, -extent..extent)?;

            let grid_color = RGBColor(90, 90, 90);
            for ring in &rings {
                chart.draw_series(LineSeries::new(ring.iter().copied(), &grid_color))?;
            }
            for spoke in &spokes {
                chart.draw_series(LineSeries::new(spoke.iter().copied(), &grid_color))?;
            }
            chart.draw_series(LineSeries::new(outer.iter().copied(), &WHITE))?;

            for (polygon, color) in &overlays {
                chart.draw_series(LineSeries::new(polygon.iter().copied(), color))?;
            }

            if let Some((outline, vertices)) = &manual {
                let manual_color = rgb(MANUAL_COLOR);
                chart.draw_series(LineSeries::new(outline.iter().copied(), &manual_color))?;

                if handles {
                    // `Circle` markers scale badly on this backend; a small cross reads better.
                    for (axis, &(x, y)) in AxisId::ALL.iter().zip(vertices.iter()) {
                        let color = if focus == Some(*axis) { YELLOW } else { WHITE };
                        chart.draw_series(LineSeries::new([(x - arm, y), (x + arm, y)], &color))?;
                        chart.draw_series(LineSeries::new([(x, y - arm), (x, y + arm)], &color))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Chart space (`+y` down) to plotters space (`+y` up).
fn flip(p: &ChartPoint) -> (f64, f64) {
    (p.x, -p.y)
}

fn closed(points: &[ChartPoint]) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = points.iter().map(flip).collect();
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

pub fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

pub fn term_color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ChartViewport {
        ChartViewport::fit(Rect::new(0, 0, 100, 40), &ChartGeometry::default())
    }

    #[test]
    fn viewport_keeps_two_to_one_cells() {
        let vp = viewport();
        assert_eq!(vp.area.height, 40);
        assert_eq!(vp.area.width, 80);
        assert_eq!(vp.area.x, 10);
        assert!((vp.extent - 230.0).abs() < 1e-9);
    }

    #[test]
    fn center_cell_maps_near_origin() {
        let vp = viewport();
        let p = vp.to_chart(50, 20);
        assert!(p.x.abs() <= vp.cell_size());
        assert!(p.y.abs() <= 2.0 * vp.extent / 40.0);
    }

    #[test]
    fn cell_round_trip() {
        let vp = viewport();
        for (col, row) in [(10, 0), (30, 7), (89, 39)] {
            assert_eq!(vp.to_cell(vp.to_chart(col, row)), Some((col, row)));
        }
        assert!(vp.contains(10, 0));
        assert!(!vp.contains(9, 0));
        assert_eq!(vp.to_cell(ChartPoint::new(1000.0, 0.0)), None);
    }

    #[test]
    fn top_cells_are_negative_y() {
        let vp = viewport();
        assert!(vp.to_chart(50, 0).y < 0.0);
        assert!(vp.to_chart(50, 39).y > 0.0);
    }
}
