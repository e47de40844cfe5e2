//! Polar layout of the radar chart.
//!
//! Screen convention: the origin is the chart center, `+x` points right and
//! `+y` points down. Axis 0 points up and subsequent axes proceed clockwise:
//!
//! `angle(i) = i * (2π / 6) - π/2`

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::{Point2, Vector2};

use crate::domain::{AXIS_COUNT, AttributeVector, AxisId};
use crate::geometry::normalize::normalize;

/// Chart canvas dimensions the default radius is derived from.
pub const CHART_WIDTH: f64 = 600.0;
pub const CHART_HEIGHT: f64 = 600.0;
pub const CHART_MARGIN: f64 = 100.0;

/// Angular distance between adjacent axes.
pub const ANGLE_SLICE: f64 = TAU / AXIS_COUNT as f64;

/// A position in chart space.
pub type ChartPoint = Point2<f64>;

/// Angle of an axis in radians.
pub fn angle(axis: AxisId) -> f64 {
    axis.index() as f64 * ANGLE_SLICE - FRAC_PI_2
}

/// Unit vector pointing along an axis.
pub fn axis_direction(axis: AxisId) -> Vector2<f64> {
    let a = angle(axis);
    Vector2::new(a.cos(), a.sin())
}

/// Radar chart geometry with a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    radius: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            radius: CHART_WIDTH.min(CHART_HEIGHT) / 2.0 - CHART_MARGIN,
        }
    }
}

impl ChartGeometry {
    /// Geometry with an explicit radius. Non-positive radii fall back to the default.
    pub fn with_radius(radius: f64) -> Self {
        if radius.is_finite() && radius > 0.0 {
            Self { radius }
        } else {
            Self::default()
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Map a data value on `axis` to its vertex position.
    pub fn to_point(&self, axis: AxisId, value: f64) -> ChartPoint {
        let spec = axis.axis();
        let r = normalize(value, spec.min, spec.max) * self.radius;
        Point2::from(axis_direction(axis) * r)
    }

    /// Inverse of `to_point` for drag interaction.
    ///
    /// The cursor is projected onto the axis direction with a dot product, so
    /// off-axis movement still yields a value (only the along-axis component
    /// counts). The projection is clamped to `[0, radius]` before mapping back
    /// to `[min, max]`. The result is not rounded.
    pub fn from_point(&self, axis: AxisId, cursor: ChartPoint) -> f64 {
        let spec = axis.axis();
        let projection = cursor.coords.dot(&axis_direction(axis));
        let distance = if projection.is_nan() {
            0.0
        } else {
            projection.clamp(0.0, self.radius)
        };
        spec.min + (distance / self.radius) * spec.span()
    }

    /// Vertices of the polygon for an applicant profile.
    pub fn polygon(&self, values: &AttributeVector) -> [ChartPoint; AXIS_COUNT] {
        AxisId::ALL.map(|axis| self.to_point(axis, values[axis]))
    }

    /// Vertices of the outer hexagon (every axis at its max).
    pub fn outer_polygon(&self) -> [ChartPoint; AXIS_COUNT] {
        AxisId::ALL.map(|axis| Point2::from(axis_direction(axis) * self.radius))
    }

    /// Concentric guide circle at `fraction` of the radius, as a closed polyline.
    pub fn ring(&self, fraction: f64, segments: usize) -> Vec<ChartPoint> {
        let segments = segments.max(3);
        let r = self.radius * fraction;
        (0..=segments)
            .map(|i| {
                let a = i as f64 / segments as f64 * TAU;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect()
    }

    /// Axis label anchor, placed `offset` beyond the outer hexagon.
    pub fn label_point(&self, axis: AxisId, offset: f64) -> ChartPoint {
        Point2::from(axis_direction(axis) * (self.radius + offset))
    }

    /// Handle closest to `cursor` within `tolerance`, if any.
    pub fn nearest_handle(&self, values: &AttributeVector, cursor: ChartPoint, tolerance: f64) -> Option<AxisId> {
        self.polygon(values)
            .iter()
            .zip(AxisId::ALL)
            .map(|(p, axis)| (axis, nalgebra::distance(p, &cursor)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(axis, _)| axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AXES;

    #[test]
    fn default_radius_matches_canvas() {
        assert_eq!(ChartGeometry::default().radius(), 200.0);
        assert_eq!(ChartGeometry::with_radius(-1.0).radius(), 200.0);
    }

    #[test]
    fn axis_zero_points_up_and_axes_go_clockwise() {
        let g = ChartGeometry::default();
        let top = g.to_point(AxisId::CreditScore, 850.0);
        assert!(top.x.abs() < 1e-9);
        assert!((top.y + 200.0).abs() < 1e-9);

        // Axis 1 sits at -30 degrees: right of center, above the horizon.
        let second = g.to_point(AxisId::AnnualIncome, 175_000.0);
        assert!(second.x > 0.0);
        assert!(second.y < 0.0);
        assert!((second.coords.norm() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn to_point_is_monotonic_in_value() {
        let g = ChartGeometry::default();
        for axis in AXES {
            let mut prev = -1.0;
            for step in 0..=20 {
                let value = axis.min + axis.span() * step as f64 / 20.0;
                let r = g.to_point(axis.id, value).coords.norm();
                assert!(r > prev, "{} not monotonic at {value}", axis.name);
                prev = r;
            }
        }
    }

    #[test]
    fn from_point_inverts_to_point_on_axis() {
        let g = ChartGeometry::default();
        for axis in AXES {
            let value = axis.min + axis.span() * 0.3;
            let p = g.to_point(axis.id, value);
            let back = g.from_point(axis.id, p);
            assert!((back - value).abs() < 1e-6, "{}: {back} != {value}", axis.name);
        }
    }

    #[test]
    fn from_point_clamps_projection() {
        let g = ChartGeometry::default();
        // Far beyond the rim on axis 0 (up is -y).
        assert_eq!(g.from_point(AxisId::CreditScore, Point2::new(0.0, -10_000.0)), 850.0);
        // Behind the center.
        assert_eq!(g.from_point(AxisId::CreditScore, Point2::new(0.0, 50.0)), 300.0);
    }

    #[test]
    fn from_point_ignores_perpendicular_offset() {
        let g = ChartGeometry::default();
        let on_axis = g.from_point(AxisId::CreditScore, Point2::new(0.0, -100.0));
        let off_axis = g.from_point(AxisId::CreditScore, Point2::new(75.0, -100.0));
        assert!((on_axis - off_axis).abs() < 1e-9);
    }

    #[test]
    fn nearest_handle_respects_tolerance() {
        let g = ChartGeometry::default();
        let values = AttributeVector::DEFAULT;
        let handle = g.to_point(AxisId::YearsEmployed, values[AxisId::YearsEmployed]);
        let near = Point2::new(handle.x + 2.0, handle.y);
        assert_eq!(g.nearest_handle(&values, near, 10.0), Some(AxisId::YearsEmployed));
        assert_eq!(g.nearest_handle(&values, Point2::new(500.0, 500.0), 10.0), None);
    }

    #[test]
    fn ring_is_closed() {
        let g = ChartGeometry::default();
        let ring = g.ring(0.5, 12);
        assert_eq!(ring.len(), 13);
        assert!(nalgebra::distance(&ring[0], &ring[12]) < 1e-9);
    }
}
