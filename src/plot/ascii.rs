//! ASCII/Unicode radar plot for terminal output.
//!
//! Fixed-size character grid, deterministic for a given input (handy for
//! golden tests and piping into files).
//!
//! Plot elements:
//! - outer hexagon: `.`
//! - axis spokes: `:`
//! - selected customers: `1`..`9` (then `+`), in selection order
//! - manual applicant outline: `*`, vertices (drag handles): `@`

use crate::domain::AttributeVector;
use crate::geometry::{ChartGeometry, ChartPoint};
use crate::report::format_value;

/// One polygon to overlay on the radar.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub label: String,
    pub values: AttributeVector,
}

/// Render the radar chart with an optional manual profile and customer overlays.
pub fn render_ascii_radar(
    manual: Option<&AttributeVector>,
    customers: &[RadarSeries],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(11);
    let height = height.max(7);
    let geometry = ChartGeometry::default();
    let canvas = Canvas::new(width, height, geometry.radius());
    let mut grid = vec![vec![' '; width]; height];

    let center = ChartPoint::origin();
    for tip in geometry.outer_polygon() {
        canvas.line(&mut grid, center, tip, ':');
    }
    canvas.closed_path(&mut grid, &geometry.outer_polygon(), '.');

    // Later series overwrite earlier ones; the manual profile is drawn last.
    for (i, series) in customers.iter().enumerate() {
        let ch = std::char::from_digit(i as u32 + 1, 10)
            .filter(|_| i < 9)
            .unwrap_or('+');
        canvas.closed_path(&mut grid, &geometry.polygon(&series.values), ch);
    }

    if let Some(values) = manual {
        let polygon = geometry.polygon(values);
        canvas.closed_path(&mut grid, &polygon, '*');
        for p in polygon {
            canvas.plot(&mut grid, p, '@');
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Radar: {} customer(s){}\n",
        customers.len(),
        if manual.is_some() { " + manual profile" } else { "" }
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    if let Some(values) = manual {
        out.push_str(&legend_line("*", "Manual", values));
    }
    for (i, series) in customers.iter().enumerate() {
        let key = if i < 9 { (i + 1).to_string() } else { "+".to_string() };
        out.push_str(&legend_line(&key, &series.label, &series.values));
    }

    out
}

fn legend_line(key: &str, label: &str, values: &AttributeVector) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|(axis, v)| format!("{}={}", axis.axis().name, format_value(v, axis)))
        .collect();
    format!("{key} {label}: {}\n", parts.join(" | "))
}

/// Maps chart space onto grid cells.
struct Canvas {
    width: usize,
    height: usize,
    radius: f64,
}

impl Canvas {
    fn new(width: usize, height: usize, radius: f64) -> Self {
        Self { width, height, radius }
    }

    fn cell(&self, p: ChartPoint) -> (isize, isize) {
        let cx = (self.width as f64 - 1.0) / 2.0;
        let cy = (self.height as f64 - 1.0) / 2.0;
        let col = cx + p.x / self.radius * cx;
        let row = cy + p.y / self.radius * cy;
        (col.round() as isize, row.round() as isize)
    }

    fn plot(&self, grid: &mut [Vec<char>], p: ChartPoint, ch: char) {
        let (col, row) = self.cell(p);
        set(grid, col, row, ch);
    }

    fn closed_path(&self, grid: &mut [Vec<char>], points: &[ChartPoint], ch: char) {
        for (i, &a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            self.line(grid, a, b, ch);
        }
    }

    fn line(&self, grid: &mut [Vec<char>], a: ChartPoint, b: ChartPoint, ch: char) {
        let (x0, y0) = self.cell(a);
        let (x1, y1) = self.cell(b);
        draw_line(grid, x0, y0, x1, y1, ch);
    }
}

fn set(grid: &mut [Vec<char>], col: isize, row: isize, ch: char) {
    if row < 0 || col < 0 {
        return;
    }
    if let Some(cell) = grid.get_mut(row as usize).and_then(|r| r.get_mut(col as usize)) {
        *cell = ch;
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], mut x0: isize, mut y0: isize, x1: isize, y1: isize, ch: char) {
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        set(grid, x0, y0, ch);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AxisId;

    fn rows(text: &str) -> Vec<Vec<char>> {
        text.lines().skip(1).take(11).map(|l| l.chars().collect()).collect()
    }

    #[test]
    fn output_is_deterministic() {
        let a = render_ascii_radar(Some(&AttributeVector::DEFAULT), &[], 21, 11);
        let b = render_ascii_radar(Some(&AttributeVector::DEFAULT), &[], 21, 11);
        assert_eq!(a, b);
    }

    #[test]
    fn outer_tip_and_center() {
        let text = render_ascii_radar(None, &[], 21, 11);
        let grid = rows(&text);
        assert_eq!(grid[0][10], '.');
        assert_eq!(grid[5][10], ':');
        assert!(text.starts_with("Radar: 0 customer(s)\n"));
    }

    #[test]
    fn manual_handles_sit_on_axes() {
        let mut values = AttributeVector::DEFAULT;
        values.set(AxisId::CreditScore, 850.0);
        let text = render_ascii_radar(Some(&values), &[], 21, 11);
        let grid = rows(&text);
        // Credit score at max lands on the top tip.
        assert_eq!(grid[0][10], '@');
        assert!(text.contains("* Manual: Credit Score=850"));
    }

    #[test]
    fn customers_are_numbered() {
        let customers = vec![
            RadarSeries { label: "C1".into(), values: AttributeVector::new([850.0, 175_000.0, 100_000.0, 20.0, 150_000.0, 100.0]) },
            RadarSeries { label: "C2".into(), values: AttributeVector::DEFAULT },
        ];
        let text = render_ascii_radar(None, &customers, 21, 11);
        let grid = rows(&text);
        // The maxed-out customer traces the outer hexagon.
        assert_eq!(grid[0][10], '1');
        assert!(grid.iter().flatten().any(|&c| c == '2'));
        assert!(text.contains("1 C1: "));
        assert!(text.contains("2 C2: "));
    }
}
