//! Visualization utilities for TSP tours.
//!
//! Generates SVG drawings of tours for instances that carry coordinates.

use crate::instance::{Point, TspInstance};
use crate::tour::Tour;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// City marker radius
    pub node_radius: f64,
    /// Draw city indices next to markers
    pub labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
            labels: false,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an SVG drawing of a tour.
    ///
    /// Returns `None` when the instance has no coordinates to draw.
    pub fn generate_svg(&self, instance: &TspInstance, tour: &Tour) -> Option<String> {
        let points = instance.coordinates()?;
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = bounds(points);
        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .city {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | Cities: {} | Cost: {}</text>
"##,
            self.margin,
            instance.name,
            tour.len(),
            tour.cost
        ));

        let transform = |p: &Point| -> (f64, f64) {
            let tx = self.margin + (p.x - min_x) * scale;
            let ty = self.height - self.margin - (p.y - min_y) * scale;
            (tx, ty)
        };

        if tour.len() > 1 {
            let mut path = String::new();
            for (i, city) in tour.closed_path().enumerate() {
                let (x, y) = transform(&points[city]);
                let op = if i == 0 { "M" } else { " L" };
                path.push_str(&format!("{} {:.2} {:.2}", op, x, y));
            }
            svg.push_str(&format!(
                r##"<path d="{}" class="edge"/>
"##,
                path
            ));
        }

        for (city, point) in points.iter().enumerate() {
            let (x, y) = transform(point);
            let class = if Some(city) == tour.start() { "start" } else { "city" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    city
                ));
            }
        }

        svg.push_str("</svg>");
        Some(svg)
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }
}

/// Get coordinate bounds
fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (min_x, max_x, min_y, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let instance = TspInstance::from_coordinates("test", points).unwrap();
        let tour = Tour::evaluate(&instance, vec![0, 1, 2]);

        let viz = Visualizer {
            labels: true,
            ..Visualizer::new()
        };
        let svg = viz.generate_svg(&instance, &tour).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("test"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches(" L").count(), 3);
        assert!(svg.contains(r#"class="start""#));
    }

    #[test]
    fn test_no_coordinates_no_drawing() {
        let instance = TspInstance::from_matrix("m", vec![vec![0, 1], vec![1, 0]]).unwrap();
        let tour = Tour::evaluate(&instance, vec![0, 1]);
        assert!(Visualizer::new().generate_svg(&instance, &tour).is_none());
    }
}
