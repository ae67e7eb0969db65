//! Module for parsing and representing TSP instances.
//!
//! This module is the boundary to the outside world: it turns a comma-separated
//! distance matrix (or a list of planar coordinates) into an immutable, square,
//! heap-owned matrix of non-negative integer distances.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A city position in the plane, when raw coordinates are available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Represents a complete TSP instance
#[derive(Debug, Clone)]
pub struct TspInstance {
    /// Name of the instance (usually the file stem)
    pub name: String,
    /// Number of cities
    pub dimension: usize,
    /// Row-major N x N distance matrix
    distances: Vec<u64>,
    /// Raw coordinates, if the instance was built from (or annotated with) them
    coordinates: Option<Vec<Point>>,
}

impl TspInstance {
    /// Build an instance from explicit matrix rows.
    pub fn from_matrix(name: impl Into<String>, rows: Vec<Vec<u64>>) -> Result<Self> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(SolverError::EmptyMatrix);
        }

        let mut distances = Vec::with_capacity(dimension * dimension);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dimension {
                return Err(SolverError::MalformedRow {
                    row,
                    expected: dimension,
                    found: values.len(),
                });
            }
            distances.extend(values);
        }
        check_cost_range(dimension, &distances)?;

        let instance = TspInstance {
            name: name.into(),
            dimension,
            distances,
            coordinates: None,
        };
        if !instance.is_symmetric() {
            log::warn!(
                "distance matrix of {} is not symmetric; tours are evaluated in visiting direction",
                instance.name
            );
        }
        Ok(instance)
    }

    /// Parse a distance matrix from a headerless CSV file.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SolverError::open_file(path, e))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let instance = Self::from_csv_reader(name, file)?;
        log::info!(
            "loaded {} cities from {}",
            instance.dimension,
            path.display()
        );
        Ok(instance)
    }

    /// Parse a distance matrix from any CSV source.
    ///
    /// Every row must hold exactly as many fields as the first one, and there
    /// must be as many rows as columns. A single trailing empty field (a line
    /// ending with a comma) is tolerated.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows: Vec<Vec<u64>> = Vec::new();
        let mut expected: Option<usize> = None;

        for record in csv_reader.records() {
            let record = record?;
            let row = rows.len();

            let mut fields: Vec<&str> = record.iter().collect();
            if fields.len() > 1 && fields.last().map_or(false, |f| f.is_empty()) {
                fields.pop();
            }

            let expected = *expected.get_or_insert(fields.len());
            if fields.len() != expected {
                return Err(SolverError::MalformedRow {
                    row,
                    expected,
                    found: fields.len(),
                });
            }

            let values = fields
                .iter()
                .enumerate()
                .map(|(column, field)| {
                    field.parse::<u64>().map_err(|_| SolverError::InvalidEntry {
                        row,
                        column,
                        value: field.to_string(),
                    })
                })
                .collect::<Result<Vec<u64>>>()?;
            rows.push(values);
        }

        match expected {
            None => Err(SolverError::EmptyMatrix),
            Some(columns) if columns != rows.len() => Err(SolverError::NotSquare {
                rows: rows.len(),
                columns,
            }),
            Some(_) => Self::from_matrix(name, rows),
        }
    }

    /// Build an instance from planar coordinates.
    ///
    /// Matrix entries are Euclidean distances rounded to the nearest integer;
    /// the raw coordinates are kept for start-city selection and rendering.
    pub fn from_coordinates(name: impl Into<String>, points: Vec<Point>) -> Result<Self> {
        let dimension = points.len();
        if dimension == 0 {
            return Err(SolverError::EmptyMatrix);
        }

        let mut distances = vec![0u64; dimension * dimension];
        for i in 0..dimension {
            for j in 0..dimension {
                if i != j {
                    distances[i * dimension + j] =
                        points[i].distance_to(&points[j]).round() as u64;
                }
            }
        }
        check_cost_range(dimension, &distances)?;

        Ok(TspInstance {
            name: name.into(),
            dimension,
            distances,
            coordinates: Some(points),
        })
    }

    /// Parse a coordinate file (`x,y` per row) and build the matching instance.
    pub fn from_coordinates_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let points = read_points(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("loaded {} coordinates from {}", points.len(), path.display());
        Self::from_coordinates(name, points)
    }

    /// Attach raw coordinates to a matrix instance.
    pub fn with_coordinates(mut self, points: Vec<Point>) -> Result<Self> {
        if points.len() != self.dimension {
            return Err(SolverError::DimensionMismatch {
                coordinates: points.len(),
                dimension: self.dimension,
            });
        }
        self.coordinates = Some(points);
        Ok(self)
    }

    /// Raw coordinates, if known
    pub fn coordinates(&self) -> Option<&[Point]> {
        self.coordinates.as_deref()
    }

    /// Distances from city `i` to every city
    #[inline]
    pub fn row(&self, i: usize) -> &[u64] {
        &self.distances[i * self.dimension..(i + 1) * self.dimension]
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> u64 {
        self.row(i)[j]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.dimension)
            .all(|i| (i + 1..self.dimension).all(|j| self.distance(i, j) == self.distance(j, i)))
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut min_distance = u64::MAX;
        let mut max_distance = 0u64;
        let mut total = 0u128;
        let mut pairs = 0u64;

        for i in 0..self.dimension {
            for (j, &d) in self.row(i).iter().enumerate() {
                if i == j {
                    continue;
                }
                min_distance = min_distance.min(d);
                max_distance = max_distance.max(d);
                total += d as u128;
                pairs += 1;
            }
        }

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            symmetric: self.is_symmetric(),
            has_coordinates: self.coordinates.is_some(),
            min_distance: if pairs == 0 { 0 } else { min_distance },
            max_distance,
            avg_distance: if pairs == 0 {
                0.0
            } else {
                total as f64 / pairs as f64
            },
        }
    }
}

/// A tour has `dimension` edges, so `dimension * max_distance` must stay below
/// `u64::MAX`, which also serves as the incumbent's "no tour yet" marker.
fn check_cost_range(dimension: usize, distances: &[u64]) -> Result<()> {
    let max_distance = distances.iter().copied().max().unwrap_or(0);
    if dimension as u128 * max_distance as u128 >= u64::MAX as u128 {
        return Err(SolverError::CostOverflow {
            dimension,
            max_distance,
        });
    }
    Ok(())
}

/// Read `x,y` rows from a headerless CSV file.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SolverError::open_file(path, e))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut points = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row = points.len();
        if record.len() != 2 {
            return Err(SolverError::InvalidCoordinate {
                row,
                message: format!("expected 2 fields, found {}", record.len()),
            });
        }
        let parse = |field: &str| -> Result<f64> {
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SolverError::InvalidCoordinate {
                    row,
                    message: format!("{:?} is not a finite number", field),
                })
        };
        points.push(Point::new(parse(&record[0])?, parse(&record[1])?));
    }
    Ok(points)
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub symmetric: bool,
    pub has_coordinates: bool,
    pub min_distance: u64,
    pub max_distance: u64,
    pub avg_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Symmetric: {}", self.symmetric)?;
        writeln!(f, "  Coordinates: {}", self.has_coordinates)?;
        writeln!(f, "  Min distance: {}", self.min_distance)?;
        writeln!(f, "  Max distance: {}", self.max_distance)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)
    }
}
