//! WKT geometry parsing and the normalization shared by both compilers:
//! ring de-duplication, antimeridian splitting, validation and bounding
//! boxes.

mod antimeridian;
pub mod bbox;
pub mod parser;

pub use bbox::BoundingBox;
pub use parser::parse_wkt;

use crate::error::GeometryError;
use std::fmt;

/// Longitudes may be drawn up to one turn past the antimeridian.
const MAX_LONGITUDE: f64 = 540.0;
const MAX_LATITUDE: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<Coord>,
    pub holes: Vec<Vec<Coord>>,
}

impl Polygon {
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Coord>> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    fn num_points(&self) -> usize {
        self.rings().map(Vec::len).sum()
    }

    fn normalized(&self) -> Polygon {
        Polygon {
            exterior: dedup_ring(&self.exterior),
            holes: self.holes.iter().map(|h| dedup_ring(h)).collect(),
        }
    }

    fn validate(&self) -> Result<(), GeometryError> {
        for ring in self.rings() {
            validate_ring(ring)?;
        }
        if signed_area(&self.exterior) == 0.0 {
            return Err(GeometryError::ZeroArea);
        }
        Ok(())
    }
}

/// A parsed shape. `LINEARRING` input is represented as a line string.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "Point",
            Shape::LineString(_) => "LineString",
            Shape::Polygon(_) => "Polygon",
            Shape::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Total number of coordinates over every ring and part.
    pub fn num_points(&self) -> usize {
        match self {
            Shape::Point(_) => 1,
            Shape::LineString(coords) => coords.len(),
            Shape::Polygon(polygon) => polygon.num_points(),
            Shape::MultiPolygon(parts) => parts.iter().map(Polygon::num_points).sum(),
        }
    }

    /// Drops consecutive duplicate coordinates from every polygon ring and
    /// cuts polygons drawn across the antimeridian into parts that stay
    /// within `[-180, 180]`. A split polygon becomes a multipolygon.
    pub fn normalized(&self) -> Shape {
        match self {
            Shape::Polygon(polygon) => {
                let mut parts = antimeridian::split_polygon(&polygon.normalized());
                if parts.len() == 1 {
                    Shape::Polygon(parts.remove(0))
                } else {
                    Shape::MultiPolygon(parts)
                }
            }
            Shape::MultiPolygon(parts) => Shape::MultiPolygon(
                parts
                    .iter()
                    .flat_map(|p| antimeridian::split_polygon(&p.normalized()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Coordinates are finite, latitudes within ±90 and longitudes no more
    /// than one turn past the antimeridian.
    pub fn check_coordinates(&self) -> Result<(), GeometryError> {
        for c in self.coords() {
            if !c.x.is_finite() || !c.y.is_finite() {
                return Err(GeometryError::NonFinite);
            }
            if c.x.abs() > MAX_LONGITUDE || c.y.abs() > MAX_LATITUDE {
                return Err(GeometryError::OutOfRange { x: c.x, y: c.y });
            }
        }
        Ok(())
    }

    /// Structural validity: coordinates are in range, rings are closed and
    /// hold at least three distinct points, polygons enclose a non-zero area,
    /// line strings have two points.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.check_coordinates()?;
        match self {
            Shape::Point(_) => Ok(()),
            Shape::LineString(coords) if coords.len() < 2 => Err(GeometryError::TooFewPoints),
            Shape::LineString(_) => Ok(()),
            Shape::Polygon(polygon) => polygon.validate(),
            Shape::MultiPolygon(parts) if parts.is_empty() => Err(GeometryError::Empty),
            Shape::MultiPolygon(parts) => parts.iter().try_for_each(Polygon::validate),
        }
    }

    /// Every coordinate, in input order.
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Shape::Point(c) => vec![*c],
            Shape::LineString(coords) => coords.clone(),
            Shape::Polygon(polygon) => polygon.rings().flatten().copied().collect(),
            Shape::MultiPolygon(parts) => parts
                .iter()
                .flat_map(|p| p.rings().flatten().copied())
                .collect(),
        }
    }
}

/// Well-known text, as `POINT (1 2)` or `POLYGON ((0 0, 1 0, 1 1, 0 0))`.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Point(c) => write!(f, "POINT ({} {})", c.x, c.y),
            Shape::LineString(coords) => {
                f.write_str("LINESTRING ")?;
                write_seq(f, coords)
            }
            Shape::Polygon(polygon) => {
                f.write_str("POLYGON ")?;
                write_polygon(f, polygon)
            }
            Shape::MultiPolygon(parts) => {
                f.write_str("MULTIPOLYGON (")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_polygon(f, part)?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, coords: &[Coord]) -> fmt::Result {
    f.write_str("(")?;
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", c.x, c.y)?;
    }
    f.write_str(")")
}

fn write_polygon(f: &mut fmt::Formatter<'_>, polygon: &Polygon) -> fmt::Result {
    f.write_str("(")?;
    for (i, ring) in polygon.rings().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_seq(f, ring)?;
    }
    f.write_str(")")
}

/// Parses and validates a WKT string in one step. Coordinates are checked
/// before normalization, rings after it.
pub fn parse_valid(wkt: &str) -> Result<Shape, GeometryError> {
    let shape = parse_wkt(wkt)?;
    shape.check_coordinates()?;
    shape.normalized().validate()?;
    Ok(shape)
}

/// Removes consecutive duplicates. The first coordinate always survives, and
/// since a closed ring ends where it starts the closing coordinate does too.
pub fn dedup_ring(coords: &[Coord]) -> Vec<Coord> {
    let mut out: Vec<Coord> = Vec::with_capacity(coords.len());
    for c in coords {
        if out.last() != Some(c) {
            out.push(*c);
        }
    }
    out
}

fn validate_ring(ring: &[Coord]) -> Result<(), GeometryError> {
    let deduped = dedup_ring(ring);
    if deduped.first() != deduped.last() {
        return Err(GeometryError::UnclosedRing);
    }
    if deduped.len() < 4 {
        return Err(GeometryError::TooFewPoints);
    }
    Ok(())
}

// shoelace
fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}
