use super::{Coord, Polygon, Shape};

/// Longitude/latitude envelope. When `west > east` the box crosses the
/// antimeridian and covers `[west, 180] ∪ [-180, east]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Plain envelope of the coordinates, no antimeridian handling.
    pub fn envelope(coords: &[Coord]) -> Option<BoundingBox> {
        let first = coords.first()?;
        let init = BoundingBox {
            west: first.x,
            east: first.x,
            south: first.y,
            north: first.y,
        };
        Some(coords.iter().fold(init, |b, c| BoundingBox {
            west: b.west.min(c.x),
            east: b.east.max(c.x),
            south: b.south.min(c.y),
            north: b.north.max(c.y),
        }))
    }

    /// Whether the point lies inside the box, honouring the antimeridian.
    pub fn contains(&self, c: &Coord) -> bool {
        let lat_ok = c.y >= self.south && c.y <= self.north;
        let lon_ok = if self.crosses_antimeridian() {
            c.x >= self.west || c.x <= self.east
        } else {
            c.x >= self.west && c.x <= self.east
        };
        lat_ok && lon_ok
    }
}

/// Wraps a longitude into `[-180, 180]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) || !lon.is_finite() {
        return lon;
    }
    lon - 360.0 * ((lon + 180.0) / 360.0).floor()
}

fn line_parts(shape: &Shape) -> Vec<Vec<Coord>> {
    match shape {
        Shape::Point(c) => vec![vec![*c]],
        Shape::LineString(coords) => vec![coords.clone()],
        Shape::Polygon(polygon) => polygon.rings().cloned().collect(),
        Shape::MultiPolygon(parts) => parts.iter().flat_map(|p| p.rings().cloned()).collect(),
    }
}

fn touches(polygon: &Polygon, lon: f64) -> bool {
    polygon.rings().flatten().any(|c| c.x == lon)
}

/// A shape crosses the antimeridian when it is drawn with longitudes beyond
/// ±180, when one of its edges jumps more than half the globe, or when it is
/// a multipolygon already split into parts meeting at +180 and -180.
pub fn crosses_antimeridian(shape: &Shape) -> bool {
    let parts = line_parts(shape);
    let out_of_range = parts.iter().flatten().any(|c| !(-180.0..=180.0).contains(&c.x));
    let long_edge = parts
        .iter()
        .any(|line| line.windows(2).any(|w| (w[1].x - w[0].x).abs() > 180.0));
    let split = match shape {
        Shape::MultiPolygon(polygons) => {
            polygons.iter().any(|p| touches(p, 180.0))
                && polygons.iter().any(|p| touches(p, -180.0))
        }
        _ => false,
    };
    out_of_range || long_edge || split
}

/// Longitude spans covered by a shape crossing the antimeridian. Polygons
/// contribute the envelope of each part after splitting; anything that
/// cannot be split contributes its wrapped vertices.
fn longitude_spans(shape: &Shape) -> Vec<(f64, f64)> {
    let parts = match shape.normalized() {
        Shape::Polygon(polygon) => vec![polygon],
        Shape::MultiPolygon(parts) => parts,
        _ => Vec::new(),
    };
    let mut spans = Vec::new();
    for part in &parts {
        match BoundingBox::envelope(&part.exterior) {
            Some(b) if b.west >= -180.0 && b.east <= 180.0 => spans.push((b.west, b.east)),
            _ => spans.extend(part.exterior.iter().map(|c| {
                let x = wrap_longitude(c.x);
                (x, x)
            })),
        }
    }
    if parts.is_empty() {
        spans.extend(shape.coords().iter().map(|c| {
            let x = wrap_longitude(c.x);
            (x, x)
        }));
    }
    spans
}

/// Bounding box of a shape. Shapes crossing the antimeridian get the
/// smallest longitude band covering every part: the complement of the
/// widest gap between the spans the parts cover.
pub fn bounding_box(shape: &Shape) -> Option<BoundingBox> {
    let envelope = BoundingBox::envelope(&shape.coords())?;
    if !crosses_antimeridian(shape) {
        return Some(envelope);
    }

    let mut spans = longitude_spans(shape);
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for (west, east) in spans {
        match merged.last_mut() {
            Some(last) if west <= last.1 => last.1 = last.1.max(east),
            _ => merged.push((west, east)),
        }
    }
    let (&(first, _), &(_, last)) = (merged.first()?, merged.last()?);

    let (mut west, mut east) = (first, last);
    // gap wrapping through the antimeridian
    let mut widest = first + 360.0 - last;
    for w in merged.windows(2) {
        let gap = w[1].0 - w[0].1;
        if gap > widest {
            widest = gap;
            west = w[1].0;
            east = w[0].1;
        }
    }

    Some(BoundingBox {
        west,
        east,
        south: envelope.south,
        north: envelope.north,
    })
}

/// Bounding box of every part of a multipolygon, each wrapped the same way
/// as [`bounding_box`]; empty for other shapes.
pub fn part_boxes(shape: &Shape) -> Vec<BoundingBox> {
    match shape {
        Shape::MultiPolygon(parts) => parts
            .iter()
            .filter_map(|p| bounding_box(&Shape::Polygon(p.clone())))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::parse_wkt;

    fn bbox(wkt: &str) -> BoundingBox {
        bounding_box(&parse_wkt(wkt).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_envelope() {
        let b = bbox("POLYGON ((30 10, 10 20, 20 40, 40 40, 30 10))");
        assert_eq!(
            b,
            BoundingBox {
                west: 10.0,
                east: 40.0,
                south: 10.0,
                north: 40.0
            }
        );
        assert!(!b.crosses_antimeridian());
    }

    #[test]
    fn test_split_multipolygon_across_antimeridian() {
        let b = bbox(
            "MULTIPOLYGON (((180 -16.658979090909092, 180 -17.12485513597339, 179.87915 -17.12058, 179.78577 -16.82899, 179.85168 -16.72643, 180 -16.658979090909092)), ((-180 -17.12485513597339, -180 -16.658979090909092, -179.8764 -16.60277, -179.75006 -16.86054, -179.89838 -17.12845, -180 -17.12485513597339)))",
        );
        assert!(b.crosses_antimeridian());
        assert_eq!((b.west, b.east), (179.78577, -179.75006));
        assert_eq!((b.south, b.north), (-17.12845, -16.60277));
    }

    #[test]
    fn test_longitudes_beyond_180_are_wrapped() {
        let b = bbox(
            "POLYGON((-180.14832 -16.72643, -180.21423 -16.82899, -180.12085 -17.12058, -179.89838 -17.12845, -179.75006 -16.86054, -179.8764 -16.60277, -180.14832 -16.72643))",
        );
        assert_eq!((b.west, b.east), (179.78577, -179.75006));
    }

    #[test]
    fn test_long_edge_crosses() {
        let b = bbox(
            "POLYGON((157.0 49.0,127.0 1.0,60.0 -9.0,35.0 -63.0,-169.0 -63.0,-77.0 -63.0,-84.0 1.0,-92.0 13.0,-112.0 18.0,-127.0 39.0,-138.0 57.0,157.0 49.0))",
        );
        assert_eq!((b.west, b.east), (35.0, -77.0));
        assert_eq!((b.south, b.north), (-63.0, 57.0));
    }

    #[test]
    fn test_polygon_along_antimeridian_does_not_cross() {
        let b = bbox(
            "POLYGON ((180 -64.7, 180 -44.3, 100 -40, 10 -38.3, -100 -40, -180 -44.3, -180 -80, -70 -80, 30 -80, 115 -80, 180 -80, 180 -64.7))",
        );
        assert_eq!((b.west, b.east), (-180.0, 180.0));
    }

    #[test]
    fn test_bounding_box_covers_every_vertex() {
        let shape = parse_wkt(
            "POLYGON ((-21.4671921 65.441761, -24.5319933 65.5027259, -19.1269971 63.3980322, -13.4948065 65.076438, -16.0235596 66.5371808, -21.4671921 65.441761))",
        )
        .unwrap();
        let b = bounding_box(&shape).unwrap();
        assert!(shape.coords().iter().all(|c| b.contains(c)));
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(-185.0), 175.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(530.0), 170.0);
        // far out of range returns at once
        assert!(wrap_longitude(1e20).is_finite());
        assert_eq!(wrap_longitude(-180.21423), 179.78577);
    }

    #[test]
    fn test_part_boxes_wrap_each_part() {
        let shape = parse_wkt(
            "MULTIPOLYGON (((-185 0, -175 0, -175 5, -185 5, -185 0)), ((10 10, 12 10, 12 13, 10 10)), ((20 20, 21 20, 21 21, 20 20)))",
        )
        .unwrap();
        let boxes = part_boxes(&shape);
        assert_eq!(boxes.len(), 3);
        assert!(boxes[0].crosses_antimeridian());
        assert!(boxes[0].contains(&Coord::new(179.0, 2.0)));
        assert!(boxes[0].contains(&Coord::new(-176.0, 2.0)));
        assert!(!boxes[0].contains(&Coord::new(0.0, 2.0)));
    }

    #[test]
    fn test_band_covers_split_parts_between_vertices() {
        // no vertex between 0 and 170, yet the part covers that stretch
        let b = bbox("POLYGON ((0 0, 170 0, 200 5, 170 10, 0 10, 0 0))");
        assert!(b.crosses_antimeridian());
        assert_eq!((b.west, b.east), (0.0, -160.0));
        assert!(b.contains(&Coord::new(90.0, 5.0)));
        assert!(b.contains(&Coord::new(-170.0, 5.0)));
    }

    #[test]
    fn test_part_boxes() {
        let shape = parse_wkt(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((10 10, 12 10, 12 13, 10 10)), ((-5 -5, -4 -5, -4 -4, -5 -5)))",
        )
        .unwrap();
        let boxes = part_boxes(&shape);
        assert_eq!(boxes.len(), 3);
        assert_eq!(
            boxes[1],
            BoundingBox {
                west: 10.0,
                east: 12.0,
                south: 10.0,
                north: 13.0
            }
        );
    }
}
