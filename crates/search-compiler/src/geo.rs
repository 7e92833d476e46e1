use predicate_model::geometry::{Coord, Polygon, Shape};
use serde_json::{Value, json};

fn position(c: &Coord) -> Value {
    json!([c.x, c.y])
}

fn line(coords: &[Coord]) -> Value {
    Value::Array(coords.iter().map(position).collect())
}

fn polygon(p: &Polygon) -> Value {
    Value::Array(p.rings().map(|r| line(r)).collect())
}

/// GeoJSON for a shape. Rings are expected to be normalized already.
pub fn geojson(shape: &Shape) -> Value {
    let coordinates = match shape {
        Shape::Point(c) => position(c),
        Shape::LineString(coords) => line(coords),
        Shape::Polygon(p) => polygon(p),
        Shape::MultiPolygon(parts) => Value::Array(parts.iter().map(polygon).collect()),
    };
    json!({ "type": shape.kind(), "coordinates": coordinates })
}
