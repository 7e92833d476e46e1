use super::{Coord, Polygon, Shape};
use crate::error::GeometryError;
use pest::{Parser, iterators::Pair};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/wkt.pest"]
pub struct WktParser;

type ParseResult<T> = Result<T, GeometryError>;

/// Parse WKT text into a typed shape.
pub fn parse_wkt(input: &str) -> ParseResult<Shape> {
    let mut pairs = WktParser::parse(Rule::geometry, input).map_err(|e| GeometryError::Parse {
        message: e.to_string(),
    })?;

    let geometry = pairs.next().ok_or(GeometryError::Empty)?;
    let body = geometry
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or(GeometryError::Empty)?;

    build_shape(body)
}

fn build_shape(pair: Pair<Rule>) -> ParseResult<Shape> {
    let rule = pair.as_rule();
    let inner = pair.into_inner().next();

    if rule == Rule::unsupported {
        let kind = inner.map(|k| k.as_str().to_uppercase()).unwrap_or_default();
        return Err(GeometryError::UnsupportedShape(kind));
    }

    let inner = match inner {
        Some(p) if p.as_rule() != Rule::empty => p,
        _ => return Err(GeometryError::Empty),
    };

    match rule {
        Rule::point => Ok(Shape::Point(build_coord(inner)?)),
        Rule::linestring | Rule::linearring => Ok(Shape::LineString(build_coord_seq(inner)?)),
        Rule::polygon => Ok(Shape::Polygon(build_polygon(inner)?)),
        Rule::multipolygon => {
            let parts = inner
                .into_inner()
                .map(build_polygon)
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(Shape::MultiPolygon(parts))
        }
        other => Err(GeometryError::Parse {
            message: format!("Unexpected rule: {other:?}"),
        }),
    }
}

fn build_polygon(pair: Pair<Rule>) -> ParseResult<Polygon> {
    let mut rings = pair.into_inner().map(build_coord_seq);
    let exterior = rings.next().ok_or(GeometryError::Empty)??;
    let holes = rings.collect::<ParseResult<Vec<_>>>()?;
    Ok(Polygon { exterior, holes })
}

fn build_coord_seq(pair: Pair<Rule>) -> ParseResult<Vec<Coord>> {
    pair.into_inner().map(build_coord).collect()
}

fn build_coord(pair: Pair<Rule>) -> ParseResult<Coord> {
    let mut numbers = pair.into_inner().map(|n| {
        n.as_str().parse::<f64>().map_err(|e| GeometryError::Parse {
            message: format!("Invalid coordinate '{}': {e}", n.as_str()),
        })
    });

    let missing = || GeometryError::Parse {
        message: "Coordinate needs an x and a y".to_string(),
    };
    let x = numbers.next().ok_or_else(missing)??;
    let y = numbers.next().ok_or_else(missing)??;
    Ok(Coord::new(x, y))
}
