//! Containment and proximity clauses over the latitude/longitude columns.

use crate::renderer::{Render, Renderer, quote};
use predicate_model::{
    geometry::{BoundingBox, Shape, bbox},
    predicate::GeoDistancePredicate,
    range::number::format_decimal,
};

/// A quadrilateral is closed in five points and needs no pre-filter.
const QUADRILATERAL_POINTS: usize = 5;

/// Rectangular pre-filter on the coordinate columns.
pub struct BoxFilter<'c> {
    pub bounds: BoundingBox,
    pub latitude: &'c str,
    pub longitude: &'c str,
}

impl Render for BoxFilter<'_> {
    fn render(&self, r: &mut Renderer) {
        let b = &self.bounds;
        r.sql.push('(');
        r.sql.push_str(&format!(
            "{lat} >= {} AND {lat} <= {}",
            format_decimal(b.south),
            format_decimal(b.north),
            lat = self.latitude
        ));
        // longitude band wraps past ±180
        let join = if b.crosses_antimeridian() { " OR " } else { " AND " };
        r.sql.push_str(&format!(
            " AND ({lon} >= {}{join}{lon} <= {})",
            format_decimal(b.west),
            format_decimal(b.east),
            lon = self.longitude
        ));
        r.sql.push(')');
    }
}

/// `Within` clause: optional bounding-box pre-filters, then the exact test.
/// The shape is expected normalized, so the WKT handed to `contains` never
/// leaves `[-180, 180]`.
pub struct Containment<'c> {
    pub shape: &'c Shape,
    pub latitude: &'c str,
    pub longitude: &'c str,
    pub batch_size: usize,
    pub per_ring_threshold: usize,
}

impl Containment<'_> {
    fn box_filter(&self, bounds: BoundingBox) -> BoxFilter<'_> {
        BoxFilter {
            bounds,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// One box per part, OR-ed, with a fresh group every `batch_size` boxes
    /// to keep expression nesting shallow.
    fn render_part_boxes(&self, parts: &[BoundingBox], r: &mut Renderer) {
        let batch = self.batch_size.max(1);
        r.sql.push_str("((");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                if i % batch == 0 {
                    r.sql.push_str(") OR (");
                } else {
                    r.sql.push_str(" OR ");
                }
            }
            self.box_filter(*part).render(r);
        }
        r.sql.push_str("))");
    }
}

impl Render for Containment<'_> {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        if self.shape.num_points() != QUADRILATERAL_POINTS {
            if let Some(bounds) = bbox::bounding_box(self.shape) {
                self.box_filter(bounds).render(r);
                r.sql.push_str(" AND ");
            }
            let parts = bbox::part_boxes(self.shape);
            if parts.len() > self.per_ring_threshold {
                self.render_part_boxes(&parts, r);
                r.sql.push_str(" AND ");
            }
        }
        r.sql.push_str(&format!(
            "contains({}, {}, {}) = TRUE)",
            quote(&self.shape.to_string()),
            self.latitude,
            self.longitude
        ));
    }
}

pub struct Proximity<'c> {
    pub predicate: &'c GeoDistancePredicate,
    pub latitude: &'c str,
    pub longitude: &'c str,
}

impl Render for Proximity<'_> {
    fn render(&self, r: &mut Renderer) {
        let p = self.predicate;
        r.sql.push_str(&format!(
            "(geoDistance({}, {}, '{}', {}, {}) = TRUE)",
            format_decimal(p.latitude()),
            format_decimal(p.longitude()),
            p.distance(),
            self.latitude,
            self.longitude
        ));
    }
}
