use super::{Coord, Polygon, signed_area};

/// Shifts vertices by whole turns so that no edge spans more than half the
/// globe. A ring circling a pole cannot be unwrapped and is returned as is.
fn unwrap_ring(ring: &[Coord]) -> Vec<Coord> {
    let Some(first) = ring.first() else {
        return Vec::new();
    };
    let mut shift = 0.0;
    let mut out = vec![*first];
    for w in ring.windows(2) {
        let dx = w[1].x - w[0].x;
        if dx > 180.0 {
            shift -= 360.0;
        } else if dx < -180.0 {
            shift += 360.0;
        }
        out.push(Coord::new(w[1].x + shift, w[1].y));
    }
    if shift != 0.0 {
        return ring.to_vec();
    }
    out
}

fn crossing(a: Coord, b: Coord, x: f64) -> Coord {
    let t = (x - a.x) / (b.x - a.x);
    Coord::new(x, a.y + t * (b.y - a.y))
}

// Sutherland-Hodgman against one vertical edge. `keep` tells which side stays.
fn clip_edge(ring: &[Coord], x: f64, keep: impl Fn(f64) -> bool) -> Vec<Coord> {
    let mut out = Vec::with_capacity(ring.len() + 2);
    for (i, current) in ring.iter().enumerate() {
        let previous = ring[(i + ring.len() - 1) % ring.len()];
        match (keep(previous.x), keep(current.x)) {
            (true, true) => out.push(*current),
            (true, false) => out.push(crossing(previous, *current, x)),
            (false, true) => {
                out.push(crossing(previous, *current, x));
                out.push(*current);
            }
            (false, false) => {}
        }
    }
    out
}

/// Part of a closed ring inside `[west, east]`, closed again. Empty when
/// nothing with an area is left.
fn clip_ring(ring: &[Coord], west: f64, east: f64) -> Vec<Coord> {
    let open = match ring.split_last() {
        Some((last, rest)) if Some(last) == rest.first() => rest,
        _ => ring,
    };
    let clipped = clip_edge(open, west, |x| x >= west);
    let clipped = clip_edge(&clipped, east, |x| x <= east);
    let mut closed = super::dedup_ring(&clipped);
    if let Some(first) = closed.first().copied() {
        if closed.last() != Some(&first) {
            closed.push(first);
        }
    }
    if closed.len() < 4 || signed_area(&closed) == 0.0 {
        return Vec::new();
    }
    closed
}

fn shifted(ring: Vec<Coord>, dx: f64) -> Vec<Coord> {
    ring.into_iter().map(|c| Coord::new(c.x + dx, c.y)).collect()
}

/// Cuts a polygon drawn across the antimeridian into pieces that each lie
/// within `[-180, 180]`. Polygons already in range come back unchanged.
pub(super) fn split_polygon(polygon: &Polygon) -> Vec<Polygon> {
    let exterior = unwrap_ring(&polygon.exterior);
    let holes: Vec<Vec<Coord>> = polygon.holes.iter().map(|h| unwrap_ring(h)).collect();

    let (min_x, max_x) = exterior
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.x), hi.max(c.x))
        });
    if !min_x.is_finite() || !max_x.is_finite() || (min_x >= -180.0 && max_x <= 180.0) {
        return vec![polygon.clone()];
    }

    // one turn per strip; valid input never needs more than a few
    let first = (((min_x + 180.0) / 360.0).floor() as i64).max(-3);
    let last = (((max_x + 180.0) / 360.0).floor() as i64).min(3);

    let mut pieces = Vec::new();
    for turn in first..=last {
        let offset = 360.0 * turn as f64;
        let (west, east) = (offset - 180.0, offset + 180.0);
        let outer = clip_ring(&exterior, west, east);
        if outer.is_empty() {
            continue;
        }
        let inner = holes
            .iter()
            .map(|h| clip_ring(h, west, east))
            .filter(|h| !h.is_empty())
            .map(|h| shifted(h, -offset))
            .collect();
        pieces.push(Polygon {
            exterior: shifted(outer, -offset),
            holes: inner,
        });
    }
    if pieces.is_empty() {
        return vec![polygon.clone()];
    }
    pieces
}
