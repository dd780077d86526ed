// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ear-clipping triangulation for polygon rings with holes.
//!
//! egui only fills convex shapes, so polygon fills are drawn as triangle
//! meshes. Triangulating in lon/lat space once at load time is enough: the
//! Web Mercator projection preserves the ring's topology at map scales.
//!
//! Holes are cut into the exterior with a bridge edge from each hole's
//! rightmost vertex to the nearest visible vertex of the outer ring. The
//! merged ring then goes through the plain ear clipper.

use crate::geometry::{ring_contains, Coord};

const COLLINEAR_EPSILON: f64 = 1e-18;

/// Triangulate an open ring, returning vertex index triples.
///
/// Works for simple (non self-intersecting) rings of either winding. Rings
/// that are not simple still produce a best-effort fan for the remainder.
#[must_use]
pub fn triangulate(ring: &[Coord]) -> Vec<[u32; 3]> {
    triangulate_with_holes(ring, &[])
}

/// Triangulate an open exterior ring minus its open hole rings.
///
/// Indices address the exterior vertices followed by every hole's vertices,
/// in order. Holes with fewer than three vertices are ignored, as is a hole
/// that no bridge can reach without crossing an edge.
#[must_use]
pub fn triangulate_with_holes(exterior: &[Coord], holes: &[Vec<Coord>]) -> Vec<[u32; 3]> {
    if exterior.len() < 3 {
        return Vec::new();
    }

    let points: Vec<Coord> = exterior.iter().chain(holes.iter().flatten()).copied().collect();

    let mut outer: Vec<usize> = (0..exterior.len()).collect();
    if signed_area(exterior) < 0.0 {
        outer.reverse();
    }

    let mut edges = ring_edges(exterior);
    let mut hole_rings = Vec::with_capacity(holes.len());
    let mut offset = exterior.len();
    for hole in holes {
        if hole.len() >= 3 {
            edges.extend(ring_edges(hole));
            let mut ring: Vec<usize> = (offset..offset + hole.len()).collect();
            // Holes wind against the exterior.
            if signed_area(hole) > 0.0 {
                ring.reverse();
            }
            hole_rings.push(ring);
        }
        offset += hole.len();
    }

    // Rightmost holes first, so holes further left may bridge onto them.
    let rightmost = |ring: &[usize]| -> usize {
        ring.iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| points[**a].lon.total_cmp(&points[**b].lon))
            .map_or(0, |(pos, _)| pos)
    };
    hole_rings.sort_by(|a, b| {
        let (a, b) = (points[a[rightmost(a)]].lon, points[b[rightmost(b)]].lon);
        b.total_cmp(&a)
    });

    for hole in &hole_rings {
        let start = rightmost(hole);
        let anchor = hole[start];
        let Some(at) = find_bridge(&points, &outer, anchor, &edges, exterior, holes) else {
            continue;
        };
        let target = outer[at];
        edges.push((points[anchor], points[target]));

        let mut spliced = Vec::with_capacity(hole.len() + 2);
        spliced.extend(hole[start..].iter().chain(&hole[..start]).copied());
        spliced.push(anchor);
        spliced.push(target);
        outer.splice(at + 1..at + 1, spliced);
    }

    clip_ears(&points, outer)
}

/// Position in `outer` of the nearest vertex joined to `anchor` by a segment
/// that crosses no edge and runs through the polygon interior.
fn find_bridge(
    points: &[Coord],
    outer: &[usize],
    anchor: usize,
    edges: &[(Coord, Coord)],
    exterior: &[Coord],
    holes: &[Vec<Coord>],
) -> Option<usize> {
    let from = points[anchor];
    let mut candidates: Vec<usize> = (0..outer.len()).collect();
    candidates.sort_by(|&a, &b| {
        distance_sq(from, points[outer[a]]).total_cmp(&distance_sq(from, points[outer[b]]))
    });

    candidates.into_iter().find(|&pos| {
        let to = points[outer[pos]];
        if to == from {
            return true;
        }
        if edges.iter().any(|&(a, b)| segments_cross(from, to, a, b)) {
            return false;
        }
        let mid = Coord::new((from.lon + to.lon) / 2.0, (from.lat + to.lat) / 2.0);
        ring_contains(exterior, mid) && !holes.iter().any(|h| ring_contains(h, mid))
    })
}

fn clip_ears(points: &[Coord], mut remaining: Vec<usize>) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(remaining.len().saturating_sub(2));
    let mut cursor = 0;
    let mut misses = 0;

    while remaining.len() > 3 {
        let len = remaining.len();
        let prev = remaining[(cursor + len - 1) % len];
        let curr = remaining[cursor % len];
        let next = remaining[(cursor + 1) % len];

        let turn = cross(points[prev], points[curr], points[next]);
        if turn.abs() <= COLLINEAR_EPSILON {
            // Degenerate vertex: drop it without emitting a triangle.
            remaining.remove(cursor % len);
            misses = 0;
        } else if turn > 0.0 && !any_inside(points, &remaining, prev, curr, next) {
            triangles.push(triple(prev, curr, next));
            remaining.remove(cursor % len);
            misses = 0;
        } else {
            cursor += 1;
            misses += 1;
            if misses > len {
                break;
            }
            continue;
        }

        if cursor >= remaining.len() {
            cursor = 0;
        }
    }

    if let Some((&first, rest)) = remaining.split_first() {
        for pair in rest.windows(2) {
            triangles.push(triple(first, pair[0], pair[1]));
        }
    }

    triangles
}

#[allow(clippy::cast_possible_truncation, reason = "overlay rings are far below u32::MAX vertices")]
fn triple(a: usize, b: usize, c: usize) -> [u32; 3] {
    [a as u32, b as u32, c as u32]
}

fn ring_edges(ring: &[Coord]) -> Vec<(Coord, Coord)> {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect()
}

fn signed_area(ring: &[Coord]) -> f64 {
    let mut sum = 0.0;
    let mut j = ring.len() - 1;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[j];
        sum += (b.lon - a.lon) * (b.lat + a.lat);
        j = i;
    }
    sum / 2.0
}

fn cross(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

fn distance_sq(a: Coord, b: Coord) -> f64 {
    (a.lon - b.lon).powi(2) + (a.lat - b.lat).powi(2)
}

/// True when segment `p1-p2` crosses `q1-q2` or passes through one of its
/// endpoints. Segments that only share an endpoint do not cross.
fn segments_cross(p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> bool {
    if p1 == q1 || p1 == q2 || p2 == q1 || p2 == q2 {
        return false;
    }
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return true;
    }
    (d3.abs() <= COLLINEAR_EPSILON && within(p1, p2, q1))
        || (d4.abs() <= COLLINEAR_EPSILON && within(p1, p2, q2))
}

fn within(a: Coord, b: Coord, p: Coord) -> bool {
    p.lon >= a.lon.min(b.lon)
        && p.lon <= a.lon.max(b.lon)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

fn any_inside(points: &[Coord], remaining: &[usize], a: usize, b: usize, c: usize) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);
    remaining
        .iter()
        .filter(|&&i| i != a && i != b && i != c)
        .map(|&i| points[i])
        .filter(|p| *p != pa && *p != pb && *p != pc)
        .any(|p| cross(pa, pb, p) >= 0.0 && cross(pb, pc, p) >= 0.0 && cross(pc, pa, p) >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area_of(ring: &[Coord], triangles: &[[u32; 3]]) -> f64 {
        triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|i| ring[i as usize]);
                cross(a, b, c).abs() / 2.0
            })
            .sum()
    }

    #[test]
    fn test_concave_ring_area_is_preserved() {
        // L-shape, clockwise.
        let ring = vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 2.0),
            Coord::new(1.0, 2.0),
            Coord::new(1.0, 1.0),
            Coord::new(2.0, 1.0),
            Coord::new(2.0, 0.0),
        ];
        let triangles = triangulate(&ring);
        assert_eq!(triangles.len(), 4);
        assert!((area_of(&ring, &triangles) - 3.0).abs() < 1e-9);
        assert!((signed_area(&ring) + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_vertices_are_skipped() {
        let ring = vec![
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(2.0, 0.0),
            Coord::new(2.0, 2.0),
            Coord::new(0.0, 2.0),
        ];
        let triangles = triangulate(&ring);
        assert!((area_of(&ring, &triangles) - 4.0).abs() < 1e-9);
    }

    fn square(origin: f64, size: f64) -> Vec<Coord> {
        vec![
            Coord::new(origin, origin),
            Coord::new(origin + size, origin),
            Coord::new(origin + size, origin + size),
            Coord::new(origin, origin + size),
        ]
    }

    fn covers(points: &[Coord], triangles: &[[u32; 3]], p: Coord) -> bool {
        triangles.iter().any(|t| {
            let [a, b, c] = t.map(|i| points[i as usize]);
            let (d1, d2, d3) = (cross(a, b, p), cross(b, c, p), cross(c, a, p));
            (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
        })
    }

    #[test]
    fn test_hole_is_cut_out_of_fill() {
        let exterior = square(0.0, 2.0);
        let holes = vec![square(0.5, 1.0)];
        let points: Vec<Coord> = exterior.iter().chain(holes.iter().flatten()).copied().collect();

        let triangles = triangulate_with_holes(&exterior, &holes);
        assert_eq!(triangles.len(), 8);
        assert!((area_of(&points, &triangles) - 3.0).abs() < 1e-9);
        assert!(!covers(&points, &triangles, Coord::new(1.0, 1.0)));
        assert!(covers(&points, &triangles, Coord::new(0.25, 1.0)));
    }

    #[test]
    fn test_multiple_holes_of_either_winding() {
        let exterior = square(0.0, 4.0);
        let mut clockwise = square(2.5, 1.0);
        clockwise.reverse();
        let holes = vec![square(0.5, 1.0), clockwise];
        let points: Vec<Coord> = exterior.iter().chain(holes.iter().flatten()).copied().collect();

        let triangles = triangulate_with_holes(&exterior, &holes);
        assert!((area_of(&points, &triangles) - 14.0).abs() < 1e-9);
        assert!(!covers(&points, &triangles, Coord::new(1.0, 1.0)));
        assert!(!covers(&points, &triangles, Coord::new(3.0, 3.0)));
    }

    #[test]
    fn test_degenerate_hole_is_ignored() {
        let exterior = square(0.0, 1.0);
        let holes = vec![vec![Coord::new(0.2, 0.2), Coord::new(0.4, 0.4)]];
        let triangles = triangulate_with_holes(&exterior, &holes);
        assert_eq!(triangles.len(), 2);
        assert!(triangles.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn test_degenerate_input() {
        assert!(triangulate(&[]).is_empty());
        assert!(triangulate(&[Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]).is_empty());
        assert_eq!(
            triangulate(&[Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.0, 1.0)]),
            vec![[0, 1, 2]]
        );
    }
}
