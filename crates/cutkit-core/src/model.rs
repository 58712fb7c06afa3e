//! Point/path model: an interning point arena and paths as index
//! sequences.
//!
//! Points are owned by a [`PointArena`] and addressed by [`PointId`];
//! paths hold plain id sequences, so there are no ownership cycles and a
//! point's `sharp`/`seen` flags are mutated by index. Two requests for
//! the same coordinate (within the arena's tolerance) always yield the
//! same id, so paths sharing a vertex share its `PointId`.
//!
//! The arena lives for a single plotting job and is discarded once the
//! device session has consumed the planned output.

use std::collections::HashMap;

use crate::geom::{sharp_turn, EPSILON};
use crate::types::Point2;

/// Index of a point in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub usize);

/// Adjacency entry: one incident segment of a point.
///
/// `done` marks the segment as consumed by a planner; a consumed segment
/// is never emitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// The other endpoint of the segment.
    pub other: PointId,
    /// Segment has been emitted.
    pub done: bool,
}

/// A point with its planner-visible attributes.
#[derive(Debug, Clone)]
pub struct Point {
    /// Position in mm.
    pub pos: Point2,
    /// How many times this coordinate was re-registered.
    pub dup_count: u32,
    /// Marked as a sharp corner by [`PointArena::mark_sharp`].
    pub sharp: bool,
    /// The cutting head has visited this point.
    pub seen: bool,
    /// Incident segments (bidirectional, one entry per incidence).
    pub links: Vec<Link>,
}

impl Point {
    fn new(pos: Point2) -> Self {
        Self {
            pos,
            dup_count: 0,
            sharp: false,
            seen: false,
            links: Vec::new(),
        }
    }

    /// Number of not-yet-consumed incident segments.
    pub fn open_links(&self) -> usize {
        self.links.iter().filter(|l| !l.done).count()
    }
}

/// An ordered sequence of point ids; closed when `first == last`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// The vertex ids, in drawing order.
    pub points: Vec<PointId>,
}

impl Path {
    /// Wrap an id sequence.
    pub fn new(points: Vec<PointId>) -> Self {
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the path has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed paths start and end on the same point id.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}

/// Deduplicating point registry.
///
/// Identical coordinates (within the construction tolerance) map to one
/// id; the point's `dup_count` records re-registrations.
#[derive(Debug)]
pub struct PointArena {
    points: Vec<Point>,
    index: HashMap<(i64, i64), PointId>,
    quantum: f64,
}

impl PointArena {
    /// Arena with the default tolerance ([`EPSILON`]).
    pub fn new() -> Self {
        Self::with_epsilon(EPSILON)
    }

    /// Arena with an explicit interning tolerance.
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            points: Vec::new(),
            index: HashMap::new(),
            quantum: epsilon.max(EPSILON),
        }
    }

    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        ((x / self.quantum).round() as i64, (y / self.quantum).round() as i64)
    }

    /// Return the id for `(x, y)`, creating the point on first sight.
    ///
    /// Point identity is purely positional: a second request for the same
    /// coordinate returns the existing id and bumps its `dup_count`.
    pub fn intern(&mut self, x: f64, y: f64) -> PointId {
        let key = self.key(x, y);
        if let Some(&id) = self.index.get(&key) {
            self.points[id.0].dup_count += 1;
            return id;
        }
        let id = PointId(self.points.len());
        self.points.push(Point::new(Point2::new(x, y)));
        self.index.insert(key, id);
        id
    }

    /// Borrow a point.
    pub fn point(&self, id: PointId) -> &Point {
        &self.points[id.0]
    }

    /// Mutably borrow a point.
    pub fn point_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.points[id.0]
    }

    /// Position of a point.
    pub fn pos(&self, id: PointId) -> Point2 {
        self.points[id.0].pos
    }

    /// Number of distinct points registered.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no points were registered.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = PointId> {
        (0..self.points.len()).map(PointId)
    }

    /// Intern a list of mm polylines into paths.
    ///
    /// With `drop_consecutive` set, runs of identical ids within one path
    /// collapse to a single vertex. Degenerate inputs (fewer than two
    /// distinct vertices) are skipped with a warning rather than failing
    /// the whole load; a partial plan is still useful.
    pub fn load(&mut self, polylines: &[Vec<Point2>], drop_consecutive: bool) -> Vec<Path> {
        let mut paths = Vec::with_capacity(polylines.len());
        for (i, poly) in polylines.iter().enumerate() {
            if poly.len() < 2 {
                tracing::warn!(path = i, vertices = poly.len(), "skipping degenerate polyline");
                continue;
            }
            let mut ids: Vec<PointId> = Vec::with_capacity(poly.len());
            for p in poly {
                let id = self.intern(p.x, p.y);
                if drop_consecutive && ids.last() == Some(&id) {
                    continue;
                }
                ids.push(id);
            }
            if ids.len() < 2 {
                tracing::warn!(path = i, "polyline collapsed to a single point, skipping");
                continue;
            }
            paths.push(Path::new(ids));
        }
        paths
    }

    /// Bound the maximum segment length by inserting evenly spaced
    /// interned points.
    ///
    /// Required before mat-free planning: the barrier sweep treats the
    /// point set as a scatter, and an over-long segment would keep its
    /// middle out of barrier consideration. Path endpoints are preserved
    /// exactly; no resulting segment exceeds `max_len_mm`.
    pub fn subdivide(&mut self, paths: &mut [Path], max_len_mm: f64) {
        if max_len_mm <= 0.0 {
            return;
        }
        for path in paths.iter_mut() {
            let mut out: Vec<PointId> = Vec::with_capacity(path.points.len());
            for i in 0..path.points.len() {
                let id = path.points[i];
                if let Some(&prev) = out.last() {
                    let a = self.pos(prev);
                    let b = self.pos(id);
                    let len = a.dist(b);
                    if len > max_len_mm {
                        let pieces = (len / max_len_mm).ceil() as usize;
                        for k in 1..pieces {
                            let t = k as f64 / pieces as f64;
                            let m = a.lerp(b, t);
                            out.push(self.intern(m.x, m.y));
                        }
                    }
                }
                out.push(id);
            }
            path.points = out;
        }
    }

    /// Populate every point's adjacency list from the paths.
    ///
    /// Entries are bidirectional; a segment appearing in two paths gets
    /// one entry per incidence. Must run before [`Self::mark_sharp`].
    pub fn link(&mut self, paths: &[Path]) {
        for point in &mut self.points {
            point.links.clear();
        }
        for path in paths {
            for w in path.points.windows(2) {
                let (p, q) = (w[0], w[1]);
                if p == q {
                    continue;
                }
                self.points[p.0].links.push(Link { other: q, done: false });
                self.points[q.0].links.push(Link { other: p, done: false });
            }
        }
    }

    /// Mark sharp corners.
    ///
    /// A point with more than four incident segments cannot avoid a sharp
    /// pair and is marked unconditionally; otherwise every distinct pair
    /// of incident segments is tested with [`sharp_turn`]. Idempotent:
    /// already-marked points are skipped.
    pub fn mark_sharp(&mut self, fwd_ratio: f64) {
        for i in 0..self.points.len() {
            if self.points[i].sharp {
                continue;
            }
            let n = self.points[i].links.len();
            if n > 4 {
                self.points[i].sharp = true;
                continue;
            }
            let b = self.points[i].pos;
            'pairs: for j in 0..n {
                for k in (j + 1)..n {
                    let a = self.pos(self.points[i].links[j].other);
                    let c = self.pos(self.points[i].links[k].other);
                    if sharp_turn(a, b, c, fwd_ratio) {
                        self.points[i].sharp = true;
                        break 'pairs;
                    }
                }
            }
        }
    }

    /// Resolve paths back into mm polylines.
    pub fn resolve(&self, paths: &[Path]) -> Vec<Vec<Point2>> {
        paths
            .iter()
            .map(|p| p.points.iter().map(|&id| self.pos(id)).collect())
            .collect()
    }
}

impl Default for PointArena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<PointId> for PointArena {
    type Output = Point;

    fn index(&self, id: PointId) -> &Point {
        &self.points[id.0]
    }
}

impl std::ops::IndexMut<PointId> for PointArena {
    fn index_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.points[id.0]
    }
}
