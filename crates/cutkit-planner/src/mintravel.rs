//! Minimal-travel planner: greedy nearest-neighbor whole-path
//! reordering.
//!
//! No mat-free guarantee; this strategy only reduces idle (pen-up) head
//! travel. O(n²) in path count, which is fine because path counts are
//! small relative to per-path vertex counts.

use serde::{Deserialize, Serialize};

use cutkit_core::{Path, Point2, PointArena, PointId};

/// Options for [`order_paths`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinTravelOptions {
    /// Head position before the first path.
    pub start: Point2,
    /// A path may be drawn back-to-front when its end is nearer.
    pub reversible: bool,
    /// A closed path may be entered at any vertex (rotating the cycle).
    pub entrycircular: bool,
}

impl Default for MinTravelOptions {
    fn default() -> Self {
        Self {
            start: Point2::new(0.0, 0.0),
            reversible: false,
            entrycircular: false,
        }
    }
}

/// How the chosen path is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Forward,
    Reversed,
    Rotated(usize),
}

/// Reorder whole paths so each one starts nearest to where the previous
/// one ended.
///
/// Distances are squared (only comparisons matter). Ties go to the first
/// path in the original order: iteration is stable and a later candidate
/// must be strictly nearer to win.
pub fn order_paths(arena: &PointArena, mut pool: Vec<Path>, opts: &MinTravelOptions) -> Vec<Path> {
    let mut out = Vec::with_capacity(pool.len());
    let mut head = opts.start;

    while !pool.is_empty() {
        let mut best: Option<(f64, usize, Entry)> = None;
        for (i, path) in pool.iter().enumerate() {
            if path.is_empty() {
                continue;
            }
            let mut dist = head.dist2(arena.pos(path.points[0]));
            let mut entry = Entry::Forward;
            if opts.reversible {
                let d = head.dist2(arena.pos(*path.points.last().expect("non-empty")));
                if d < dist {
                    dist = d;
                    entry = Entry::Reversed;
                }
            }
            if opts.entrycircular && path.is_closed() {
                for (k, &id) in path.points[..path.len() - 1].iter().enumerate() {
                    let d = head.dist2(arena.pos(id));
                    if d < dist {
                        dist = d;
                        entry = Entry::Rotated(k);
                    }
                }
            }
            match best {
                Some((bd, _, _)) if bd <= dist => {}
                _ => best = Some((dist, i, entry)),
            }
        }

        let Some((_, idx, entry)) = best else {
            // Only empty paths left; pass them through untouched.
            out.append(&mut pool);
            break;
        };

        let mut path = pool.remove(idx);
        match entry {
            Entry::Forward => {}
            Entry::Reversed => path.points.reverse(),
            Entry::Rotated(k) => path.points = rotate_cycle(&path.points, k),
        }
        head = arena.pos(*path.points.last().expect("non-empty"));
        out.push(path);
    }

    out
}

/// Rotate a closed vertex cycle (`first == last`) to start at index `k`,
/// keeping it closed.
fn rotate_cycle(points: &[PointId], k: usize) -> Vec<PointId> {
    let cycle = &points[..points.len() - 1];
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&cycle[k..]);
    rotated.extend_from_slice(&cycle[..k]);
    rotated.push(cycle[k]);
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(arena: &mut PointArena, polys: &[&[(f64, f64)]]) -> Vec<Path> {
        let polys: Vec<Vec<Point2>> = polys
            .iter()
            .map(|p| p.iter().map(|&(x, y)| Point2::new(x, y)).collect())
            .collect();
        arena.load(&polys, true)
    }

    fn jump_total(arena: &PointArena, paths: &[Path], start: Point2) -> f64 {
        let mut head = start;
        let mut total = 0.0;
        for p in paths {
            total += head.dist(arena.pos(p.points[0]));
            head = arena.pos(*p.points.last().unwrap());
        }
        total
    }

    #[test]
    fn greedy_order_matches_nearest_neighbor() {
        let mut arena = PointArena::new();
        let paths = load(
            &mut arena,
            &[
                &[(0.0, 0.0), (5.0, 0.0)],
                &[(100.0, 100.0), (105.0, 100.0)],
                &[(6.0, 0.0), (9.0, 0.0)],
            ],
        );
        let expected = [paths[0].clone(), paths[2].clone(), paths[1].clone()];
        let sorted = order_paths(&arena, paths, &MinTravelOptions::default());
        assert_eq!(sorted.len(), 3);
        assert_eq!(sorted[0], expected[0]);
        assert_eq!(sorted[1], expected[1]);
        assert_eq!(sorted[2], expected[2]);
    }

    #[test]
    fn single_path_is_unchanged() {
        let mut arena = PointArena::new();
        let paths = load(&mut arena, &[&[(3.0, 4.0), (5.0, 6.0)]]);
        let want = paths.clone();
        let sorted = order_paths(&arena, paths, &MinTravelOptions::default());
        assert_eq!(sorted, want);
    }

    #[test]
    fn path_count_is_invariant() {
        let mut arena = PointArena::new();
        let paths = load(
            &mut arena,
            &[
                &[(10.0, 0.0), (20.0, 0.0)],
                &[(0.0, 50.0), (0.0, 60.0)],
                &[(5.0, 5.0), (6.0, 6.0)],
                &[(80.0, 80.0), (81.0, 81.0)],
            ],
        );
        let n = paths.len();
        let sorted = order_paths(&arena, paths, &MinTravelOptions::default());
        assert_eq!(sorted.len(), n);
    }

    #[test]
    fn sorting_never_increases_total_jump_distance() {
        let mut arena = PointArena::new();
        // Adversarial order: far, near, far, near.
        let paths = load(
            &mut arena,
            &[
                &[(90.0, 90.0), (95.0, 90.0)],
                &[(1.0, 0.0), (5.0, 0.0)],
                &[(50.0, 50.0), (55.0, 50.0)],
                &[(6.0, 1.0), (9.0, 1.0)],
            ],
        );
        let start = Point2::new(0.0, 0.0);
        let before = jump_total(&arena, &paths, start);
        let sorted = order_paths(&arena, paths, &MinTravelOptions { start, ..Default::default() });
        let after = jump_total(&arena, &sorted, start);
        assert!(after <= before, "jump distance grew: {after} > {before}");
    }

    #[test]
    fn reversible_enters_at_the_nearer_end() {
        let mut arena = PointArena::new();
        let paths = load(&mut arena, &[&[(50.0, 0.0), (1.0, 0.0)]]);
        let sorted = order_paths(
            &arena,
            paths,
            &MinTravelOptions { reversible: true, ..Default::default() },
        );
        assert_eq!(arena.pos(sorted[0].points[0]), Point2::new(1.0, 0.0));
    }

    proptest::proptest! {
        /// Greedy ordering is a permutation: no path lost, none
        /// duplicated, and the first pick is the globally nearest start.
        #[test]
        fn ordering_is_a_permutation_starting_nearest(
            coords in proptest::collection::vec((0.0f64..200.0, 0.0f64..200.0), 2..12),
        ) {
            let mut arena = PointArena::new();
            let polys: Vec<Vec<Point2>> = coords
                .iter()
                .map(|&(x, y)| vec![Point2::new(x, y), Point2::new(x + 1.0, y)])
                .collect();
            let paths = arena.load(&polys, true);
            let start = Point2::new(0.0, 0.0);
            let nearest = paths
                .iter()
                .map(|p| start.dist2(arena.pos(p.points[0])))
                .fold(f64::MAX, f64::min);
            let mut want: Vec<Path> = paths.clone();
            let sorted =
                order_paths(&arena, paths, &MinTravelOptions { start, ..Default::default() });
            proptest::prop_assert_eq!(sorted.len(), want.len());
            proptest::prop_assert!(
                (start.dist2(arena.pos(sorted[0].points[0])) - nearest).abs() < 1e-9
            );
            let mut got = sorted;
            want.sort_by_key(|p| p.points[0]);
            got.sort_by_key(|p| p.points[0]);
            proptest::prop_assert_eq!(got, want);
        }
    }

    #[test]
    fn entrycircular_rotates_closed_paths() {
        let mut arena = PointArena::new();
        let paths = load(
            &mut arena,
            &[&[(50.0, 50.0), (60.0, 50.0), (60.0, 60.0), (2.0, 1.0), (50.0, 50.0)]],
        );
        let sorted = order_paths(
            &arena,
            paths,
            &MinTravelOptions { entrycircular: true, ..Default::default() },
        );
        let p = &sorted[0];
        // Entered at the vertex nearest the origin, still closed.
        assert_eq!(arena.pos(p.points[0]), Point2::new(2.0, 1.0));
        assert_eq!(p.points.first(), p.points.last());
        assert_eq!(p.len(), 5);
    }
}
