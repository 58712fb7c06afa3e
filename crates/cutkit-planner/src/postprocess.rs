//! Path post-processing between planning and the device: pre-orientation,
//! fusing, multipass and overcut.
//!
//! Post-processing works on concrete mm polylines rather than arena
//! paths: multipass and overcut create repeated and interpolated
//! vertices that need no arena identity.

use serde::{Deserialize, Serialize};

use cutkit_core::{Point2, EPSILON};

/// Orientation axis for [`pre_orient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

fn coord(p: Point2, axis: Axis) -> f64 {
    match axis {
        Axis::X => p.x,
        Axis::Y => p.y,
    }
}

fn poly_is_closed(path: &[Point2]) -> bool {
    path.len() > 2
        && path
            .first()
            .zip(path.last())
            .map(|(a, b)| a.dist(*b) <= EPSILON)
            .unwrap_or(false)
}

/// Split every path into runs that progress monotonically along `axis`.
///
/// Greedy monotone-run extraction: the leading run of each path is cut
/// off (reversed first when it goes the wrong way) and the leftover
/// vertices are fed back into the pool instead of being discarded.
/// Relative path order is otherwise preserved.
pub fn pre_orient(paths: Vec<Vec<Point2>>, axis: Axis, ascending: bool) -> Vec<Vec<Point2>> {
    let sign = if ascending { 1.0 } else { -1.0 };
    let mut pool: std::collections::VecDeque<Vec<Point2>> = paths.into();
    let mut out = Vec::new();

    while let Some(path) = pool.pop_front() {
        if path.len() < 2 {
            out.push(path);
            continue;
        }
        let step = |i: usize| sign * (coord(path[i + 1], axis) - coord(path[i], axis));
        let with_direction = step(0) >= 0.0;
        let mut r = 1;
        while r + 1 < path.len() {
            let s = step(r);
            let extends = if with_direction { s >= 0.0 } else { s <= 0.0 };
            if !extends {
                break;
            }
            r += 1;
        }
        let mut run = path[..=r].to_vec();
        if !with_direction {
            run.reverse();
        }
        out.push(run);
        if r + 1 < path.len() {
            pool.push_front(path[r..].to_vec());
        }
    }

    out
}

/// Merge paths whose endpoints coincide into continuous strokes.
///
/// One scan over the ordered list: when a path starts where the previous
/// one ended (within `eps`), the two are fused and the duplicate
/// junction vertex dropped, eliminating a pen lift.
pub fn fuse(paths: Vec<Vec<Point2>>, eps: f64) -> Vec<Vec<Point2>> {
    let mut out: Vec<Vec<Point2>> = Vec::with_capacity(paths.len());
    for path in paths {
        if let Some(prev) = out.last_mut() {
            if let (Some(&tail), Some(&head)) = (prev.last(), path.first()) {
                if tail.dist(head) <= eps {
                    prev.extend(path.into_iter().skip(1));
                    continue;
                }
            }
        }
        out.push(path);
    }
    out
}

/// Repeat each path's stroke `passes` times.
///
/// With `reverse_toggle` the direction alternates each pass and the
/// passes join into one stroke (no pen lift). Closed paths continue
/// around the loop without lifting. Open paths without the toggle lift
/// and restart for every pass.
pub fn multipass(paths: Vec<Vec<Point2>>, passes: usize, reverse_toggle: bool) -> Vec<Vec<Point2>> {
    if passes <= 1 {
        return paths;
    }
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        if path.len() < 2 {
            out.push(path);
            continue;
        }
        if reverse_toggle {
            let mut stroke = path.clone();
            let mut forward = true;
            for _ in 1..passes {
                forward = !forward;
                if forward {
                    stroke.extend(path.iter().skip(1).copied());
                } else {
                    stroke.extend(path.iter().rev().skip(1).copied());
                }
            }
            out.push(stroke);
        } else if poly_is_closed(&path) {
            let mut stroke = path.clone();
            for _ in 1..passes {
                stroke.extend(path.iter().skip(1).copied());
            }
            out.push(stroke);
        } else {
            for _ in 0..passes {
                out.push(path.clone());
            }
        }
    }
    out
}

/// Extend closed cuts past their seam to compensate for blade offset.
///
/// The stroke gains a pre-cut run (approaching the seam along the path's
/// final segments) and a post-cut run (continuing past the seam along
/// its first segments), each up to `distance_mm` long. Open paths are
/// returned untouched; the overlap is bounded by one full loop.
pub fn overcut(paths: Vec<Vec<Point2>>, distance_mm: f64) -> Vec<Vec<Point2>> {
    if distance_mm <= 0.0 {
        return paths;
    }
    paths.into_iter().map(|p| overcut_path(p, distance_mm)).collect()
}

fn overcut_path(path: Vec<Point2>, distance_mm: f64) -> Vec<Point2> {
    if !poly_is_closed(&path) {
        return path;
    }
    let total: f64 = path.windows(2).map(|w| w[0].dist(w[1])).sum();
    if total <= EPSILON {
        return path;
    }
    let o = distance_mm.min(total);

    // Post-cut: continue past the seam along the loop's first segments.
    let post = walk_run(&path, o);

    // Pre-cut: approach the seam backward along its final segments.
    let back: Vec<Point2> = path.iter().rev().copied().collect();
    let mut pre = walk_run(&back, o);
    pre.reverse();

    let mut out = pre;
    out.extend(path);
    out.extend(post);
    out
}

/// The run of vertices after `verts[0]`, cut off at accumulated length
/// `o` with an interpolated final point.
fn walk_run(verts: &[Point2], o: f64) -> Vec<Point2> {
    let mut run = Vec::new();
    let mut acc = 0.0;
    let mut prev = verts[0];
    for &v in &verts[1..] {
        let seg = prev.dist(v);
        if seg <= EPSILON {
            prev = v;
            continue;
        }
        if acc + seg >= o {
            run.push(prev.lerp(v, (o - acc) / seg));
            return run;
        }
        run.push(v);
        acc += seg;
        prev = v;
    }
    run
}
