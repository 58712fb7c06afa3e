//! Cross-module planning tests: model → strategy → post-processing.

use cutkit_core::{Point2, PointArena};
use cutkit_planner::{
    fuse, plan_mat_free, postprocess, pre_orient, Axis, MinTravelOptions, PlannerConfig,
};

fn poly(pts: &[(f64, f64)]) -> Vec<Point2> {
    pts.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

#[test]
fn mat_free_output_fuses_into_few_strokes() {
    // A comb of five short vertical teeth hanging from one bar; planned
    // mat-free and fused, the bar must come out as continuous runs, not
    // twenty separate two-point strokes.
    let mut input = vec![poly(&[(0.0, 0.0), (50.0, 0.0)])];
    for i in 0..5 {
        let x = 10.0 * i as f64;
        input.push(poly(&[(x, 0.0), (x, 8.0)]));
    }
    let mut arena = PointArena::new();
    let mut paths = arena.load(&input, true);
    let cfg = PlannerConfig::default();
    arena.subdivide(&mut paths, cfg.max_segment_mm);
    let planned = plan_mat_free(&mut arena, &paths, &cfg);

    let segments: usize = planned.iter().map(|p| p.len() - 1).sum();
    let polys = fuse(arena.resolve(&planned), 1e-9);
    // Nothing lost in fusing.
    let after: usize = polys.iter().map(|p| p.len() - 1).sum();
    assert_eq!(segments, after);
    // Far fewer pen lifts than segments.
    assert!(polys.len() <= segments / 2, "{} strokes for {} segments", polys.len(), segments);
}

#[test]
fn mat_free_never_cuts_upward_across_the_barrier() {
    // With back-travel disabled, every emitted segment must be fully
    // promoted before any segment strictly below it starts: track the
    // barrier-monotone property via the maximum y seen so far.
    let cfg = PlannerConfig {
        allow_back_travel: 0.0,
        barrier_step_mm: 2.0,
        ..Default::default()
    };
    let input = vec![
        poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 30.0), (0.0, 30.0), (0.0, 0.0)]),
        poly(&[(20.0, 15.0), (30.0, 15.0)]),
    ];
    let mut arena = PointArena::new();
    let mut paths = arena.load(&input, true);
    arena.subdivide(&mut paths, cfg.max_segment_mm);
    let planned = plan_mat_free(&mut arena, &paths, &cfg);

    // A promoted segment's top can trail the furthest top seen by at
    // most one barrier step plus one subdivided segment length; anything
    // beyond that would mean re-entering paper the sweep already
    // finished.
    let slack = cfg.barrier_step_mm + cfg.max_segment_mm;
    let mut barrier_floor: f64 = f64::MIN;
    for path in &planned {
        for w in path.points.windows(2) {
            let (a, b) = (arena.pos(w[0]), arena.pos(w[1]));
            let top = a.y.min(b.y);
            assert!(
                top + slack >= barrier_floor - 1e-9,
                "segment at y={top} emitted after barrier reached {barrier_floor}"
            );
            barrier_floor = barrier_floor.max(top);
        }
    }
}

#[test]
fn pre_orient_then_min_travel_round_trip() {
    let mut arena = PointArena::new();
    let paths = arena.load(
        &[
            poly(&[(0.0, 20.0), (0.0, 10.0)]),
            poly(&[(5.0, 0.0), (5.0, 30.0)]),
        ],
        true,
    );
    let ordered = cutkit_planner::order_paths(&arena, paths, &MinTravelOptions::default());
    let polys = pre_orient(arena.resolve(&ordered), Axis::Y, true);
    for p in &polys {
        for w in p.windows(2) {
            assert!(w[1].y >= w[0].y);
        }
    }
}

#[test]
fn overcut_after_multipass_keeps_the_loop_closed_cut() {
    let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    let strokes = postprocess::multipass(vec![square], 3, false);
    let out = postprocess::overcut(strokes, 2.0);
    let p = &out[0];
    // 3 loops of 4 segments, plus a lead-in and a lead-out vertex.
    assert_eq!(p.len(), 13 + 2);
    assert_eq!(p[0], Point2::new(0.0, 2.0));
    assert_eq!(*p.last().unwrap(), Point2::new(2.0, 0.0));
}
