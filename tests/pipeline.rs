//! Whole-pipeline tests: polylines in, wire commands out.

use cutkit::{
    plan, MediaDescriptor, MinTravelOptions, PlanOptions, Point2, RecordingTransport, Session,
    SetupParams, Strategy, TrailerMode,
};
use cutkit_devicedb::{lookup, VENDOR_GRAPHTEC};

fn poly(pts: &[(f64, f64)]) -> Vec<Point2> {
    pts.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

/// Sum of segment lengths over a set of polylines.
fn total_length(polys: &[Vec<Point2>]) -> f64 {
    polys
        .iter()
        .flat_map(|p| p.windows(2))
        .map(|w| w[0].dist(w[1]))
        .sum()
}

#[test]
fn mat_free_plan_preserves_total_cut_length() {
    let input = vec![
        poly(&[(0.0, 0.0), (30.0, 0.0), (30.0, 20.0), (0.0, 20.0), (0.0, 0.0)]),
        poly(&[(40.0, 5.0), (55.0, 5.0), (47.5, 18.0), (40.0, 5.0)]),
        poly(&[(70.0, 0.0), (70.0, 25.0)]),
    ];
    let want = total_length(&input);
    let opts = PlanOptions::default();
    let planned = plan(&input, &opts);
    let got = total_length(&planned);
    // Ordering, splitting and fusing may reshape paths but never add or
    // drop cut length.
    assert!((want - got).abs() < 1e-6, "cut length changed: {want} -> {got}");
}

#[test]
fn min_travel_strategy_orders_nearest_first() {
    let input = vec![
        poly(&[(0.0, 0.0), (5.0, 0.0)]),
        poly(&[(100.0, 100.0), (105.0, 100.0)]),
        poly(&[(6.0, 0.0), (9.0, 0.0)]),
    ];
    let opts = PlanOptions {
        strategy: Strategy::MinTravel,
        travel: MinTravelOptions { start: Point2::new(0.0, 0.0), ..Default::default() },
        fuse: false,
        ..Default::default()
    };
    let planned = plan(&input, &opts);
    assert_eq!(planned.len(), 3);
    assert_eq!(planned[0][0], Point2::new(0.0, 0.0));
    assert_eq!(planned[1][0], Point2::new(6.0, 0.0));
    assert_eq!(planned[2][0], Point2::new(100.0, 100.0));
}

#[test]
fn single_path_min_travel_is_identity() {
    let input = vec![poly(&[(3.0, 1.0), (8.0, 2.0), (9.0, 9.0)])];
    let opts =
        PlanOptions { strategy: Strategy::MinTravel, fuse: false, ..Default::default() };
    let planned = plan(&input, &opts);
    assert_eq!(planned, input);
}

#[test]
fn planned_square_plots_with_multipass_and_overcut() {
    let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
    let opts = PlanOptions {
        strategy: Strategy::MinTravel,
        passes: 2,
        overcut_mm: 1.0,
        fuse: false,
        ..Default::default()
    };
    let planned = plan(&[square], &opts);
    assert_eq!(planned.len(), 1);

    let mut session = Session::new(
        RecordingTransport::new(),
        lookup(VENDOR_GRAPHTEC, 0x1121).unwrap(),
    );
    session.setup(&SetupParams::default()).unwrap();
    let out = session
        .plot(&planned, &MediaDescriptor::default(), Point2::new(0.0, 0.0), TrailerMode::ReturnHome)
        .unwrap();

    // Two passes around the loop plus 1mm leads on both sides of the
    // seam; the box is still exactly the square.
    assert_eq!(out.bbox.llx, 0);
    assert_eq!(out.bbox.urx, 200);
    assert_eq!(out.bbox.ury, 0);
    assert_eq!(out.bbox.lly, 200);
    let cmds = session.transport().commands();
    // Stroke starts pen-up at the pre-cut lead-in, 1mm up the final edge.
    assert!(cmds.iter().any(|c| c == "M20,0"), "missing lead-in: {cmds:?}");
    // And finishes 1mm past the seam on the first edge.
    assert!(cmds.iter().any(|c| c == "D0,20"), "missing lead-out: {cmds:?}");
}

#[test]
fn plan_options_round_trip_through_json() {
    let opts = PlanOptions {
        strategy: Strategy::MinTravel,
        passes: 3,
        overcut_mm: 2.0,
        ..Default::default()
    };
    let json = serde_json::to_string(&opts).unwrap();
    let back: PlanOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(opts, back);
}
