//! One-call planning pipeline: point model → strategy → post-processing.
//!
//! Embedders that don't need to mix their own passes call [`plan`] to
//! turn raw polylines into device-ready polylines, and [`plot_job`] to
//! run a whole job against the first discovered device.

use serde::{Deserialize, Serialize};

use cutkit_core::{MediaDescriptor, Point2, PointArena};
use cutkit_device::{open_first, PlotOutcome, Session, SetupParams, TrailerMode, TransportParams};
use cutkit_planner::{matfree, mintravel, postprocess, Axis, MinTravelOptions, PlannerConfig};

use anyhow::Context;

/// Which ordering strategy plans the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Barrier-sweep ordering safe for mat-free cutting.
    MatFree,
    /// Greedy nearest-neighbor travel minimization only.
    MinTravel,
}

/// Options for [`plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    /// Ordering strategy.
    pub strategy: Strategy,
    /// Planner tuning (also supplies the interning tolerance).
    pub planner: PlannerConfig,
    /// Options for the min-travel strategy.
    pub travel: MinTravelOptions,
    /// Re-orient paths monotonically along an axis before fusing.
    pub pre_orient: Option<(Axis, bool)>,
    /// Fuse paths whose endpoints coincide.
    pub fuse: bool,
    /// Number of passes per stroke.
    pub passes: usize,
    /// Alternate stroke direction between passes (no pen lift).
    pub reverse_toggle: bool,
    /// Overcut distance for closed cuts, mm (0 disables).
    pub overcut_mm: f64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::MatFree,
            planner: PlannerConfig::default(),
            travel: MinTravelOptions::default(),
            pre_orient: None,
            fuse: true,
            passes: 1,
            reverse_toggle: false,
            overcut_mm: 0.0,
        }
    }
}

/// Plan raw mm polylines into device-ready polylines.
///
/// Loads the vertices into a fresh point arena (fresh per job, nothing
/// survives it), runs the chosen strategy and applies the configured
/// post-processing in order: pre-orientation, fusing, multipass,
/// overcut.
pub fn plan(polylines: &[Vec<Point2>], opts: &PlanOptions) -> Vec<Vec<Point2>> {
    let mut arena = PointArena::with_epsilon(opts.planner.dup_epsilon);
    let mut paths = arena.load(polylines, true);

    let planned = match opts.strategy {
        Strategy::MatFree => {
            arena.subdivide(&mut paths, opts.planner.max_segment_mm);
            matfree::plan_mat_free(&mut arena, &paths, &opts.planner)
        }
        Strategy::MinTravel => mintravel::order_paths(&arena, paths, &opts.travel),
    };

    let mut polys = arena.resolve(&planned);
    if let Some((axis, ascending)) = opts.pre_orient {
        polys = postprocess::pre_orient(polys, axis, ascending);
    }
    if opts.fuse {
        polys = postprocess::fuse(polys, opts.planner.dup_epsilon.max(1e-9));
    }
    if opts.passes > 1 {
        polys = postprocess::multipass(polys, opts.passes, opts.reverse_toggle);
    }
    if opts.overcut_mm > 0.0 {
        polys = postprocess::overcut(polys, opts.overcut_mm);
    }
    polys
}

/// Plan and plot one job on the first discovered device.
pub fn plot_job(
    polylines: &[Vec<Point2>],
    opts: &PlanOptions,
    media: &MediaDescriptor,
    setup: &SetupParams,
    trailer: TrailerMode,
) -> anyhow::Result<PlotOutcome> {
    let planned = plan(polylines, opts);
    tracing::info!(paths = planned.len(), "plan ready");

    let (transport, profile) =
        open_first(&TransportParams::default()).context("no supported plotter connected")?;
    tracing::info!(device = %profile.name, "device claimed");

    let mut session = Session::new(transport, profile);
    session.setup(setup).context("device setup failed")?;
    let outcome = session
        .plot(&planned, media, Point2::new(0.0, 0.0), trailer)
        .context("plot failed")?;
    tracing::info!(count = outcome.bbox.count, trailer = %outcome.trailer, "job done");
    Ok(outcome)
}
