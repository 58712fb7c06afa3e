//! Planner configuration.

use serde::{Deserialize, Serialize};

use cutkit_core::EPSILON;

/// Tuning knobs for the planning strategies.
///
/// Passed explicitly into every planner entry point; there is no ambient
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Lateral head travel below which the barrier sweep keeps its
    /// previous scan direction instead of flipping, mm.
    pub min_jump: f64,
    /// Interning tolerance for the point registry.
    pub dup_epsilon: f64,
    /// How far a segment's lower endpoint may dangle past the sweep
    /// barrier and still be promoted, mm.
    pub allow_back_travel: f64,
    /// Pen mode: the tool cannot tear media, so sharp-corner handling is
    /// disabled entirely.
    pub pen_mode: bool,
    /// Cotangent of the half-angle treated as a sharp turn; 0 is the 90°
    /// case, larger values classify shallower corners as sharp.
    pub fwd_ratio: f64,
    /// Barrier advance per sweep step, mm.
    pub barrier_step_mm: f64,
    /// Maximum segment length fed to the barrier sweep; longer input
    /// segments are subdivided first, mm.
    pub max_segment_mm: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_jump: 2.0,
            dup_epsilon: EPSILON,
            allow_back_travel: 1.0,
            pen_mode: false,
            fwd_ratio: 0.0,
            barrier_step_mm: 5.0,
            max_segment_mm: 5.0,
        }
    }
}
