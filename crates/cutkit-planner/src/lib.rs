//! # CutKit Planner
//!
//! Path-ordering strategies and post-processing for knife/pen plotting:
//!
//! - [`matfree`] — the barrier-sweep planner for cutting without a mat,
//!   ordering and orienting every segment so fragile media is never
//!   destabilized by the blade.
//! - [`mintravel`] — greedy nearest-neighbor whole-path reordering that
//!   only minimizes idle travel.
//! - [`postprocess`] — pre-orientation, path fusing, multipass and
//!   overcut applied to planned polylines before they reach the device.
//!
//! A planning pass runs to completion before the device session consumes
//! its output; nothing here touches hardware.

pub mod config;
pub mod matfree;
pub mod mintravel;
pub mod postprocess;

pub use config::PlannerConfig;
pub use matfree::plan_mat_free;
pub use mintravel::{order_paths, MinTravelOptions};
pub use postprocess::{fuse, multipass, overcut, pre_orient, Axis};
