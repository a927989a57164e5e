//! Builder Module
//!
//! Build mode: the placement session that drives the ghost, the validity
//! gate it consults, and the debounced feedback it reports.

pub mod feedback;
pub mod gate;
pub mod session;

pub use feedback::{PreviewFeedback, ValidityLatch};
pub use gate::{GateRequest, PlacementVerdict, evaluate, within_reach};
pub use session::{CommitOutcome, FrameOutcome, PlacementSession, SessionState, SkipReason};
