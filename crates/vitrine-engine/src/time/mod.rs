//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per frame loop; call `tick()` once per delivered frame
//! - `PeriodicGate` for effects that should run every N seconds
//! - `FrameStats` for a once-per-second fps sample

mod frame_clock;
mod periodic_gate;
mod stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use periodic_gate::PeriodicGate;
pub use stats::FrameStats;
