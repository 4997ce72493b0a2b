//! Per-frame scheduling: callback registry, platform frame requests, and the
//! loop that ties them to a world and a renderer.

mod frame_loop;
mod registry;
mod scheduler;

pub use frame_loop::{FrameLoop, LoopState};
pub use registry::{FrameCallback, FrameRegistry, Subscription, SubscriptionId};
pub use scheduler::{FrameHandle, FrameRequests, FrameScheduler};
