//! Key/value debug readout owned by the running demo.

mod panel;

pub use panel::DebugPanel;
