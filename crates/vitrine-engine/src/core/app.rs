use winit::event::WindowEvent;

use super::ctx::{FrameCtx, StartCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once after the window and GPU are ready.
    fn on_start(&mut self, ctx: &mut StartCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Called for window events. Resizes reach the app after the surface is reconfigured.
    fn on_window_event(&mut self, ctx: &mut WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called when a requested frame comes due.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once while the event loop shuts down.
    fn on_exit(&mut self) {}
}
