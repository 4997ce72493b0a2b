use winit::window::Window;

use crate::device::Gpu;
use crate::frame::{FrameHandle, FrameRequests};

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Width over height, or `None` while minimized.
    pub fn aspect(&self) -> Option<f32> {
        let size = self.window.inner_size();
        (size.width > 0 && size.height > 0).then(|| size.width as f32 / size.height as f32)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Context passed to `core::App::on_start`.
pub struct StartCtx<'a> {
    pub window:   WindowCtx<'a>,
    /// Frame request cell drained by this runtime; clone it into a frame loop.
    pub requests: &'a FrameRequests,
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:  WindowCtx<'a>,
    pub gpu:     &'a mut Gpu<'w>,
    /// The request that came due for this redraw.
    pub handle:  FrameHandle,
}
