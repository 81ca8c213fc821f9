use thiserror::Error;

use wgpu_utils::GpuError;

/// Start-up failures. The renderer can't recover from any of them.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("could not create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("could not create the window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
}
