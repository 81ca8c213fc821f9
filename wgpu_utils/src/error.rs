use thiserror::Error;

/// Failures while bringing up the GPU or building the shader programs.
///
/// All of them are fatal at start-up.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("could not create a surface for the window: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter found")]
    NoAdapter,
    #[error("the adapter '{0}' can't present to this window")]
    IncompatibleSurface(String),
    #[error("could not open the graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("could not parse shader '{label}':\n{diagnostic}")]
    ShaderParse { label: String, diagnostic: String },
    #[error("shader '{label}' has no compute entry point named '{entry_point}'")]
    MissingEntryPoint { label: String, entry_point: String },
    #[error("'{label}' failed validation:\n{message}")]
    Validation { label: String, message: String },
}
