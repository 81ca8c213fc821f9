mod buffer;
mod error;
mod gpu;
mod shader;


pub use buffer::{BufferInitDescriptor, BindGroupDescriptor, BufferType};
pub use error::GpuError;
pub use gpu::setup_gpu;
pub use shader::{workgroup_size, create_shader_module, validated};
