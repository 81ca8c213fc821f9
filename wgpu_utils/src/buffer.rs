use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// A struct representing the initial descriptor for a buffer.
///
/// This struct is used to create a new buffer with specified label and usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferInitDescriptor<'a> {
    /// Debug label of a buffer. This will show up in graphics debuggers for easy identification.
    pub label: wgpu::Label<'a>,
    /// Usages of a buffer. If the buffer is used in any way that isn't specified here, the operation
    /// will panic.
    pub usage: wgpu::BufferUsages,
}

impl<'a> BufferInitDescriptor<'a> {
    pub fn new(label: wgpu::Label<'a>, usage: wgpu::BufferUsages) -> Self {
        Self { label, usage }
    }

    pub fn create_new_buffer<T: Pod>(&self, device: &wgpu::Device, data: &[T]) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: self.label,
            contents: bytemuck::cast_slice(data),
            usage: self.usage,
        })
    }
}

/// An enum representing the template for a binding resource.
/// This shortens the amount of code needed to create a bind group layout and bind group.
#[derive(Clone, Debug)]
enum BindingResourceTemplate<'a> {
    BufferUniform(wgpu::BindingResource<'a>),
    StorageTexture(wgpu::BindingResource<'a>),
    TextureView(wgpu::BindingResource<'a>),
    Sampler(wgpu::BindingResource<'a>),
}

impl<'a> BindingResourceTemplate<'a> {
    fn resource(&self) -> wgpu::BindingResource<'a> {
        match self {
            BindingResourceTemplate::BufferUniform(binding_resource)
            | BindingResourceTemplate::StorageTexture(binding_resource)
            | BindingResourceTemplate::TextureView(binding_resource)
            | BindingResourceTemplate::Sampler(binding_resource) => binding_resource.clone(),
        }
    }
}

/// A struct representing a type of buffer.
/// This enables the user to specify the binding and the layout details it needs in a compact way.
/// This struct can be picked apart to create a bind group layout and bind group.
pub struct BufferType<'a> {
    ty: BindingResourceTemplate<'a>,
    binding_type: wgpu::BindingType,
}

impl<'a> BufferType<'a> {
    pub fn uniform(resource: wgpu::BindingResource<'a>) -> Self {
        Self {
            ty: BindingResourceTemplate::BufferUniform(resource),
            binding_type: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
        }
    }

    /// Write-only storage texture of the given format.
    pub fn storage_texture(view: &'a wgpu::TextureView, format: wgpu::TextureFormat, view_dimension: wgpu::TextureViewDimension) -> Self {
        Self {
            ty: BindingResourceTemplate::StorageTexture(wgpu::BindingResource::TextureView(view)),
            binding_type: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension,
            },
        }
    }

    /// Sampled float texture. 32 bit float formats have to be bound with `filterable: false`.
    pub fn texture(view: &'a wgpu::TextureView, view_dimension: wgpu::TextureViewDimension, filterable: bool) -> Self {
        Self {
            ty: BindingResourceTemplate::TextureView(wgpu::BindingResource::TextureView(view)),
            binding_type: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension,
                multisampled: false,
            },
        }
    }

    pub fn sampler(sampler: &'a wgpu::Sampler, filtering: bool) -> Self {
        let binding_type = if filtering {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        };
        Self {
            ty: BindingResourceTemplate::Sampler(wgpu::BindingResource::Sampler(sampler)),
            binding_type: wgpu::BindingType::Sampler(binding_type),
        }
    }

    fn template(&self) -> &BindingResourceTemplate<'a> {
        &self.ty
    }

    pub fn binding_type(&self) -> wgpu::BindingType {
        self.binding_type
    }
}

/// A struct representing a descriptor for a bind group.
/// This struct can be used to create a bind group layout and any number of bind groups
/// that share it, e.g. the two halves of a ping-pong pair.
///
/// Bindings are numbered in the order they are listed.
pub struct BindGroupDescriptor<'a> {
    pub label: wgpu::Label<'a>,
    pub vis: wgpu::ShaderStages,
    pub bindings: Vec<BufferType<'a>>,
}

impl<'a> BindGroupDescriptor<'a> {
    pub fn new(label: wgpu::Label<'a>, vis: wgpu::ShaderStages, bindings: Vec<BufferType<'a>>) -> Self {
        Self { label, vis, bindings }
    }

    pub fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.bindings.iter().enumerate().map(|(index, binding)| {
            wgpu::BindGroupLayoutEntry {
                binding: index as u32,
                visibility: self.vis,
                ty: binding.binding_type(),
                count: None,
            }
        }).collect()
    }

    /// A method to generate a bind group layout.
    pub fn generate_bind_group_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        //append _bind_group_layout if label is Some
        let mod_label = self.label.as_ref().map(|label| format!("{}_bind_group_layout", label));

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: mod_label.as_deref(),
            entries: &self.layout_entries(),
        })
    }

    /// A method to generate a bind group against an existing layout.
    pub fn generate_bind_group(&self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> wgpu::BindGroup {
        let entries = self.bindings.iter().enumerate().map(|(index, binding)| {
            wgpu::BindGroupEntry {
                binding: index as u32,
                resource: binding.template().resource(),
            }
        }).collect::<Vec<_>>();

        //append _bind_group if label is Some
        let mod_label = self.label.as_ref().map(|label| format!("{}_bind_group", label));

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: mod_label.as_deref(),
            layout,
            entries: &entries,
        })
    }
}
