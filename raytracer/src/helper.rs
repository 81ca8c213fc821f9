use wgpu_utils::{BindGroupDescriptor, BufferType};

/// Format of the accumulation images. Needs `STORAGE_BINDING` and float precision.
pub const ACCUMULATION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Creates one zero-initialised accumulation image.
pub fn create_accumulation_texture(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: ACCUMULATION_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::STORAGE_BINDING,
        view_formats: &[],
    })
}

/// Bindings of the trace kernel's group 1: the previous accumulation and the image to write.
pub fn trace_bind_group_descriptor<'a>(previous: &'a wgpu::TextureView, output: &'a wgpu::TextureView) -> BindGroupDescriptor<'a> {
    BindGroupDescriptor::new(
        Some("trace"),
        wgpu::ShaderStages::COMPUTE,
        vec![
            BufferType::texture(previous, wgpu::TextureViewDimension::D2, false),
            BufferType::storage_texture(output, ACCUMULATION_FORMAT, wgpu::TextureViewDimension::D2),
        ]
    )
}

/// Bindings of the screen shader: a nearest sampler and the accumulation image to show.
pub fn screen_bind_group_descriptor<'a>(sampler: &'a wgpu::Sampler, view: &'a wgpu::TextureView) -> BindGroupDescriptor<'a> {
    BindGroupDescriptor::new(
        Some("screen_transfer"),
        wgpu::ShaderStages::FRAGMENT,
        vec![
            BufferType::sampler(sampler, false),
            BufferType::texture(view, wgpu::TextureViewDimension::D2, false),
        ]
    )
}

/// The two accumulation images used ping-pong style.
///
/// Each frame the kernel reads image `read` and writes image `1 - read`, and the screen pass
/// shows the image just written. `swap` flips the roles once the frame was submitted.
pub struct AccumulationTargets {
    _textures: [wgpu::Texture; 2],
    trace_bind_groups: [wgpu::BindGroup; 2],
    screen_bind_groups: [wgpu::BindGroup; 2],
    read: usize,
}

/// Layouts shared by every pair of accumulation images.
pub struct AccumulationLayouts {
    pub trace: wgpu::BindGroupLayout,
    pub screen: wgpu::BindGroupLayout,
}

fn create_views(device: &wgpu::Device, width: u32, height: u32) -> ([wgpu::Texture; 2], [wgpu::TextureView; 2]) {
    let textures = [
        create_accumulation_texture(device, "Accumulation Texture A", width, height),
        create_accumulation_texture(device, "Accumulation Texture B", width, height),
    ];
    let views = [
        textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
        textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
    ];
    (textures, views)
}

impl AccumulationTargets {
    /// Allocates the first pair of images and derives the bind group layouts from them.
    pub fn with_layouts(device: &wgpu::Device, width: u32, height: u32, sampler: &wgpu::Sampler) -> (Self, AccumulationLayouts) {
        let (textures, views) = create_views(device, width, height);
        let layouts = AccumulationLayouts {
            trace: trace_bind_group_descriptor(&views[0], &views[1]).generate_bind_group_layout(device),
            screen: screen_bind_group_descriptor(sampler, &views[1]).generate_bind_group_layout(device),
        };
        let targets = Self::from_views(device, textures, &views, &layouts, sampler);
        (targets, layouts)
    }

    /// Allocates a fresh, zeroed pair of images for an existing set of layouts.
    pub fn new(device: &wgpu::Device, width: u32, height: u32, layouts: &AccumulationLayouts, sampler: &wgpu::Sampler) -> Self {
        let (textures, views) = create_views(device, width, height);
        log::debug!("Reallocated accumulation images {}x{}", width, height);
        Self::from_views(device, textures, &views, layouts, sampler)
    }

    fn from_views(device: &wgpu::Device, textures: [wgpu::Texture; 2], views: &[wgpu::TextureView; 2], layouts: &AccumulationLayouts, sampler: &wgpu::Sampler) -> Self {
        // index = image read by the kernel
        let trace_bind_groups = [
            trace_bind_group_descriptor(&views[0], &views[1]).generate_bind_group(device, &layouts.trace),
            trace_bind_group_descriptor(&views[1], &views[0]).generate_bind_group(device, &layouts.trace),
        ];
        let screen_bind_groups = [
            screen_bind_group_descriptor(sampler, &views[1]).generate_bind_group(device, &layouts.screen),
            screen_bind_group_descriptor(sampler, &views[0]).generate_bind_group(device, &layouts.screen),
        ];

        Self {
            _textures: textures,
            trace_bind_groups,
            screen_bind_groups,
            read: 0,
        }
    }

    pub fn trace_bind_group(&self) -> &wgpu::BindGroup {
        &self.trace_bind_groups[self.read]
    }

    pub fn screen_bind_group(&self) -> &wgpu::BindGroup {
        &self.screen_bind_groups[self.read]
    }

    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }
}

pub fn create_trace_pipeline(device: &wgpu::Device, shader: &wgpu::ShaderModule, entry_point: &str, bind_group_layouts: &[&wgpu::BindGroupLayout]) -> wgpu::ComputePipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Ray Tracing Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("Ray Tracing Pipeline"),
        layout: Some(&pipeline_layout),
        module: shader,
        entry_point,
    })
}

pub fn create_screen_pipeline(device: &wgpu::Device, shader: &wgpu::ShaderModule, bind_group_layout: &wgpu::BindGroupLayout, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Screen Transfer Pipeline Layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Screen Transfer Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[
                Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })
            ],
        }),
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        multiview: None,
    })
}
