use std::sync::Arc;

use winit::window::Window;

use wgpu_utils::{BufferInitDescriptor, BindGroupDescriptor, BufferType, create_shader_module, setup_gpu, validated, workgroup_size};

use scene::{Config, TraceParams};

use crate::dispatch::WorkgroupGrid;
use crate::error::InitError;
use crate::frame::FrameTarget;
use crate::helper::{create_screen_pipeline, create_trace_pipeline, AccumulationLayouts, AccumulationTargets};

const TRACE_SHADER: &str = include_str!("../../res/shader/raytracing.wgsl");
const SCREEN_SHADER: &str = include_str!("../../res/shader/screen-shader.wgsl");
const TRACE_ENTRY_POINT: &str = "main";

/// Everything wgpu needs to trace and present frames in one window.
pub struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    //Trace kernel
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    trace_pipeline: wgpu::ComputePipeline,
    workgroup_size: [u32; 3],
    //Transfer to screen
    screen_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    //Accumulation
    layouts: AccumulationLayouts,
    targets: AccumulationTargets,
}

impl State {
    /// Brings up the GPU and builds both pipelines.
    ///
    /// The kernel's work-group size is read from its source before any GPU object exists,
    /// so a broken shader fails fast. Shader and pipeline creation run inside validation
    /// scopes and report compile or link problems as `GpuError::Validation`.
    pub async fn new(window: Arc<Window>, userconfig: &Config) -> Result<Self, InitError> {
        let workgroup_size = workgroup_size("raytracing.wgsl", TRACE_SHADER, TRACE_ENTRY_POINT)?;
        log::info!("Trace kernel work-group size: {:?}", workgroup_size);

        //---------Setup Hardware---------
        let (device, queue, surface, config) = setup_gpu(window.clone(), userconfig.window.vsync).await?;
        log::info!("Surface {}x{} ({:?}, {:?})", config.width, config.height, config.format, config.present_mode);

        //--------Trace parameters--------
        let params_descriptor = BufferInitDescriptor::new(Some("Trace Params Buffer"), wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST);
        let params_buffer = params_descriptor.create_new_buffer(&device, &[<TraceParams as bytemuck::Zeroable>::zeroed()]);

        let params_bind_group_descriptor = BindGroupDescriptor::new(
            Some("trace_params"),
            wgpu::ShaderStages::COMPUTE,
            vec![BufferType::uniform(params_buffer.as_entire_binding())]
        );
        let params_bind_group_layout = params_bind_group_descriptor.generate_bind_group_layout(&device);
        let params_bind_group = params_bind_group_descriptor.generate_bind_group(&device, &params_bind_group_layout);

        //--------Accumulation images-----
        // Nearest filtering: rgba32float can't be filtered without an extra feature
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Screen Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let (targets, layouts) = AccumulationTargets::with_layouts(&device, config.width, config.height, &sampler);

        //----------Raytracing-------------
        let trace_shader = create_shader_module(&device, "raytracing.wgsl", TRACE_SHADER).await?;
        let trace_pipeline = validated(&device, "Ray Tracing Pipeline", |device| {
            create_trace_pipeline(device, &trace_shader, TRACE_ENTRY_POINT, &[&params_bind_group_layout, &layouts.trace])
        }).await?;

        //----------Transfer to screen-------------
        let screen_shader = create_shader_module(&device, "screen-shader.wgsl", SCREEN_SHADER).await?;
        let screen_pipeline = validated(&device, "Screen Transfer Pipeline", |device| {
            create_screen_pipeline(device, &screen_shader, &layouts.screen, config.format)
        }).await?;
        log::info!("Pipelines ready");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            params_buffer,
            params_bind_group,
            trace_pipeline,
            workgroup_size,
            screen_pipeline,
            sampler,
            layouts,
            targets,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn workgroup_size(&self) -> [u32; 3] {
        self.workgroup_size
    }

    /// Reconfigures the surface with the current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl FrameTarget for State {
    type Error = wgpu::SurfaceError;

    /// Resizes the surface and replaces both accumulation images.
    fn reallocate(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.targets = AccumulationTargets::new(&self.device, self.config.width, self.config.height, &self.layouts, &self.sampler);
    }

    /// Records the trace pass and the screen pass into one encoder and presents.
    ///
    /// The surface texture is acquired first so a lost surface skips the frame before
    /// anything is recorded. The accumulation images only swap roles once the frame is submitted.
    fn render(&mut self, params: &TraceParams, grid: WorkgroupGrid) -> Result<(), Self::Error> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[*params]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        //----------Raytracing pass----------
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Ray Tracing Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.trace_pipeline);
            compute_pass.set_bind_group(0, &self.params_bind_group, &[]);
            compute_pass.set_bind_group(1, self.targets.trace_bind_group(), &[]);
            compute_pass.dispatch_workgroups(grid.x, grid.y, 1);
        }
        // The compute pass has ended here; its storage writes are visible to the screen pass.

        //----------Render pass----------
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.screen_pipeline);
            render_pass.set_bind_group(0, self.targets.screen_bind_group(), &[]);
            // Full-screen quad, two triangles generated in the vertex shader
            render_pass.draw(0..6, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.targets.swap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_entry_point_is_a_compute_kernel() {
        assert_eq!(workgroup_size("raytracing.wgsl", TRACE_SHADER, TRACE_ENTRY_POINT).unwrap(), [16, 8, 1]);
    }
}
