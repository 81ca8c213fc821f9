use std::sync::Arc;

use winit::window::Window;

use crate::error::GpuError;

/// Opens a device for `window` and configures its surface.
///
/// The surface prefers an sRGB format so the linear accumulation image is gamma corrected
/// on presentation. `vsync` picks between `AutoVsync` and `AutoNoVsync`.
pub async fn setup_gpu(window: Arc<Window>, vsync: bool) -> Result<(wgpu::Device, wgpu::Queue, wgpu::Surface<'static>, wgpu::SurfaceConfiguration), GpuError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let size = window.inner_size();
    let surface = instance.create_surface(window)?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or(GpuError::NoAdapter)?;

    let adapter_name = adapter.get_info().name;
    log::info!("Using adapter: {}", adapter_name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Raytracing Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await?;

    let surface_caps = surface.get_capabilities(&adapter);
    let format = surface_caps.formats.iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or(GpuError::IncompatibleSurface(adapter_name))?;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: if vsync { wgpu::PresentMode::AutoVsync } else { wgpu::PresentMode::AutoNoVsync },
        alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    Ok((device, queue, surface, config))
}
