use crate::error::GpuError;

/// Parses WGSL `source` and returns the `@workgroup_size` declared by the compute entry point.
///
/// The size is fixed by the shader, so the renderer reads it once at start-up.
pub fn workgroup_size(label: &str, source: &str, entry_point: &str) -> Result<[u32; 3], GpuError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|error| GpuError::ShaderParse {
        label: label.to_string(),
        diagnostic: error.emit_to_string(source),
    })?;

    module.entry_points.iter()
        .find(|entry| entry.name == entry_point && entry.stage == naga::ShaderStage::Compute)
        .map(|entry| entry.workgroup_size)
        .ok_or_else(|| GpuError::MissingEntryPoint {
            label: label.to_string(),
            entry_point: entry_point.to_string(),
        })
}

/// Runs `create` inside a validation error scope and turns a captured error into `GpuError::Validation`.
///
/// wgpu reports shader compile and pipeline link problems asynchronously; without a scope
/// they would go to the uncaptured error handler and abort the process.
pub async fn validated<T>(device: &wgpu::Device, label: &str, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T, GpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create(device);
    match device.pop_error_scope().await {
        Some(error) => Err(GpuError::Validation { label: label.to_string(), message: error.to_string() }),
        None => Ok(value),
    }
}

/// Creates a WGSL shader module, failing with the compiler message instead of panicking.
pub async fn create_shader_module(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule, GpuError> {
    validated(device, label, |device| {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE_SHADER: &str = include_str!("../../res/shader/raytracing.wgsl");
    const SCREEN_SHADER: &str = include_str!("../../res/shader/screen-shader.wgsl");

    #[test]
    fn test_trace_shader_workgroup_size() {
        let size = workgroup_size("raytracing.wgsl", TRACE_SHADER, "main").expect("trace shader should parse");
        assert_eq!(size, [16, 8, 1]);
    }

    #[test]
    fn test_screen_shader_parses() {
        let module = naga::front::wgsl::parse_str(SCREEN_SHADER)
            .unwrap_or_else(|error| panic!("{}", error.emit_to_string(SCREEN_SHADER)));
        assert!(module.entry_points.iter().any(|entry| entry.name == "vs_main" && entry.stage == naga::ShaderStage::Vertex));
        assert!(module.entry_points.iter().any(|entry| entry.name == "fs_main" && entry.stage == naga::ShaderStage::Fragment));
    }

    #[test]
    fn test_shaders_validate() {
        for (label, source) in [("raytracing.wgsl", TRACE_SHADER), ("screen-shader.wgsl", SCREEN_SHADER)] {
            let module = naga::front::wgsl::parse_str(source).expect("shader should parse");
            let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty());
            assert!(validator.validate(&module).is_ok(), "{} failed validation", label);
        }
    }

    #[test]
    fn test_workgroup_size_missing_entry_point() {
        let error = workgroup_size("raytracing.wgsl", TRACE_SHADER, "trace").unwrap_err();
        assert!(matches!(error, GpuError::MissingEntryPoint { ref entry_point, .. } if entry_point == "trace"));

        // vs_main exists but isn't a compute entry point
        let error = workgroup_size("screen-shader.wgsl", SCREEN_SHADER, "vs_main").unwrap_err();
        assert!(matches!(error, GpuError::MissingEntryPoint { .. }));
    }

    #[test]
    fn test_workgroup_size_parse_error() {
        let error = workgroup_size("broken.wgsl", "@compute @workgroup_size(8, 8) fn main( {", "main").unwrap_err();
        match error {
            GpuError::ShaderParse { label, diagnostic } => {
                assert_eq!(label, "broken.wgsl");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_workgroup_size_defaults_missing_dimensions() {
        let size = workgroup_size("small.wgsl", "@compute @workgroup_size(32) fn main() {}", "main").expect("shader should parse");
        assert_eq!(size, [32, 1, 1]);
    }
}
