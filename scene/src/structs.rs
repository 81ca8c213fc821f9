use cgmath::{Point3, Vector3};

use crate::camera::CornerRays;

//-----------Trace Parameters-----------------
/// Per-dispatch inputs of the trace kernel.
///
/// Every `vec3` is followed by a scalar so the struct matches the WGSL uniform layout
/// (16 byte aligned rows) without explicit padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TraceParams {
    pub eye: [f32; 3],
    pub time: f32,
    pub ray00: [f32; 3],
    pub blend_factor: f32,
    pub ray01: [f32; 3],
    pub sample_count: u32,
    pub ray10: [f32; 3],
    pub bounce_count: u32,
    pub ray11: [f32; 3],
    pub frame_index: u32,
}

impl TraceParams {
    pub fn new(eye: Point3<f32>, rays: &CornerRays, time: f32, blend_factor: f32, sample_count: u32, bounce_count: u32, frame_index: u32) -> Self {
        Self {
            eye: eye.into(),
            time,
            ray00: rays.ray00.into(),
            blend_factor,
            ray01: rays.ray01.into(),
            sample_count,
            ray10: rays.ray10.into(),
            bounce_count,
            ray11: rays.ray11.into(),
            frame_index,
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        Point3::from(self.eye)
    }

    pub fn rays(&self) -> CornerRays {
        CornerRays {
            ray00: Vector3::from(self.ray00),
            ray01: Vector3::from(self.ray01),
            ray10: Vector3::from(self.ray10),
            ray11: Vector3::from(self.ray11),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_params_layout() {
        // WGSL: five rows of vec3<f32> + 4 byte scalar
        assert_eq!(std::mem::size_of::<TraceParams>(), 80);
        assert_eq!(std::mem::align_of::<TraceParams>(), 4);
    }

    #[test]
    fn test_trace_params_new() {
        let rays = CornerRays {
            ray00: Vector3::new(-1.0, -1.0, -1.0),
            ray01: Vector3::new(-1.0, 1.0, -1.0),
            ray10: Vector3::new(1.0, -1.0, -1.0),
            ray11: Vector3::new(1.0, 1.0, -1.0),
        };
        let params = TraceParams::new(Point3::new(0.0, 2.0, 3.0), &rays, 1.5, 0.5, 4, 2, 1);

        assert_eq!(params.eye, [0.0, 2.0, 3.0]);
        assert_eq!(params.ray01, [-1.0, 1.0, -1.0]);
        assert_eq!(params.ray10, [1.0, -1.0, -1.0]);
        assert_eq!(params.time, 1.5);
        assert_eq!(params.blend_factor, 0.5);
        assert_eq!(params.sample_count, 4);
        assert_eq!(params.bounce_count, 2);
        assert_eq!(params.rays(), rays);
        assert_eq!(params.eye(), Point3::new(0.0, 2.0, 3.0));

        let bytes: &[u8] = bytemuck::bytes_of(&params);
        assert_eq!(&bytes[12..16], &1.5f32.to_ne_bytes());
    }
}
