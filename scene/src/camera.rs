use cgmath::*;

/// Below this length a direction is treated as degenerate.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// The four world-space frustum corner directions handed to the trace kernel.
///
/// Naming follows the normalized device coordinates of each corner:
/// `ray01` is `(x = -1, y = 1)`, i.e. the top left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerRays {
    pub ray00: Vector3<f32>,
    pub ray01: Vector3<f32>,
    pub ray10: Vector3<f32>,
    pub ray11: Vector3<f32>,
}

impl CornerRays {
    pub fn as_array(&self) -> [Vector3<f32>; 4] {
        [self.ray00, self.ray01, self.ray10, self.ray11]
    }
}

/// Represents a pinhole camera in 3D space.
///
/// The camera keeps an orthonormal `forward`/`right`/`up` basis and the half extents
/// of the image plane at unit distance. Rays are generated by offsetting `forward`
/// along `right` and `up` by those extents.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    half_width: f32,
    half_height: f32,
    znear: f32,
    zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Point3::origin(),
            forward: -Vector3::unit_z(),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            half_width: 1.0,
            half_height: 1.0,
            znear: 1.0,
            zfar: 2.0,
        };
        camera.set_frustum_perspective(Deg(60.0), 1.0, 1.0, 2.0);
        camera
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the camera at `eye` looking at `target`.
    ///
    /// Degenerate input never produces NaNs: if `eye == target` the previous view
    /// direction is replaced by `-Z`, and if `up` is parallel to the view direction a
    /// fallback axis is used to build the basis.
    pub fn set_look_at(&mut self, eye: Point3<f32>, target: Point3<f32>, up: Vector3<f32>) {
        let view = target - eye;
        let forward = if view.magnitude() < DEGENERATE_EPSILON {
            log::warn!("Camera eye {:?} coincides with its target, looking down -Z", eye);
            -Vector3::unit_z()
        } else {
            view.normalize()
        };

        let mut right = forward.cross(up);
        if right.magnitude() < DEGENERATE_EPSILON {
            let fallback = if forward.y.abs() < 0.9 { Vector3::unit_y() } else { Vector3::unit_z() };
            log::warn!("Camera up {:?} is parallel to the view direction, using {:?}", up, fallback);
            right = forward.cross(fallback);
        }
        let right = right.normalize();

        self.position = eye;
        self.forward = forward;
        self.right = right;
        self.up = right.cross(forward).normalize();
    }

    /// Sets the image plane extents from a vertical field of view and an aspect ratio.
    ///
    /// `znear`/`zfar` are only stored; ray generation needs directions, not depth.
    pub fn set_frustum_perspective(&mut self, fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32) {
        if !(aspect.is_finite() && aspect > 0.0) {
            log::warn!("Ignoring invalid aspect ratio {}", aspect);
            return;
        }
        self.half_height = (Rad::from(fovy).0 * 0.5).tan();
        self.half_width = self.half_height * aspect;
        self.znear = znear;
        self.zfar = zfar;
    }

    /// Returns the normalized world-space direction through `(ndc_x, ndc_y)`, both in `[-1, 1]`.
    pub fn eye_ray(&self, ndc_x: f32, ndc_y: f32) -> Vector3<f32> {
        (self.forward + self.right * (self.half_width * ndc_x) + self.up * (self.half_height * ndc_y)).normalize()
    }

    pub fn corner_rays(&self) -> CornerRays {
        CornerRays {
            ray00: self.eye_ray(-1.0, -1.0),
            ray01: self.eye_ray(-1.0, 1.0),
            ray10: self.eye_ray(1.0, -1.0),
            ray11: self.eye_ray(1.0, 1.0),
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    pub fn near_far(&self) -> [f32; 2] {
        [self.znear, self.zfar]
    }
}

/// Represents the projection of the scene onto the framebuffer.
///
/// The projection is defined by an aspect ratio, a vertical field of view, and near and far clipping planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    pub fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.set_frustum_perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }
}

/// Places the camera on a horizontal circle around the origin, looking at a fixed target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRig {
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub radius: f32,
    pub height: f32,
}

impl OrbitRig {
    /// Eye position for a rotation of `azimuth` radians about the Y axis.
    pub fn eye(&self, azimuth: f32) -> Point3<f32> {
        let (sin, cos) = (-azimuth).sin_cos();
        Point3::new(sin * self.radius, self.height, cos * self.radius)
    }

    pub fn aim(&self, camera: &mut Camera, azimuth: f32) {
        camera.set_look_at(self.eye(azimuth), self.target, self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_orthonormal(camera: &Camera) {
        let (f, r, u) = (camera.forward(), camera.right(), camera.up());
        assert!(f.dot(r).abs() < EPSILON, "forward.right = {}", f.dot(r));
        assert!(f.dot(u).abs() < EPSILON, "forward.up = {}", f.dot(u));
        assert!(r.dot(u).abs() < EPSILON, "right.up = {}", r.dot(u));
        for v in [f, r, u] {
            assert!((v.magnitude() - 1.0).abs() < EPSILON, "length {}", v.magnitude());
            assert!(v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
        }
    }

    #[test]
    fn test_look_at_basis_is_orthonormal() {
        let mut camera = Camera::new();
        let rig = OrbitRig {
            target: Point3::new(0.0, 0.5, 0.0),
            up: Vector3::unit_y(),
            radius: 3.0,
            height: 2.0,
        };
        for step in 0..64 {
            rig.aim(&mut camera, step as f32 * 0.37 - 5.0);
            assert_orthonormal(&camera);
        }

        camera.set_look_at(Point3::new(1.0, -2.0, 3.0), Point3::new(-4.0, 0.5, 2.0), Vector3::new(0.3, 1.0, -0.2));
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_look_at_forward_points_at_target() {
        let mut camera = Camera::new();
        camera.set_look_at(Point3::new(0.0, 0.0, 5.0), Point3::origin(), Vector3::unit_y());
        assert!((camera.forward() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPSILON);
        assert!((camera.right() - Vector3::unit_x()).magnitude() < EPSILON);
        assert!((camera.up() - Vector3::unit_y()).magnitude() < EPSILON);
        assert_eq!(camera.position(), Point3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_look_at_eye_equals_target() {
        let mut camera = Camera::new();
        let point = Point3::new(1.0, 2.0, 3.0);
        camera.set_look_at(point, point, Vector3::unit_y());
        assert_orthonormal(&camera);
        assert!((camera.forward() + Vector3::unit_z()).magnitude() < EPSILON);
    }

    #[test]
    fn test_look_at_up_parallel_to_forward() {
        let mut camera = Camera::new();
        camera.set_look_at(Point3::new(0.0, 5.0, 0.0), Point3::origin(), Vector3::unit_y());
        assert_orthonormal(&camera);

        camera.set_look_at(Point3::origin(), Point3::new(3.0, 0.0, 0.0), Vector3::new(-2.0, 0.0, 0.0));
        assert_orthonormal(&camera);

        camera.set_look_at(Point3::origin(), Point3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 0.0));
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_frustum_perspective_extents() {
        let mut camera = Camera::new();
        let aspect = 1024.0 / 768.0;
        camera.set_frustum_perspective(Deg(60.0), aspect, 1.0, 2.0);
        let expected = (30.0f32).to_radians().tan();
        assert!((camera.half_height() - expected).abs() < EPSILON);
        assert!((camera.half_width() - expected * aspect).abs() < EPSILON);
        assert_eq!(camera.near_far(), [1.0, 2.0]);
    }

    #[test]
    fn test_frustum_perspective_rejects_invalid_aspect() {
        let mut camera = Camera::new();
        camera.set_frustum_perspective(Deg(90.0), 2.0, 1.0, 2.0);
        let (width, height) = (camera.half_width(), camera.half_height());
        camera.set_frustum_perspective(Deg(60.0), 0.0, 1.0, 2.0);
        camera.set_frustum_perspective(Deg(60.0), f32::NAN, 1.0, 2.0);
        assert_eq!((camera.half_width(), camera.half_height()), (width, height));
    }

    #[test]
    fn test_eye_ray_center_is_forward() {
        let mut camera = Camera::new();
        camera.set_look_at(Point3::new(2.0, 1.0, 2.0), Point3::origin(), Vector3::unit_y());
        assert!((camera.eye_ray(0.0, 0.0) - camera.forward()).magnitude() < EPSILON);
    }

    #[test]
    fn test_corner_rays_within_frustum() {
        let mut camera = Camera::new();
        camera.set_frustum_perspective(Deg(60.0), 1024.0 / 768.0, 1.0, 2.0);
        OrbitRig {
            target: Point3::new(0.0, 0.5, 0.0),
            up: Vector3::unit_y(),
            radius: 3.0,
            height: 2.0,
        }
        .aim(&mut camera, 0.8);

        let (hw, hh) = (camera.half_width(), camera.half_height());
        let length = (1.0 + hw * hw + hh * hh).sqrt();
        let rays = camera.corner_rays();
        let corners = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)];

        for (ray, (x, y)) in rays.as_array().iter().zip(corners) {
            assert!((ray.magnitude() - 1.0).abs() < EPSILON);
            assert!((ray.dot(camera.forward()) - 1.0 / length).abs() < EPSILON);
            assert!((ray.dot(camera.right()) - x * hw / length).abs() < EPSILON);
            assert!((ray.dot(camera.up()) - y * hh / length).abs() < EPSILON);
        }

        let all = rays.as_array();
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert!((all[i] - all[j]).magnitude() > 0.1, "rays {} and {} coincide", i, j);
            }
        }
    }

    #[test]
    fn test_orbit_rig_eye() {
        let rig = OrbitRig {
            target: Point3::new(0.0, 0.5, 0.0),
            up: Vector3::unit_y(),
            radius: 3.0,
            height: 2.0,
        };
        let eye = rig.eye(0.0);
        assert!((eye - Point3::new(0.0, 2.0, 3.0)).magnitude() < EPSILON);
        let eye = rig.eye(std::f32::consts::FRAC_PI_2);
        assert!((eye - Point3::new(-3.0, 2.0, 0.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_projection_resize() {
        let mut projection = Projection::new(800, 600, Deg(60.0), 1.0, 2.0);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < EPSILON);
        projection.resize(1920, 1080);
        assert!((projection.aspect() - 1920.0 / 1080.0).abs() < EPSILON);

        let mut camera = Camera::new();
        projection.apply(&mut camera);
        assert!((camera.half_width() / camera.half_height() - 1920.0 / 1080.0).abs() < EPSILON);
    }
}
