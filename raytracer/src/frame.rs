use instant::{Duration, Instant};

use scene::{Camera, Config, OrbitRig, Projection, TraceParams};

use crate::accumulation::Accumulator;
use crate::dispatch::{DispatchPlanner, WorkgroupGrid};
use crate::interaction::{InputEvent, InteractionState};

/// Where a frame ends up: reallocates the accumulation images and records the trace and
/// composite passes.
pub trait FrameTarget {
    type Error;

    /// Replaces the accumulation images with zeroed ones of the given size.
    fn reallocate(&mut self, width: u32, height: u32);

    /// Traces one frame with `params` over `grid`, then composites the result to the screen.
    ///
    /// The trace must be complete before the composite reads the image.
    fn render(&mut self, params: &TraceParams, grid: WorkgroupGrid) -> Result<(), Self::Error>;
}

/// The inputs of one frame, computed before any GPU work is recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    /// Set when the accumulation images must be reallocated first
    pub resize: Option<(u32, u32)>,
    pub params: TraceParams,
    pub grid: WorkgroupGrid,
}

/// Per-tick bookkeeping between the input events and the GPU.
pub struct FrameOrchestrator {
    interaction: InteractionState,
    accumulator: Accumulator,
    planner: DispatchPlanner,
    camera: Camera,
    projection: Projection,
    rig: OrbitRig,
    start: Option<Instant>,
}

impl FrameOrchestrator {
    pub fn new(config: &Config, width: u32, height: u32, workgroup_size: [u32; 3]) -> Self {
        let interaction = InteractionState::new(config, width, height);
        let (width, height) = interaction.framebuffer().size();

        let camera_config = &config.camera;
        let projection = Projection::new(width, height, cgmath::Deg(camera_config.fov), camera_config.near_far[0], camera_config.near_far[1]);
        let rig = OrbitRig {
            target: camera_config.look_at.into(),
            up: camera_config.up.into(),
            radius: camera_config.orbit_radius,
            height: camera_config.orbit_height,
        };
        let mut camera = Camera::new();
        projection.apply(&mut camera);
        rig.aim(&mut camera, interaction.orbit().azimuth());

        Self {
            interaction,
            accumulator: Accumulator::new(),
            planner: DispatchPlanner::new(workgroup_size, config.render.dispatch_rounding),
            camera,
            projection,
            rig,
            start: None,
        }
    }

    /// Applies the tick's events and derives everything the frame needs.
    ///
    /// `now` is measured against the first call, so the kernel sees time since the first frame.
    pub fn prepare<I: IntoIterator<Item = InputEvent>>(&mut self, events: I, now: Instant) -> FramePlan {
        let input = self.interaction.apply(events);

        if let Some((width, height)) = input.resize {
            self.projection.resize(width, height);
            self.projection.apply(&mut self.camera);
        }
        if input.reset {
            self.accumulator.reset();
        }

        let start = *self.start.get_or_insert(now);
        let time = now.checked_duration_since(start).unwrap_or(Duration::ZERO).as_secs_f32();

        self.rig.aim(&mut self.camera, input.azimuth);
        let params = TraceParams::new(
            self.camera.position(),
            &self.camera.corner_rays(),
            time,
            self.accumulator.blend_weight(),
            input.samples_per_frame,
            input.bounces,
            self.accumulator.frame_index(),
        );

        FramePlan {
            resize: input.resize,
            params,
            grid: self.planner.plan(input.width, input.height),
        }
    }

    /// Runs one tick against `target`.
    ///
    /// Nothing is rendered once a close was requested. The frame counter only advances
    /// when the frame was actually rendered.
    pub fn tick<I, T>(&mut self, events: I, now: Instant, target: &mut T) -> Result<(), T::Error>
    where
        I: IntoIterator<Item = InputEvent>,
        T: FrameTarget,
    {
        let plan = self.prepare(events, now);
        if self.should_stop() {
            return Ok(());
        }

        if let Some((width, height)) = plan.resize {
            target.reallocate(width, height);
        }
        target.render(&plan.params, plan.grid)?;
        self.accumulator.advance();
        Ok(())
    }

    pub fn should_stop(&self) -> bool {
        self.interaction.should_stop()
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
