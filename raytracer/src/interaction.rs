use winit::keyboard::KeyCode;

use scene::{Config, BOUNCES_RANGE, SAMPLES_RANGE};

/// Discrete inputs the renderer reacts to, already stripped of windowing details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    SetSamples(u32),
    IncreaseBounces,
    DecreaseBounces,
    /// Horizontal cursor position in physical pixels
    CursorMoved(f32),
    DragStart,
    DragEnd,
    Resized { width: u32, height: u32 },
    CloseRequested,
}

impl InputEvent {
    /// Maps a released key to its command, if it has one.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let event = match code {
            KeyCode::Digit1 | KeyCode::Numpad1 => InputEvent::SetSamples(1),
            KeyCode::Digit2 | KeyCode::Numpad2 => InputEvent::SetSamples(2),
            KeyCode::Digit3 | KeyCode::Numpad3 => InputEvent::SetSamples(3),
            KeyCode::Digit4 | KeyCode::Numpad4 => InputEvent::SetSamples(4),
            KeyCode::Digit5 | KeyCode::Numpad5 => InputEvent::SetSamples(5),
            KeyCode::Digit6 | KeyCode::Numpad6 => InputEvent::SetSamples(6),
            KeyCode::Digit7 | KeyCode::Numpad7 => InputEvent::SetSamples(7),
            KeyCode::Digit8 | KeyCode::Numpad8 => InputEvent::SetSamples(8),
            KeyCode::Digit9 | KeyCode::Numpad9 => InputEvent::SetSamples(9),
            KeyCode::NumpadAdd | KeyCode::PageUp => InputEvent::IncreaseBounces,
            KeyCode::NumpadSubtract | KeyCode::PageDown => InputEvent::DecreaseBounces,
            KeyCode::Escape => InputEvent::CloseRequested,
            _ => return None,
        };
        Some(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { anchor_x: f32, live_x: f32 },
}

/// Mouse-drag orbit around the look-at target.
///
/// While a drag is active the azimuth is `base + (live_x - anchor_x) * sensitivity`;
/// releasing the button folds that delta into `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    base: f32,
    sensitivity: f32,
    cursor_x: f32,
    drag: DragState,
}

impl OrbitState {
    pub fn new(base: f32, sensitivity: f32) -> Self {
        Self {
            base,
            sensitivity,
            cursor_x: 0.0,
            drag: DragState::Idle,
        }
    }

    /// Starts a drag anchored at the last known cursor position.
    ///
    /// The azimuth doesn't move yet, so this never asks for a reset.
    pub fn press(&mut self) -> bool {
        if self.drag == DragState::Idle {
            self.drag = DragState::Dragging { anchor_x: self.cursor_x, live_x: self.cursor_x };
        }
        false
    }

    /// Tracks the cursor. Returns true when an active drag moved the view.
    pub fn move_cursor(&mut self, x: f32) -> bool {
        self.cursor_x = x;
        match &mut self.drag {
            DragState::Dragging { live_x, .. } if *live_x != x => {
                *live_x = x;
                true
            }
            _ => false,
        }
    }

    /// Ends the drag and commits its delta. The effective azimuth is unchanged.
    pub fn release(&mut self) -> bool {
        if let DragState::Dragging { .. } = self.drag {
            self.base += self.delta();
            self.drag = DragState::Idle;
        }
        false
    }

    pub fn delta(&self) -> f32 {
        match self.drag {
            DragState::Dragging { anchor_x, live_x } => (live_x - anchor_x) * self.sensitivity,
            DragState::Idle => 0.0,
        }
    }

    pub fn azimuth(&self) -> f32 {
        self.base + self.delta()
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }
}

/// Samples per frame and bounces per path, each kept inside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    samples: u32,
    bounces: u32,
}

impl RenderSettings {
    pub fn new(samples: u32, bounces: u32) -> Self {
        Self {
            samples: samples.clamp(*SAMPLES_RANGE.start(), *SAMPLES_RANGE.end()),
            bounces: bounces.clamp(*BOUNCES_RANGE.start(), *BOUNCES_RANGE.end()),
        }
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn set_samples(&mut self, samples: u32) -> bool {
        if !SAMPLES_RANGE.contains(&samples) {
            log::warn!("Ignoring samples per frame {}, valid range is {:?}", samples, SAMPLES_RANGE);
            return false;
        }
        if samples == self.samples {
            return false;
        }
        self.samples = samples;
        log::info!("Samples per frame: {}", samples);
        true
    }

    pub fn increase_bounces(&mut self) -> bool {
        self.set_bounces(self.bounces.saturating_add(1))
    }

    pub fn decrease_bounces(&mut self) -> bool {
        self.set_bounces(self.bounces.saturating_sub(1))
    }

    fn set_bounces(&mut self, bounces: u32) -> bool {
        let bounces = bounces.clamp(*BOUNCES_RANGE.start(), *BOUNCES_RANGE.end());
        if bounces == self.bounces {
            return false;
        }
        self.bounces = bounces;
        log::info!("Bounces: {}", bounces);
        true
    }
}

/// Current output size plus the size the accumulation images were last allocated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferSpec {
    width: u32,
    height: u32,
    allocated: (u32, u32),
}

impl FramebufferSpec {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self { width, height, allocated: (width, height) }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_dirty(&self) -> bool {
        self.size() != self.allocated
    }

    /// Applies a new size. Zero sizes (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        log::info!("Resized to {}x{}", width, height);
        true
    }

    /// Returns whether the size differs from the allocated one, then marks it allocated.
    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.is_dirty();
        self.allocated = self.size();
        dirty
    }
}

/// Everything one tick needs from the interaction state, frozen at the start of the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub azimuth: f32,
    pub samples_per_frame: u32,
    pub bounces: u32,
    pub width: u32,
    pub height: u32,
    /// New framebuffer size when it changed since the last tick
    pub resize: Option<(u32, u32)>,
    /// Accumulated samples are stale
    pub reset: bool,
    pub should_stop: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    orbit: OrbitState,
    settings: RenderSettings,
    framebuffer: FramebufferSpec,
    should_stop: bool,
}

impl InteractionState {
    pub fn new(config: &Config, width: u32, height: u32) -> Self {
        Self {
            orbit: OrbitState::new(config.camera.rotation, config.camera.drag_sensitivity),
            settings: RenderSettings::new(config.render.samples_per_frame, config.render.bounces),
            framebuffer: FramebufferSpec::new(width, height),
            should_stop: false,
        }
    }

    /// Routes one event. Returns whether it invalidates the accumulated image.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::SetSamples(samples) => self.settings.set_samples(samples),
            InputEvent::IncreaseBounces => self.settings.increase_bounces(),
            InputEvent::DecreaseBounces => self.settings.decrease_bounces(),
            InputEvent::CursorMoved(x) => self.orbit.move_cursor(x),
            InputEvent::DragStart => self.orbit.press(),
            InputEvent::DragEnd => self.orbit.release(),
            InputEvent::Resized { width, height } => self.framebuffer.resize(width, height),
            InputEvent::CloseRequested => {
                self.should_stop = true;
                false
            }
        }
    }

    /// Drains a tick's events and snapshots the result.
    ///
    /// Any number of invalidating events collapse into a single `reset`. Resizes only count
    /// when the tick ends at a size other than the allocated one.
    pub fn apply<I: IntoIterator<Item = InputEvent>>(&mut self, events: I) -> TickInput {
        // `|` instead of `||` so every event is applied
        let reset = events.into_iter().fold(false, |reset, event| match event {
            InputEvent::Resized { .. } => {
                self.handle(event);
                reset
            }
            _ => reset | self.handle(event),
        });
        let resize = self.framebuffer.take_dirty().then(|| self.framebuffer.size());
        let (width, height) = self.framebuffer.size();

        TickInput {
            azimuth: self.orbit.azimuth(),
            samples_per_frame: self.settings.samples(),
            bounces: self.settings.bounces(),
            width,
            height,
            resize,
            reset: reset || resize.is_some(),
            should_stop: self.should_stop,
        }
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn framebuffer(&self) -> &FramebufferSpec {
        &self.framebuffer
    }

    pub fn should_stop(&self) -> bool {
        self.should_stop
    }
}
