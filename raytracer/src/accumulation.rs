/// Largest frame index whose blend weight is still below 1 in f32.
pub const MAX_FRAME_INDEX: u32 = (1 << 24) - 1;

/// Running mean over the frames traced since the last reset.
///
/// Frame `n` is blended as `mix(new, previous, n / (n + 1))`, so after `n + 1` frames every
/// frame contributed with the same weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    frame_index: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the accumulated history.
    pub fn reset(&mut self) {
        if self.frame_index != 0 {
            log::debug!("Accumulation reset after {} frames", self.frame_index);
        }
        self.frame_index = 0;
    }

    /// Weight of the previous image for the frame about to be traced. Read before `advance`.
    pub fn blend_weight(&self) -> f32 {
        let n = self.frame_index as f32;
        n / (n + 1.0)
    }

    /// Marks the current frame as done.
    pub fn advance(&mut self) {
        self.frame_index = (self.frame_index + 1).min(MAX_FRAME_INDEX);
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_weight_sequence() {
        let mut accumulator = Accumulator::new();
        assert_eq!(accumulator.blend_weight(), 0.0);
        accumulator.advance();
        assert_eq!(accumulator.blend_weight(), 0.5);
        for _ in 1..9 {
            accumulator.advance();
        }
        assert_eq!(accumulator.frame_index(), 9);
        assert!((accumulator.blend_weight() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_blend_weight_formula() {
        let mut accumulator = Accumulator::new();
        for n in 0..1000u32 {
            let expected = n as f32 / (n as f32 + 1.0);
            assert_eq!(accumulator.blend_weight(), expected);
            assert!(accumulator.blend_weight() < 1.0);
            accumulator.advance();
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut accumulator = Accumulator::new();
        for _ in 0..5 {
            accumulator.advance();
        }
        accumulator.reset();
        let once = accumulator;
        accumulator.reset();
        assert_eq!(accumulator, once);
        assert_eq!(accumulator.frame_index(), 0);
        assert_eq!(accumulator.blend_weight(), 0.0);
    }

    #[test]
    fn test_frame_index_saturates() {
        let mut accumulator = Accumulator { frame_index: MAX_FRAME_INDEX - 1 };
        accumulator.advance();
        accumulator.advance();
        assert_eq!(accumulator.frame_index(), MAX_FRAME_INDEX);
        assert!(accumulator.blend_weight() < 1.0);
    }
}
