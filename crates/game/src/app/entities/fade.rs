use std::any::Any;

use engine::{render_priority, EntityBase, Point, Renderable, Signal, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Black to clear. The overlay disposes itself once finished.
    In,
    /// Clear to black. The overlay stays opaque until the scene swaps.
    Out,
}

/// Full-screen fade. Emits its completion signal exactly once; the scene
/// advances its state machine off that signal rather than polling.
pub struct FadeOverlay {
    base: EntityBase,
    direction: FadeDirection,
    duration_ticks: u32,
    elapsed: u32,
    signal: Signal,
    signalled: bool,
}

impl FadeOverlay {
    pub fn new(direction: FadeDirection, duration_ticks: u32, signal: Signal) -> Self {
        Self {
            base: EntityBase::new(Point::default(), render_priority::MAX),
            direction,
            duration_ticks: duration_ticks.max(1),
            elapsed: 0,
            signal,
            signalled: false,
        }
    }

    fn alpha(&self) -> u8 {
        let progress = self.elapsed as f32 / self.duration_ticks as f32;
        let opacity = match self.direction {
            FadeDirection::In => 1.0 - progress,
            FadeDirection::Out => progress,
        };
        (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl Renderable for FadeOverlay {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn tick(&mut self, _frame_index: u64) -> Option<Signal> {
        if self.signalled {
            return None;
        }
        self.elapsed = (self.elapsed + 1).min(self.duration_ticks);
        if self.elapsed < self.duration_ticks {
            return None;
        }
        self.signalled = true;
        if self.direction == FadeDirection::In {
            self.dispose();
        }
        Some(self.signal)
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        let alpha = self.alpha();
        if alpha > 0 {
            surface.fill_blended([0, 0, 0, alpha]);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_signals_once_and_self_disposes() {
        let mut fade = FadeOverlay::new(FadeDirection::In, 3, Signal(9));
        fade.spawn().expect("spawn");
        assert_eq!(fade.tick(0), None);
        assert_eq!(fade.tick(1), None);
        assert_eq!(fade.tick(2), Some(Signal(9)));
        assert!(fade.should_remove());
        assert_eq!(fade.tick(3), None);
    }

    #[test]
    fn fade_out_ends_opaque_and_stays() {
        let mut fade = FadeOverlay::new(FadeDirection::Out, 2, Signal(4));
        fade.spawn().expect("spawn");
        let _ = fade.tick(0);
        let _ = fade.tick(1);
        assert!(fade.signalled);
        assert!(!fade.should_remove());
        assert_eq!(fade.alpha(), 255);
    }

    #[test]
    fn fade_in_starts_fully_black() {
        let fade = FadeOverlay::new(FadeDirection::In, 10, Signal(1));
        assert_eq!(fade.alpha(), 255);
    }
}
