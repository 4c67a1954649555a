use std::any::Any;
use std::sync::Arc;

use engine::{
    lerp_color, Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Rgba, Signal,
    Surface,
};
use tracing::warn;

const TIMER_START_COLOR: Rgba = [90, 220, 110, 255];
const TIMER_END_COLOR: Rgba = [230, 70, 60, 255];

/// Per-turn countdown readout. The digits shift from green to red as the
/// budget drains; hitting zero emits the expiry signal once per run.
pub struct CountdownTimer {
    base: EntityBase,
    compositor: Arc<Compositor>,
    total_ticks: u32,
    remaining_ticks: u32,
    ticks_per_second: u32,
    scale: f32,
    signal: Signal,
    signalled: bool,
    image: Option<RasterImage>,
}

impl CountdownTimer {
    pub fn new(
        compositor: Arc<Compositor>,
        location: Point,
        priority: i8,
        seconds: u32,
        ticks_per_second: u32,
        scale: f32,
        signal: Signal,
    ) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        let total_ticks = seconds.max(1) * ticks_per_second;
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            total_ticks,
            remaining_ticks: total_ticks,
            ticks_per_second,
            scale,
            signal,
            signalled: false,
            image: None,
        }
    }

    pub fn restart(&mut self) {
        self.remaining_ticks = self.total_ticks;
        self.signalled = false;
        self.recompose();
    }

    pub fn seconds_left(&self) -> u32 {
        self.remaining_ticks.div_ceil(self.ticks_per_second)
    }

    fn current_color(&self) -> Rgba {
        let drained = 1.0 - self.remaining_ticks as f32 / self.total_ticks as f32;
        lerp_color(TIMER_START_COLOR, TIMER_END_COLOR, drained)
    }

    fn recompose(&mut self) {
        let text = format!("{:02}", self.seconds_left());
        let request = Composition::text(text)
            .scale(self.scale)
            .color(self.current_color())
            .remove_background();
        match self.compositor.compose(request) {
            Ok(image) => self.image = Some(image),
            Err(error) => {
                warn!(%error, "timer_compose_failed");
                self.image = None;
            }
        }
    }
}

impl Renderable for CountdownTimer {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn on_spawn(&mut self) {
        self.recompose();
    }

    fn on_remove(&mut self) {
        self.image = None;
    }

    fn tick(&mut self, _frame_index: u64) -> Option<Signal> {
        if self.signalled {
            return None;
        }
        let before = self.seconds_left();
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.seconds_left() != before {
            self.recompose();
        }
        if self.remaining_ticks == 0 {
            self.signalled = true;
            return Some(self.signal);
        }
        None
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        if let Some(image) = &self.image {
            let location = self.base.location();
            surface.blit(image, location.x, location.y);
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
    use std::sync::Arc;

    use engine::{embedded_glyph_set, Compositor};

    use super::*;

    fn timer(seconds: u32, ticks_per_second: u32) -> CountdownTimer {
        let compositor = Arc::new(Compositor::new(embedded_glyph_set(), 1.0));
        CountdownTimer::new(
            compositor,
            Point::default(),
            0,
            seconds,
            ticks_per_second,
            1.0,
            Signal(3),
        )
    }

    #[test]
    fn expiry_signal_fires_exactly_once() {
        let mut timer = timer(1, 3);
        timer.spawn().expect("spawn");
        assert_eq!(timer.tick(0), None);
        assert_eq!(timer.tick(1), None);
        assert_eq!(timer.tick(2), Some(Signal(3)));
        assert_eq!(timer.tick(3), None);
    }

    #[test]
    fn restart_rearms_the_signal() {
        let mut timer = timer(1, 2);
        timer.spawn().expect("spawn");
        let _ = timer.tick(0);
        assert_eq!(timer.tick(1), Some(Signal(3)));
        timer.restart();
        assert_eq!(timer.seconds_left(), 1);
        let _ = timer.tick(2);
        assert_eq!(timer.tick(3), Some(Signal(3)));
    }

    #[test]
    fn color_moves_from_green_to_red() {
        let mut timer = timer(2, 2);
        timer.spawn().expect("spawn");
        assert_eq!(timer.current_color(), TIMER_START_COLOR);
        for index in 0..4 {
            let _ = timer.tick(index);
        }
        assert_eq!(timer.current_color(), TIMER_END_COLOR);
    }
}
