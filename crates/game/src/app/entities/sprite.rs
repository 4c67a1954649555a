use std::any::Any;
use std::sync::Arc;

use engine::{Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Signal, Surface};
use tracing::warn;

/// A looping frame animation. Owns its own frame counter and advances it in
/// `tick`; the scene never drives animation state.
pub struct AnimatedSprite {
    base: EntityBase,
    compositor: Arc<Compositor>,
    frames: Vec<RasterImage>,
    composed: Vec<RasterImage>,
    ticks_per_frame: u32,
    counter: u32,
    current: usize,
    scale: f32,
}

impl AnimatedSprite {
    pub fn new(
        compositor: Arc<Compositor>,
        location: Point,
        priority: i8,
        frames: Vec<RasterImage>,
        ticks_per_frame: u32,
        scale: f32,
    ) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            frames,
            composed: Vec::new(),
            ticks_per_frame: ticks_per_frame.max(1),
            counter: 0,
            current: 0,
            scale,
        }
    }

}

impl Renderable for AnimatedSprite {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn on_spawn(&mut self) {
        self.composed.clear();
        for frame in &self.frames {
            let request = Composition::image(frame.clone())
                .scale(self.scale)
                .remove_background();
            match self.compositor.compose(request) {
                Ok(image) => self.composed.push(image),
                Err(error) => {
                    warn!(%error, "sprite_compose_failed");
                }
            }
        }
    }

    fn on_remove(&mut self) {
        self.composed.clear();
    }

    fn tick(&mut self, _frame_index: u64) -> Option<Signal> {
        if self.composed.len() < 2 {
            return None;
        }
        self.counter += 1;
        if self.counter >= self.ticks_per_frame {
            self.counter = 0;
            self.current = (self.current + 1) % self.composed.len();
        }
        None
    }

    fn draw(&self, surface: &mut Surface<'_>) {
        if let Some(image) = self.composed.get(self.current) {
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
    use engine::{embedded_glyph_set, Compositor};

    use super::*;

    fn two_frame_sprite(ticks_per_frame: u32) -> AnimatedSprite {
        let compositor = Arc::new(Compositor::new(embedded_glyph_set(), 1.0));
        let frames = vec![
            RasterImage::filled(2, 2, [255, 255, 255, 255]),
            RasterImage::filled(2, 2, [128, 128, 128, 255]),
        ];
        AnimatedSprite::new(compositor, Point::default(), 0, frames, ticks_per_frame, 1.0)
    }

    #[test]
    fn frames_advance_on_the_configured_cadence() {
        let mut sprite = two_frame_sprite(3);
        sprite.spawn().expect("spawn");
        assert_eq!(sprite.current, 0);
        for frame in 0..2 {
            let _ = sprite.tick(frame);
        }
        assert_eq!(sprite.current, 0);
        let _ = sprite.tick(2);
        assert_eq!(sprite.current, 1);
        for frame in 3..6 {
            let _ = sprite.tick(frame);
        }
        assert_eq!(sprite.current, 0);
    }

    #[test]
    fn single_frame_sprite_never_advances() {
        let compositor = Arc::new(Compositor::new(embedded_glyph_set(), 1.0));
        let frames = vec![RasterImage::filled(1, 1, [255, 255, 255, 255])];
        let mut sprite = AnimatedSprite::new(compositor, Point::default(), 0, frames, 1, 1.0);
        sprite.spawn().expect("spawn");
        for frame in 0..5 {
            let _ = sprite.tick(frame);
        }
        assert_eq!(sprite.current, 0);
    }
}
