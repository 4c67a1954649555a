use std::any::Any;
use std::sync::Arc;

use engine::{Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Signal, Surface};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

const FLICKER_PERIOD_TICKS: u64 = 8;
const INTENSITY_FLOOR: f32 = 0.55;
const INTENSITY_APPROACH: f32 = 0.3;
const GLOW_SIZE: u32 = 9;

/// A warm ambient glow whose brightness wanders randomly, retargeted every
/// few ticks and eased toward the target in between. Purely decorative.
pub struct LightFixture {
    base: EntityBase,
    compositor: Arc<Compositor>,
    rng: SmallRng,
    glow: RasterImage,
    intensity: f32,
    target: f32,
    scale: f32,
    image: Option<RasterImage>,
}

impl LightFixture {
    pub fn new(
        compositor: Arc<Compositor>,
        location: Point,
        priority: i8,
        scale: f32,
        seed: u64,
    ) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            rng: SmallRng::seed_from_u64(seed),
            glow: glow_bitmap(),
            intensity: 1.0,
            target: 1.0,
            scale,
            image: None,
        }
    }

    fn warm_color(&self) -> [u8; 4] {
        let level = |channel: f32| (channel * self.intensity).round().clamp(0.0, 255.0) as u8;
        [level(255.0), level(232.0), level(170.0), 255]
    }

    fn recompose(&mut self) {
        let request = Composition::image(self.glow.clone())
            .scale(self.scale)
            .color(self.warm_color());
        match self.compositor.compose(request) {
            Ok(image) => self.image = Some(image),
            Err(error) => {
                warn!(%error, "light_compose_failed");
                self.image = None;
            }
        }
    }
}

/// Concentric swatch-gray rings on a transparent field; the color remap
/// turns the shading steps into the warm glow gradient.
fn glow_bitmap() -> RasterImage {
    let mut image = RasterImage::new(GLOW_SIZE, GLOW_SIZE);
    let center = GLOW_SIZE as i32 / 2;
    for y in 0..GLOW_SIZE {
        for x in 0..GLOW_SIZE {
            let distance = (x as i32 - center).abs().max((y as i32 - center).abs());
            let value = match distance {
                0 => 255,
                1 => 192,
                2 => 128,
                3 => 64,
                _ => continue,
            };
            image.put_pixel(x, y, [value, value, value, 255]);
        }
    }
    image
}

impl Renderable for LightFixture {
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

    fn tick(&mut self, frame_index: u64) -> Option<Signal> {
        if frame_index % FLICKER_PERIOD_TICKS == 0 {
            self.target = self.rng.gen_range(INTENSITY_FLOOR..=1.0);
        }
        let next = self.intensity + (self.target - self.intensity) * INTENSITY_APPROACH;
        if (next - self.intensity).abs() > f32::EPSILON {
            self.intensity = next;
            self.recompose();
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
    use engine::{embedded_glyph_set, Compositor};

    use super::*;

    #[test]
    fn flicker_stays_inside_the_intensity_band() {
        let compositor = Arc::new(Compositor::new(embedded_glyph_set(), 1.0));
        let mut light = LightFixture::new(compositor, Point::default(), 0, 1.0, 7);
        light.spawn().expect("spawn");
        for frame in 0..100 {
            let _ = light.tick(frame);
            assert!(light.intensity >= INTENSITY_FLOOR - 0.2);
            assert!(light.intensity <= 1.0 + f32::EPSILON);
        }
    }

    #[test]
    fn glow_bitmap_is_authored_in_swatch_values() {
        let glow = glow_bitmap();
        let center = GLOW_SIZE / 2;
        assert_eq!(glow.pixel(center, center), Some([255, 255, 255, 255]));
        assert_eq!(glow.pixel(center + 1, center), Some([192, 192, 192, 255]));
        assert_eq!(glow.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
