use std::any::Any;
use std::sync::Arc;

use engine::{Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Rgba, Surface};
use tracing::warn;

/// A fixed piece of image art, run once through the compositor so it picks
/// up the display scalar and optional recolor/keying like everything else.
pub struct StaticImage {
    base: EntityBase,
    compositor: Arc<Compositor>,
    source: RasterImage,
    scale: f32,
    color: Option<Rgba>,
    keyed: bool,
    image: Option<RasterImage>,
}

impl StaticImage {
    pub fn new(
        compositor: Arc<Compositor>,
        location: Point,
        priority: i8,
        source: RasterImage,
        scale: f32,
    ) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            source,
            scale,
            color: None,
            keyed: false,
            image: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_background_removed(mut self) -> Self {
        self.keyed = true;
        self
    }

    fn recompose(&mut self) {
        let mut request = Composition::image(self.source.clone()).scale(self.scale);
        if self.keyed {
            request = request.remove_background();
        }
        if let Some(color) = self.color {
            request = request.color(color);
        }
        match self.compositor.compose(request) {
            Ok(image) => self.image = Some(image),
            Err(error) => {
                warn!(%error, "image_compose_failed");
                self.image = None;
            }
        }
    }
}

impl Renderable for StaticImage {
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
