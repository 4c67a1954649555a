use std::any::Any;
use std::sync::Arc;

use engine::{Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Rgba, Surface};
use tracing::warn;

/// A line of composed text. The texture is regenerated on every text or
/// color change, never shared.
pub struct TextBox {
    base: EntityBase,
    compositor: Arc<Compositor>,
    text: String,
    scale: f32,
    color: Rgba,
    image: Option<RasterImage>,
}

impl TextBox {
    pub fn new(
        compositor: Arc<Compositor>,
        location: Point,
        priority: i8,
        scale: f32,
        color: Rgba,
    ) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            text: String::new(),
            scale,
            color,
            image: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.recompose();
    }

    pub fn set_color(&mut self, color: Rgba) {
        if color == self.color {
            return;
        }
        self.color = color;
        self.recompose();
    }

    fn recompose(&mut self) {
        let request = Composition::text(self.text.clone())
            .scale(self.scale)
            .color(self.color)
            .remove_background();
        match self.compositor.compose(request) {
            Ok(image) => self.image = Some(image),
            Err(error) => {
                warn!(%error, text = %self.text, "text_compose_failed");
                self.image = None;
            }
        }
    }
}

impl Renderable for TextBox {
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
