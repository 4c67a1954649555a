use std::any::Any;
use std::sync::Arc;

use engine::{Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Rgba, Surface};
use tracing::warn;

const LOCKED_COLOR: Rgba = [235, 200, 80, 255];
const DRAFT_COLOR: Rgba = [150, 170, 200, 255];
const EMPTY_COLOR: Rgba = [90, 100, 115, 255];

/// One letter position of the secret word: an underscore while empty, a
/// draft letter during word entry, and a locked letter once confirmed.
pub struct GlyphSlot {
    base: EntityBase,
    compositor: Arc<Compositor>,
    entry: Option<char>,
    locked: bool,
    scale: f32,
    image: Option<RasterImage>,
}

impl GlyphSlot {
    pub fn new(compositor: Arc<Compositor>, location: Point, priority: i8, scale: f32) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            entry: None,
            locked: false,
            scale,
            image: None,
        }
    }

    /// Shows a draft letter (or clears the slot). Locked slots keep their
    /// confirmed letter.
    pub fn set_entry(&mut self, entry: Option<char>) {
        if self.locked || self.entry == entry {
            return;
        }
        self.entry = entry;
        self.recompose();
    }

    /// Confirms a letter permanently.
    pub fn lock(&mut self, letter: char) {
        if self.locked && self.entry == Some(letter) {
            return;
        }
        self.entry = Some(letter);
        self.locked = true;
        self.recompose();
    }

    fn recompose(&mut self) {
        let (text, color) = match self.entry {
            Some(letter) if self.locked => (letter.to_string(), LOCKED_COLOR),
            Some(letter) => (letter.to_string(), DRAFT_COLOR),
            None => ("_".to_string(), EMPTY_COLOR),
        };
        let request = Composition::text(text)
            .scale(self.scale)
            .color(color)
            .remove_background();
        match self.compositor.compose(request) {
            Ok(image) => self.image = Some(image),
            Err(error) => {
                warn!(%error, "slot_compose_failed");
                self.image = None;
            }
        }
    }
}

impl Renderable for GlyphSlot {
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
