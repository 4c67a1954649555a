use std::any::Any;
use std::sync::Arc;

use engine::{
    stitch, Composition, Compositor, EntityBase, Point, RasterImage, Renderable, Rgba, Surface,
};
use tracing::warn;

const ICON_COLOR: Rgba = [170, 190, 210, 255];
const ICON_GAP_PX: u32 = 6;

/// The per-state affordance strip: each label is composed on its own and the
/// chips are stitched into a single row image.
pub struct IconRow {
    base: EntityBase,
    compositor: Arc<Compositor>,
    labels: Vec<String>,
    scale: f32,
    image: Option<RasterImage>,
}

impl IconRow {
    pub fn new(compositor: Arc<Compositor>, location: Point, priority: i8, scale: f32) -> Self {
        Self {
            base: EntityBase::new(location, priority),
            compositor,
            labels: Vec::new(),
            scale,
            image: None,
        }
    }

    pub fn set_labels(&mut self, labels: &[&str]) {
        let labels: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
        if labels == self.labels {
            return;
        }
        self.labels = labels;
        self.recompose();
    }

    fn recompose(&mut self) {
        let mut row = RasterImage::new(0, 0);
        let gap = RasterImage::new(ICON_GAP_PX, 1);
        for (index, label) in self.labels.iter().enumerate() {
            let request = Composition::text(format!("({label})"))
                .scale(self.scale)
                .color(ICON_COLOR)
                .remove_background();
            let chip = match self.compositor.compose(request) {
                Ok(chip) => chip,
                Err(error) => {
                    warn!(%error, label = %label, "icon_compose_failed");
                    continue;
                }
            };
            if index > 0 {
                row = stitch(&row, &gap);
            }
            row = stitch(&row, &chip);
        }
        self.image = if row.is_empty() { None } else { Some(row) };
    }
}

impl Renderable for IconRow {
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
