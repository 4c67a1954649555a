mod fade;
mod icon_row;
mod image;
mod light;
mod slot;
mod sprite;
mod text_box;
mod timer;

pub use fade::{FadeDirection, FadeOverlay};
pub use icon_row::IconRow;
pub use image::StaticImage;
pub use light::LightFixture;
pub use slot::GlyphSlot;
pub use sprite::AnimatedSprite;
pub use text_box::TextBox;
pub use timer::CountdownTimer;
