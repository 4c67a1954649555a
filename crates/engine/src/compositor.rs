//! Texture compositing: every piece of on-screen text and glyph imagery is
//! synthesized at runtime from a bitmap glyph dictionary, then run through a
//! fixed pipeline of scale resolution, background keying, swatch recoloring
//! and nearest-neighbour upscaling.
//!
//! The pipeline order is load-bearing: the color remap matches byte-exact
//! swatch values, so it must run before any resampling touches the pixels.

use std::collections::HashMap;

use thiserror::Error;

use crate::raster::{RasterImage, Rgba, TRANSPARENT};

/// Sentinel background color keyed out by `remove_background`.
pub const BACKGROUND_KEY: Rgba = [0, 0, 0, 255];

/// The grayscale values glyph art is authored in. For a gray pixel the
/// 0.2126/0.7152/0.0722 relative luminance is exactly the channel value,
/// so these double as the luminance steps of the palette.
pub const SWATCH_VALUES: [u8; 4] = [64, 128, 192, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("no glyph mapped for character {0:?}")]
    InvalidCharacter(char),
}

/// Character to glyph-bitmap dictionary.
#[derive(Debug, Clone, Default)]
pub struct GlyphSet {
    glyphs: HashMap<char, RasterImage>,
}

impl GlyphSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: char, image: RasterImage) {
        self.glyphs.insert(character, image);
    }

    pub fn get(&self, character: char) -> Option<&RasterImage> {
        self.glyphs.get(&character)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

enum Source {
    Text(String),
    Image(RasterImage),
}

/// A compositing request. Scale directives are cumulative: chained `.scale`
/// calls multiply together (and with the compositor's display scalar).
pub struct Composition {
    source: Source,
    scale: f32,
    color: Option<Rgba>,
    remove_background: bool,
}

impl Composition {
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_source(Source::Text(text.into()))
    }

    pub fn image(image: RasterImage) -> Self {
        Self::from_source(Source::Image(image))
    }

    fn from_source(source: Source) -> Self {
        Self {
            source,
            scale: 1.0,
            color: None,
            remove_background: false,
        }
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn remove_background(mut self) -> Self {
        self.remove_background = true;
        self
    }
}

pub struct Compositor {
    glyphs: GlyphSet,
    display_scale: f32,
}

impl Compositor {
    /// `display_scale` is the per-resolution scalar applied to every
    /// composition so the same logical request renders proportionally
    /// larger at higher configured resolutions.
    pub fn new(glyphs: GlyphSet, display_scale: f32) -> Self {
        Self {
            glyphs,
            display_scale: normalize_scale(display_scale),
        }
    }

    pub fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    /// Runs the fixed pipeline: text build, scale resolution, background
    /// keying, swatch remap, physical upscale.
    pub fn compose(&self, composition: Composition) -> Result<RasterImage, ComposeError> {
        let mut image = match composition.source {
            Source::Text(text) => self.build_text(&text)?,
            Source::Image(image) => image,
        };
        let effective_scale = normalize_scale(composition.scale * self.display_scale);
        if composition.remove_background {
            key_out_background(&mut image);
        }
        if let Some(target) = composition.color {
            remap_swatches(&mut image, target);
        }
        if effective_scale > 1.0 {
            image = upscale_nearest(&image, effective_scale);
        }
        Ok(image)
    }

    fn build_text(&self, text: &str) -> Result<RasterImage, ComposeError> {
        let mut row = RasterImage::new(0, 0);
        for character in text.chars() {
            let glyph = self
                .glyphs
                .get(character)
                .ok_or(ComposeError::InvalidCharacter(character))?;
            row = stitch(&row, glyph);
        }
        Ok(row)
    }
}

/// Horizontal concatenation: width is the sum, height the max, both inputs
/// top-aligned. Used for string builds and for external icon rows.
pub fn stitch(left: &RasterImage, right: &RasterImage) -> RasterImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());
    let mut out = RasterImage::filled(width, height, TRANSPARENT);
    copy_into(&mut out, left, 0);
    copy_into(&mut out, right, left.width());
    out
}

fn copy_into(target: &mut RasterImage, source: &RasterImage, x_offset: u32) {
    for y in 0..source.height() {
        for x in 0..source.width() {
            if let Some(pixel) = source.pixel(x, y) {
                target.put_pixel(x + x_offset, y, pixel);
            }
        }
    }
}

/// Componentwise linear interpolation between two colors, `t` in [0, 1].
pub fn lerp_color(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix =
        |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
    [
        mix(from[0], to[0]),
        mix(from[1], to[1]),
        mix(from[2], to[2]),
        mix(from[3], to[3]),
    ]
}

fn key_out_background(image: &mut RasterImage) {
    image.map_pixels(|pixel| {
        if pixel == BACKGROUND_KEY {
            TRANSPARENT
        } else {
            pixel
        }
    });
}

fn remap_swatches(image: &mut RasterImage, target: Rgba) {
    image.map_pixels(|pixel| {
        for value in SWATCH_VALUES {
            if pixel == [value, value, value, 255] {
                return scaled_target(target, value);
            }
        }
        pixel
    });
}

fn scaled_target(target: Rgba, luminance: u8) -> Rgba {
    let scale = luminance as u32;
    let apply = |channel: u8| ((channel as u32 * scale + 127) / 255) as u8;
    [apply(target[0]), apply(target[1]), apply(target[2]), 255]
}

fn normalize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn upscale_nearest(source: &RasterImage, scale: f32) -> RasterImage {
    if source.is_empty() {
        return source.clone();
    }
    let width = ((source.width() as f32 * scale).round() as u32).max(1);
    let height = ((source.height() as f32 * scale).round() as u32).max(1);
    let inv_scale = scale.recip();
    let mut out = RasterImage::new(width, height);
    for out_y in 0..height {
        let src_y = ((out_y as f32 * inv_scale).floor() as u32).min(source.height() - 1);
        for out_x in 0..width {
            let src_x = ((out_x as f32 * inv_scale).floor() as u32).min(source.width() - 1);
            if let Some(pixel) = source.pixel(src_x, src_y) {
                out.put_pixel(out_x, out_y, pixel);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: u32, height: u32, value: u8) -> RasterImage {
        RasterImage::filled(width, height, [value, value, value, 255])
    }

    fn test_compositor() -> Compositor {
        let mut glyphs = GlyphSet::new();
        glyphs.insert('A', glyph(10, 10, 255));
        glyphs.insert('B', glyph(10, 10, 192));
        Compositor::new(glyphs, 1.0)
    }

    #[test]
    fn two_glyph_string_stitches_widths_and_keeps_height() {
        let compositor = test_compositor();
        let image = compositor
            .compose(Composition::text("AB"))
            .expect("compose");
        assert_eq!(image.width(), 20);
        assert_eq!(image.height(), 10);
    }

    #[test]
    fn unmapped_character_is_rejected() {
        let compositor = test_compositor();
        let err = compositor
            .compose(Composition::text("A#"))
            .expect_err("unmapped");
        assert_eq!(err, ComposeError::InvalidCharacter('#'));
    }

    #[test]
    fn stitch_takes_max_height_and_top_aligns() {
        let tall = glyph(2, 6, 255);
        let short = glyph(3, 2, 128);
        let row = stitch(&tall, &short);
        assert_eq!(row.width(), 5);
        assert_eq!(row.height(), 6);
        assert_eq!(row.pixel(2, 0), Some([128, 128, 128, 255]));
        assert_eq!(row.pixel(2, 3), Some(TRANSPARENT));
    }

    #[test]
    fn background_removal_precedes_color_remap() {
        // An all-background image goes fully transparent; the requested
        // color then has nothing to remap.
        let compositor = test_compositor();
        let source = RasterImage::filled(4, 4, BACKGROUND_KEY);
        let image = compositor
            .compose(
                Composition::image(source)
                    .scale(2.0)
                    .remove_background()
                    .color([255, 0, 0, 255]),
            )
            .expect("compose");
        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 8);
        for y in 0..image.height() {
            for x in 0..image.width() {
                assert_eq!(image.pixel(x, y), Some(TRANSPARENT));
            }
        }
    }

    #[test]
    fn swatch_remap_preserves_shading_ratio() {
        let compositor = test_compositor();
        let mut source = RasterImage::new(2, 1);
        source.put_pixel(0, 0, [255, 255, 255, 255]);
        source.put_pixel(1, 0, [128, 128, 128, 255]);
        let image = compositor
            .compose(Composition::image(source).color([200, 100, 0, 255]))
            .expect("compose");
        assert_eq!(image.pixel(0, 0), Some([200, 100, 0, 255]));
        // 128/255 of the target, componentwise
        assert_eq!(image.pixel(1, 0), Some([100, 50, 0, 255]));
    }

    #[test]
    fn non_swatch_pixels_survive_color_remap() {
        let compositor = test_compositor();
        let source = RasterImage::filled(1, 1, [10, 200, 30, 255]);
        let image = compositor
            .compose(Composition::image(source).color([255, 0, 0, 255]))
            .expect("compose");
        assert_eq!(image.pixel(0, 0), Some([10, 200, 30, 255]));
    }

    #[test]
    fn chained_scales_multiply_with_display_scalar() {
        let mut glyphs = GlyphSet::new();
        glyphs.insert('A', glyph(4, 4, 255));
        let compositor = Compositor::new(glyphs, 1.5);
        let image = compositor
            .compose(Composition::text("A").scale(2.0))
            .expect("compose");
        assert_eq!(image.width(), 12);
        assert_eq!(image.height(), 12);
    }

    #[test]
    fn upscale_is_nearest_neighbour_not_blended() {
        let compositor = test_compositor();
        let mut source = RasterImage::new(2, 1);
        source.put_pixel(0, 0, [255, 0, 0, 255]);
        source.put_pixel(1, 0, [0, 0, 255, 255]);
        let image = compositor
            .compose(Composition::image(source).scale(2.0))
            .expect("compose");
        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(2, 0), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(3, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn scale_at_or_below_one_leaves_dimensions_alone() {
        let compositor = test_compositor();
        let image = compositor
            .compose(Composition::text("A").scale(0.5))
            .expect("compose");
        assert_eq!(image.width(), 10);
        assert_eq!(image.height(), 10);
    }

    #[test]
    fn lerp_color_endpoints_and_midpoint() {
        let green = [0, 255, 0, 255];
        let red = [255, 0, 0, 255];
        assert_eq!(lerp_color(green, red, 0.0), green);
        assert_eq!(lerp_color(green, red, 1.0), red);
        let mid = lerp_color(green, red, 0.5);
        assert_eq!(mid, [128, 128, 0, 255]);
    }
}
