//! Startup asset loading. Glyph bitmaps and named images are read once at
//! boot; a missing or undecodable asset is fatal, never a runtime fallback.
//! The crate also carries a small embedded pixel font so the game stays
//! runnable (and testable) without an asset pack on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::compositor::GlyphSet;
use crate::raster::RasterImage;

/// Punctuation the glyph table covers, next to letters, digits and space.
pub const SUPPORTED_PUNCTUATION: [char; 15] = [
    '.', ',', '!', '?', '\'', '-', ':', ';', '_', '<', '>', '(', ')', '/', '"',
];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("glyph image for {character:?} missing at {path}")]
    MissingGlyph { character: char, path: PathBuf },
    #[error("failed to open image at {path}: {source}")]
    OpenImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image at {path}: {source}")]
    DecodeImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to read images directory {path}: {source}")]
    ReadImagesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image at {path} has an inconsistent pixel buffer")]
    CorruptImage { path: PathBuf },
    #[error("no image named '{0}' in the asset catalog")]
    MissingImage(String),
}

/// Every character the compositor's glyph table must map.
pub fn supported_characters() -> Vec<char> {
    let mut characters = vec![' '];
    characters.extend('A'..='Z');
    characters.extend('a'..='z');
    characters.extend('0'..='9');
    characters.extend(SUPPORTED_PUNCTUATION);
    characters
}

/// File stem a character's glyph bitmap is stored under.
pub fn glyph_file_stem(character: char) -> Option<String> {
    match character {
        ' ' => Some("space".to_string()),
        'A'..='Z' => Some(format!("upper_{}", character.to_ascii_lowercase())),
        'a'..='z' => Some(format!("lower_{character}")),
        '0'..='9' => Some(format!("digit_{character}")),
        '.' => Some("period".to_string()),
        ',' => Some("comma".to_string()),
        '!' => Some("bang".to_string()),
        '?' => Some("query".to_string()),
        '\'' => Some("apostrophe".to_string()),
        '-' => Some("hyphen".to_string()),
        ':' => Some("colon".to_string()),
        ';' => Some("semicolon".to_string()),
        '_' => Some("underscore".to_string()),
        '<' => Some("angle_left".to_string()),
        '>' => Some("angle_right".to_string()),
        '(' => Some("paren_left".to_string()),
        ')' => Some("paren_right".to_string()),
        '/' => Some("slash".to_string()),
        '"' => Some("quote".to_string()),
        _ => None,
    }
}

/// Glyph dictionary plus named images, loaded once at startup.
pub struct AssetCatalog {
    glyphs: GlyphSet,
    images: HashMap<String, RasterImage>,
}

impl AssetCatalog {
    /// Loads `<root>/glyphs/<stem>.png` for every supported character and
    /// every PNG under `<root>/images/`. Any missing glyph is fatal; the
    /// images directory may be absent when a pack ships no image art.
    pub fn load(asset_root: &Path) -> Result<Self, AssetError> {
        let glyph_dir = asset_root.join("glyphs");
        let mut glyphs = GlyphSet::new();
        for character in supported_characters() {
            let Some(stem) = glyph_file_stem(character) else {
                continue;
            };
            let path = glyph_dir.join(format!("{stem}.png"));
            if !path.is_file() {
                return Err(AssetError::MissingGlyph { character, path });
            }
            glyphs.insert(character, load_raster(&path)?);
        }

        let images = load_images(&asset_root.join("images"))?;
        Ok(Self { glyphs, images })
    }

    /// A catalog backed entirely by the embedded pixel font, with no image
    /// art; used when no asset pack is installed.
    pub fn embedded() -> Self {
        Self {
            glyphs: embedded_glyph_set(),
            images: HashMap::new(),
        }
    }

    pub fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    pub fn into_glyphs(self) -> GlyphSet {
        self.glyphs
    }

    pub fn image(&self, id: &str) -> Option<&RasterImage> {
        self.images.get(id)
    }

    pub fn require_image(&self, id: &str) -> Result<&RasterImage, AssetError> {
        self.images
            .get(id)
            .ok_or_else(|| AssetError::MissingImage(id.to_string()))
    }
}

fn load_images(images_dir: &Path) -> Result<HashMap<String, RasterImage>, AssetError> {
    let mut images = HashMap::new();
    if !images_dir.is_dir() {
        return Ok(images);
    }
    let entries = fs::read_dir(images_dir).map_err(|source| AssetError::ReadImagesDir {
        path: images_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::ReadImagesDir {
            path: images_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        images.insert(stem.to_string(), load_raster(&path)?);
    }
    Ok(images)
}

fn load_raster(path: &Path) -> Result<RasterImage, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::OpenImage {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::DecodeImage {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    RasterImage::from_rgba(width, height, rgba.into_raw()).map_err(|_| AssetError::CorruptImage {
        path: path.to_path_buf(),
    })
}

const EMBEDDED_GLYPH_WIDTH: u32 = 3;
const EMBEDDED_GLYPH_HEIGHT: u32 = 5;

/// The embedded 3x5 pixel font, rendered with one blank column/row of
/// margin. Lit pixels are authored at the brightest swatch value on the
/// opaque-black sentinel background, so both background removal and the
/// swatch color remap apply unchanged.
pub fn embedded_glyph_set() -> GlyphSet {
    let mut glyphs = GlyphSet::new();
    for character in supported_characters() {
        glyphs.insert(character, embedded_glyph_image(character));
    }
    glyphs
}

fn embedded_glyph_image(character: char) -> RasterImage {
    let rows = embedded_glyph_rows(character);
    let mut image = RasterImage::filled(
        EMBEDDED_GLYPH_WIDTH + 1,
        EMBEDDED_GLYPH_HEIGHT + 1,
        [0, 0, 0, 255],
    );
    for (row_index, row_bits) in rows.iter().enumerate() {
        for col in 0..EMBEDDED_GLYPH_WIDTH {
            if row_bits & (1 << (EMBEDDED_GLYPH_WIDTH - 1 - col)) != 0 {
                image.put_pixel(col, row_index as u32, [255, 255, 255, 255]);
            }
        }
    }
    image
}

fn embedded_glyph_rows(character: char) -> [u8; 5] {
    match character.to_ascii_uppercase() {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b110, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b110, 0b101, 0b010],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b010, 0b101, 0b010, 0b101, 0b010],
        '9' => [0b010, 0b101, 0b011, 0b001, 0b110],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b110, 0b001, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        _ => [0b000; 5],
    }
}
