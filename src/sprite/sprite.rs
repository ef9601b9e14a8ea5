use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::packing::Rect;

/// Shift between a sprite's authored bounds and its trimmed bounds,
/// needed to reposition the sprite correctly at draw time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Pixels trimmed from the left edge
    pub x: i32,
    /// Pixels trimmed from the top edge
    pub y: i32,
}

impl Origin {
    pub const ZERO: Origin = Origin { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A named source image queued for packing.
///
/// Names are the unique keys of the emitted atlas; pixels are RGBA with
/// the origin at the top-left.
#[derive(Debug, Clone)]
pub struct SourceSprite {
    pub name: String,
    pub image: RgbaImage,
}

impl SourceSprite {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    /// Authored bounds of the sprite bitmap
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            i32::try_from(self.image.width()).unwrap_or(i32::MAX),
            i32::try_from(self.image.height()).unwrap_or(i32::MAX),
        )
    }
}

/// Per-sprite bookkeeping carried through one build.
///
/// Created when the sprite is trimmed; `dest` stays empty until packing
/// succeeds and is frozen once the atlas is emitted.
#[derive(Debug, Clone)]
pub struct SpriteRecord {
    pub name: String,
    /// Authored bounds within the source bitmap
    pub source: Rect,
    /// Content bounds within the source bitmap after trimming
    pub trimmed: Rect,
    /// Trimmed top-left minus authored top-left
    pub origin: Origin,
    /// Destination bounds in the atlas
    pub dest: Rect,
}
