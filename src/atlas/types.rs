use std::collections::HashMap;

use image::RgbaImage;

use crate::packing::Rect;
use crate::sprite::Origin;

/// A completed texture atlas.
///
/// `names` maps each sprite name to an index into the parallel
/// `sources`, `origins`, and `rotated` sequences. Indices follow the
/// original insertion order of the input sprites, not packing order.
#[derive(Debug)]
pub struct Atlas {
    /// Rendered atlas bitmap
    pub image: RgbaImage,
    /// Sprite name to sequence index
    pub names: HashMap<String, usize>,
    /// Destination rectangle of each sprite within the bitmap; this is
    /// the source rectangle to sample when drawing
    pub sources: Vec<Rect>,
    /// Per-sprite shift between authored and trimmed bounds
    pub origins: Vec<Origin>,
    /// True where a sprite was placed rotated 90 degrees clockwise
    pub rotated: Vec<bool>,
    /// Ratio of sprite area to the packed bounding-box area; advisory
    pub fill_rate: f64,
}

impl Atlas {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sequence index of a sprite by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }
}
