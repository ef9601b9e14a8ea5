pub mod atlas;
pub mod config;
pub mod error;
pub mod packing;
pub mod sprite;

pub use atlas::{Atlas, AtlasBuilder};
pub use config::PackConfig;
pub use error::SheetError;
pub use packing::{MaxRectsPacker, PackingHeuristic, Rect};
pub use sprite::{Origin, SourceSprite, SpriteRecord};
