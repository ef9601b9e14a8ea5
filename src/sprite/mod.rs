mod sprite;
mod trimmer;

pub use sprite::{Origin, SourceSprite, SpriteRecord};
pub use trimmer::trim_rect;
