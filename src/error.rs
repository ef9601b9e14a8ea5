use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("no sprites to pack")]
    NoSprites,

    #[error("duplicate sprite name '{0}'")]
    DuplicateName(String),

    #[error(
        "sprite '{name}' ({width}x{height} padded) exceeds maximum atlas size ({max_width}x{max_height})"
    )]
    SpriteTooLarge {
        name: String,
        width: i32,
        height: i32,
        max_width: u32,
        max_height: u32,
    },

    #[error(
        "unknown packing heuristic '{0}'. Valid values: best-short-side-fit, \
         best-long-side-fit, best-area-fit, bottom-left, contact-point"
    )]
    InvalidHeuristic(String),

    #[error("parallel sprite sequences diverged: {sources} sources, {destinations} destinations")]
    LengthMismatch { sources: usize, destinations: usize },

    #[error("packed only {placed} of {total} sprites; bin cannot grow beyond {width}x{height}")]
    PackingIncomplete {
        placed: usize,
        total: usize,
        width: i32,
        height: i32,
    },
}
