mod estimate;
mod maxrects;
mod rect;

pub use estimate::starting_size;
pub use maxrects::{MaxRectsPacker, PackingHeuristic};
pub use rect::{Rect, common_interval_length};
