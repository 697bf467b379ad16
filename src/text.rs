/// Stroke/fill/shadow composition of laid-out lines.
pub mod compose;
/// The line layout engine and its transient result.
pub mod layout;
/// Word-wrapping strategies applied before layout.
pub mod wrap;

pub use layout::{TextLayout, compute_layout};
pub use wrap::{advanced_wrap, basic_wrap};
