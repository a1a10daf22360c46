//! Color & Mode Resolver (§4.8).

mod mode;
mod palette;

pub use mode::{resolve, ColorMode, Resolved};
pub use palette::{hsl_hashed_color, palette_color};
