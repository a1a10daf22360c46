//! Small cross-cutting helpers shared by several pipeline stages.

mod cosine;
mod sanitize;
mod timestamp;

pub use cosine::cosine_similarity;
pub use sanitize::{sanitize_f64, Sanitize};
pub use timestamp::normalize_timestamp_ms;
