//! Node Builder (§4.2) — turns reader output into the unified [`Node`] record.

mod builder;
mod types;

pub use builder::{build_nodes, BuiltNodes, NodeIndex};
pub use types::{preview_of, word_count_of, ContentType, Node, NodeSource};
