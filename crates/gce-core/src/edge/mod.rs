//! Edge Synthesizer (§4.4): the ordered pipeline producing the graph's edges.

mod synth;
mod types;

pub use synth::synthesize_edges;
pub use types::{Edge, EdgeGroup, EdgeType};
