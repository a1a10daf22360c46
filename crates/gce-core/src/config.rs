//! Tunable parameters for the graph-building pipeline.
//!
//! Mirrors the teacher's convention of a single `Default`-implementing
//! config struct per subsystem (c.f. `FSRSParameters` in the source
//! material), rather than scattering magic numbers through the pipeline.

/// Canonical embedding dimensionality. Only embeddings of exactly this many
/// dimensions are considered "valid" and participate in UMAP / cosine edges.
pub const CANONICAL_EMBEDDING_DIM: usize = 384;

/// Logical canvas size in UI units (§6.3).
pub const CANVAS_SIZE: f64 = 4000.0;

/// Configuration for a single graph build.
#[derive(Debug, Clone, PartialEq)]
pub struct GceConfig {
    /// Cosine-similarity cutoff for semantic edges (§4.4 step 11). Compared
    /// with `>=` (inclusive).
    pub similarity_threshold: f32,
    /// Per-node fan-out cap during the non-semantic phases of edge synthesis.
    pub deterministic_fanout_cap: usize,
    /// Per-node fan-out cap during the semantic phase.
    pub semantic_fanout_cap: usize,
    /// Number of nearest neighbors rescued per orphan node.
    pub knn_rescue_k: usize,
    /// UMAP target box size and origin.
    pub umap_box_size: f64,
    pub umap_box_origin: (f64, f64),
    /// Minimum embedded-node count required to run UMAP at all.
    pub umap_min_nodes: usize,
    pub umap_min_dist: f32,
    /// Whether to reproject the final layout through the Poincaré disk.
    pub poincare_enabled: bool,
    /// Node ceiling above which the topology engine declines to run.
    pub topology_node_ceiling: usize,
    /// Number of buckets in the timeline histogram.
    pub timeline_bucket_count: usize,
    /// Minimum membership count for a hyperedge to be emitted.
    pub hyperedge_min_members: usize,
}

impl Default for GceConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.55,
            deterministic_fanout_cap: 25,
            semantic_fanout_cap: 15,
            knn_rescue_k: 3,
            umap_box_size: 3800.0,
            umap_box_origin: (150.0, 150.0),
            umap_min_nodes: 5,
            umap_min_dist: 0.1,
            poincare_enabled: false,
            topology_node_ceiling: 2000,
            timeline_bucket_count: 50,
            hyperedge_min_members: 4,
        }
    }
}
