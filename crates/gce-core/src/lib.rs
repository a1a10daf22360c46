//! # Graph Construction Engine
//!
//! Transforms a SQLite intelligence store into a typed, layout-ready,
//! edge-classified graph with topological features.
//!
//! The pipeline, in order:
//!
//! 1. [`store`] — reads the store's tables into typed rows, degrading
//!    missing optional tables and corrupt metadata to safe defaults rather
//!    than erroring.
//! 2. [`node`] — materializes the nine node kinds into the unified
//!    [`node::Node`] record.
//! 3. [`projection`] — places every node in 2D: UMAP-like layout for
//!    embedded nodes, deterministic ring layout for everything else, with
//!    an optional Poincaré-disk reprojection pass.
//! 4. [`edge`] — runs the 12-step edge synthesis pipeline and classifies
//!    every edge into a closed [`edge::EdgeType`] set.
//! 5. [`hyperedge`] — groups ≥4-member clusters that don't reduce to
//!    pairwise edges.
//! 6. [`topology`] — approximates persistent homology over the embedded
//!    layout and derives knowledge gaps from the resulting H1 bars.
//! 7. [`timeline`] — a moving time-range visibility filter over the built
//!    graph.
//! 8. [`color`] — resolves per-node colors and legends under ~25
//!    selectable modes.
//! 9. [`cache`] — the single-source-of-truth node-type config and a
//!    `(store_mtime_ms, similarity_threshold)`-keyed rebuild cache.
//! 10. [`force`] — the force-simulation controller interface and its
//!     fallback integrator.
//!
//! [`graph::build_graph`] drives the whole thing end to end.

pub mod cache;
pub mod color;
pub mod config;
pub mod edge;
pub mod error;
pub mod force;
pub mod graph;
pub mod hyperedge;
pub mod node;
pub mod projection;
pub mod store;
pub mod timeline;
pub mod topology;
mod util;

pub use util::{sanitize_f64, Sanitize};

pub use cache::{GraphCache, NodeTypeConfig};
pub use color::{resolve as resolve_color, ColorMode, Resolved as ResolvedColors};
pub use config::{GceConfig, CANONICAL_EMBEDDING_DIM, CANVAS_SIZE};
pub use edge::{synthesize_edges, Edge, EdgeGroup, EdgeType};
pub use error::{GceError, Result, StoreError};
pub use force::{FallbackForceSimulation, ForceConfigUpdate, ForceSimulationController, Tick, WorkerLifecycle};
pub use graph::{build_graph, build_graph_from_rows, GraphMeta, GraphResponse, GraphStats, TimelineBounds};
pub use hyperedge::{build_hyperedges, Hyperedge};
pub use node::{build_nodes, BuiltNodes, ContentType, Node, NodeIndex, NodeSource};
pub use projection::{canonical_depth, layout_cluster, reproject, umap_project, DiskPoint};
pub use store::{
    AgentRow, FileSequenceRow, LearningDataRow, MemoryRow, NeuralPatternRow, QPatternRow,
    StoreReader, StoreRows, StoredEdgeRow, TrajectoryRow,
};
pub use timeline::{TimelineFilter, TimelineSnapshot};
pub use topology::{analyze_topology, KnowledgeGap, PersistenceBar, TopologyResult};

/// Commonly used types, re-exported flat for `use gce_core::prelude::*;`.
pub mod prelude {
    pub use crate::{
        build_graph, build_graph_from_rows, Edge, EdgeGroup, EdgeType, GceConfig, GceError,
        GraphCache, GraphResponse, Node, NodeSource, Result,
    };
}
