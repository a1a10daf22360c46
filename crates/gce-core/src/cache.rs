//! Graph Cache & API Facade (§4.9).
//!
//! Two responsibilities live here: the single-source-of-truth node-type
//! config every client renders from, and a cache keyed on
//! `(store_mtime_ms, similarity_threshold)` that spares repeat callers a
//! full pipeline rebuild when neither the store nor the caller's tuning
//! has changed since the last build.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::color::hsl_hashed_color;
use crate::config::GceConfig;
use crate::error::Result;
use crate::graph::{build_graph, GraphResponse};
use crate::node::{Node, NodeSource};
use crate::store::StoreReader;

/// One row of the node-type legend: `source → {label, color, svgIcon,
/// shape2d, shape3d, order, count, active}` (§4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeConfig {
    pub source: String,
    pub label: String,
    pub color: String,
    pub svg_icon: String,
    pub shape2d: String,
    pub shape3d: String,
    pub order: usize,
    pub count: usize,
    pub active: bool,
}

/// Canonical entry for a known [`NodeSource`] — everything but `count`,
/// which is filled in from the actual node set at build time.
fn canonical_entry(source: NodeSource, order: usize) -> NodeTypeConfig {
    let (label, color, svg_icon, shape2d, shape3d) = match source {
        NodeSource::Memory => ("Memory", "#4f8fd6", "memory", "circle", "sphere"),
        NodeSource::NeuralPattern => ("Neural Pattern", "#a569d6", "neural", "diamond", "octahedron"),
        NodeSource::QPattern => ("Q-Pattern", "#d68f4f", "policy", "square", "box"),
        NodeSource::TrajectorySuccess => ("Trajectory (success)", "#4fd67d", "trajectory", "triangle-up", "cone"),
        NodeSource::TrajectoryFailed => ("Trajectory (failed)", "#d64f4f", "trajectory", "triangle-down", "cone"),
        NodeSource::File => ("File", "#9e9e9e", "file", "hexagon", "cylinder"),
        NodeSource::FileType => ("File Type", "#707070", "file-type", "hexagon-outline", "cylinder-outline"),
        NodeSource::Agent => ("Agent", "#d6c74f", "agent", "star", "dodecahedron"),
        NodeSource::State => ("State", "#4fc9d6", "state", "pentagon", "icosahedron"),
        NodeSource::Action => ("Action", "#d64fa9", "action", "cross", "torus"),
    };
    NodeTypeConfig {
        source: source.as_str().to_string(),
        label: label.to_string(),
        color: color.to_string(),
        svg_icon: svg_icon.to_string(),
        shape2d: shape2d.to_string(),
        shape3d: shape3d.to_string(),
        order,
        count: 0,
        active: true,
    }
}

/// Round-robin shape cycle for auto-synthesized unknown node sources.
const AUTO_SHAPES_2D: &[&str] = &["circle", "square", "triangle-up", "diamond", "hexagon", "pentagon"];
const AUTO_SHAPES_3D: &[&str] = &["sphere", "box", "cone", "octahedron", "cylinder", "icosahedron"];

/// Build the SSOT node-type config: every known [`NodeSource`] gets a
/// canonical entry; any other `source` string observed in `nodes` (there
/// shouldn't be one — `Node::source` is the closed enum — but the API
/// contract is phrased over "whatever sources actually occur", so this
/// stays generic) is auto-synthesized with an HSL-hashed color and a
/// round-robin shape (§4.9).
pub fn build_node_type_config(nodes: &[Node]) -> Vec<NodeTypeConfig> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for n in nodes {
        *counts.entry(n.source.as_str()).or_default() += 1;
    }

    let mut order = 0usize;
    let mut entries: Vec<NodeTypeConfig> = NodeSource::all()
        .iter()
        .map(|&source| {
            let mut entry = canonical_entry(source, order);
            order += 1;
            entry.count = counts.remove(source.as_str()).unwrap_or(0);
            entry.active = entry.count > 0;
            entry
        })
        .collect();

    let mut unknown: Vec<&str> = counts.keys().copied().collect();
    unknown.sort();
    for (i, key) in unknown.into_iter().enumerate() {
        entries.push(NodeTypeConfig {
            source: key.to_string(),
            label: key.to_string(),
            color: hsl_hashed_color(key),
            svg_icon: "unknown".to_string(),
            shape2d: AUTO_SHAPES_2D[i % AUTO_SHAPES_2D.len()].to_string(),
            shape3d: AUTO_SHAPES_3D[i % AUTO_SHAPES_3D.len()].to_string(),
            order,
            count: *counts.get(key).unwrap_or(&0),
            active: true,
        });
        order += 1;
    }

    entries
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CacheKey {
    store_mtime_ms: i64,
    similarity_threshold_bits: u32,
}

impl CacheKey {
    fn new(store_mtime_ms: i64, similarity_threshold: f32) -> Self {
        Self { store_mtime_ms, similarity_threshold_bits: similarity_threshold.to_bits() }
    }
}

struct CacheEntry {
    key: CacheKey,
    response: Arc<GraphResponse>,
}

/// Caches one built [`GraphResponse`] per store path, keyed on
/// `(store_mtime_ms, similarity_threshold)` (§4.9). A hit returns the
/// shared `Arc` from the last build; a miss rebuilds the whole pipeline
/// and replaces the cached entry.
pub struct GraphCache {
    store_path: PathBuf,
    entry: Mutex<Option<CacheEntry>>,
}

impl GraphCache {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self { store_path: store_path.into(), entry: Mutex::new(None) }
    }

    /// Return the cached response if the store hasn't changed on disk and
    /// `config.similarity_threshold` matches the last build; otherwise
    /// rebuild, cache, and return the fresh one.
    pub fn get_or_build(&self, config: &GceConfig) -> Result<Arc<GraphResponse>> {
        let mtime = StoreReader::mtime_ms(&self.store_path);
        let key = CacheKey::new(mtime, config.similarity_threshold);

        let mut guard = self.entry.lock().expect("graph cache mutex poisoned");
        if let Some(existing) = guard.as_ref() {
            if existing.key == key {
                return Ok(existing.response.clone());
            }
        }

        let response = Arc::new(build_graph(&self.store_path, config)?);
        *guard = Some(CacheEntry { key, response: response.clone() });
        Ok(response)
    }

    /// Drop the cached entry unconditionally, forcing the next call to
    /// rebuild regardless of mtime/threshold.
    pub fn invalidate(&self) {
        *self.entry.lock().expect("graph cache mutex poisoned") = None;
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}
