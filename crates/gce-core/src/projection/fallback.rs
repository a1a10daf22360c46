//! Deterministic fallback layout for non-embedded node clusters (§4.3 step 2).
//!
//! Each node kind that doesn't carry an embedding (and any embedded node
//! when UMAP didn't run) is placed on a polar ring around a fixed,
//! kind-specific center. Ring radius grows linearly with cluster size, up
//! to a declared per-kind maximum, so a cluster with one member sits near
//! its center and a cluster with many spreads out without overflowing into
//! its neighbors' territory.

use crate::node::NodeSource;

/// `(center_x, center_y, max_radius)` for each node kind, positioned so
/// kinds that naturally relate sit near each other on the canvas (files
/// near Q-patterns, trajectories near agents, etc. — §4.3).
fn cluster_geometry(source: NodeSource) -> (f64, f64, f64) {
    match source {
        NodeSource::File => (700.0, 700.0, 600.0),
        NodeSource::QPattern => (1400.0, 900.0, 500.0),
        NodeSource::FileType => (2000.0, 500.0, 400.0),
        NodeSource::Agent => (3300.0, 700.0, 600.0),
        NodeSource::TrajectorySuccess => (2900.0, 1400.0, 500.0),
        NodeSource::TrajectoryFailed => (2900.0, 2000.0, 500.0),
        NodeSource::State => (700.0, 3300.0, 600.0),
        NodeSource::Action => (3300.0, 3300.0, 600.0),
        NodeSource::Memory => (2000.0, 2000.0, 900.0),
        NodeSource::NeuralPattern => (2000.0, 1300.0, 700.0),
    }
}

/// Position every node in `cluster` (all sharing `source`) on a ring around
/// that kind's declared center.
pub fn layout_cluster(source: NodeSource, cluster: &[usize]) -> Vec<(usize, f64, f64)> {
    let (cx, cy, max_radius) = cluster_geometry(source);
    let n = cluster.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![(cluster[0], cx, cy)];
    }

    let radius = (30.0 + n as f64 * 4.0).min(max_radius);
    cluster
        .iter()
        .enumerate()
        .map(|(i, &node_index)| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (node_index, cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_member_sits_at_center() {
        let positions = layout_cluster(NodeSource::File, &[0]);
        let (cx, cy, _) = cluster_geometry(NodeSource::File);
        assert_eq!(positions, vec![(0, cx, cy)]);
    }

    #[test]
    fn ring_radius_is_capped() {
        let cluster: Vec<usize> = (0..1000).collect();
        let positions = layout_cluster(NodeSource::State, &cluster);
        let (cx, cy, max_radius) = cluster_geometry(NodeSource::State);
        for (_, x, y) in positions {
            let dist = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            assert!(dist <= max_radius + 1e-6);
        }
    }

    #[test]
    fn empty_cluster_yields_no_positions() {
        assert!(layout_cluster(NodeSource::Agent, &[]).is_empty());
    }
}
