//! UMAP-like projection of embedded nodes into 2D (§4.3 step 1).
//!
//! No UMAP implementation exists anywhere in this codebase's lineage, so
//! this is a documented approximation rather than a faithful port of the
//! algorithm: it builds the same kind of neighbor graph UMAP would
//! (`nNeighbors` nearest by cosine similarity) and then relaxes it with the
//! force-directed layout the teacher already used for its subgraph
//! visualization (`fruchterman_reingold` in the source lineage) — attraction
//! along neighbor edges, repulsion between all pairs. This gets the same
//! qualitative result (similar embeddings cluster together) without pulling
//! in an external crate the corpus never reaches for. See DESIGN.md.

use crate::util::cosine_similarity;

/// Run neighbor-graph force layout over `embeddings`, scaled into a
/// `box_size x box_size` square with top-left corner at `origin`.
///
/// Returns one `(x, y)` per input embedding, in the same order.
pub fn umap_project(
    embeddings: &[Vec<f32>],
    n_neighbors: usize,
    min_dist: f32,
    box_size: f64,
    origin: (f64, f64),
) -> Vec<(f64, f64)> {
    let n = embeddings.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![(origin.0 + box_size / 2.0, origin.1 + box_size / 2.0)];
    }

    let k = n_neighbors.clamp(1, n - 1);
    let neighbor_edges = build_knn_edges(embeddings, k);

    let mut positions: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (500.0 * angle.cos(), 500.0 * angle.sin())
        })
        .collect();

    let area = 1000.0 * 1000.0;
    let k_spring = (area / n as f64).sqrt();
    let iterations = 80usize;
    let mut temperature = 1000.0 / 10.0;
    let cooling = temperature / iterations as f64;
    // min_dist widens the equilibrium spacing UMAP would target between
    // dissimilar points; folded into the spring constant.
    let k_spring = k_spring * (1.0 + min_dist as f64);

    for _ in 0..iterations {
        let mut disp = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = positions[i].0 - positions[j].0;
                let dy = positions[i].1 - positions[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = k_spring * k_spring / dist;
                disp[i].0 += dx / dist * force;
                disp[i].1 += dy / dist * force;
                disp[j].0 -= dx / dist * force;
                disp[j].1 -= dy / dist * force;
            }
        }

        for &(u, v, weight) in &neighbor_edges {
            let dx = positions[u].0 - positions[v].0;
            let dy = positions[u].1 - positions[v].1;
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let force = dist * dist / k_spring * weight as f64;
            disp[u].0 -= dx / dist * force;
            disp[u].1 -= dy / dist * force;
            disp[v].0 += dx / dist * force;
            disp[v].1 += dy / dist * force;
        }

        for i in 0..n {
            let dx = disp[i].0;
            let dy = disp[i].1;
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let capped = dist.min(temperature);
            positions[i].0 += dx / dist * capped;
            positions[i].1 += dy / dist * capped;
        }

        temperature = (temperature - cooling).max(0.01);
    }

    scale_into_box(&positions, box_size, origin)
}

/// For each node, its `k` highest-cosine-similarity neighbors, deduped to
/// undirected edges.
fn build_knn_edges(embeddings: &[Vec<f32>], k: usize) -> Vec<(usize, usize, f32)> {
    let n = embeddings.len();
    let mut edges = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for i in 0..n {
        let mut sims: Vec<(usize, f32)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| (j, cosine_similarity(&embeddings[i], &embeddings[j])))
            .collect();
        sims.sort_by(|a, b| b.1.total_cmp(&a.1));
        for &(j, sim) in sims.iter().take(k) {
            let key = (i.min(j), i.max(j));
            if seen.insert(key) {
                edges.push((key.0, key.1, sim.max(0.05)));
            }
        }
    }
    edges
}

/// Rescale a point cloud to exactly fit inside `[origin, origin + box_size]`
/// on both axes.
fn scale_into_box(positions: &[(f64, f64)], box_size: f64, origin: (f64, f64)) -> Vec<(f64, f64)> {
    let (min_x, max_x) = min_max(positions.iter().map(|p| p.0));
    let (min_y, max_y) = min_max(positions.iter().map(|p| p.1));
    let span_x = (max_x - min_x).max(1e-6);
    let span_y = (max_y - min_y).max(1e-6);

    positions
        .iter()
        .map(|&(x, y)| {
            (
                origin.0 + (x - min_x) / span_x * box_size,
                origin.1 + (y - min_y) / span_y * box_size,
            )
        })
        .collect()
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// `nNeighbors = max(2, min(15, floor(N/2)))` (§4.3 step 1).
pub fn default_n_neighbors(n: usize) -> usize {
    (n / 2).clamp(2, 15)
}
