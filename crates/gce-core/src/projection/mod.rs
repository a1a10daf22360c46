//! Projection & Layout (§4.3): turns node embeddings and kind groupings into
//! 2D canvas coordinates, with an optional hyperbolic reprojection on top.

mod fallback;
mod poincare;
mod umap;

pub use fallback::layout_cluster;
pub use poincare::{
    canonical_depth, disk_to_half_plane, disk_to_klein, exp_map_origin, half_plane_to_disk,
    klein_to_disk, log_map_origin, mobius_add, poincare_distance, reproject, DiskPoint,
};
pub use umap::{default_n_neighbors, umap_project};
