//! Poincaré-disk hierarchical reprojection (§4.3 step 3, optional).
//!
//! Provides the hyperbolic-geometry primitives the interactive pan/zoom
//! needs (Möbius addition, Poincaré distance, exponential/log maps, and
//! disk ↔ Klein ↔ half-plane conversions) plus the one operation this
//! pipeline actually applies at build time: a hierarchy-aware radial blend
//! that pulls each node toward a canonical depth for its kind while
//! preserving the angle UMAP/fallback already assigned it.

use crate::node::NodeSource;

/// A point in the open unit disk, `x^2 + y^2 < 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskPoint {
    pub x: f64,
    pub y: f64,
}

impl DiskPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn norm_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

/// Möbius addition `a ⊕ b` in the Poincaré disk model.
pub fn mobius_add(a: DiskPoint, b: DiskPoint) -> DiskPoint {
    let dot = a.x * b.x + a.y * b.y;
    let a2 = a.norm_sq();
    let b2 = b.norm_sq();
    let denom = 1.0 + 2.0 * dot + a2 * b2;
    if denom.abs() < 1e-12 {
        return DiskPoint::new(0.0, 0.0);
    }
    let scale_a = 1.0 + 2.0 * dot + b2;
    let scale_b = 1.0 - a2;
    DiskPoint::new(
        (scale_a * a.x + scale_b * b.x) / denom,
        (scale_a * a.y + scale_b * b.y) / denom,
    )
}

/// Poincaré distance between two points in the disk.
pub fn poincare_distance(a: DiskPoint, b: DiskPoint) -> f64 {
    let neg_a = DiskPoint::new(-a.x, -a.y);
    let diff = mobius_add(neg_a, b);
    let norm = diff.norm_sq().sqrt().min(1.0 - 1e-12);
    2.0 * norm.atanh()
}

/// Exponential map at the origin: a tangent vector of Euclidean length `r`
/// in direction `(dx, dy)` maps to the disk point at hyperbolic distance `r`
/// from the origin in that direction.
pub fn exp_map_origin(dx: f64, dy: f64) -> DiskPoint {
    let norm = (dx * dx + dy * dy).sqrt();
    if norm < 1e-12 {
        return DiskPoint::new(0.0, 0.0);
    }
    let scale = norm.tanh() / norm;
    DiskPoint::new(dx * scale, dy * scale)
}

/// Log map at the origin: inverse of [`exp_map_origin`].
pub fn log_map_origin(p: DiskPoint) -> (f64, f64) {
    let norm = p.norm_sq().sqrt().min(1.0 - 1e-12);
    if norm < 1e-12 {
        return (0.0, 0.0);
    }
    let scale = norm.atanh() / norm;
    (p.x * scale, p.y * scale)
}

/// Poincaré disk → Klein disk (both unit disks, different geodesics).
pub fn disk_to_klein(p: DiskPoint) -> DiskPoint {
    let denom = 1.0 + p.norm_sq();
    DiskPoint::new(2.0 * p.x / denom, 2.0 * p.y / denom)
}

/// Klein disk → Poincaré disk.
pub fn klein_to_disk(p: DiskPoint) -> DiskPoint {
    let norm2 = p.norm_sq();
    let denom = 1.0 + (1.0 - norm2).max(0.0).sqrt();
    if denom.abs() < 1e-12 {
        return DiskPoint::new(0.0, 0.0);
    }
    DiskPoint::new(p.x / denom, p.y / denom)
}

/// Poincaré disk → upper half-plane (Cayley transform), represented as
/// `(re, im)` with `im > 0`.
pub fn disk_to_half_plane(p: DiskPoint) -> (f64, f64) {
    // Standard Cayley transform centered so the disk's origin maps to i.
    let denom = p.x * p.x + (1.0 - p.y) * (1.0 - p.y);
    if denom.abs() < 1e-12 {
        return (0.0, f64::MAX);
    }
    let re = 2.0 * p.x / denom;
    let im = (1.0 - p.x * p.x - p.y * p.y) / denom;
    (re, im)
}

/// Upper half-plane → Poincaré disk (inverse Cayley transform).
pub fn half_plane_to_disk(re: f64, im: f64) -> DiskPoint {
    let denom = re * re + (im + 1.0) * (im + 1.0);
    if denom.abs() < 1e-12 {
        return DiskPoint::new(0.0, 1.0 - 1e-12);
    }
    DiskPoint::new(
        2.0 * re / denom,
        (re * re + im * im - 1.0) / denom,
    )
}

/// Canonical hierarchy depth in `[0.1, 0.9]` for a node kind (§4.3 step 3:
/// `agent → state → action → trajectory → neural → Q → memory → file`).
/// `FileType` shares `File`'s depth; the two trajectory outcomes share one
/// depth since they're one hierarchy level.
pub fn canonical_depth(source: NodeSource) -> f64 {
    let rank = match source {
        NodeSource::Agent => 0,
        NodeSource::State => 1,
        NodeSource::Action => 2,
        NodeSource::TrajectorySuccess | NodeSource::TrajectoryFailed => 3,
        NodeSource::NeuralPattern => 4,
        NodeSource::QPattern => 5,
        NodeSource::Memory => 6,
        NodeSource::File | NodeSource::FileType => 7,
    };
    0.1 + rank as f64 * (0.8 / 7.0)
}

/// Reproject a layout position through the hierarchy-aware radial blend:
/// final radius = 0.5 * normalized_euclidean_radius + 0.5 * (depth * 0.95);
/// angle is preserved.
///
/// `positions` are in canvas space (`canvas_size x canvas_size`); the
/// returned points are disk points with `x^2 + y^2 < 1`.
pub fn reproject(
    positions: &[(f64, f64)],
    sources: &[NodeSource],
    canvas_size: f64,
) -> Vec<DiskPoint> {
    debug_assert_eq!(positions.len(), sources.len());
    let center = canvas_size / 2.0;
    let max_radius = center * std::f64::consts::SQRT_2;

    positions
        .iter()
        .zip(sources.iter())
        .map(|(&(x, y), &source)| {
            let dx = x - center;
            let dy = y - center;
            let euclid_radius = (dx * dx + dy * dy).sqrt();
            let normalized = (euclid_radius / max_radius).clamp(0.0, 1.0);
            let angle = dy.atan2(dx);
            let depth = canonical_depth(source);
            let radius = (0.5 * normalized + 0.5 * (depth * 0.95)).clamp(0.0, 0.999);
            DiskPoint::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobius_add_identity_at_origin() {
        let origin = DiskPoint::new(0.0, 0.0);
        let p = DiskPoint::new(0.3, 0.2);
        let result = mobius_add(origin, p);
        assert!((result.x - p.x).abs() < 1e-9);
        assert!((result.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn poincare_distance_to_self_is_zero() {
        let p = DiskPoint::new(0.4, -0.2);
        assert!(poincare_distance(p, p).abs() < 1e-9);
    }

    #[test]
    fn exp_log_maps_round_trip() {
        let (dx, dy) = (0.3, 0.1);
        let p = exp_map_origin(dx, dy);
        let (dx2, dy2) = log_map_origin(p);
        assert!((dx - dx2).abs() < 1e-9);
        assert!((dy - dy2).abs() < 1e-9);
    }

    #[test]
    fn disk_klein_round_trip() {
        let p = DiskPoint::new(0.3, 0.2);
        let klein = disk_to_klein(p);
        let back = klein_to_disk(klein);
        assert!((p.x - back.x).abs() < 1e-9);
        assert!((p.y - back.y).abs() < 1e-9);
    }

    #[test]
    fn half_plane_round_trip() {
        let p = DiskPoint::new(0.25, -0.1);
        let (re, im) = disk_to_half_plane(p);
        let back = half_plane_to_disk(re, im);
        assert!((p.x - back.x).abs() < 1e-6);
        assert!((p.y - back.y).abs() < 1e-6);
    }

    #[test]
    fn canonical_depth_is_monotonic_by_hierarchy() {
        assert!(canonical_depth(NodeSource::Agent) < canonical_depth(NodeSource::State));
        assert!(canonical_depth(NodeSource::State) < canonical_depth(NodeSource::Action));
        assert!(canonical_depth(NodeSource::Action) < canonical_depth(NodeSource::TrajectorySuccess));
        assert!(canonical_depth(NodeSource::Memory) < canonical_depth(NodeSource::File));
        assert!(canonical_depth(NodeSource::Agent) >= 0.1);
        assert!(canonical_depth(NodeSource::File) <= 0.9);
    }

    #[test]
    fn reproject_keeps_points_inside_disk() {
        let positions = vec![(0.0, 0.0), (4000.0, 4000.0), (2000.0, 2000.0)];
        let sources = vec![NodeSource::Agent, NodeSource::File, NodeSource::Memory];
        let points = reproject(&positions, &sources, 4000.0);
        for p in points {
            assert!(p.norm_sq() < 1.0);
        }
    }
}
