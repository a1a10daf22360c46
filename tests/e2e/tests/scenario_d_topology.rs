//! Scenario D — H0 trivial (spec §8): four embeddings placed at the
//! corners of a unit square in embedding space, via 2D + zero-padding, so
//! the UMAP-approximated layout preserves the square and the topology
//! engine recovers the expected barcode shape: three finite H0 bars plus
//! one essential, and one H1 bar.

use gce_core::{analyze_topology, GceConfig};

#[test]
fn unit_square_layout_yields_expected_barcode_shape() {
    let positions = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let global_indices = vec![0, 1, 2, 3];
    let nodes = Vec::new();
    let config = GceConfig::default();

    let result = analyze_topology(&nodes, &global_indices, &positions, &config);

    let h0_finite = result.bars.iter().filter(|b| b.dimension == 0 && b.death.is_finite()).count();
    let h0_essential = result.bars.iter().filter(|b| b.dimension == 0 && b.death.is_infinite()).count();
    assert_eq!(h0_finite, 3, "a 4-point connected filtration should merge exactly 3 times");
    assert_eq!(h0_essential, 1, "exactly one component survives to infinity");

    let h1_bars: Vec<_> = result.bars.iter().filter(|b| b.dimension == 1).collect();
    assert_eq!(h1_bars.len(), 1, "the first diagonal fills both triangles and kills the square's only cycle");
    assert!((h1_bars[0].birth - 1.0).abs() < 1e-9);
    assert!((h1_bars[0].death - 2.0_f64.sqrt()).abs() < 1e-9, "the cycle dies when a diagonal completes its triangles");
}
