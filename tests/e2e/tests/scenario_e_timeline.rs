//! Scenario E — timeline animation (spec §8): nodes at ts = 0, 50, …, 1000
//! (21 nodes). Animating at 1000 ms per unit range, sampling partway
//! through should reveal a strict prefix of the nodes; at the end all 21
//! are visible and the animation flag has flipped off.

use gce_core::TimelineFilter;

#[test]
fn animation_reveals_nodes_progressively_and_stops_at_the_end() {
    let timestamps: Vec<Option<i64>> = (0..=20).map(|i| Some(i * 50)).collect();
    let mut timeline = TimelineFilter::new(timestamps, Vec::new(), 50);

    timeline.set_range(0, 0);
    timeline.set_animating(true);
    timeline.tick(500.0);

    let visible = timeline.snapshot();
    let visible_count = visible.visible_nodes.iter().filter(|&&v| v).count();
    assert_eq!(visible_count, 11, "ts in [0, 500] covers 0,50,...,500");
    assert!(visible.is_animating);

    timeline.tick(500.0);
    let visible = timeline.snapshot();
    assert_eq!(visible.visible_nodes.iter().filter(|&&v| v).count(), 21);
    assert!(!visible.is_animating);
}
