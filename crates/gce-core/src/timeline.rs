//! Timeline Filter (§4.7): a moving time-range window over node/edge
//! visibility, with animation, a density histogram, and snap-to-event.

/// A snapshot pushed to subscribers on every mutation (§4.7 contract: one
/// snapshot per mutation, no coalescing).
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    pub current_range: (i64, i64),
    pub visible_nodes: Vec<bool>,
    pub visible_edges: Vec<bool>,
    pub is_animating: bool,
}

/// `(minTs, maxTs, currentRange, isAnimating, speed_ms_per_unit, bucketCount)`
/// plus the node/edge shape needed to recompute visibility.
pub struct TimelineFilter {
    min_ts: i64,
    max_ts: i64,
    current_range: (i64, i64),
    is_animating: bool,
    speed_ms_per_unit: f64,
    bucket_count: usize,
    show_future: bool,
    node_timestamps: Vec<Option<i64>>,
    edge_endpoints: Vec<(usize, usize)>,
    subscribers: Vec<Box<dyn FnMut(&TimelineSnapshot)>>,
}

impl TimelineFilter {
    pub fn new(node_timestamps: Vec<Option<i64>>, edge_endpoints: Vec<(usize, usize)>, bucket_count: usize) -> Self {
        let (min_ts, max_ts) = node_timestamps
            .iter()
            .flatten()
            .fold((i64::MAX, i64::MIN), |(lo, hi), &t| (lo.min(t), hi.max(t)));
        let (min_ts, max_ts) = if min_ts > max_ts { (0, 0) } else { (min_ts, max_ts) };
        let mut filter = Self {
            min_ts,
            max_ts,
            current_range: (min_ts, max_ts),
            is_animating: false,
            speed_ms_per_unit: 1000.0,
            bucket_count,
            show_future: true,
            node_timestamps,
            edge_endpoints,
            subscribers: Vec::new(),
        };
        filter.current_range = (min_ts, max_ts);
        filter
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&TimelineSnapshot) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        for sub in &mut self.subscribers {
            sub(&snapshot);
        }
    }

    /// The current visibility snapshot, without mutating state or emitting
    /// to subscribers.
    pub fn snapshot(&self) -> TimelineSnapshot {
        let (visible_nodes, visible_edges) = self.compute_visibility();
        TimelineSnapshot {
            current_range: self.current_range,
            visible_nodes,
            visible_edges,
            is_animating: self.is_animating,
        }
    }

    fn compute_visibility(&self) -> (Vec<bool>, Vec<bool>) {
        let (start, end) = self.current_range;
        let visible_nodes: Vec<bool> = self
            .node_timestamps
            .iter()
            .map(|ts| match ts {
                Some(t) => *t >= start && *t <= end,
                None => self.show_future,
            })
            .collect();
        let visible_edges = self
            .edge_endpoints
            .iter()
            .map(|&(s, t)| visible_nodes.get(s).copied().unwrap_or(false) && visible_nodes.get(t).copied().unwrap_or(false))
            .collect();
        (visible_nodes, visible_edges)
    }

    pub fn set_range(&mut self, start: i64, end: i64) {
        self.current_range = (start.min(end), start.max(end));
        self.emit();
    }

    pub fn set_range_percent(&mut self, p0: f64, p1: f64) {
        let span = (self.max_ts - self.min_ts) as f64;
        let start = self.min_ts + (p0.clamp(0.0, 1.0) * span) as i64;
        let end = self.min_ts + (p1.clamp(0.0, 1.0) * span) as i64;
        self.set_range(start, end);
    }

    /// Progressive reveal: start stays pinned at `minTs`, only the end
    /// moves (§4.7).
    pub fn set_endpoint_percent(&mut self, p: f64) {
        let span = (self.max_ts - self.min_ts) as f64;
        let end = self.min_ts + (p.clamp(0.0, 1.0) * span) as i64;
        self.set_range(self.min_ts, end);
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.is_animating = animating;
        self.emit();
    }

    /// Advance `end` by `(elapsed / speed) * (maxTs - minTs)`; stops
    /// animating once `end >= maxTs`.
    pub fn tick(&mut self, elapsed_ms: f64) {
        if !self.is_animating {
            return;
        }
        let span = (self.max_ts - self.min_ts) as f64;
        let delta = (elapsed_ms / self.speed_ms_per_unit) * span;
        let mut new_end = self.current_range.1 + delta as i64;
        if new_end >= self.max_ts {
            new_end = self.max_ts;
            self.is_animating = false;
        }
        self.current_range.1 = new_end;
        self.emit();
    }

    /// Fixed-width density histogram over `[minTs, maxTs]`.
    pub fn histogram(&self) -> Vec<usize> {
        let mut buckets = vec![0usize; self.bucket_count.max(1)];
        let span = (self.max_ts - self.min_ts).max(1) as f64;
        for ts in self.node_timestamps.iter().flatten() {
            let frac = ((*ts - self.min_ts) as f64 / span).clamp(0.0, 0.999_999);
            let bucket = (frac * buckets.len() as f64) as usize;
            buckets[bucket.min(buckets.len() - 1)] += 1;
        }
        buckets
    }

    /// Closest observed node timestamp to `ts`.
    pub fn snap_to_nearest(&self, ts: i64) -> Option<i64> {
        self.node_timestamps
            .iter()
            .flatten()
            .copied()
            .min_by_key(|&t| (t - ts).abs())
    }

    pub fn current_range(&self) -> (i64, i64) {
        self.current_range
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min_ts, self.max_ts)
    }
}
