//! Force Simulation Controller (§4.10) — interface only, the physics
//! algorithm itself is out of scope. Also ships the documented fallback
//! path: a simple pairwise-repulsion + spring integrator used when no
//! parallel worker is available, functionally (not performance-)
//! equivalent to the worker protocol.

use std::collections::HashMap;

/// One `tick` message: positions for all `n` nodes as `[x0, y0, x1, y1, …]`,
/// plus the simulation's current cooling factor.
#[derive(Debug, Clone)]
pub struct Tick {
    pub positions: Vec<f32>,
    pub alpha: f32,
}

impl Tick {
    pub fn node_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn position_of(&self, node_index: usize) -> Option<(f32, f32)> {
        let base = node_index * 2;
        Some((*self.positions.get(base)?, *self.positions.get(base + 1)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerLifecycle {
    Idle,
    Running,
    Stopped,
}

/// Owns the physics worker (or its fallback) lifecycle and the tick
/// protocol. Implementations write tick positions back into Node records
/// and report `alpha` to subscribers (§4.10, §5 shared-resource policy).
pub trait ForceSimulationController {
    fn set_data(&mut self, node_count: usize, edges: Vec<(usize, usize, f32)>);
    fn start(&mut self);
    fn stop(&mut self);
    fn restart(&mut self, alpha: f32);
    fn update_config(&mut self, config: ForceConfigUpdate);
    fn pin_node(&mut self, index: usize, x: f64, y: f64);
    fn unpin_node(&mut self, index: usize);
    fn lifecycle(&self) -> WorkerLifecycle;
}

/// Partial config update (`updateConfig(partial)` in §4.10); unset fields
/// leave the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct ForceConfigUpdate {
    pub repulsion: Option<f64>,
    pub spring_length: Option<f64>,
    pub cooling: Option<f64>,
}

/// The documented fallback: a timer-driven pairwise-repulsion + spring
/// integrator, grounded on the same Fruchterman-Reingold shape the
/// Projection component uses for UMAP (§4.3, §4.10 fallback path).
pub struct FallbackForceSimulation {
    positions: Vec<(f64, f64)>,
    edges: Vec<(usize, usize, f32)>,
    pinned: HashMap<usize, (f64, f64)>,
    lifecycle: WorkerLifecycle,
    repulsion: f64,
    spring_length: f64,
    cooling: f64,
    alpha: f64,
}

impl FallbackForceSimulation {
    pub fn new(initial_positions: Vec<(f64, f64)>) -> Self {
        Self {
            positions: initial_positions,
            edges: Vec::new(),
            pinned: HashMap::new(),
            lifecycle: WorkerLifecycle::Idle,
            repulsion: 400.0,
            spring_length: 80.0,
            cooling: 0.98,
            alpha: 1.0,
        }
    }

    /// Advance one fallback tick; returns the same `Tick` shape a worker
    /// would post.
    pub fn step(&mut self) -> Tick {
        let n = self.positions.len();
        let mut disp = vec![(0.0f64, 0.0f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = self.positions[i].0 - self.positions[j].0;
                let dy = self.positions[i].1 - self.positions[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = self.repulsion / (dist * dist);
                disp[i].0 += dx / dist * force;
                disp[i].1 += dy / dist * force;
                disp[j].0 -= dx / dist * force;
                disp[j].1 -= dy / dist * force;
            }
        }

        for &(u, v, weight) in &self.edges {
            if u >= n || v >= n {
                continue;
            }
            let dx = self.positions[u].0 - self.positions[v].0;
            let dy = self.positions[u].1 - self.positions[v].1;
            let dist = (dx * dx + dy * dy).sqrt().max(0.01);
            let force = (dist - self.spring_length) * weight as f64 * 0.05;
            disp[u].0 -= dx / dist * force;
            disp[u].1 -= dy / dist * force;
            disp[v].0 += dx / dist * force;
            disp[v].1 += dy / dist * force;
        }

        for (i, d) in disp.into_iter().enumerate() {
            if self.pinned.contains_key(&i) {
                continue;
            }
            self.positions[i].0 += d.0 * self.alpha;
            self.positions[i].1 += d.1 * self.alpha;
        }
        for (&i, &(x, y)) in &self.pinned {
            if i < n {
                self.positions[i] = (x, y);
            }
        }

        self.alpha *= self.cooling;

        let flat: Vec<f32> = self.positions.iter().flat_map(|&(x, y)| [x as f32, y as f32]).collect();
        Tick { positions: flat, alpha: self.alpha as f32 }
    }
}

impl ForceSimulationController for FallbackForceSimulation {
    fn set_data(&mut self, node_count: usize, edges: Vec<(usize, usize, f32)>) {
        self.positions.resize(node_count, (0.0, 0.0));
        self.edges = edges;
        self.alpha = 1.0;
    }

    fn start(&mut self) {
        self.lifecycle = WorkerLifecycle::Running;
    }

    fn stop(&mut self) {
        self.lifecycle = WorkerLifecycle::Stopped;
    }

    fn restart(&mut self, alpha: f32) {
        self.alpha = alpha as f64;
        self.lifecycle = WorkerLifecycle::Running;
    }

    fn update_config(&mut self, config: ForceConfigUpdate) {
        if let Some(r) = config.repulsion {
            self.repulsion = r;
        }
        if let Some(s) = config.spring_length {
            self.spring_length = s;
        }
        if let Some(c) = config.cooling {
            self.cooling = c;
        }
    }

    fn pin_node(&mut self, index: usize, x: f64, y: f64) {
        self.pinned.insert(index, (x, y));
    }

    fn unpin_node(&mut self, index: usize) {
        self.pinned.remove(&index);
    }

    fn lifecycle(&self) -> WorkerLifecycle {
        self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_node_never_moves() {
        let mut sim = FallbackForceSimulation::new(vec![(0.0, 0.0), (10.0, 10.0), (-5.0, 5.0)]);
        sim.set_data(3, vec![(0, 1, 1.0), (1, 2, 1.0)]);
        sim.pin_node(1, 10.0, 10.0);
        sim.start();
        for _ in 0..5 {
            sim.step();
        }
        assert_eq!(sim.positions[1], (10.0, 10.0));
    }

    #[test]
    fn unpin_allows_movement_again() {
        let mut sim = FallbackForceSimulation::new(vec![(0.0, 0.0), (1.0, 0.0)]);
        sim.set_data(2, vec![(0, 1, 1.0)]);
        sim.pin_node(1, 1.0, 0.0);
        sim.unpin_node(1);
        sim.start();
        for _ in 0..20 {
            sim.step();
        }
        assert_ne!(sim.positions[1], (1.0, 0.0));
    }

    #[test]
    fn tick_shape_matches_flattened_position_array() {
        let mut sim = FallbackForceSimulation::new(vec![(0.0, 0.0), (1.0, 1.0)]);
        sim.set_data(2, vec![]);
        let tick = sim.step();
        assert_eq!(tick.node_count(), 2);
        assert_eq!(tick.position_of(1).is_some(), true);
    }

    #[test]
    fn lifecycle_transitions() {
        let mut sim = FallbackForceSimulation::new(vec![(0.0, 0.0)]);
        assert_eq!(sim.lifecycle(), WorkerLifecycle::Idle);
        sim.start();
        assert_eq!(sim.lifecycle(), WorkerLifecycle::Running);
        sim.stop();
        assert_eq!(sim.lifecycle(), WorkerLifecycle::Stopped);
    }
}
