//! Force-directed (Fruchterman–Reingold) spring layout.
//!
//! Connected nodes attract in proportion to their edge weight, every pair of
//! nodes repels, and a linearly cooling temperature caps each step. The
//! initial positions come from a seeded RNG so that the same graph always
//! lands on the same coordinates.

use indexmap::IndexMap;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{NodeId, SimilarityGraph};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ITERATIONS: usize = 50;

/// closest distance used when computing forces
const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub seed: u64,
    pub iterations: usize,
    /// largest absolute coordinate after rescaling
    pub scale: f64,
    /// stop once the mean step length drops below this
    pub convergence: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            seed: DEFAULT_SEED,
            iterations: DEFAULT_ITERATIONS,
            scale: 1.0,
            convergence: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// node id -> 2D position, in the graph's node order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    positions: IndexMap<NodeId, Position>,
}

impl Layout {
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Position)> + '_ {
        self.positions.iter().map(|(&id, &p)| (id, p))
    }

    pub fn positions(&self) -> &IndexMap<NodeId, Position> {
        &self.positions
    }
}

/// Compute a spring layout for every node of `graph`.
///
/// An empty graph yields an empty layout; a single node sits at the origin.
pub fn spring_layout(graph: &SimilarityGraph, config: &LayoutConfig) -> Layout {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    let n = ids.len();
    match n {
        0 => return Layout::default(),
        1 => {
            let mut positions = IndexMap::with_capacity(1);
            positions.insert(ids[0], Position { x: 0.0, y: 0.0 });
            return Layout { positions };
        }
        _ => {}
    }

    // dense weighted adjacency in node order
    let mut adj = vec![0.0f64; n * n];
    for (u, v, weight) in graph.edges() {
        if let (Some(i), Some(j)) = (graph.node_index(u), graph.node_index(v)) {
            adj[i * n + j] = weight;
            adj[j * n + i] = weight;
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let k = (1.0 / n as f64).sqrt();
    let extent = |axis: usize, pos: &[[f64; 2]]| {
        let (lo, hi) = pos
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p[axis]), hi.max(p[axis])));
        hi - lo
    };
    let mut t = extent(0, &pos).max(extent(1, &pos)) * 0.1;
    let dt = t / (config.iterations as f64 + 1.0);

    let mut iterations_run = 0usize;
    for _ in 0..config.iterations {
        iterations_run += 1;
        let mut disp = vec![[0.0f64; 2]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / (dist * dist) - adj[i * n + j] * dist / k;
                disp[i][0] += dx * force;
                disp[i][1] += dy * force;
            }
        }

        let mut step_sq = 0.0f64;
        for (p, d) in pos.iter_mut().zip(disp.iter()) {
            let mut len = (d[0] * d[0] + d[1] * d[1]).sqrt();
            if len < MIN_DISTANCE {
                len = 0.1;
            }
            let sx = d[0] * t / len;
            let sy = d[1] * t / len;
            p[0] += sx;
            p[1] += sy;
            step_sq += sx * sx + sy * sy;
        }
        t -= dt;
        if step_sq.sqrt() / (n as f64) < config.convergence {
            break;
        }
    }

    rescale(&mut pos, config.scale);
    debug!(
        "Spring layout computed - nodes={}, iterations={}, seed={}",
        n, iterations_run, config.seed
    );

    let positions = ids
        .into_iter()
        .zip(pos)
        .map(|(id, [x, y])| (id, Position { x, y }))
        .collect();
    Layout { positions }
}

/// Centre on the mean, then scale so the largest absolute coordinate is `scale`.
fn rescale(pos: &mut [[f64; 2]], scale: f64) {
    if pos.is_empty() {
        return;
    }
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;
    let mut lim = 0.0f64;
    for p in pos.iter_mut() {
        p[0] -= mean_x;
        p[1] -= mean_y;
        lim = lim.max(p[0].abs()).max(p[1].abs());
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] *= scale / lim;
            p[1] *= scale / lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> SimilarityGraph {
        let mut g = SimilarityGraph::new();
        for id in 0..n {
            g.add_node(id, format!("node {id}"));
        }
        for id in 1..n {
            g.add_edge(id - 1, id, 0.5);
        }
        g
    }

    fn dist(a: Position, b: Position) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn same_graph_same_coordinates() {
        let g = path_graph(6);
        let config = LayoutConfig::default();
        assert_eq!(spring_layout(&g, &config), spring_layout(&g, &config));
    }

    #[test]
    fn one_position_per_node_within_scale() {
        let g = path_graph(7);
        let layout = spring_layout(&g, &LayoutConfig::default());
        assert_eq!(layout.len(), 7);
        let ids: Vec<NodeId> = layout.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, g.node_ids().collect::<Vec<_>>());
        let mut max_abs = 0.0f64;
        for (_, p) in layout.iter() {
            assert!(p.x.is_finite() && p.y.is_finite());
            max_abs = max_abs.max(p.x.abs()).max(p.y.abs());
        }
        assert!((max_abs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn seed_changes_the_drawing() {
        let g = path_graph(5);
        let a = spring_layout(&g, &LayoutConfig::default());
        let b = spring_layout(&g, &LayoutConfig { seed: 7, ..LayoutConfig::default() });
        assert_ne!(a, b);
    }

    #[test]
    fn single_and_empty_graphs() {
        let mut g = SimilarityGraph::new();
        assert!(spring_layout(&g, &LayoutConfig::default()).is_empty());
        g.add_node(3, "alone");
        let layout = spring_layout(&g, &LayoutConfig::default());
        assert_eq!(layout.get(3), Some(Position { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn connected_pair_sits_closer_than_unconnected() {
        let mut g = SimilarityGraph::new();
        for id in 0..4 {
            g.add_node(id, "");
        }
        g.add_edge(0, 1, 1.0);
        g.add_edge(2, 3, 1.0);
        let layout = spring_layout(&g, &LayoutConfig { iterations: 200, ..LayoutConfig::default() });
        let p = |id| layout.get(id).unwrap();
        let linked = dist(p(0), p(1));
        assert!(linked < dist(p(0), p(2)));
        assert!(linked < dist(p(0), p(3)));
    }
}
