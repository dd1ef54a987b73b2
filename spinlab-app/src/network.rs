//! The graph shown in the viewport. It is static scene data; nothing here
//! reads or writes the panel state.

use rand::Rng;
use serde::Serialize;

pub type Point = [f32; 3];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinNode {
    pub id: String,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinEdge {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// An edge resolved to coordinates, with the point its label is drawn at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub source: String,
    pub target: String,
    pub start: Point,
    pub end: Point,
    pub mid: Point,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneInfo {
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinNetwork {
    pub nodes: Vec<SpinNode>,
    pub edges: Vec<SpinEdge>,
}

/// SU(2) representation labels j = 0, 1/2, 1, 3/2.
pub fn random_su2_label(rng: &mut impl Rng) -> String {
    let j = rng.random_range(0..4u8) as f32 / 2.0;
    if j == 0.0 { "0".to_string() } else { j.to_string() }
}

impl SpinNetwork {
    /// Four nodes on the unit square, labelled by their endpoints.
    pub fn fixed() -> Self {
        let nodes = [
            ("A", [0.0, 0.0, 0.0]),
            ("B", [1.0, 0.0, 0.0]),
            ("C", [0.0, 1.0, 0.0]),
            ("D", [1.0, 1.0, 0.0]),
        ];
        let edges = [("A", "B"), ("A", "C"), ("B", "C"), ("C", "D")];
        Self {
            nodes: nodes
                .into_iter()
                .map(|(id, position)| SpinNode {
                    id: id.to_string(),
                    position,
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|(source, target)| SpinEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: format!("{source}{target}"),
                })
                .collect(),
        }
    }

    /// A square with one diagonal whose edges carry random spins.
    pub fn random_square(rng: &mut impl Rng) -> Self {
        let nodes = [
            [-1.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
        ];
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3), (0, 3)];
        Self {
            nodes: nodes
                .into_iter()
                .enumerate()
                .map(|(id, position)| SpinNode {
                    id: id.to_string(),
                    position,
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|(source, target)| SpinEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    label: random_su2_label(rng),
                })
                .collect(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&SpinNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose endpoints both exist, in edge order.
    pub fn segments(&self) -> Vec<EdgeSegment> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let start = self.node(&edge.source)?.position;
                let end = self.node(&edge.target)?.position;
                let mid = [
                    (start[0] + end[0]) * 0.5,
                    (start[1] + end[1]) * 0.5,
                    (start[2] + end[2]) * 0.5,
                ];
                Some(EdgeSegment {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    start,
                    end,
                    mid,
                    label: edge.label.clone(),
                })
            })
            .collect()
    }

    pub fn scene_info(&self) -> SceneInfo {
        SceneInfo {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }
}
