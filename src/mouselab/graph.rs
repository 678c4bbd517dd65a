//! Annotated structural graph of an environment, used as cost-function input.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Node attributes available to cost functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Shortest-path distance from the initial node.
    pub depth: usize,
    /// Branch label shared by a root child and all of its descendants.
    pub cluster: String,
    /// On-screen coordinates, when a structure file supplied them.
    pub layout: Option<[f64; 2]>,
    /// Key pressed to move into this node, when known.
    pub resulting_key: Option<String>,
}

/// Node properties parsed from an experiment structure description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureProperties {
    pub resulting_key: HashMap<usize, String>,
    pub layout: HashMap<usize, [f64; 2]>,
    pub initial: usize,
}

/// Experiment structure file: `{"layout": .., "initial": "0", "graph": ..}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Structure {
    pub layout: HashMap<String, [f64; 2]>,
    pub initial: String,
    /// node -> key -> `[reward, next node]`
    pub graph: HashMap<String, HashMap<String, (serde_json::Value, String)>>,
}

impl StructureProperties {
    /// Reshape a structure description into per-node properties.
    pub fn from_structure(structure: &Structure) -> Result<Self> {
        let parse = |label: &str| -> Result<usize> {
            label
                .parse::<usize>()
                .map_err(|_| Error::config(format!("structure node '{label}' is not an index")))
        };

        let mut resulting_key = HashMap::new();
        for moves in structure.graph.values() {
            for (key, (_, next)) in moves {
                resulting_key.insert(parse(next)?, key.clone());
            }
        }

        let mut layout = HashMap::new();
        for (node, coords) in &structure.layout {
            layout.insert(parse(node)?, *coords);
        }

        let initial = parse(&structure.initial)?;
        resulting_key
            .entry(initial)
            .or_insert_with(|| "init".to_string());

        Ok(Self {
            resulting_key,
            layout,
            initial,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let structure: Structure = serde_json::from_str(json)?;
        Self::from_structure(&structure)
    }
}

/// Directed graph of the tree with per-node attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    attributes: Vec<NodeAttributes>,
    initial: usize,
}

impl MdpGraph {
    /// Build and annotate a graph from adjacency lists.
    ///
    /// Depth is the shortest-path length from the initial node. Clusters are
    /// assigned per successor of the initial node, using its resulting key if
    /// present and its 1-based position otherwise; the initial node is
    /// cluster `"0"`.
    pub fn from_adjacency(
        adjacency: &[Vec<usize>],
        properties: Option<&StructureProperties>,
    ) -> Result<Self> {
        let n = adjacency.len();
        let initial = properties.map_or(0, |p| p.initial);
        if initial >= n {
            return Err(Error::config(format!("initial node {initial} outside graph")));
        }

        let mut predecessors = vec![Vec::new(); n];
        for (node, next) in adjacency.iter().enumerate() {
            for &succ in next {
                if succ >= n {
                    return Err(Error::config(format!("edge {node}->{succ} outside graph")));
                }
                predecessors[succ].push(node);
            }
        }

        let depth = shortest_paths(adjacency, initial);
        let mut attributes = Vec::with_capacity(n);
        for (node, d) in depth.iter().enumerate() {
            let Some(d) = d else {
                return Err(Error::config(format!("node {node} unreachable from {initial}")));
            };
            attributes.push(NodeAttributes {
                depth: *d,
                cluster: String::new(),
                layout: properties.and_then(|p| p.layout.get(&node).copied()),
                resulting_key: properties.and_then(|p| p.resulting_key.get(&node).cloned()),
            });
        }

        attributes[initial].cluster = "0".to_string();
        for (idx, &child) in adjacency[initial].iter().enumerate() {
            let cluster = attributes[child]
                .resulting_key
                .clone()
                .unwrap_or_else(|| (idx + 1).to_string());
            for desc in descendants(adjacency, child) {
                attributes[desc].cluster = cluster.clone();
            }
            attributes[child].cluster = cluster;
        }

        Ok(Self {
            successors: adjacency.to_vec(),
            predecessors,
            attributes,
            initial,
        })
    }

    /// Adjacency lists, indexed by node.
    pub fn to_adjacency(&self) -> Vec<Vec<usize>> {
        self.successors.clone()
    }

    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn node(&self, node: usize) -> &NodeAttributes {
        &self.attributes[node]
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    /// Successors followed by predecessors.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors[node]
            .iter()
            .chain(self.predecessors[node].iter())
            .copied()
    }
}

/// Graph together with which nodes are revealed in the state being expanded.
#[derive(Debug, Clone, Copy)]
pub struct GraphView<'a> {
    pub graph: &'a MdpGraph,
    pub revealed: &'a [bool],
}

impl<'a> GraphView<'a> {
    pub fn new(graph: &'a MdpGraph, revealed: &'a [bool]) -> Self {
        Self { graph, revealed }
    }

    pub fn is_revealed(&self, node: usize) -> bool {
        self.revealed.get(node).copied().unwrap_or(false)
    }

    /// Revealed nodes, optionally leaving out the initial node.
    pub fn revealed_nodes(&self, include_start: bool) -> Vec<usize> {
        (0..self.graph.len())
            .filter(|&node| self.is_revealed(node))
            .filter(|&node| include_start || node != self.graph.initial())
            .collect()
    }
}

fn shortest_paths(adjacency: &[Vec<usize>], source: usize) -> Vec<Option<usize>> {
    let mut depth = vec![None; adjacency.len()];
    depth[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        let next_depth = depth[node].map(|d| d + 1);
        for &succ in &adjacency[node] {
            if depth[succ].is_none() {
                depth[succ] = next_depth;
                queue.push_back(succ);
            }
        }
    }
    depth
}

fn descendants(adjacency: &[Vec<usize>], node: usize) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack = adjacency[node].clone();
    while let Some(next) = stack.pop() {
        if seen.insert(next) {
            stack.extend(adjacency[next].iter().copied());
        }
    }
    seen
}
