//! Cost functions charged for revealing a node.
//!
//! The environment calls [`CostFunction::cost`] once per reveal with the
//! revealed node, the previous action, and a [`GraphView`] of the annotated
//! structure. Costs are returned as (usually negative) rewards.

use std::{collections::HashMap, fmt};

use super::graph::GraphView;
use crate::{Error, Result};

/// Pluggable inspection cost.
pub trait CostFunction: fmt::Debug {
    fn cost(&self, node: usize, last_action: Option<usize>, graph: &GraphView<'_>) -> Result<f64>;
}

/// Same cost for every reveal: `-|cost|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCost(pub f64);

impl CostFunction for FlatCost {
    fn cost(&self, _node: usize, _last_action: Option<usize>, _graph: &GraphView<'_>) -> Result<f64> {
        Ok(-self.0.abs())
    }
}

/// `-(static_weight + depth * depth_weight)`; free at depth 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDepthCost {
    pub static_weight: f64,
    pub depth_weight: f64,
}

impl LinearDepthCost {
    pub fn new(static_weight: f64, depth_weight: f64) -> Self {
        Self {
            static_weight,
            depth_weight,
        }
    }
}

impl CostFunction for LinearDepthCost {
    fn cost(&self, node: usize, _last_action: Option<usize>, graph: &GraphView<'_>) -> Result<f64> {
        let depth = graph.graph.node(node).depth;
        if depth == 0 {
            return Ok(0.0);
        }
        Ok(-(self.static_weight + depth as f64 * self.depth_weight))
    }
}

/// Redistributes a base cost over clusters according to side preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct SideCost {
    given_cost: f64,
    side_preferences: HashMap<String, f64>,
}

impl SideCost {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless the preferences sum to 1
    /// (within 0.001).
    pub fn new(given_cost: f64, side_preferences: HashMap<String, f64>) -> Result<Self> {
        let total: f64 = side_preferences.values().sum();
        if (1.0 - total).abs() > 0.001 {
            return Err(Error::config("side preferences must sum to 1"));
        }
        Ok(Self {
            given_cost,
            side_preferences,
        })
    }
}

impl CostFunction for SideCost {
    fn cost(&self, node: usize, _last_action: Option<usize>, graph: &GraphView<'_>) -> Result<f64> {
        let cluster = &graph.graph.node(node).cluster;
        let preference =
            self.side_preferences
                .get(cluster)
                .ok_or_else(|| Error::MissingNodeAttribute {
                    node,
                    attribute: format!("side preference for cluster '{cluster}'"),
                    context: "side cost".to_string(),
                })?;
        let equitable = 1.0 / self.side_preferences.len() as f64;
        Ok(-(preference / equitable * self.given_cost))
    }
}

/// Cost growing with Euclidean distance from the previously clicked node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceCost {
    pub given_cost: f64,
    pub distance_multiplier: f64,
    pub max_penalty: Option<f64>,
}

impl Default for DistanceCost {
    fn default() -> Self {
        Self {
            given_cost: 1.0,
            distance_multiplier: 1.2,
            max_penalty: None,
        }
    }
}

impl CostFunction for DistanceCost {
    fn cost(&self, node: usize, last_action: Option<usize>, graph: &GraphView<'_>) -> Result<f64> {
        let from = last_action.unwrap_or_else(|| graph.graph.initial());
        let here = layout(graph, node)?;
        let there = layout(graph, from)?;
        let distance = ((here[0] - there[0]).powi(2) + (here[1] - there[1]).powi(2)).sqrt();
        let penalty = self.given_cost + self.distance_multiplier * distance;
        Ok(match self.max_penalty {
            Some(max) => -penalty.min(max),
            None => -penalty,
        })
    }
}

fn layout(graph: &GraphView<'_>, node: usize) -> Result<[f64; 2]> {
    graph
        .graph
        .node(node)
        .layout
        .ok_or_else(|| Error::MissingNodeAttribute {
            node,
            attribute: "layout".to_string(),
            context: "distance cost".to_string(),
        })
}

/// Which structural relatives of revealed nodes incur the added cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// Parents of revealed nodes.
    Backward,
    /// Children of revealed nodes.
    Forward,
    /// Parents or children of revealed nodes.
    Neighbor,
}

/// Search-direction-dependent cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchCost {
    pub direction: SearchDirection,
    pub added_cost: f64,
    pub inspection_cost: f64,
    pub include_start: bool,
}

impl SearchCost {
    pub fn new(direction: SearchDirection) -> Self {
        Self {
            direction,
            added_cost: 1.0,
            inspection_cost: 1.0,
            include_start: false,
        }
    }
}

impl CostFunction for SearchCost {
    fn cost(&self, node: usize, _last_action: Option<usize>, graph: &GraphView<'_>) -> Result<f64> {
        let g = graph.graph;
        let related = graph
            .revealed_nodes(self.include_start)
            .into_iter()
            .any(|revealed| match self.direction {
                SearchDirection::Backward => g.predecessors(revealed).contains(&node),
                SearchDirection::Forward => g.successors(revealed).contains(&node),
                SearchDirection::Neighbor => g.neighbors(revealed).any(|n| n == node),
            });
        if related {
            Ok(-(self.inspection_cost + self.added_cost))
        } else {
            Ok(-self.inspection_cost)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mouselab::graph::{MdpGraph, StructureProperties};

    fn graph() -> MdpGraph {
        let props = StructureProperties::from_json(
            r#"{
                "layout": {"0": [0, 0], "1": [0, -1], "2": [1, -1], "3": [-1, -1]},
                "initial": "0",
                "graph": {"0": {"up": [0, "1"]}, "1": {"right": [0, "2"], "left": [0, "3"]},
                          "2": {}, "3": {}}
            }"#,
        )
        .unwrap();
        MdpGraph::from_adjacency(&[vec![1], vec![2, 3], vec![], vec![]], Some(&props)).unwrap()
    }

    #[test]
    fn flat_cost_is_negative() {
        let g = graph();
        let revealed = [true, false, false, false];
        let view = GraphView::new(&g, &revealed);
        assert_eq!(FlatCost(1.0).cost(1, None, &view).unwrap(), -1.0);
        assert_eq!(FlatCost(-2.5).cost(1, None, &view).unwrap(), -2.5);
    }

    #[test]
    fn linear_depth_scales_with_depth() {
        let g = graph();
        let revealed = [true, false, false, false];
        let view = GraphView::new(&g, &revealed);
        let cost = LinearDepthCost::new(1.0, 1.0);
        assert_eq!(cost.cost(0, None, &view).unwrap(), 0.0);
        assert_eq!(cost.cost(1, None, &view).unwrap(), -2.0);
        assert_eq!(cost.cost(3, None, &view).unwrap(), -3.0);
    }

    #[test]
    fn side_cost_requires_normalized_preferences() {
        let prefs = HashMap::from([("up".to_string(), 0.5)]);
        assert!(SideCost::new(1.0, prefs).is_err());
    }

    #[test]
    fn side_cost_redistributes_by_cluster() {
        let g = graph();
        let revealed = [true, false, false, false];
        let view = GraphView::new(&g, &revealed);
        let prefs = HashMap::from([("up".to_string(), 0.75), ("down".to_string(), 0.25)]);
        let cost = SideCost::new(2.0, prefs).unwrap();
        assert_eq!(cost.cost(2, None, &view).unwrap(), -3.0);
    }

    #[test]
    fn distance_cost_adjacent_nodes() {
        let g = graph();
        let revealed = [true, true, false, false];
        let view = GraphView::new(&g, &revealed);
        let cost = DistanceCost {
            given_cost: 1.0,
            distance_multiplier: 1.0,
            max_penalty: None,
        };
        assert_eq!(cost.cost(2, Some(1), &view).unwrap(), -2.0);
        assert_eq!(cost.cost(1, None, &view).unwrap(), -2.0);

        let capped = DistanceCost {
            max_penalty: Some(1.5),
            ..cost
        };
        assert_eq!(capped.cost(2, Some(1), &view).unwrap(), -1.5);
    }

    #[test]
    fn distance_cost_needs_layout() {
        let g = MdpGraph::from_adjacency(&[vec![1], vec![]], None).unwrap();
        let revealed = [true, false];
        let view = GraphView::new(&g, &revealed);
        assert!(DistanceCost::default().cost(1, Some(0), &view).is_err());
    }

    #[test]
    fn search_costs_follow_direction() {
        let g = graph();
        // node 1 revealed: parent 0, children 2 and 3
        let revealed = [true, true, false, false];
        let view = GraphView::new(&g, &revealed);

        let forward = SearchCost::new(SearchDirection::Forward);
        assert_eq!(forward.cost(2, None, &view).unwrap(), -2.0);

        let backward = SearchCost::new(SearchDirection::Backward);
        assert_eq!(backward.cost(2, None, &view).unwrap(), -1.0);
        assert_eq!(backward.cost(0, None, &view).unwrap(), -2.0);

        let neighbor = SearchCost::new(SearchDirection::Neighbor);
        assert_eq!(neighbor.cost(3, None, &view).unwrap(), -2.0);
    }

    #[test]
    fn search_cost_start_inclusion() {
        let g = graph();
        let revealed = [true, false, false, false];
        let view = GraphView::new(&g, &revealed);
        let mut forward = SearchCost::new(SearchDirection::Forward);
        assert_eq!(forward.cost(1, None, &view).unwrap(), -1.0);
        forward.include_start = true;
        assert_eq!(forward.cost(1, None, &view).unwrap(), -2.0);
    }
}
