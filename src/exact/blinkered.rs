//! Blinkered action subsetting.
//!
//! After taking an action the solver may restrict which nodes the
//! continuation is allowed to reveal. The restriction is carried as an
//! [`ActionSubset`] and becomes part of the memoization key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, mouselab::Tree};

/// Per-node mask of actions the continuation may take.
///
/// The terminal action is always allowed and is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionSubset {
    nodes: Vec<bool>,
}

impl ActionSubset {
    /// Subset allowing exactly `allowed` among `n` nodes.
    pub fn from_nodes(n: usize, allowed: impl IntoIterator<Item = usize>) -> Self {
        let mut nodes = vec![false; n];
        for node in allowed {
            if let Some(slot) = nodes.get_mut(node) {
                *slot = true;
            }
        }
        Self { nodes }
    }

    /// Only the terminal action remains.
    pub fn terminal_only(n: usize) -> Self {
        Self {
            nodes: vec![false; n],
        }
    }

    /// Every action remains.
    pub fn all(n: usize) -> Self {
        Self {
            nodes: vec![true; n],
        }
    }

    /// Whether `action` may be taken; actions past the last node are terminal.
    pub fn allows(&self, action: usize) -> bool {
        self.nodes.get(action).copied().unwrap_or(true)
    }

    pub fn mask(&self) -> &[bool] {
        &self.nodes
    }

    pub fn allowed_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, allowed)| **allowed)
            .map(|(node, _)| node)
    }
}

/// How the continuation is restricted after a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Blinkered {
    /// No restriction.
    #[default]
    None,
    /// Descendants of the revealed node and its ancestors.
    Recursive,
    /// Descendants of the revealed node.
    Children,
    /// The root branch containing the revealed node.
    Branch,
    /// The revealed node itself.
    SingleAction,
}

impl Blinkered {
    /// Subset for the continuation after `action`, or `None` when
    /// unrestricted. The terminal action leaves only termination.
    pub fn subset(&self, tree: &Tree, action: usize) -> Option<ActionSubset> {
        let n = tree.len();
        if *self == Blinkered::None {
            return None;
        }
        if action >= n {
            return Some(ActionSubset::terminal_only(n));
        }

        let others = |nodes: &[usize]| -> Vec<usize> {
            nodes.iter().copied().filter(|&node| node != action).collect()
        };
        let allowed = match self {
            Blinkered::None => return None,
            Blinkered::Recursive => {
                let mut nodes = others(tree.subtree(action));
                nodes.extend(others(&tree.path_to(action)));
                nodes
            }
            Blinkered::Children => others(tree.subtree(action)),
            Blinkered::Branch => tree.relevant_subtree(action).to_vec(),
            Blinkered::SingleAction => vec![action],
        };
        Some(ActionSubset::from_nodes(n, allowed))
    }
}

impl fmt::Display for Blinkered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Blinkered::None => "none",
            Blinkered::Recursive => "recursive",
            Blinkered::Children => "children",
            Blinkered::Branch => "branch",
            Blinkered::SingleAction => "single-action",
        };
        f.write_str(label)
    }
}

impl FromStr for Blinkered {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "false" => Ok(Blinkered::None),
            "recursive" => Ok(Blinkered::Recursive),
            "children" => Ok(Blinkered::Children),
            "branch" => Ok(Blinkered::Branch),
            "single-action" | "single_action" => Ok(Blinkered::SingleAction),
            _ => Err(Error::ParseOption {
                option: "blinkered".to_string(),
                input: s.to_string(),
                expected: "none, recursive, children, branch, single-action".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(subset: &ActionSubset) -> Vec<usize> {
        subset.allowed_nodes().collect()
    }

    #[test]
    fn unrestricted_mode_has_no_subset() {
        let tree = Tree::symmetric(&[3, 1, 2]);
        assert!(Blinkered::None.subset(&tree, 2).is_none());
    }

    #[test]
    fn terminal_action_leaves_only_termination() {
        let tree = Tree::symmetric(&[3, 1, 2]);
        let subset = Blinkered::Branch.subset(&tree, tree.len()).unwrap();
        assert!(nodes(&subset).is_empty());
        assert!(subset.allows(tree.len()));
    }

    #[test]
    fn modes_select_expected_nodes() {
        let tree = Tree::symmetric(&[3, 1, 2]);
        let children = Blinkered::Children.subset(&tree, 6).unwrap();
        assert_eq!(nodes(&children), vec![7, 8]);

        let recursive = Blinkered::Recursive.subset(&tree, 6).unwrap();
        assert_eq!(nodes(&recursive), vec![0, 5, 7, 8]);

        let branch = Blinkered::Branch.subset(&tree, 7).unwrap();
        assert_eq!(nodes(&branch), vec![5, 6, 7, 8]);

        let single = Blinkered::SingleAction.subset(&tree, 7).unwrap();
        assert_eq!(nodes(&single), vec![7]);
        assert!(single.allows(13));
        assert!(!single.allows(8));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("single_action".parse::<Blinkered>().unwrap(), Blinkered::SingleAction);
        assert_eq!(Blinkered::Children.to_string().parse::<Blinkered>().unwrap(), Blinkered::Children);
        assert!("sideways".parse::<Blinkered>().is_err());
    }
}
