//! Tree structure of a Mouselab environment.

use std::collections::{HashMap, VecDeque};

use crate::{Error, Result};

/// Rooted tree over node indices `0..n`, node 0 being the root.
///
/// Structural queries used by the solver (subtrees, root paths, branch
/// membership, subtree shapes) are precomputed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    children: Vec<Vec<usize>>,
    parent: Vec<Option<usize>>,
    depth: Vec<usize>,
    subtree: Vec<Vec<usize>>,
    shape: Vec<usize>,
    paths: Vec<Vec<usize>>,
}

impl Tree {
    /// Build a tree from parent→children adjacency lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the lists are empty, reference
    /// unknown nodes or the root as a child, give a node two parents, or leave
    /// nodes unreachable from the root.
    pub fn new(children: Vec<Vec<usize>>) -> Result<Self> {
        let n = children.len();
        if n == 0 {
            return Err(Error::config("tree must contain a root node"));
        }

        let mut parent = vec![None; n];
        for (node, kids) in children.iter().enumerate() {
            for &child in kids {
                if child >= n {
                    return Err(Error::config(format!(
                        "node {node} lists child {child} outside 0..{n}"
                    )));
                }
                if child == 0 {
                    return Err(Error::config(format!("node {node} lists the root as a child")));
                }
                if parent[child].is_some() {
                    return Err(Error::config(format!("node {child} has more than one parent")));
                }
                parent[child] = Some(node);
            }
        }

        let mut depth = vec![usize::MAX; n];
        let mut queue = VecDeque::from([0usize]);
        depth[0] = 0;
        while let Some(node) = queue.pop_front() {
            for &child in &children[node] {
                depth[child] = depth[node] + 1;
                queue.push_back(child);
            }
        }
        if let Some(orphan) = depth.iter().position(|d| *d == usize::MAX) {
            return Err(Error::config(format!("node {orphan} is not reachable from the root")));
        }

        let mut tree = Self {
            children,
            parent,
            depth,
            subtree: vec![Vec::new(); n],
            shape: vec![0; n],
            paths: Vec::new(),
        };
        tree.subtree = (0..n).map(|node| tree.collect_subtree(node)).collect();
        tree.shape = tree.compute_shapes();
        tree.paths = tree.collect_paths();
        Ok(tree)
    }

    /// Symmetric tree with `branching[d]` children for every node at depth `d`.
    ///
    /// Nodes are numbered in depth-first pre-order, so every subtree occupies a
    /// contiguous index range.
    pub fn symmetric(branching: &[usize]) -> Self {
        fn expand(depth: usize, branching: &[usize], children: &mut Vec<Vec<usize>>) -> usize {
            let idx = children.len();
            children.push(Vec::new());
            let fan_out = branching.get(depth).copied().unwrap_or(0);
            for _ in 0..fan_out {
                let child = expand(depth + 1, branching, children);
                children[idx].push(child);
            }
            idx
        }

        let mut children = Vec::new();
        expand(0, branching, &mut children);
        // pre-order construction always yields a valid tree
        match Self::new(children) {
            Ok(tree) => tree,
            Err(_) => unreachable!("symmetric construction produced an invalid tree"),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.children
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    pub fn depth(&self, node: usize) -> usize {
        self.depth[node]
    }

    /// `node` followed by all of its descendants in pre-order.
    pub fn subtree(&self, node: usize) -> &[usize] {
        &self.subtree[node]
    }

    /// Nodes from the root down to `node`, inclusive.
    pub fn path_to(&self, node: usize) -> Vec<usize> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent[current] {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Root-to-leaf paths, excluding the root itself.
    pub fn paths(&self) -> &[Vec<usize>] {
        &self.paths
    }

    /// Subtree of the root child whose branch contains `node`.
    ///
    /// The root's own branch is the whole tree.
    pub fn relevant_subtree(&self, node: usize) -> &[usize] {
        self.children[0]
            .iter()
            .map(|&child| self.subtree(child))
            .find(|subtree| subtree.contains(&node))
            .unwrap_or_else(|| self.subtree(0))
    }

    /// Index range of `node`'s subtree, if its indices are contiguous.
    pub fn subtree_range(&self, node: usize) -> Option<std::ops::Range<usize>> {
        let subtree = &self.subtree[node];
        let contiguous = subtree
            .iter()
            .enumerate()
            .all(|(offset, &member)| member == node + offset);
        contiguous.then(|| node..node + subtree.len())
    }

    /// Structural shape identifier; equal ids mean isomorphic ordered subtrees.
    pub fn shape(&self, node: usize) -> usize {
        self.shape[node]
    }

    fn collect_subtree(&self, node: usize) -> Vec<usize> {
        let mut out = vec![node];
        for &child in &self.children[node] {
            out.extend(self.collect_subtree(child));
        }
        out
    }

    fn compute_shapes(&self) -> Vec<usize> {
        fn visit(
            tree: &Tree,
            node: usize,
            interned: &mut HashMap<Vec<usize>, usize>,
            shapes: &mut [usize],
        ) -> usize {
            let signature: Vec<usize> = tree.children[node]
                .iter()
                .map(|&child| visit(tree, child, interned, shapes))
                .collect();
            let next_id = interned.len();
            let id = *interned.entry(signature).or_insert(next_id);
            shapes[node] = id;
            id
        }

        let mut shapes = vec![0; self.len()];
        let mut interned = HashMap::new();
        visit(self, 0, &mut interned, &mut shapes);
        shapes
    }

    fn collect_paths(&self) -> Vec<Vec<usize>> {
        fn walk(tree: &Tree, node: usize, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if tree.children[node].is_empty() {
                if !prefix.is_empty() {
                    out.push(prefix.clone());
                }
                return;
            }
            for &child in &tree.children[node] {
                prefix.push(child);
                walk(tree, child, prefix, out);
                prefix.pop();
            }
        }

        let mut paths = Vec::new();
        walk(self, 0, &mut Vec::new(), &mut paths);
        paths
    }
}
