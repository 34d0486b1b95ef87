//! Node indexing and lazy pre-order traversal of outline trees.

use std::collections::HashMap;
use std::slice;

use crate::domain::TreeNode;
use crate::error::{Error, Result};

/// Lookup from node id to node.
pub type NodeIndex<N> = HashMap<String, N>;

/// Indexes nodes by id.
///
/// Duplicate ids are resolved deterministically: the last occurrence in
/// `nodes` wins.
pub fn index_nodes<N: TreeNode>(nodes: Vec<N>) -> NodeIndex<N> {
    let mut index = HashMap::with_capacity(nodes.len());
    for node in nodes {
        index.insert(node.id().to_string(), node);
    }
    index
}

/// Walks the tree rooted at `root_id`, yielding each root-to-node path.
pub fn traverse<'a, N: TreeNode>(index: &'a NodeIndex<N>, root_id: &str) -> Traverse<'a, N> {
    Traverse {
        index,
        root: Some(root_id.to_string()),
        path: Vec::new(),
        pending: Vec::new(),
    }
}

/// Pre-order, depth-first iterator over path contexts.
///
/// `path[i]` always owns `pending[i]`, the not-yet-visited children of that
/// node, so the stack holds at most one iterator per tree level.
pub struct Traverse<'a, N> {
    index: &'a NodeIndex<N>,
    root: Option<String>,
    path: Vec<&'a N>,
    pending: Vec<slice::Iter<'a, String>>,
}

impl<'a, N: TreeNode> Traverse<'a, N> {
    fn enter(&mut self, id: &str) -> Result<Vec<&'a N>> {
        let node = self
            .index
            .get(id)
            .ok_or_else(|| Error::MissingNode(id.to_string()))?;
        self.path.push(node);
        self.pending.push(node.children().iter());
        Ok(self.path.clone())
    }

    fn fail(&mut self, err: Error) -> Option<Result<Vec<&'a N>>> {
        self.path.clear();
        self.pending.clear();
        Some(Err(err))
    }
}

impl<'a, N: TreeNode> Iterator for Traverse<'a, N> {
    type Item = Result<Vec<&'a N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            return match self.enter(&root) {
                Ok(context) => Some(Ok(context)),
                Err(err) => self.fail(err),
            };
        }

        loop {
            let next_child = self.pending.last_mut()?.next();
            match next_child {
                Some(id) => {
                    return match self.enter(id) {
                        Ok(context) => Some(Ok(context)),
                        Err(err) => self.fail(err),
                    };
                }
                None => {
                    self.pending.pop();
                    self.path.pop();
                }
            }
        }
    }
}
