//! Every route from the roots down to one type

use crate::node::ComponentNode;
use crate::tree::TreeBuilder;
use std::sync::Arc;
use trellis_core::{GuardedPath, Type};

enum Frame {
    Enter(ComponentNode),
    /// `fresh` is false when the node's type was already on the path.
    Exit { fresh: bool },
}

pub struct PathResolver<'t, 'a> {
    tree: &'t TreeBuilder<'a>,
}

impl<'t, 'a> PathResolver<'t, 'a> {
    pub fn new(tree: &'t TreeBuilder<'a>) -> Self {
        PathResolver { tree }
    }

    /// Depth-first search below each root. A path ends at the first node
    /// wrapping `target`; repetition nodes are never descended into.
    pub fn compute_paths(&self, target: &Type, roots: &[ComponentNode]) -> Vec<Vec<ComponentNode>> {
        let mut paths = Vec::new();

        for root in roots {
            let mut path: Vec<ComponentNode> = Vec::new();
            let mut types: GuardedPath<Arc<Type>> = GuardedPath::new();
            let mut stack = vec![Frame::Enter(root.clone())];

            while let Some(frame) = stack.pop() {
                let node = match frame {
                    Frame::Enter(node) => node,
                    Frame::Exit { fresh } => {
                        path.pop();
                        if fresh {
                            types.pop();
                        }
                        continue;
                    }
                };

                let fresh = types.push(Arc::clone(&node.value));
                path.push(node.clone());
                stack.push(Frame::Exit { fresh });

                if *node.value == *target {
                    paths.push(path.clone());
                    continue;
                }
                if !fresh || node.is_repetition() {
                    continue;
                }

                let children = self.tree.children(&node);
                stack.extend(children.into_iter().rev().map(Frame::Enter));
            }
        }

        tracing::debug!("Found {} paths to {}", paths.len(), target);
        paths
    }
}
