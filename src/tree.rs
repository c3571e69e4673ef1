//! Linking flat records into a rooted tree.
//!
//! [`TreeBuilder`] takes two extractors, one for a record's own id and one for the id of its
//! head (parent), plus the sentinel id that marks "headed by the virtual root". Records matching
//! the optional skip predicate stay out of the tree. The result is an arena [`Tree`] borrowing the
//! records; each node knows its parent and its children in sequence order.
//!
//! Building fails, rather than guessing, when the references do not form exactly one tree:
//! no root, several roots, a head that names no record, duplicate or missing ids, and records
//! that can never be reached from the root (members of a head cycle).
//!
//! ## Examples
//!
//! ```rust
//! use conll_schema::TreeBuilder;
//!
//! // (id, head)
//! let records = vec![("1", "2"), ("2", "0"), ("3", "2")];
//! let builder = TreeBuilder::new(
//!     "0".to_string(),
//!     |r: &(&str, &str)| Some(r.0.to_string()),
//!     |r: &(&str, &str)| Some(r.1.to_string()),
//! );
//! let tree = builder.build(&records).unwrap();
//!
//! let root = tree.root();
//! assert_eq!(root.data().0, "2");
//! let children: Vec<&str> = root.children().map(|c| c.data().0).collect();
//! assert_eq!(children, vec!["1", "3"]);
//! ```

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<'a, R> {
    data: &'a R,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A rooted tree over borrowed records.
///
/// Node ids follow the order of the participating records in the input sequence.
#[derive(Debug)]
pub struct Tree<'a, R> {
    nodes: Vec<Node<'a, R>>,
    root: NodeId,
}

impl<'a, R> Tree<'a, R> {
    #[must_use]
    pub fn root(&self) -> TreeNode<'_, R> {
        TreeNode {
            tree: self,
            id: self.root,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<TreeNode<'_, R>> {
        (id.0 < self.nodes.len()).then_some(TreeNode { tree: self, id })
    }

    /// Depth-first, pre-order traversal starting at the root.
    pub fn iter(&self) -> Iter<'_, R> {
        Iter {
            tree: self,
            stack: vec![self.root],
        }
    }
}

/// A view of one node.
pub struct TreeNode<'t, R> {
    tree: &'t Tree<'t, R>,
    id: NodeId,
}

impl<R> Clone for TreeNode<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for TreeNode<'_, R> {}

impl<R: fmt::Debug> fmt::Debug for TreeNode<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("data", self.data())
            .field("children", &self.tree.nodes[self.id.0].children)
            .finish()
    }
}

impl<'t, R> TreeNode<'t, R> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The record at this node.
    #[must_use]
    pub fn data(&self) -> &'t R {
        self.tree.nodes[self.id.0].data
    }

    /// The parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<TreeNode<'t, R>> {
        self.tree.nodes[self.id.0].parent.map(|id| TreeNode {
            tree: self.tree,
            id,
        })
    }

    /// Children in sequence order.
    pub fn children(&self) -> impl Iterator<Item = TreeNode<'t, R>> + 't {
        let tree = self.tree;
        tree.nodes[self.id.0]
            .children
            .iter()
            .map(move |&id| TreeNode { tree, id })
    }

    #[must_use]
    pub fn child(&self, i: usize) -> Option<TreeNode<'t, R>> {
        self.tree.nodes[self.id.0]
            .children
            .get(i)
            .map(|&id| TreeNode {
                tree: self.tree,
                id,
            })
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.nodes[self.id.0].children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tree.nodes[self.id.0].parent.is_none()
    }
}

/// Pre-order iterator over a [`Tree`].
pub struct Iter<'t, R> {
    tree: &'t Tree<'t, R>,
    stack: Vec<NodeId>,
}

impl<'t, R> Iterator for Iter<'t, R> {
    type Item = TreeNode<'t, R>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(TreeNode {
            tree: self.tree,
            id,
        })
    }
}

type Extract<'f, R, K> = Box<dyn Fn(&R) -> Option<K> + 'f>;

/// Builds a [`Tree`] from a sequence of records.
///
/// The builder holds no records; one builder can build any number of trees.
pub struct TreeBuilder<'f, R, K> {
    starting_id: K,
    id: Extract<'f, R, K>,
    head: Extract<'f, R, K>,
    skip: Option<Box<dyn Fn(&R) -> bool + 'f>>,
}

impl<'f, R, K> TreeBuilder<'f, R, K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    /// `id` and `head` return `None` when a record has no usable value, which fails the build.
    pub fn new<I, H>(starting_id: K, id: I, head: H) -> Self
    where
        I: Fn(&R) -> Option<K> + 'f,
        H: Fn(&R) -> Option<K> + 'f,
    {
        TreeBuilder {
            starting_id,
            id: Box::new(id),
            head: Box::new(head),
            skip: None,
        }
    }

    /// Records for which `pred` is true are left out of the tree.
    #[must_use]
    pub fn skip<S>(mut self, pred: S) -> Self
    where
        S: Fn(&R) -> bool + 'f,
    {
        self.skip = Some(Box::new(pred));
        self
    }

    /// Links `records` into a tree.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingId`] / [`Error::MissingHead`] when an extractor yields nothing
    /// - [`Error::DuplicateId`] when two participating records share an id
    /// - [`Error::DanglingHead`] when a head names no participating record
    /// - [`Error::NoRoot`] / [`Error::MultipleRoots`] unless exactly one record is headed by the
    ///   starting id
    /// - [`Error::Unattached`] for records that cannot be reached from the root
    pub fn build<'a>(&self, records: &'a [R]) -> Result<Tree<'a, R>> {
        let mut members: Vec<(&'a R, K)> = Vec::new();
        let mut index: HashMap<K, usize> = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            if self.skip.as_ref().is_some_and(|skip| skip(record)) {
                continue;
            }
            let id = (self.id)(record).ok_or(Error::MissingId { position })?;
            if index.contains_key(&id) {
                return Err(Error::DuplicateId { id: id.to_string() });
            }
            index.insert(id.clone(), members.len());
            members.push((record, id));
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; members.len()];
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); members.len()];
        let mut roots: Vec<usize> = Vec::new();
        for (i, (record, id)) in members.iter().enumerate() {
            let head = (self.head)(*record).ok_or_else(|| Error::MissingHead { id: id.to_string() })?;
            if head == self.starting_id {
                roots.push(i);
                continue;
            }
            let parent = *index.get(&head).ok_or_else(|| Error::DanglingHead {
                id: id.to_string(),
                head: head.to_string(),
            })?;
            parents[i] = Some(NodeId(parent));
            children[parent].push(NodeId(i));
        }

        let root = match roots.as_slice() {
            [] => {
                return Err(Error::NoRoot {
                    starting_id: self.starting_id.to_string(),
                })
            }
            [root] => *root,
            many => {
                return Err(Error::MultipleRoots {
                    starting_id: self.starting_id.to_string(),
                    count: many.len(),
                })
            }
        };

        let mut reached = vec![false; members.len()];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            reached[i] = true;
            stack.extend(children[i].iter().map(|c| c.0));
        }
        let unattached: Vec<String> = members
            .iter()
            .zip(&reached)
            .filter(|(_, reached)| !**reached)
            .map(|((_, id), _)| id.to_string())
            .collect();
        if !unattached.is_empty() {
            return Err(Error::Unattached { ids: unattached });
        }

        debug!(
            target: "conll_schema::tree",
            nodes = members.len(),
            skipped = records.len() - members.len(),
            "Tree built"
        );

        let nodes = members
            .into_iter()
            .zip(parents)
            .zip(children)
            .map(|(((data, _), parent), children)| Node {
                data,
                parent,
                children,
            })
            .collect();
        Ok(Tree {
            nodes,
            root: NodeId(root),
        })
    }
}
