use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TreeError;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a node. Two nodes with equal text are still different
/// nodes unless they share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Child indices leading from a root to one of its nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{step}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Terminal,
    Nonterminal,
}

#[derive(Debug)]
struct Node {
    id: NodeId,
    kind: NodeKind,
    /// Literal text for terminals, rule name for nonterminals.
    symbol: String,
    /// `None` marks an open nonterminal that has not been expanded yet.
    children: Option<Vec<DerivationTree>>,
}

/// Immutable derivation tree. Cloning is cheap and shares the whole
/// structure; edits return a new tree that reuses every untouched sub-tree.
#[derive(Debug, Clone)]
pub struct DerivationTree(Arc<Node>);

impl DerivationTree {
    /// Terminal carrying literal text.
    pub fn leaf(text: impl Into<String>) -> Self {
        Self::build(NodeId::fresh(), NodeKind::Terminal, text.into(), Some(Vec::new()))
    }

    /// Unexpanded nonterminal placeholder.
    pub fn open(symbol: impl Into<String>) -> Self {
        Self::build(NodeId::fresh(), NodeKind::Nonterminal, symbol.into(), None)
    }

    /// Expanded nonterminal.
    pub fn node(symbol: impl Into<String>, children: Vec<DerivationTree>) -> Self {
        Self::build(NodeId::fresh(), NodeKind::Nonterminal, symbol.into(), Some(children))
    }

    fn build(
        id: NodeId,
        kind: NodeKind,
        symbol: String,
        children: Option<Vec<DerivationTree>>,
    ) -> Self {
        Self(Arc::new(Node {
            id,
            kind,
            symbol,
            children,
        }))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }

    pub fn children(&self) -> Option<&[DerivationTree]> {
        self.0.children.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.0.kind == NodeKind::Terminal
    }

    pub fn is_open(&self) -> bool {
        self.0.children.is_none()
    }

    /// True when no node anywhere below (or at) this one is still open.
    pub fn is_complete(&self) -> bool {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree.children() {
                None => return false,
                Some(children) => stack.extend(children),
            }
        }
        true
    }

    /// Literal pieces in tree order. Terminals and open nodes contribute their
    /// symbol, expanded nonterminals contribute nothing themselves.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            match tree.children() {
                Some(children) if !tree.is_terminal() => stack.extend(children.iter().rev()),
                _ => out.push(tree.symbol()),
            }
        }
        out
    }

    pub fn render(&self) -> String {
        self.leaves().concat()
    }

    /// Locates the node with the given identity.
    pub fn find_path(&self, id: NodeId) -> Option<Path> {
        let mut stack = vec![(self, Path::root())];
        while let Some((tree, path)) = stack.pop() {
            if tree.id() == id {
                return Some(path);
            }
            if let Some(children) = tree.children() {
                for (index, child) in children.iter().enumerate().rev() {
                    stack.push((child, path.child(index)));
                }
            }
        }
        None
    }

    pub fn get(&self, path: &Path) -> Option<&DerivationTree> {
        let mut current = self;
        for &index in path.as_slice() {
            current = current.children()?.get(index)?;
        }
        Some(current)
    }

    /// First node (pre-order) whose symbol is `symbol`.
    pub fn find_first(&self, symbol: &str) -> Option<&DerivationTree> {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            if tree.symbol() == symbol {
                return Some(tree);
            }
            if let Some(children) = tree.children() {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    /// Returns a new tree with the node at `path` replaced by `replacement`.
    /// Nodes on the way down keep their ids; everything off that spine is
    /// shared with `self`.
    pub fn replace_at_path(
        &self,
        path: &Path,
        replacement: DerivationTree,
    ) -> Result<DerivationTree, TreeError> {
        self.replace_steps(path.as_slice(), replacement)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))
    }

    fn replace_steps(&self, steps: &[usize], replacement: DerivationTree) -> Option<Self> {
        let Some((&index, rest)) = steps.split_first() else {
            return Some(replacement);
        };
        let children = self.children()?;
        let new_child = children.get(index)?.replace_steps(rest, replacement)?;
        let mut new_children = children.to_vec();
        new_children[index] = new_child;
        Some(Self::build(
            self.id(),
            self.0.kind,
            self.symbol().to_string(),
            Some(new_children),
        ))
    }

    /// Same children under a different symbol, as a new node.
    pub fn with_symbol(&self, symbol: impl Into<String>) -> Self {
        Self::build(
            NodeId::fresh(),
            self.0.kind,
            symbol.into(),
            self.0.children.clone(),
        )
    }

    /// Whether `other` is this very node (or a clone of the handle).
    pub fn shares_node(&self, other: &DerivationTree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.leaves() {
            f.write_str(piece)?;
        }
        Ok(())
    }
}
