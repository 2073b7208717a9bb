//! Huffman code tree over a fixed-capacity node arena.
//!
//! Nodes live in a single pre-sized `Vec` and refer to each other by
//! [`NodeId`]. Parent links are plain indices, so the encoder can walk
//! leaf-to-root and the decoder root-to-leaf without any shared ownership.
//!
//! # Merge Order
//!
//! The tree is a pure function of the [`FrequencyTable`], which lets the
//! decoder rebuild exactly the tree the encoder used:
//! 1. One leaf per table entry, in increasing byte order
//! 2. Stable sort by descending frequency
//! 3. Join the last two entries (left = second-to-last, right = last)
//! 4. Insert the new node after every entry whose frequency is >= its own
//! 5. Repeat until one node remains
//!
//! A table with a single symbol gets a synthetic root whose left child is
//! that symbol and whose right child is absent, giving it the 1-bit code `1`.

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result, TreeError};
use crate::frequency::{FrequencyTable, ALPHABET_SIZE};

/// Arena capacity: a full binary tree over the whole byte alphabet.
pub const MAX_NODES: usize = 2 * ALPHABET_SIZE - 1;

/// Longest possible code: a fully skewed tree over 256 leaves has depth 255.
pub const MAX_CODE_LEN: usize = ALPHABET_SIZE;

/// Position of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u16);

impl NodeId {
    /// Sentinel for "no parent" / "no child".
    pub const NONE: NodeId = NodeId(u16::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the code tree.
///
/// Leaves have no children and carry a symbol; internal nodes carry the
/// summed frequency of their children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub frequency: f64,
    pub symbol: u8,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn left(&self) -> NodeId {
        self.left
    }

    pub fn right(&self) -> NodeId {
        self.right
    }
}

/// A code word, stored root-first.
///
/// Bit `i` is the edge taken at depth `i`: `true` for a left child,
/// `false` for a right child.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Code {
    words: [u64; MAX_CODE_LEN / 64],
    len: u16,
}

impl Code {
    pub const EMPTY: Code = Code {
        words: [0; MAX_CODE_LEN / 64],
        len: 0,
    };

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at depth `i`.
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.len());
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    /// Bits in transmission order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(move |i| self.bit(i))
    }

    fn push(&mut self, bit: bool) {
        let i = self.len();
        debug_assert!(i < MAX_CODE_LEN);
        if bit {
            self.words[i / 64] |= 1 << (i % 64);
        }
        self.len += 1;
    }

    fn reversed(&self) -> Code {
        let mut out = Code::EMPTY;
        for i in (0..self.len()).rev() {
            out.push(self.bit(i));
        }
        out
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({self})")
    }
}

/// One row of a tree's symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolCode {
    pub symbol: u8,
    pub frequency: f64,
    pub code: Code,
}

/// A Huffman code tree and its symbol index.
#[derive(Debug, Clone)]
pub struct CodeTree {
    nodes: Vec<Node>,
    leaves: [NodeId; ALPHABET_SIZE],
    root: NodeId,
}

impl CodeTree {
    fn with_arena() -> Self {
        Self {
            nodes: Vec::with_capacity(MAX_NODES),
            leaves: [NodeId::NONE; ALPHABET_SIZE],
            root: NodeId::NONE,
        }
    }

    fn alloc(&mut self, node: Node) -> std::result::Result<NodeId, TreeError> {
        if self.nodes.len() >= MAX_NODES {
            return Err(TreeError::ArenaExhausted {
                capacity: MAX_NODES,
            });
        }
        let id = NodeId(self.nodes.len() as u16);
        self.nodes.push(node);
        Ok(id)
    }

    fn add_leaf(&mut self, symbol: u8, frequency: f64) -> std::result::Result<NodeId, TreeError> {
        let id = self.alloc(Node {
            frequency,
            symbol,
            parent: NodeId::NONE,
            left: NodeId::NONE,
            right: NodeId::NONE,
        })?;
        self.leaves[symbol as usize] = id;
        Ok(id)
    }

    /// Create the parent of `left` and `right`. `right` may be
    /// [`NodeId::NONE`] for the single-symbol root.
    fn join(&mut self, left: NodeId, right: NodeId) -> std::result::Result<NodeId, TreeError> {
        let mut frequency = self.nodes[left.index()].frequency;
        if !right.is_none() {
            frequency += self.nodes[right.index()].frequency;
        }
        let id = self.alloc(Node {
            frequency,
            symbol: 0,
            parent: NodeId::NONE,
            left,
            right,
        })?;
        self.nodes[left.index()].parent = id;
        if !right.is_none() {
            self.nodes[right.index()].parent = id;
        }
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node at `id`, or `None` for [`NodeId::NONE`] and ids outside the
    /// arena.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The child reached by `bit` (left for `true`), possibly
    /// [`NodeId::NONE`].
    pub fn child(&self, id: NodeId, bit: bool) -> NodeId {
        match self.node(id) {
            Some(node) if bit => node.left,
            Some(node) => node.right,
            None => NodeId::NONE,
        }
    }

    /// The leaf holding `symbol`, if the symbol is in the table.
    pub fn leaf(&self, symbol: u8) -> Option<NodeId> {
        let id = self.leaves[symbol as usize];
        (!id.is_none()).then_some(id)
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of symbols with a leaf.
    pub fn symbol_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Code word for `symbol`, derived by walking from its leaf up to the
    /// root and reversing the collected edges.
    pub fn code(&self, symbol: u8) -> Option<Code> {
        let mut node = self.leaf(symbol)?;
        let mut code = Code::EMPTY;
        loop {
            let parent = self.nodes[node.index()].parent;
            if parent.is_none() {
                break;
            }
            code.push(self.nodes[parent.index()].left == node);
            node = parent;
        }
        Some(code.reversed())
    }

    /// Code words indexed by byte value.
    pub fn codes(&self) -> Vec<Option<Code>> {
        (0..=u8::MAX).map(|symbol| self.code(symbol)).collect()
    }

    /// `(symbol, code length)` for every symbol, in byte order.
    pub fn code_lengths(&self) -> Vec<(u8, usize)> {
        self.table()
            .into_iter()
            .map(|row| (row.symbol, row.code.len()))
            .collect()
    }

    /// Every symbol with its frequency and code, in byte order.
    pub fn table(&self) -> Vec<SymbolCode> {
        (0..=u8::MAX)
            .filter_map(|symbol| {
                let leaf = self.leaf(symbol)?;
                let code = self.code(symbol)?;
                Some(SymbolCode {
                    symbol,
                    frequency: self.nodes[leaf.index()].frequency,
                    code,
                })
            })
            .collect()
    }

    /// Expected code length in bits per input byte.
    pub fn average_code_length(&self) -> f64 {
        self.table()
            .iter()
            .map(|row| row.frequency * row.code.len() as f64)
            .sum()
    }
}

/// Build the code tree for `table`.
///
/// # Errors
/// - `Error::EmptyInput` if the table has no entries
/// - `TreeError::ArenaExhausted` if the arena overflows, which a valid
///   table cannot cause
pub fn build_tree(table: &FrequencyTable) -> Result<CodeTree> {
    if table.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut tree = CodeTree::with_arena();
    let mut working = Vec::with_capacity(table.len());
    for &(symbol, frequency) in table.entries() {
        working.push(tree.add_leaf(symbol, frequency)?);
    }

    if let &[only] = working.as_slice() {
        tree.root = tree.join(only, NodeId::NONE)?;
        debug!(symbol = tree.nodes[only.index()].symbol, "built single-symbol code tree");
        return Ok(tree);
    }

    // stable, so equal frequencies keep byte order
    working.sort_by(|&a, &b| {
        tree.nodes[b.index()]
            .frequency
            .total_cmp(&tree.nodes[a.index()].frequency)
    });

    while let &[.., left, right] = working.as_slice() {
        working.truncate(working.len() - 2);
        let parent = tree.join(left, right)?;
        let frequency = tree.nodes[parent.index()].frequency;
        let at = working.partition_point(|&id| tree.nodes[id.index()].frequency >= frequency);
        working.insert(at, parent);
    }

    tree.root = working[0];
    debug!(
        symbols = table.len(),
        nodes = tree.node_count(),
        "built code tree"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u8, f64)]) -> FrequencyTable {
        FrequencyTable::from_entries(entries.to_vec()).unwrap()
    }

    fn code_str(tree: &CodeTree, symbol: u8) -> String {
        tree.code(symbol).unwrap().to_string()
    }

    #[test]
    fn test_two_symbols() {
        let tree = build_tree(&table(&[(b'A', 0.75), (b'B', 0.25)])).unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(code_str(&tree, b'A'), "1");
        assert_eq!(code_str(&tree, b'B'), "0");
        assert_eq!(tree.code(b'C'), None);
    }

    #[test]
    fn test_skewed_four_symbols() {
        let tree = build_tree(&table(&[
            (b'A', 0.5),
            (b'B', 0.25),
            (b'C', 0.125),
            (b'D', 0.125),
        ]))
        .unwrap();

        assert_eq!(code_str(&tree, b'A'), "1");
        assert_eq!(code_str(&tree, b'B'), "01");
        assert_eq!(code_str(&tree, b'C'), "001");
        assert_eq!(code_str(&tree, b'D'), "000");
        assert!((tree.average_code_length() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_equal_frequency_tie_break() {
        let tree = build_tree(&table(&[(1, 0.25), (2, 0.25), (3, 0.25), (4, 0.25)])).unwrap();

        // (3, 4) merges first and sorts ahead of the leaves; (1, 2) merges
        // next and lands after it
        assert_eq!(code_str(&tree, 1), "01");
        assert_eq!(code_str(&tree, 2), "00");
        assert_eq!(code_str(&tree, 3), "11");
        assert_eq!(code_str(&tree, 4), "10");
    }

    #[test]
    fn test_determinism() {
        let t = table(&[
            (0, 0.1),
            (10, 0.1),
            (20, 0.2),
            (30, 0.05),
            (40, 0.05),
            (50, 0.3),
            (60, 0.2),
        ]);
        let a = build_tree(&t).unwrap();
        let b = build_tree(&t).unwrap();
        assert_eq!(a.codes(), b.codes());
        assert_eq!(a.code_lengths(), b.code_lengths());
    }

    #[test]
    fn test_optimality_two_symbols() {
        let tree = build_tree(&table(&[(7, 0.9), (8, 0.1)])).unwrap();
        assert_eq!(tree.code(7).unwrap().len(), 1);
    }

    #[test]
    fn test_single_symbol() {
        let tree = build_tree(&table(&[(b'Z', 1.0)])).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.symbol_count(), 1);
        assert_eq!(code_str(&tree, b'Z'), "1");

        let root = tree.root();
        assert!(!tree.node(root).unwrap().is_leaf());
        assert!(tree.child(root, false).is_none());
        assert_eq!(tree.child(root, true), tree.leaf(b'Z').unwrap());
    }

    #[test]
    fn test_sentinel_lookups() {
        let tree = build_tree(&table(&[(b'a', 0.5), (b'b', 0.5)])).unwrap();
        assert!(tree.node(NodeId::NONE).is_none());
        assert!(tree.node(NodeId(tree.node_count() as u16)).is_none());
        assert!(tree.child(NodeId::NONE, true).is_none());
        assert!(tree.child(NodeId::NONE, false).is_none());
    }

    #[test]
    fn test_empty_table() {
        let result = build_tree(&FrequencyTable::default());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_full_alphabet() {
        let entries: Vec<(u8, f64)> = (0..=255u8).map(|b| (b, 1.0 / 256.0)).collect();
        let tree = build_tree(&table(&entries)).unwrap();

        assert_eq!(tree.node_count(), MAX_NODES);
        assert!(tree.code_lengths().iter().all(|&(_, len)| len == 8));
    }

    #[test]
    fn test_full_binary_tree_shape() {
        let tree = build_tree(&table(&[
            (1, 0.4),
            (2, 0.3),
            (3, 0.15),
            (4, 0.1),
            (5, 0.05),
        ]))
        .unwrap();

        assert_eq!(tree.node_count(), 2 * 5 - 1);
        assert!(tree.node(tree.root()).unwrap().parent().is_none());
        for i in 0..tree.node_count() {
            let id = NodeId(i as u16);
            let node = tree.node(id).unwrap();
            if node.is_leaf() {
                continue;
            }
            for child in [node.left(), node.right()] {
                assert!(!child.is_none());
                assert_eq!(tree.node(child).unwrap().parent(), id);
            }
        }
    }

    #[test]
    fn test_codes_longer_than_a_word() {
        // probabilities 1/2, 1/4, ... produce a fully skewed tree
        let mut entries: Vec<(u8, f64)> = (0..99u8).map(|i| (i, 0.5f64.powi(i as i32 + 1))).collect();
        entries.push((99, 0.5f64.powi(99)));
        let tree = build_tree(&table(&entries)).unwrap();

        assert_eq!(tree.code(0).unwrap().len(), 1);
        assert_eq!(tree.code(70).unwrap().len(), 71);
        assert_eq!(tree.code(98).unwrap().len(), 99);
        assert_eq!(tree.code(99).unwrap().len(), 99);
        assert_eq!(code_str(&tree, 98), format!("{}1", "0".repeat(98)));
    }

    #[test]
    fn test_prefix_free() {
        let tree = build_tree(&table(&[
            (b'a', 0.3),
            (b'b', 0.3),
            (b'c', 0.2),
            (b'd', 0.1),
            (b'e', 0.1),
        ]))
        .unwrap();
        let codes: Vec<String> = tree.table().iter().map(|r| r.code.to_string()).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_str()), "{a} is a prefix of {b}");
                }
            }
        }
    }
}
