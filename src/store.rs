use std::ops::{Index, IndexMut};

use crate::node::Node;
use crate::types::BitIndex;

//------------ NodeId --------------------------------------------------------

/// The index of a node in the backing arena.
///
/// The trie is a graph with self-loops and back-pointing edges, so nodes
/// refer to each other by arena index instead of by owning pointer. This also
/// keeps a node's identity stable across the splicing that removal performs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct NodeId(u32);

/// The root sentinel always occupies the first slot.
pub(crate) const ROOT: NodeId = NodeId(0);

//------------ NodeStore -----------------------------------------------------

// Vec-backed arena holding all nodes of one trie. Released slots are kept on
// a free list and handed out again before the Vec grows.
#[derive(Clone, Debug)]
pub(crate) struct NodeStore<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
}

impl<K, V> NodeStore<K, V> {
    pub(crate) fn init() -> Self {
        let root = Node::new(None, None, BitIndex::Root, ROOT);
        NodeStore {
            nodes: vec![root],
            free: Vec::new(),
        }
    }

    /// Place a new node, reusing a released slot when one is available.
    pub(crate) fn store_node(
        &mut self,
        key: K,
        value: Option<V>,
        bit_index: BitIndex,
    ) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0 as usize] =
                    Node::new(Some(key), value, bit_index, id);
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node::new(Some(key), value, bit_index, id));
                id
            }
        }
    }

    /// Return a spliced-out node's slot to the free list. The payload must
    /// already have been taken out, so an iterator that still holds the
    /// index cannot resurrect state through it.
    pub(crate) fn release_node(&mut self, id: NodeId) {
        debug_assert!(id != ROOT);
        debug_assert!(self.nodes[id.0 as usize].is_empty());
        self.nodes[id.0 as usize] = Node::new(None, None, BitIndex::Root, id);
        self.free.push(id);
    }
}

impl<K, V> Index<NodeId> for NodeStore<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.0 as usize]
    }
}

impl<K, V> IndexMut<NodeId> for NodeStore<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.0 as usize]
    }
}
