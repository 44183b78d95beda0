use crate::store::NodeId;
use crate::types::BitIndex;

//------------ Node ----------------------------------------------------------

// A single trie entry. Next to the payload it carries the four structural
// links that make uplink-based traversal work without a parent stack:
// `parent` points down-tree toward the root, `left`/`right` are the child
// edges (either of which may loop back to the node itself or to an
// ancestor), and `predecessor` names the node whose uplink terminates here.
//
// Links are arena indices. `left` is always a valid index: a child edge that
// points at the node's own slot encodes the self-loop of an external node.
// `right` and `parent` are `None` only at the root sentinel.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub key: Option<K>,
    pub value: Option<V>,
    pub bit_index: BitIndex,
    pub parent: Option<NodeId>,
    pub left: NodeId,
    pub right: Option<NodeId>,
    pub predecessor: NodeId,
}

impl<K, V> Node<K, V> {
    // A freshly allocated node is its own predecessor and self-loops on the
    // left until the splice routine rewires it.
    pub(crate) fn new(
        key: Option<K>,
        value: Option<V>,
        bit_index: BitIndex,
        own_id: NodeId,
    ) -> Self {
        Node {
            key,
            value,
            bit_index,
            parent: None,
            left: own_id,
            right: None,
            predecessor: own_id,
        }
    }

    /// True only for the root sentinel while no zero-bit key is stored.
    pub(crate) fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    /// Neither child edge loops back onto the node itself.
    pub(crate) fn is_internal(&self, own_id: NodeId) -> bool {
        self.left != own_id && self.right != Some(own_id)
    }

    pub(crate) fn set_key_value(&mut self, key: K, value: V) -> Option<V> {
        self.key = Some(key);
        self.value.replace(value)
    }
}
