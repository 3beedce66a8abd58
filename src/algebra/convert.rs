use std::cell::RefCell;
use std::hash::{BuildHasher, Hash};

use hashbrown::HashTable;
use rapidhash::quality::RandomState;
use serde::Deserialize;

use crate::algebra::{Algebra, ExprId, Node};

/// Wire form of an [`Algebra`]: just the node vector. The intern table is
/// derived data and is rebuilt on the way in.
#[derive(Deserialize)]
#[serde(bound = "T: for<'a> Deserialize<'a>")]
pub(crate) struct AlgebraShadow<T> {
    nodes: Vec<Node<T>>,
}

impl<T: Hash + Eq> From<AlgebraShadow<T>> for Algebra<T> {
    fn from(value: AlgebraShadow<T>) -> Self {
        Algebra::from_nodes(value.nodes)
    }
}

impl<T: Hash + Eq> Algebra<T> {
    pub(crate) fn from_nodes(nodes: Vec<Node<T>>) -> Self {
        let hasher = RandomState::new();
        let mut table = HashTable::with_capacity(nodes.len());
        // skip the two singletons; alloc never looks them up
        for (idx, node) in nodes.iter().enumerate().skip(2) {
            let hash = hasher.hash_one(node);
            // every node in a valid algebra is unique
            table.insert_unique(hash, ExprId::new(idx), |&id| hasher.hash_one(&nodes[id.idx()]));
        }
        Self {
            nodes: RefCell::new(nodes),
            table: RefCell::new(table),
            hasher,
        }
    }
}

#[cfg(feature = "fast-binary")]
mod impl_fast_binary {
    use std::hash::Hash;

    use bitcode::{Decode, Encode};

    use crate::algebra::{Algebra, Node};

    impl<T: Encode> Algebra<T> {
        pub fn to_bitcode_bytes(&self) -> Vec<u8> {
            bitcode::encode(&*self.nodes.borrow())
        }
    }

    impl<T: Hash + Eq + for<'a> Decode<'a>> Algebra<T> {
        pub fn from_bitcode_bytes(bytes: &[u8]) -> Result<Self, bitcode::Error> {
            let nodes: Vec<Node<T>> = bitcode::decode(bytes)?;
            Ok(Self::from_nodes(nodes))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::algebra::{Algebra, ExprId};

    #[test]
    fn serde_round_trip_rebuilds_the_intern_table() {
        let algebra = Algebra::new();
        let foo = algebra.literal("foo".chars());
        let bar = algebra.literal("bar".chars());
        let either = algebra.alternation([foo, bar]);

        let wire = serde_json::to_string(&algebra).unwrap();
        let thawed: Algebra<char> = serde_json::from_str(&wire).unwrap();

        assert_eq!(thawed.node_count(), algebra.node_count());
        // interning still works: known ids come back, not fresh ones
        assert_eq!(thawed.literal("foo".chars()), foo);
        assert_eq!(thawed.alternation([foo, bar]), either);
        assert_eq!(thawed.node(either), algebra.node(either));
    }

    #[test]
    fn clone_preserves_ids() {
        let algebra = Algebra::new();
        let x = algebra.literal([1, 2]);
        let cloned = algebra.clone();
        assert_eq!(cloned.literal([1, 2]), x);
        assert_eq!(cloned.node(ExprId::EMPTY), algebra.node(ExprId::EMPTY));
    }
}
