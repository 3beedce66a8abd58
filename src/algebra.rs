use std::cell::RefCell;
use std::hash::{BuildHasher, Hash};

use hashbrown::HashTable;
use rapidhash::quality::RandomState;
use serde::{Deserialize, Serialize};

mod basic;
mod convert;
mod term;

pub use term::Term;

/// A handle to an expression within an [`Algebra`].
///
/// This is a lightweight wrapper around a `u32` index into the algebra's node
/// vector. Because every canonical expression is interned exactly once,
/// comparing two `ExprId`s from the same algebra is structural equality of
/// the expressions they denote, and the id itself is the content-derived
/// identity used to key memoization tables.
///
/// Ids are assigned in construction order, so for a fixed construction
/// sequence they are stable across runs of the same build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "fast-binary", derive(bitcode::Encode, bitcode::Decode))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// The expression matching only the empty sequence.
    pub const EMPTY: Self = Self(0);
    /// The expression matching no sequence at all.
    pub const NOTHING: Self = Self(1);

    pub(crate) fn new(idx: usize) -> Self {
        Self(idx as u32)
    }
    pub(crate) fn raw(&self) -> u32 {
        self.0
    }
    pub(crate) fn idx(&self) -> usize {
        self.0 as usize
    }
}

/// One canonical expression node over the alphabet `T`.
///
/// Nodes are stored in a flat vector within an [`Algebra`]. Composite
/// variants reference their children via [`ExprId`]s, and children are always
/// created before their parents, so the stored graph is acyclic by
/// construction.
///
/// The smart constructors on [`Algebra`] are the only way to build composite
/// nodes, and they maintain the canonical-form invariants:
///
/// * `Literal` holds at least one symbol.
/// * `Alternation`, `Concatenation`, and `Intersection` hold at least two
///   children, never a child of their own variant.
/// * `Alternation` and `Intersection` hold no duplicates; `Alternation`
///   holds no `Nothing` and no `Optional` (an optional alternative is split
///   into its inner expression plus `Empty`).
/// * `Concatenation` holds no `Empty`; a `Nothing` child collapses the whole
///   concatenation to `Nothing`.
/// * `Optional` and `Repetition` never wrap `Empty`, `Nothing`, `Optional`,
///   or `Repetition`.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "fast-binary", derive(bitcode::Encode, bitcode::Decode))]
pub enum Node<T> {
    /// Matches only the empty sequence.
    Empty,
    /// Matches no sequence; the additive zero of the algebra.
    Nothing,
    /// Matches exactly this sequence of symbols.
    Literal(Vec<T>),
    /// Matches whatever any of the children matches.
    Alternation(Vec<ExprId>),
    /// Matches the children's languages in order.
    Concatenation(Vec<ExprId>),
    /// Matches only what every child matches.
    Intersection(Vec<ExprId>),
    /// Matches the child or the empty sequence.
    Optional(ExprId),
    /// Matches zero or more repetitions of the child (Kleene star).
    Repetition(ExprId),
}

/// An interning arena of canonical sequence expressions.
///
/// `Algebra` stores expressions as a deduplicated flat vector of [`Node`]s.
/// Every structurally identical canonical node is stored exactly once, so an
/// [`ExprId`] doubles as a content hash: equal ids, equal expressions. All
/// construction goes through smart constructors that normalize on the fly —
/// identity elements disappear, nested variants flatten, duplicates collapse,
/// and `Nothing` annihilates where the algebra demands.
///
/// Construction works through `&self`: the arena uses interior mutability so
/// that the [`Term`] operator sugar can build expressions from shared
/// references. As a consequence the type is single-threaded by design; use
/// one `Algebra` per thread.
///
/// # Example
///
/// ```rust
/// use seqlang::{Algebra, ExprId};
///
/// let algebra = Algebra::new();
/// let foo = algebra.literal("foo".chars());
/// let bar = algebra.literal("bar".chars());
///
/// // foo | bar, with canonicalization: duplicates are dropped.
/// let either = algebra.alternation([foo, bar, foo]);
/// assert_eq!(either, algebra.alternation([foo, bar]));
///
/// // Identity elements vanish.
/// assert_eq!(algebra.concatenation([ExprId::EMPTY, foo]), foo);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(from = "convert::AlgebraShadow<T>")]
#[serde(bound = "T: Serialize + for<'a> Deserialize<'a> + Hash + Eq")]
pub struct Algebra<T> {
    pub(crate) nodes: RefCell<Vec<Node<T>>>,
    #[serde(skip)]
    pub(crate) table: RefCell<HashTable<ExprId>>,
    #[serde(skip)]
    pub(crate) hasher: RandomState,
}

impl<T> Default for Algebra<T> {
    fn default() -> Self {
        Self {
            // the two singletons live at fixed indices
            nodes: RefCell::new(vec![Node::Empty, Node::Nothing]),
            table: RefCell::new(HashTable::new()),
            hasher: RandomState::new(),
        }
    }
}

impl<T: Clone + Hash + Eq> Clone for Algebra<T> {
    fn clone(&self) -> Self {
        Self::from_nodes(self.nodes.borrow().clone())
    }
}

impl<T> Algebra<T> {
    /// Creates a new algebra containing only [`Node::Empty`] and
    /// [`Node::Nothing`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of interned nodes, the two singletons included.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }
}

impl<T: Clone> Algebra<T> {
    /// Returns a copy of the node behind `id`.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this algebra.
    pub fn node(&self, id: ExprId) -> Node<T> {
        let nodes = self.nodes.borrow();
        match nodes.get(id.idx()) {
            Some(node) => node.clone(),
            None => panic!(
                "invalid ExprId: id {} does not exist in this algebra. The algebra has {} nodes.",
                id.raw(),
                nodes.len(),
            ),
        }
    }
}

impl<T: Hash + Eq> Algebra<T> {
    pub(crate) fn alloc(&self, node: Node<T>) -> ExprId {
        if let Node::Empty = node {
            return ExprId::EMPTY;
        }
        if let Node::Nothing = node {
            return ExprId::NOTHING;
        }

        let mut nodes = self.nodes.borrow_mut();
        let mut table = self.table.borrow_mut();
        let hash = self.hasher.hash_one(&node);

        if let Some(&id) = table.find(hash, |&id| nodes[id.idx()] == node) {
            return id; // duplicate node
        }

        let id = ExprId::new(nodes.len());
        nodes.push(node);
        table.insert_unique(hash, id, |&id| self.hasher.hash_one(&nodes[id.idx()]));
        id
    }
}
