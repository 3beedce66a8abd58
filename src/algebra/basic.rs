use std::fmt::Display;
use std::hash::Hash;

use itertools::Itertools;

use crate::algebra::{Algebra, ExprId, Node};

fn push_unique(parts: &mut Vec<ExprId>, id: ExprId) {
    if !parts.contains(&id) {
        parts.push(id);
    }
}

impl<T: Clone + Hash + Eq> Algebra<T> {
    /// The expression matching only the empty sequence.
    pub fn empty(&self) -> ExprId {
        ExprId::EMPTY
    }

    /// The expression matching no sequence at all.
    pub fn nothing(&self) -> ExprId {
        ExprId::NOTHING
    }

    /// Creates the expression matching exactly `values`.
    ///
    /// Zero symbols yield [`ExprId::EMPTY`]; a literal node always holds at
    /// least one symbol.
    ///
    /// # Example
    /// ```rust
    /// # use seqlang::{Algebra, ExprId};
    /// let algebra = Algebra::new();
    /// let foo = algebra.literal("foo".chars());
    ///
    /// assert_eq!(foo, algebra.literal("foo".chars())); // interned once
    /// assert_eq!(algebra.literal("".chars()), ExprId::EMPTY);
    /// ```
    pub fn literal<I>(&self, values: I) -> ExprId
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return ExprId::EMPTY;
        }
        self.alloc(Node::Literal(values))
    }

    /// Creates the concatenation of `children`, in order.
    ///
    /// This method acts as a **smart constructor**:
    ///
    /// * **Identity:** `Empty · e` -> `e`.
    /// * **Annihilation:** a `Nothing` child collapses the result to
    ///   `Nothing`.
    /// * **Flattening:** nested concatenations are spliced in place.
    /// * **Singleton:** one surviving child is returned unwrapped; zero
    ///   survivors yield `Empty`.
    pub fn concatenation<I>(&self, children: I) -> ExprId
    where
        I: IntoIterator<Item = ExprId>,
    {
        let mut parts = Vec::new();
        for child in children {
            match self.node(child) {
                Node::Nothing => return ExprId::NOTHING,
                Node::Empty => {}
                Node::Concatenation(inner) => parts.extend(inner),
                _ => parts.push(child),
            }
        }
        match parts.len() {
            0 => ExprId::EMPTY,
            1 => parts[0],
            _ => self.alloc(Node::Concatenation(parts)),
        }
    }

    /// Creates the alternation of `children`.
    ///
    /// This method acts as a **smart constructor**:
    ///
    /// * **Identity:** `Nothing | e` -> `e`.
    /// * **Idempotence:** duplicate alternatives are dropped; the first
    ///   occurrence decides the position.
    /// * **Flattening:** nested alternations are spliced in place.
    /// * **Optionals:** an `Optional(e)` alternative contributes `e` and
    ///   `Empty` as separate alternatives.
    /// * **Singleton:** one surviving child is returned unwrapped; zero
    ///   survivors yield `Nothing`.
    pub fn alternation<I>(&self, children: I) -> ExprId
    where
        I: IntoIterator<Item = ExprId>,
    {
        let mut parts = Vec::new();
        for child in children {
            match self.node(child) {
                Node::Nothing => {}
                Node::Alternation(inner) => {
                    for id in inner {
                        push_unique(&mut parts, id);
                    }
                }
                Node::Optional(inner) => {
                    // an alternation never holds Optional children; an inner
                    // alternation must be spliced to keep the form flat
                    match self.node(inner) {
                        Node::Alternation(grand) => {
                            for id in grand {
                                push_unique(&mut parts, id);
                            }
                        }
                        _ => push_unique(&mut parts, inner),
                    }
                    push_unique(&mut parts, ExprId::EMPTY);
                }
                _ => push_unique(&mut parts, child),
            }
        }
        match parts.len() {
            0 => ExprId::NOTHING,
            1 => parts[0],
            _ => self.alloc(Node::Alternation(parts)),
        }
    }

    /// Creates the intersection of `children`.
    ///
    /// This method acts as a **smart constructor**:
    ///
    /// * **Annihilation:** a `Nothing` child collapses the result to
    ///   `Nothing`.
    /// * **Idempotence:** duplicate requirements are dropped; the first
    ///   occurrence decides the position.
    /// * **Flattening:** nested intersections are spliced in place.
    /// * **Singleton:** one surviving child is returned unwrapped.
    ///
    /// `Empty` is deliberately *not* absorbed: `Empty & repetition(x)`
    /// denotes the language `{ε}`, so the `Empty` requirement must survive.
    ///
    /// # Panics
    /// Panics when called with no expressions at all — the intersection of
    /// zero requirements would be the universal language, which has no
    /// representation here.
    pub fn intersection<I>(&self, children: I) -> ExprId
    where
        I: IntoIterator<Item = ExprId>,
    {
        let mut parts = Vec::new();
        for child in children {
            match self.node(child) {
                Node::Nothing => return ExprId::NOTHING,
                Node::Intersection(inner) => {
                    for id in inner {
                        push_unique(&mut parts, id);
                    }
                }
                _ => push_unique(&mut parts, child),
            }
        }
        match parts.len() {
            0 => panic!(
                "intersection requires at least one expression: the universal language has no representation"
            ),
            1 => parts[0],
            _ => self.alloc(Node::Intersection(parts)),
        }
    }

    /// Creates the expression matching `child` or the empty sequence.
    ///
    /// Absorptions: `Optional(Optional(e))` -> `Optional(e)`,
    /// `Optional(Repetition(e))` -> `Repetition(e)`, and both `Empty` and
    /// `Nothing` collapse to `Empty`.
    pub fn optional(&self, child: ExprId) -> ExprId {
        match self.node(child) {
            Node::Empty | Node::Nothing => ExprId::EMPTY,
            Node::Optional(_) | Node::Repetition(_) => child,
            _ => self.alloc(Node::Optional(child)),
        }
    }

    /// Creates the expression matching zero or more repetitions of `child`.
    ///
    /// Absorptions: `Repetition(Repetition(e))` -> `Repetition(e)`,
    /// `Repetition(Optional(e))` -> `Repetition(e)`, and both `Empty` and
    /// `Nothing` collapse to `Empty`.
    pub fn repetition(&self, child: ExprId) -> ExprId {
        match self.node(child) {
            Node::Empty | Node::Nothing => ExprId::EMPTY,
            Node::Repetition(_) => child,
            Node::Optional(inner) => self.repetition(inner),
            _ => self.alloc(Node::Repetition(child)),
        }
    }
}

impl<T: Display> Algebra<T> {
    /// Renders the expression behind `id`.
    ///
    /// Literals print their symbols juxtaposed, composites print
    /// parenthesized with `|`, `&`, or nothing between children, and the
    /// unary forms print postfix `?` and `*`. The two singletons print as
    /// `ε` and `∅`.
    ///
    /// # Example
    /// ```rust
    /// # use seqlang::Algebra;
    /// let algebra = Algebra::new();
    /// let a = algebra.literal(['a']);
    /// let b = algebra.literal(['b']);
    /// let expr = algebra.concatenation([algebra.repetition(a), b]);
    ///
    /// assert_eq!(algebra.to_string(expr), "(a*b)");
    /// ```
    pub fn to_string(&self, id: ExprId) -> String {
        let nodes = self.nodes.borrow();
        render(&nodes, id)
    }
}

fn render<T: Display>(nodes: &[Node<T>], id: ExprId) -> String {
    match &nodes[id.idx()] {
        Node::Empty => "ε".to_owned(),
        Node::Nothing => "∅".to_owned(),
        Node::Literal(values) => values.iter().join(""),
        Node::Alternation(children) => {
            format!("({})", children.iter().map(|&c| render(nodes, c)).join("|"))
        }
        Node::Concatenation(children) => {
            format!("({})", children.iter().map(|&c| render(nodes, c)).join(""))
        }
        Node::Intersection(children) => {
            format!("({})", children.iter().map(|&c| render(nodes, c)).join("&"))
        }
        Node::Optional(child) => format!("{}?", render_tight(nodes, *child)),
        Node::Repetition(child) => format!("{}*", render_tight(nodes, *child)),
    }
}

// multi-symbol literals need parentheses under a postfix operator
fn render_tight<T: Display>(nodes: &[Node<T>], id: ExprId) -> String {
    match &nodes[id.idx()] {
        Node::Literal(values) if values.len() > 1 => format!("({})", values.iter().join("")),
        _ => render(nodes, id),
    }
}

#[cfg(test)]
mod tests {
    use crate::algebra::{Algebra, ExprId, Node};

    #[test]
    fn literals_are_interned_once() {
        let algebra = Algebra::new();
        let a = algebra.literal([1, 2, 3]);
        let b = algebra.literal([1, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, algebra.literal([1, 2]));
    }

    #[test]
    fn empty_literal_is_empty() {
        let algebra: Algebra<i32> = Algebra::new();
        assert_eq!(algebra.literal([]), ExprId::EMPTY);
    }

    #[test]
    fn empty_is_concatenation_identity() {
        let algebra = Algebra::new();
        let x = algebra.literal([7]);
        assert_eq!(algebra.concatenation([algebra.empty(), x]), x);
        assert_eq!(algebra.concatenation([x, algebra.empty()]), x);
    }

    #[test]
    fn concatenation_is_associative() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let y = algebra.literal([2]);
        let z = algebra.literal([3]);
        let left = algebra.concatenation([algebra.concatenation([x, y]), z]);
        let right = algebra.concatenation([x, algebra.concatenation([y, z])]);
        assert_eq!(left, right);
    }

    #[test]
    fn nothing_annihilates_concatenation() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        assert_eq!(algebra.concatenation([algebra.nothing(), x]), ExprId::NOTHING);
        assert_eq!(algebra.concatenation([x, algebra.nothing()]), ExprId::NOTHING);
    }

    #[test]
    fn alternation_is_associative_and_idempotent() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let y = algebra.literal([2]);
        let z = algebra.literal([3]);
        let left = algebra.alternation([algebra.alternation([x, y]), z]);
        let right = algebra.alternation([x, algebra.alternation([y, z])]);
        assert_eq!(left, right);
        assert_eq!(algebra.alternation([x, x]), x);
    }

    #[test]
    fn alternation_drops_nothing() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        assert_eq!(algebra.alternation([algebra.nothing(), x]), x);
    }

    #[test]
    fn alternation_keeps_first_seen_order() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let y = algebra.literal([2]);
        let forward = algebra.alternation([x, y]);
        let backward = algebra.alternation([y, x]);
        assert_ne!(forward, backward); // order is part of the canonical form
        assert_eq!(algebra.node(forward), Node::Alternation(vec![x, y]));
    }

    #[test]
    fn optional_alternative_splits_into_inner_and_empty() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let y = algebra.literal([2]);
        let with_optional = algebra.alternation([algebra.optional(x), y]);
        assert_eq!(
            algebra.node(with_optional),
            Node::Alternation(vec![x, ExprId::EMPTY, y])
        );
    }

    #[test]
    fn intersection_is_associative_and_idempotent() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let y = algebra.literal([2]);
        let z = algebra.literal([3]);
        let left = algebra.intersection([algebra.intersection([x, y]), z]);
        let right = algebra.intersection([x, algebra.intersection([y, z])]);
        assert_eq!(left, right);
        assert_eq!(algebra.intersection([x, x]), x);
    }

    #[test]
    fn nothing_annihilates_intersection() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        assert_eq!(algebra.intersection([x, algebra.nothing()]), ExprId::NOTHING);
    }

    #[test]
    fn intersection_keeps_empty() {
        let algebra = Algebra::new();
        let star = algebra.repetition(algebra.literal([1]));
        let both = algebra.intersection([algebra.empty(), star]);
        assert_eq!(
            algebra.node(both),
            Node::Intersection(vec![ExprId::EMPTY, star])
        );
    }

    #[test]
    #[should_panic]
    fn intersection_of_nothing_at_all_panics() {
        let algebra: Algebra<i32> = Algebra::new();
        algebra.intersection([]);
    }

    #[test]
    fn optional_absorptions() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let opt = algebra.optional(x);
        assert_eq!(algebra.optional(opt), opt);
        assert_eq!(algebra.optional(algebra.empty()), ExprId::EMPTY);
        assert_eq!(algebra.optional(algebra.nothing()), ExprId::EMPTY);

        let star = algebra.repetition(x);
        assert_eq!(algebra.optional(star), star);
    }

    #[test]
    fn repetition_absorptions() {
        let algebra = Algebra::new();
        let x = algebra.literal([1]);
        let star = algebra.repetition(x);
        assert_eq!(algebra.repetition(star), star);
        assert_eq!(algebra.repetition(algebra.optional(x)), star);
        assert_eq!(algebra.repetition(algebra.empty()), ExprId::EMPTY);
        assert_eq!(algebra.repetition(algebra.nothing()), ExprId::EMPTY);
    }

    #[test]
    fn structurally_equal_nodes_hash_equal() {
        use std::hash::{BuildHasher, RandomState};

        let algebra = Algebra::new();
        let x = algebra.literal(['a', 'b']);
        let left = algebra.node(algebra.alternation([x, algebra.literal(['c'])]));
        let right = algebra.node(algebra.alternation([x, algebra.literal(['c'])]));
        assert_eq!(left, right);

        let state = RandomState::new();
        assert_eq!(state.hash_one(&left), state.hash_one(&right));
    }

    #[test]
    fn rendering_is_compact() {
        let algebra = Algebra::new();
        let foo = algebra.literal("foo".chars());
        let bar = algebra.literal("bar".chars());
        let either = algebra.alternation([foo, bar]);
        assert_eq!(algebra.to_string(either), "(foo|bar)");
        assert_eq!(algebra.to_string(algebra.repetition(foo)), "(foo)*");
        assert_eq!(algebra.to_string(ExprId::EMPTY), "ε");
        assert_eq!(algebra.to_string(ExprId::NOTHING), "∅");
    }

    #[test]
    #[should_panic]
    fn foreign_id_panics() {
        let algebra: Algebra<i32> = Algebra::new();
        algebra.node(ExprId::new(99));
    }
}
