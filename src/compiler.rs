use std::cell::RefCell;
use std::collections::BTreeSet;
use std::hash::Hash;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use rapidhash::quality::RandomState;

use crate::algebra::{Algebra, ExprId, Node};
use crate::dfa::{Dfa, State};
use crate::errors::Error;

/// Tuning knobs for a [`Compiler`].
pub struct CompilerConfig {
    /// The maximum number of distinct derivative states any single
    /// construction may discover.
    ///
    /// Canonicalization keeps the derivative space of every well-formed
    /// expression finite, so hitting this limit indicates a normalization
    /// bug rather than a big input; the resulting error carries the root
    /// expression for diagnosis. Raise the limit for genuinely enormous
    /// expressions.
    pub max_states: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { max_states: 10_000 }
    }
}

type Memo<K, V> = RefCell<HashMap<K, V, RandomState>>;

fn memo<K, V>() -> Memo<K, V> {
    RefCell::new(HashMap::with_hasher(RandomState::new()))
}

/// Answers semantic queries about expressions and compiles them to [`Dfa`]s.
///
/// A compiler is a container of memoization tables keyed by expression
/// identity: nullability, starting elements, satisfiability, and Brzozowski
/// derivatives. Once computed, a cached result is never invalidated, and a
/// failed computation caches nothing. Compilers borrow their [`Algebra`] and
/// are cheap to instantiate, one per compilation if need be.
///
/// # Example
/// ```rust
/// use seqlang::{Algebra, Compiler};
///
/// let algebra = Algebra::new();
/// let expr = algebra.repetition(algebra.literal("ab".chars()));
///
/// let compiler = Compiler::new(&algebra);
/// assert!(compiler.matches_empty(expr));
///
/// let dfa = compiler.compile(expr).unwrap();
/// assert!(dfa.matches(&['a', 'b', 'a', 'b']));
/// assert!(!dfa.matches(&['a']));
/// ```
pub struct Compiler<'a, T> {
    algebra: &'a Algebra<T>,
    config: CompilerConfig,
    nullable: Memo<ExprId, bool>,
    starts: Memo<ExprId, Rc<BTreeSet<T>>>,
    satisfiable: Memo<ExprId, bool>,
    derivatives: Memo<(ExprId, T), ExprId>,
}

impl<'a, T: Clone + Ord + Hash> Compiler<'a, T> {
    /// Creates a compiler with the default configuration.
    pub fn new(algebra: &'a Algebra<T>) -> Self {
        Self::with_config(algebra, CompilerConfig::default())
    }

    pub fn with_config(algebra: &'a Algebra<T>, config: CompilerConfig) -> Self {
        Self {
            algebra,
            config,
            nullable: memo(),
            starts: memo(),
            satisfiable: memo(),
            derivatives: memo(),
        }
    }

    /// Whether the empty sequence is in the language of `expr`.
    pub fn matches_empty(&self, expr: ExprId) -> bool {
        if let Some(&known) = self.nullable.borrow().get(&expr) {
            return known;
        }
        let result = match self.algebra.node(expr) {
            Node::Empty => true,
            Node::Nothing | Node::Literal(_) => false,
            Node::Alternation(children) => children.iter().any(|&c| self.matches_empty(c)),
            Node::Concatenation(children) | Node::Intersection(children) => {
                children.iter().all(|&c| self.matches_empty(c))
            }
            Node::Optional(_) | Node::Repetition(_) => true,
        };
        self.nullable.borrow_mut().insert(expr, result);
        result
    }

    /// The symbols that may begin a sequence in the language of `expr`.
    ///
    /// For a concatenation this walks past nullable prefixes: every child
    /// whose preceding children are all nullable contributes its starting
    /// elements, up to and including the first non-nullable child.
    pub fn starting_elements(&self, expr: ExprId) -> Rc<BTreeSet<T>> {
        if let Some(known) = self.starts.borrow().get(&expr) {
            return Rc::clone(known);
        }
        let result = match self.algebra.node(expr) {
            Node::Empty | Node::Nothing => BTreeSet::new(),
            Node::Literal(values) => BTreeSet::from([values[0].clone()]),
            Node::Alternation(children) => {
                let mut set = BTreeSet::new();
                for c in children {
                    set.extend(self.starting_elements(c).iter().cloned());
                }
                set
            }
            Node::Concatenation(children) => {
                let mut set = BTreeSet::new();
                for c in children {
                    set.extend(self.starting_elements(c).iter().cloned());
                    if !self.matches_empty(c) {
                        break;
                    }
                }
                set
            }
            Node::Optional(child) | Node::Repetition(child) => {
                (*self.starting_elements(child)).clone()
            }
            Node::Intersection(children) => {
                let mut set = (*self.starting_elements(children[0])).clone();
                for &c in &children[1..] {
                    let other = self.starting_elements(c);
                    set.retain(|symbol| other.contains(symbol));
                }
                set
            }
        };
        let result = Rc::new(result);
        self.starts.borrow_mut().insert(expr, Rc::clone(&result));
        result
    }

    /// The Brzozowski derivative: the expression whose language is
    /// `{ w : symbol·w ∈ L(expr) }`.
    ///
    /// Returns [`ExprId::NOTHING`] whenever `symbol` is not a starting
    /// element of `expr`. Canonicalization in the smart constructors keeps
    /// repeated derivatives within a finite set of expressions.
    pub fn differentiate(&self, expr: ExprId, symbol: &T) -> ExprId {
        if !self.starting_elements(expr).contains(symbol) {
            return ExprId::NOTHING;
        }
        let key = (expr, symbol.clone());
        if let Some(&known) = self.derivatives.borrow().get(&key) {
            return known;
        }
        let result = match self.algebra.node(expr) {
            Node::Empty | Node::Nothing => ExprId::NOTHING,
            Node::Literal(values) => self.algebra.literal(values[1..].iter().cloned()),
            Node::Alternation(children) => {
                let parts: Vec<ExprId> = children
                    .iter()
                    .filter(|&&c| self.starting_elements(c).contains(symbol))
                    .map(|&c| self.differentiate(c, symbol))
                    .collect();
                self.algebra.alternation(parts)
            }
            Node::Concatenation(children) => {
                let head = children[0];
                let rest = self.algebra.concatenation(children[1..].iter().copied());
                let through_head = self
                    .algebra
                    .concatenation([self.differentiate(head, symbol), rest]);
                if self.matches_empty(head) {
                    // a nullable head may be skipped entirely
                    self.algebra
                        .alternation([through_head, self.differentiate(rest, symbol)])
                } else {
                    through_head
                }
            }
            Node::Optional(child) => self.differentiate(child, symbol),
            Node::Repetition(child) => self
                .algebra
                .concatenation([self.differentiate(child, symbol), expr]),
            Node::Intersection(children) => {
                let parts: Vec<ExprId> = children
                    .iter()
                    .map(|&c| self.differentiate(c, symbol))
                    .collect();
                self.algebra.intersection(parts)
            }
        };
        self.derivatives.borrow_mut().insert(key, result);
        result
    }

    /// Whether the language of `expr` contains any sequence at all.
    ///
    /// Computed as a worklist fixpoint over the derivative closure of
    /// `expr`: satisfiable as soon as a nullable expression is reachable;
    /// unsatisfiable when the closure is exhausted without one, in which
    /// case every member of the closure is cached as unsatisfiable. The
    /// worklist terminates on derivative cycles where naive recursion would
    /// not.
    ///
    /// Fails with [`Error::StateBudgetExceeded`] if the closure outgrows the
    /// configured state budget; nothing is cached in that case.
    pub fn is_satisfiable(&self, expr: ExprId) -> Result<bool, Error> {
        if let Some(&known) = self.satisfiable.borrow().get(&expr) {
            return Ok(known);
        }

        let mut seen: HashSet<ExprId, RandomState> = HashSet::with_hasher(RandomState::new());
        let mut closure = Vec::new();
        let mut pending = vec![expr];
        seen.insert(expr);
        closure.push(expr);

        while let Some(current) = pending.pop() {
            let known = self.satisfiable.borrow().get(&current).copied();
            if known == Some(true) || self.matches_empty(current) {
                self.satisfiable.borrow_mut().insert(expr, true);
                return Ok(true);
            }
            if known == Some(false) {
                continue;
            }
            for symbol in self.starting_elements(current).iter() {
                let derivative = self.differentiate(current, symbol);
                if derivative == ExprId::NOTHING {
                    continue;
                }
                if seen.insert(derivative) {
                    if seen.len() > self.config.max_states {
                        return Err(Error::StateBudgetExceeded {
                            limit: self.config.max_states,
                            expr,
                        });
                    }
                    closure.push(derivative);
                    pending.push(derivative);
                }
            }
        }

        // the closure is derivative-closed and contains no nullable member,
        // so none of it can reach an accepting sequence
        let mut table = self.satisfiable.borrow_mut();
        for visited in closure {
            table.insert(visited, false);
        }
        Ok(false)
    }

    /// The outgoing derivative edges of `expr`, restricted to satisfiable
    /// targets and ordered by symbol.
    pub fn transitions(&self, expr: ExprId) -> Result<Vec<(T, ExprId)>, Error> {
        let mut edges = Vec::new();
        for symbol in self.starting_elements(expr).iter() {
            let derivative = self.differentiate(expr, symbol);
            if self.is_satisfiable(derivative)? {
                edges.push((symbol.clone(), derivative));
            }
        }
        Ok(edges)
    }

    /// Compiles `expr` into a frozen [`Dfa`].
    ///
    /// States are the reachable derivatives of `expr`, numbered in discovery
    /// order with `expr` itself as state 0. A state is terminal iff its
    /// expression is nullable. Edges to unsatisfiable derivatives are pruned
    /// before they are recorded, so no dead state is ever materialized —
    /// except for an unsatisfiable root, which compiles to the lone
    /// non-accepting start state.
    pub fn compile(&self, expr: ExprId) -> Result<Dfa<T>, Error> {
        let mut ids: HashMap<ExprId, usize, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut rows: HashMap<ExprId, Vec<(T, ExprId)>, RandomState> =
            HashMap::with_hasher(RandomState::new());
        let mut order = vec![expr];
        let mut pending = vec![expr];
        ids.insert(expr, 0);

        while let Some(current) = pending.pop() {
            if rows.contains_key(&current) {
                continue;
            }
            let edges = self.transitions(current)?;
            for &(_, target) in &edges {
                if !ids.contains_key(&target) {
                    if order.len() >= self.config.max_states {
                        return Err(Error::StateBudgetExceeded {
                            limit: self.config.max_states,
                            expr,
                        });
                    }
                    ids.insert(target, order.len());
                    order.push(target);
                    pending.push(target);
                }
            }
            rows.insert(current, edges);
        }

        let states = order
            .iter()
            .map(|state_expr| State {
                terminal: self.matches_empty(*state_expr),
                transitions: rows[state_expr]
                    .iter()
                    .map(|(symbol, target)| (symbol.clone(), ids[target]))
                    .collect(),
            })
            .collect();

        Ok(Dfa::new(states))
    }
}

impl<T: Clone + Ord + Hash> Algebra<T> {
    /// Compiles `expr` with a throwaway default [`Compiler`].
    ///
    /// Convenient for one-off queries; hold a [`Compiler`] yourself when
    /// compiling several related expressions so the memo tables are shared.
    pub fn compile(&self, expr: ExprId) -> Result<Dfa<T>, Error> {
        Compiler::new(self).compile(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(algebra: &Algebra<char>, text: &str) -> ExprId {
        algebra.literal(text.chars())
    }

    #[test]
    fn nullability_by_variant() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a = chars(&algebra, "a");
        let b = chars(&algebra, "b");

        assert!(compiler.matches_empty(ExprId::EMPTY));
        assert!(!compiler.matches_empty(ExprId::NOTHING));
        assert!(!compiler.matches_empty(a));
        assert!(compiler.matches_empty(algebra.optional(a)));
        assert!(compiler.matches_empty(algebra.repetition(a)));
        assert!(!compiler.matches_empty(algebra.concatenation([algebra.optional(a), b])));
        assert!(compiler.matches_empty(
            algebra.concatenation([algebra.optional(a), algebra.repetition(b)])
        ));
    }

    #[test]
    fn intersection_nullability_is_conjunction() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a = chars(&algebra, "a");
        let star = algebra.repetition(a);
        let opt = algebra.optional(chars(&algebra, "b"));

        assert!(compiler.matches_empty(algebra.intersection([star, opt])));
        assert!(!compiler.matches_empty(algebra.intersection([star, a])));
    }

    #[test]
    fn alternation_nullability_is_disjunction() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a = chars(&algebra, "a");
        let b = chars(&algebra, "b");

        assert!(compiler.matches_empty(algebra.alternation([a, algebra.optional(b)])));
        assert!(!compiler.matches_empty(algebra.alternation([a, b])));
    }

    #[test]
    fn starting_elements_walk_nullable_prefixes() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a = chars(&algebra, "a");
        let b = chars(&algebra, "b");
        let c = chars(&algebra, "c");

        // a? b* c — every prefix before c is nullable
        let expr = algebra.concatenation([algebra.optional(a), algebra.repetition(b), c]);
        let starts = compiler.starting_elements(expr);
        assert_eq!(starts.iter().copied().collect::<Vec<_>>(), vec!['a', 'b', 'c']);

        // ab — only the head contributes
        let expr = algebra.concatenation([a, b]);
        let starts = compiler.starting_elements(expr);
        assert_eq!(starts.iter().copied().collect::<Vec<_>>(), vec!['a']);
    }

    #[test]
    fn starting_elements_of_intersection_intersect() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let ab = algebra.alternation([chars(&algebra, "a"), chars(&algebra, "b")]);
        let bc = algebra.alternation([chars(&algebra, "b"), chars(&algebra, "c")]);

        let starts = compiler.starting_elements(algebra.intersection([ab, bc]));
        assert_eq!(starts.iter().copied().collect::<Vec<_>>(), vec!['b']);
    }

    #[test]
    fn differentiating_outside_the_starts_yields_nothing() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let foo = chars(&algebra, "foo");
        assert_eq!(compiler.differentiate(foo, &'x'), ExprId::NOTHING);
        assert_eq!(compiler.differentiate(ExprId::EMPTY, &'a'), ExprId::NOTHING);
    }

    #[test]
    fn differentiating_a_literal_produces_its_elements_in_sequence() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);

        let mut expr = algebra.literal([1, 2, 3]);
        for value in [1, 2, 3] {
            let starts = compiler.starting_elements(expr);
            assert_eq!(starts.iter().copied().collect::<Vec<_>>(), vec![value]);
            expr = compiler.differentiate(expr, &value);
        }
        assert_eq!(expr, ExprId::EMPTY);
    }

    #[test]
    fn derivative_of_a_repetition_loops_back() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let star = algebra.repetition(chars(&algebra, "a"));
        // d_a(a*) = ε · a* = a*
        assert_eq!(compiler.differentiate(star, &'a'), star);
    }

    #[test]
    fn derivative_skips_a_nullable_head() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a = chars(&algebra, "a");
        let b = chars(&algebra, "b");
        let expr = algebra.concatenation([algebra.optional(a), b]);

        assert_eq!(compiler.differentiate(expr, &'a'), b);
        assert_eq!(compiler.differentiate(expr, &'b'), ExprId::EMPTY);
    }

    #[test]
    fn intersection_of_distinct_literals_is_unsatisfiable() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let left = algebra.literal([1, 2]);
        let right = algebra.literal([1, 3]);
        let both = algebra.intersection([left, right]);

        assert!(!compiler.is_satisfiable(both).unwrap());
        assert!(compiler.is_satisfiable(left).unwrap());
    }

    #[test]
    fn satisfiability_reaches_fixpoint_on_self_derivatives() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let a_star = algebra.repetition(chars(&algebra, "a"));
        let left = algebra.concatenation([a_star, chars(&algebra, "b")]);
        let right = algebra.concatenation([a_star, chars(&algebra, "c")]);
        // (a*b) & (a*c) is its own derivative by 'a'; naive recursion
        // would never return
        let both = algebra.intersection([left, right]);

        assert_eq!(compiler.differentiate(both, &'a'), both);
        assert!(!compiler.is_satisfiable(both).unwrap());
    }

    #[test]
    fn satisfiable_non_nullable_expressions_have_starting_elements() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let expr = algebra.concatenation([
            algebra.repetition(chars(&algebra, "a")),
            algebra.alternation([chars(&algebra, "b"), chars(&algebra, "c")]),
        ]);

        assert!(compiler.is_satisfiable(expr).unwrap());
        assert!(!compiler.matches_empty(expr));
        assert!(!compiler.starting_elements(expr).is_empty());
    }

    #[test]
    fn a_compiled_literal_is_a_chain() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let dfa = compiler.compile(chars(&algebra, "foo")).unwrap();

        assert_eq!(dfa.states().len(), 4);
        assert_eq!(dfa.states()[0].transitions().len(), 1);
        assert_eq!(
            dfa.states().iter().filter(|s| s.is_terminal()).count(),
            1
        );
    }

    #[test]
    fn unsatisfiable_roots_compile_to_a_dead_start() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let both = algebra.intersection([algebra.literal([1, 2]), algebra.literal([1, 3])]);
        let dfa = compiler.compile(both).unwrap();

        assert_eq!(dfa.states().len(), 1);
        assert!(!dfa.states()[0].is_terminal());
        assert!(dfa.states()[0].transitions().is_empty());
        assert!(!dfa.matches(&[1, 2]));
    }

    #[test]
    fn transition_rows_are_symbol_sorted() {
        let algebra = Algebra::new();
        let compiler = Compiler::new(&algebra);
        let expr = algebra.alternation([
            chars(&algebra, "zed"),
            chars(&algebra, "alpha"),
            chars(&algebra, "mid"),
        ]);
        let dfa = compiler.compile(expr).unwrap();
        let symbols: Vec<char> = dfa.states()[0]
            .transitions()
            .iter()
            .map(|(symbol, _)| *symbol)
            .collect();
        assert_eq!(symbols, vec!['a', 'm', 'z']);
    }

    #[test]
    fn the_state_budget_is_enforced() {
        let algebra = Algebra::new();
        let compiler = Compiler::with_config(&algebra, CompilerConfig { max_states: 4 });
        let parts = ["ab", "cd", "ef", "gh", "ij"].map(|text| chars(&algebra, text));
        let wide = algebra.alternation(parts);

        match compiler.compile(wide) {
            Err(Error::StateBudgetExceeded { limit, expr }) => {
                assert_eq!(limit, 4);
                assert_eq!(expr, wide);
            }
            other => panic!("expected a state budget error, got {other:?}"),
        }
    }

    #[test]
    fn deep_satisfiability_honors_the_budget_too() {
        let algebra = Algebra::new();
        let compiler = Compiler::with_config(&algebra, CompilerConfig { max_states: 4 });
        let long = algebra.literal("abcdefgh".chars());

        assert!(matches!(
            compiler.compile(long),
            Err(Error::StateBudgetExceeded { limit: 4, .. })
        ));
        // a failed computation caches nothing: a roomier compiler answers
        let roomy = Compiler::new(&algebra);
        assert!(roomy.is_satisfiable(long).unwrap());
    }
}
