use std::hash::Hash;
use std::ops::{Add, BitAnd, BitOr};

use crate::algebra::{Algebra, ExprId};

/// An [`ExprId`] paired with its [`Algebra`], enabling operator syntax.
///
/// `Term`s are cheap to copy and exist purely for ergonomics: `+` is
/// concatenation, `|` is alternation, and `&` is intersection, each
/// delegating to the corresponding smart constructor.
///
/// # Example
/// ```rust
/// use seqlang::Algebra;
///
/// let algebra = Algebra::new();
/// let foo = algebra.lit("foo".chars());
/// let bar = algebra.lit("bar".chars());
///
/// // (foo | bar) followed by any number of "baz"
/// let expr = (foo | bar) + algebra.lit("baz".chars()).repetition();
///
/// assert_eq!(
///     expr.id(),
///     algebra.concatenation([
///         algebra.alternation([foo.id(), bar.id()]),
///         algebra.repetition(algebra.literal("baz".chars())),
///     ])
/// );
/// ```
pub struct Term<'a, T> {
    algebra: &'a Algebra<T>,
    id: ExprId,
}

// handles are copyable regardless of the symbol type
impl<T> Clone for Term<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Term<'_, T> {}

impl<'a, T> Term<'a, T> {
    pub(crate) fn new(algebra: &'a Algebra<T>, id: ExprId) -> Self {
        Self { algebra, id }
    }

    /// The underlying expression handle.
    pub fn id(&self) -> ExprId {
        self.id
    }
}

impl<'a, T> From<Term<'a, T>> for ExprId {
    fn from(term: Term<'a, T>) -> Self {
        term.id
    }
}

impl<T> Algebra<T> {
    /// Wraps an existing handle in a [`Term`] for operator syntax.
    pub fn term(&self, id: ExprId) -> Term<'_, T> {
        Term::new(self, id)
    }
}

impl<T: Clone + Hash + Eq> Algebra<T> {
    /// Creates a literal and wraps it in a [`Term`] in one step.
    pub fn lit<I>(&self, values: I) -> Term<'_, T>
    where
        I: IntoIterator<Item = T>,
    {
        let id = self.literal(values);
        Term::new(self, id)
    }
}

impl<'a, T: Clone + Hash + Eq> Term<'a, T> {
    /// This term or the empty sequence.
    pub fn optional(self) -> Self {
        Term::new(self.algebra, self.algebra.optional(self.id))
    }

    /// Zero or more repetitions of this term.
    pub fn repetition(self) -> Self {
        Term::new(self.algebra, self.algebra.repetition(self.id))
    }
}

impl<'a, T: Clone + Hash + Eq> Add for Term<'a, T> {
    type Output = Term<'a, T>;

    fn add(self, rhs: Self) -> Self::Output {
        Term::new(self.algebra, self.algebra.concatenation([self.id, rhs.id]))
    }
}

impl<'a, T: Clone + Hash + Eq> BitOr for Term<'a, T> {
    type Output = Term<'a, T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        Term::new(self.algebra, self.algebra.alternation([self.id, rhs.id]))
    }
}

impl<'a, T: Clone + Hash + Eq> BitAnd for Term<'a, T> {
    type Output = Term<'a, T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        Term::new(self.algebra, self.algebra.intersection([self.id, rhs.id]))
    }
}
