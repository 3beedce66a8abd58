/// Builds a concatenation from a list of [`ExprId`](crate::ExprId)s.
///
/// `seq![algebra; a, b, c]` is `algebra.concatenation([a, b, c])`.
///
/// # Example
/// ```rust
/// use seqlang::{seq, Algebra};
///
/// let algebra = Algebra::new();
/// let a = algebra.literal(['a']);
/// let b = algebra.literal(['b']);
///
/// assert_eq!(seq![algebra; a, b], algebra.concatenation([a, b]));
/// ```
#[macro_export]
macro_rules! seq {
    ($algebra:expr; $($expr:expr),+ $(,)?) => {
        $algebra.concatenation([$($expr),+])
    };
}

/// Builds an alternation from a list of [`ExprId`](crate::ExprId)s.
///
/// `any_of![algebra; a, b, c]` is `algebra.alternation([a, b, c])`.
#[macro_export]
macro_rules! any_of {
    ($algebra:expr; $($expr:expr),+ $(,)?) => {
        $algebra.alternation([$($expr),+])
    };
}

/// Builds an intersection from a list of [`ExprId`](crate::ExprId)s.
///
/// `all_of![algebra; a, b, c]` is `algebra.intersection([a, b, c])`.
///
/// # Example
/// ```rust
/// use seqlang::{all_of, any_of, Algebra, Compiler};
///
/// let algebra = Algebra::new();
/// let ab = algebra.literal("ab".chars());
/// let ac = algebra.literal("ac".chars());
///
/// let clash = all_of![algebra; ab, ac];
/// assert!(!Compiler::new(&algebra).is_satisfiable(clash).unwrap());
///
/// let either = any_of![algebra; ab, ac];
/// assert!(Compiler::new(&algebra).is_satisfiable(either).unwrap());
/// ```
#[macro_export]
macro_rules! all_of {
    ($algebra:expr; $($expr:expr),+ $(,)?) => {
        $algebra.intersection([$($expr),+])
    };
}
