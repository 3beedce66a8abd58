//! An algebraic sequence-expression engine.
//!
//! `seqlang` builds regular-language-like expressions over an arbitrary
//! alphabet, keeps them in canonical algebraic form through interning smart
//! constructors, answers semantic queries about them via Brzozowski
//! derivatives, and compiles them to frozen DFAs that can *match*,
//! *generate*, and *rank* sequences.
//!
//! # Example
//!
//! ```rust
//! use seqlang::{Algebra, Compiler, LanguageSize};
//!
//! let algebra = Algebra::new();
//!
//! // ("foo" | "bar") "!"?
//! let expr = algebra.concatenation([
//!     algebra.alternation([
//!         algebra.literal("foo".chars()),
//!         algebra.literal("bar".chars()),
//!     ]),
//!     algebra.optional(algebra.literal(['!'])),
//! ]);
//!
//! let dfa = Compiler::new(&algebra).compile(expr).unwrap();
//! assert!(dfa.matches(&['f', 'o', 'o']));
//! assert!(dfa.matches(&['b', 'a', 'r', '!']));
//! assert_eq!(dfa.language_size(), LanguageSize::Finite(4));
//!
//! // ranked enumeration, shortest first, then by symbol order
//! assert_eq!(dfa.nth_string(0).unwrap(), vec!['b', 'a', 'r']);
//! assert_eq!(dfa.nth_string(3).unwrap(), vec!['f', 'o', 'o', '!']);
//! ```
//!
//! Character expressions can also come from the textual front-end in
//! [`pattern`], which accepts the usual `(a|b)* c?` notation.

#[macro_use]
mod macros;

pub mod algebra;
pub mod compiler;
pub mod dfa;
pub mod errors;
pub mod pattern;

pub mod prelude {
    pub use crate::algebra::{Algebra, ExprId, Node, Term};
    pub use crate::compiler::{Compiler, CompilerConfig};
    pub use crate::dfa::{CountCache, Dfa, LanguageSize, State};
    pub use crate::errors::Error;

    pub use crate::{all_of, any_of, seq};
}

pub use algebra::{Algebra, ExprId, Node, Term};
pub use compiler::{Compiler, CompilerConfig};
pub use dfa::{CountCache, Dfa, LanguageSize, State};
pub use errors::Error;
