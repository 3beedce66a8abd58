use std::hash::{BuildHasher, Hasher};

use rand::seq::SliceRandom;
use rand::Rng;
use rapidhash::quality::RandomState;
use serde::{Deserialize, Serialize};

mod enumerate;

pub use enumerate::{CountCache, LanguageSize, StringsAtLength};

/// One state of a [`Dfa`]: whether it accepts, and its outgoing transitions
/// as `(symbol, target state)` pairs sorted by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "fast-binary", derive(bitcode::Encode, bitcode::Decode))]
pub struct State<T> {
    pub(crate) terminal: bool,
    pub(crate) transitions: Vec<(T, usize)>,
}

impl<T> State<T> {
    /// Whether ending a sequence in this state accepts it.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The outgoing transitions, sorted by symbol.
    pub fn transitions(&self) -> &[(T, usize)] {
        &self.transitions
    }
}

/// A frozen deterministic finite automaton over the alphabet `T`.
///
/// States are numbered from 0, the start state. Every state either accepts
/// or has at least one outgoing transition — the construction prunes dead
/// edges — with the single exception of the automaton of an empty language,
/// which is the lone non-accepting start state.
///
/// Beyond membership ([`matches`](Self::matches)), a `Dfa` can lazily scan
/// the accepted prefixes of an input, generate random members of its
/// language, and rank/unrank the language in length-then-symbol order.
///
/// # Example
/// ```rust
/// use seqlang::Algebra;
///
/// let algebra = Algebra::new();
/// let expr = algebra.concatenation([
///     algebra.optional(algebra.literal(['a'])),
///     algebra.literal(['b']),
/// ]);
/// let dfa = algebra.compile(expr).unwrap();
///
/// assert!(dfa.matches(&['a', 'b']));
/// assert!(dfa.matches(&['b']));
/// assert!(!dfa.matches(&['a']));
/// assert_eq!(dfa.nth_string(0).unwrap(), vec!['b']);
/// assert_eq!(dfa.nth_string(1).unwrap(), vec!['a', 'b']);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "fast-binary", derive(bitcode::Encode, bitcode::Decode))]
pub struct Dfa<T> {
    pub(crate) states: Vec<State<T>>,
    pub(crate) uuid: u128,
}

// equality is over the transition structure; the uuid only tags caches
impl<T: PartialEq> PartialEq for Dfa<T> {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}

impl<T: Eq> Eq for Dfa<T> {}

impl<T> Dfa<T> {
    pub(crate) fn new(states: Vec<State<T>>) -> Self {
        Self {
            states,
            uuid: generate_uuid(),
        }
    }

    /// The state table; index 0 is the start state.
    pub fn states(&self) -> &[State<T>] {
        &self.states
    }
}

fn generate_uuid() -> u128 {
    let low = RandomState::new();
    let mut hash_low = low.build_hasher();
    hash_low.write_usize(&low as *const _ as usize);
    let low = hash_low.finish() as u128;

    let high = RandomState::new();
    let mut hash_high = high.build_hasher();
    hash_high.write_usize(&high as *const _ as usize);
    let high = hash_high.finish() as u128;

    (high << 64) | low
}

impl<T: Ord> Dfa<T> {
    pub(crate) fn step(&self, state: usize, symbol: &T) -> Option<usize> {
        let row = &self.states[state].transitions;
        row.binary_search_by(|(candidate, _)| candidate.cmp(symbol))
            .ok()
            .map(|found| row[found].1)
    }

    /// Whether `input` is in the language of this automaton.
    pub fn matches(&self, input: &[T]) -> bool {
        let mut state = 0;
        for symbol in input {
            match self.step(state, symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.states[state].terminal
    }

    /// Lazily yields every non-empty prefix of `input` that is in the
    /// language, in increasing length, stopping at the first symbol with no
    /// transition.
    ///
    /// # Example
    /// ```rust
    /// # use seqlang::Algebra;
    /// let algebra = Algebra::new();
    /// let word = algebra.repetition(algebra.literal("ab".chars()));
    /// let dfa = algebra.compile(word).unwrap();
    ///
    /// let input: Vec<char> = "ababx".chars().collect();
    /// let prefixes: Vec<&[char]> = dfa.matching_substrings(&input).collect();
    /// assert_eq!(prefixes, vec![&input[..2], &input[..4]]);
    /// ```
    pub fn matching_substrings<'a>(&'a self, input: &'a [T]) -> MatchingSubstrings<'a, T> {
        MatchingSubstrings {
            dfa: self,
            input,
            state: 0,
            consumed: 0,
        }
    }
}

impl<T: Clone + Ord> Dfa<T> {
    /// Randomly walks the automaton and returns an accepted sequence.
    ///
    /// At a terminal state the walk stops when there are no transitions
    /// left, or with probability `stopping_chance`; otherwise it follows a
    /// uniformly random transition. Returns `None` iff the language is
    /// empty — in every other state of the walk a transition exists, so
    /// generation cannot get stuck.
    ///
    /// # Panics
    /// Panics if `stopping_chance` is not in `0.0..=1.0`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, stopping_chance: f64) -> Option<Vec<T>> {
        let mut state = 0;
        let mut out = Vec::new();
        loop {
            let current = &self.states[state];
            if current.terminal
                && (current.transitions.is_empty() || rng.gen_bool(stopping_chance))
            {
                return Some(out);
            }
            let (symbol, next) = current.transitions.choose(rng)?;
            out.push(symbol.clone());
            state = *next;
        }
    }
}

/// Iterator over the accepted prefixes of an input. See
/// [`Dfa::matching_substrings`].
pub struct MatchingSubstrings<'a, T> {
    dfa: &'a Dfa<T>,
    input: &'a [T],
    state: usize,
    consumed: usize,
}

impl<'a, T: Ord> Iterator for MatchingSubstrings<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        while self.consumed < self.input.len() {
            let next = self.dfa.step(self.state, &self.input[self.consumed])?;
            self.state = next;
            self.consumed += 1;
            if self.dfa.states[next].terminal {
                return Some(&self.input[..self.consumed]);
            }
        }
        None
    }
}
