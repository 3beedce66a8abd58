use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dfa::Dfa;
use crate::errors::Error;

/// The number of sequences a language contains.
///
/// Counts saturate at `u64::MAX`; a language that large is indistinguishable
/// from one of exactly `u64::MAX` sequences, which no rank can reach anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageSize {
    Finite(u64),
    Infinite,
}

impl LanguageSize {
    pub fn is_infinite(&self) -> bool {
        matches!(self, LanguageSize::Infinite)
    }

    /// The size as a number, or `None` for an infinite language.
    pub fn finite(&self) -> Option<u64> {
        match self {
            LanguageSize::Finite(size) => Some(*size),
            LanguageSize::Infinite => None,
        }
    }
}

impl fmt::Display for LanguageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSize::Finite(size) => write!(f, "{size}"),
            LanguageSize::Infinite => write!(f, "∞"),
        }
    }
}

/// A reusable word-count table for ranked enumeration.
///
/// Ranking and unranking repeatedly need `cnt(state, length)`, the number of
/// length-`length` sequences leading from `state` to a terminal state. The
/// cache stores those counts one length-row at a time, each row derived from
/// the previous one, so enumerating many ranks against the same [`Dfa`]
/// reuses all earlier work.
///
/// # Automatic invalidation
/// The cache remembers the uuid of the automaton it was filled from. Passing
/// it to a different `Dfa` clears it transparently, so a single cache can be
/// handed around without bookkeeping.
///
/// # Example
/// ```rust
/// use seqlang::{Algebra, CountCache};
///
/// let algebra = Algebra::new();
/// let word = algebra.repetition(algebra.alternation([
///     algebra.literal(['a']),
///     algebra.literal(['b']),
/// ]));
/// let dfa = algebra.compile(word).unwrap();
///
/// // one table serves every rank
/// let mut cache = CountCache::new();
/// let first: Vec<String> = (0..7)
///     .map(|rank| dfa.nth_string_with(&mut cache, rank).unwrap())
///     .map(|word| word.into_iter().collect())
///     .collect();
/// assert_eq!(first, ["", "a", "b", "aa", "ab", "ba", "bb"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountCache {
    // rows[length][state]
    rows: Vec<Vec<u64>>,
    dfa_uuid: u128, // 0 for an uninitialized cache
}

impl Default for CountCache {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            dfa_uuid: 0,
        }
    }
}

impl CountCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all rows and resets the versioning.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.dfa_uuid = 0;
    }
}

impl<T> Dfa<T> {
    // cnt(state, length), filling the cache row by row
    fn count_from(&self, cache: &mut CountCache, state: usize, length: usize) -> u64 {
        if cache.dfa_uuid != self.uuid {
            cache.clear();
            cache.dfa_uuid = self.uuid;
        }
        while cache.rows.len() <= length {
            let row = match cache.rows.last() {
                None => self.states.iter().map(|s| u64::from(s.terminal)).collect(),
                Some(previous) => self
                    .states
                    .iter()
                    .map(|s| {
                        s.transitions
                            .iter()
                            .fold(0u64, |acc, &(_, target)| {
                                acc.saturating_add(previous[target])
                            })
                    })
                    .collect(),
            };
            cache.rows.push(row);
        }
        cache.rows[length][state]
    }

    /// Whether the language of this automaton is infinite.
    ///
    /// True iff a cycle is reachable from the start state. Construction
    /// prunes edges into unsatisfiable expressions, so every state on a
    /// reachable cycle can also reach a terminal state.
    pub fn is_language_infinite(&self) -> bool {
        const UNSEEN: u8 = 0;
        const ON_PATH: u8 = 1;
        const DONE: u8 = 2;

        let mut color = vec![UNSEEN; self.states.len()];
        let mut stack = vec![(0usize, false)];
        while let Some((state, leaving)) = stack.pop() {
            if leaving {
                color[state] = DONE;
                continue;
            }
            if color[state] != UNSEEN {
                continue;
            }
            color[state] = ON_PATH;
            stack.push((state, true));
            for &(_, target) in &self.states[state].transitions {
                match color[target] {
                    UNSEEN => stack.push((target, false)),
                    ON_PATH => return true,
                    _ => {}
                }
            }
        }
        false
    }

    /// The number of sequences this automaton accepts.
    pub fn language_size(&self) -> LanguageSize {
        if self.is_language_infinite() {
            return LanguageSize::Infinite;
        }
        let mut memo = vec![None; self.states.len()];
        LanguageSize::Finite(self.size_from(0, &mut memo))
    }

    // total accepted words from `state`; the automaton is acyclic here
    fn size_from(&self, state: usize, memo: &mut Vec<Option<u64>>) -> u64 {
        if let Some(known) = memo[state] {
            return known;
        }
        let mut total = u64::from(self.states[state].terminal);
        for &(_, target) in &self.states[state].transitions {
            total = total.saturating_add(self.size_from(target, memo));
        }
        memo[state] = Some(total);
        total
    }

    /// The lazy sequence `(length, count)` of accepted-word counts, for
    /// length 0, 1, 2, … — an infinite iterator.
    pub fn strings_at_length(&self) -> StringsAtLength<'_, T> {
        StringsAtLength {
            dfa: self,
            cache: CountCache::new(),
            length: 0,
        }
    }

    /// The `rank`-th accepted sequence, counting from 0 in
    /// length-then-symbol order.
    ///
    /// Allocates a throwaway [`CountCache`]; use
    /// [`nth_string_with`](Self::nth_string_with) to amortize the counting
    /// across many ranks.
    pub fn nth_string(&self, rank: u64) -> Result<Vec<T>, Error>
    where
        T: Clone,
    {
        let mut cache = CountCache::new();
        self.nth_string_with(&mut cache, rank)
    }

    /// [`nth_string`](Self::nth_string) against a caller-held cache.
    ///
    /// Fails with [`Error::IndexOutOfRange`] when the language is finite and
    /// `rank` is not below its size.
    pub fn nth_string_with(&self, cache: &mut CountCache, rank: u64) -> Result<Vec<T>, Error>
    where
        T: Clone,
    {
        if let LanguageSize::Finite(size) = self.language_size() {
            if rank >= size {
                return Err(Error::IndexOutOfRange { index: rank, size });
            }
        }

        // find the length bucket holding the rank
        let mut remaining = rank;
        let mut length = 0usize;
        loop {
            let bucket = self.count_from(cache, 0, length);
            if bucket > remaining {
                break;
            }
            remaining -= bucket;
            length += 1;
        }

        // unrank within the bucket, symbol-sorted transitions first
        let mut out = Vec::with_capacity(length);
        let mut state = 0;
        while out.len() < length {
            let left = length - out.len() - 1;
            for position in 0..self.states[state].transitions.len() {
                let target = self.states[state].transitions[position].1;
                let below = self.count_from(cache, target, left);
                if below <= remaining {
                    remaining -= below;
                } else {
                    out.push(self.states[state].transitions[position].0.clone());
                    state = target;
                    break;
                }
            }
        }
        Ok(out)
    }
}

/// Infinite iterator over per-length accepted-word counts. See
/// [`Dfa::strings_at_length`].
pub struct StringsAtLength<'a, T> {
    dfa: &'a Dfa<T>,
    cache: CountCache,
    length: usize,
}

impl<'a, T> Iterator for StringsAtLength<'a, T> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let length = self.length;
        self.length += 1;
        Some((length, self.dfa.count_from(&mut self.cache, 0, length)))
    }
}
