//! Build an expression three ways, compile it, and put the DFA to work:
//! membership, random generation, and ranked enumeration.
//!
//! Run with `cargo run --example enumerate`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use seqlang::{pattern, Algebra, Compiler, CountCache, LanguageSize};

fn main() {
    let algebra = Algebra::new();

    // --- 1. Build: constructors, operators, or text ---

    // identifiers: a letter followed by letters or digits
    let letter = algebra.alternation(('a'..='e').map(|c| algebra.literal([c])));
    let digit = algebra.alternation(('0'..='1').map(|c| algebra.literal([c])));
    let tail = algebra.repetition(algebra.alternation([letter, digit]));
    let ident = algebra.concatenation([letter, tail]);

    // the same shape via operator sugar
    let sugared = (algebra.term(letter) + algebra.term(tail)).id();
    assert_eq!(ident, sugared);

    // and via the textual front-end
    let parsed = pattern::parse(&algebra, "(a|b|c|d|e)(a|b|c|d|e|0|1)*").unwrap();
    println!("parsed:  {}", algebra.to_string(parsed));

    // --- 2. Compile ---

    let compiler = Compiler::new(&algebra);
    let dfa = compiler.compile(ident).unwrap();
    println!("states:  {}", dfa.states().len());
    assert_eq!(dfa, compiler.compile(parsed).unwrap());

    // --- 3. Query ---

    let accepted: Vec<char> = "ab01".chars().collect();
    let rejected: Vec<char> = "0ab".chars().collect();
    assert!(dfa.matches(&accepted));
    assert!(!dfa.matches(&rejected));

    match dfa.language_size() {
        LanguageSize::Infinite => println!("size:    infinite"),
        LanguageSize::Finite(n) => println!("size:    {n}"),
    }

    // every prefix of the input that is itself an identifier
    let prefixes: Vec<String> = dfa
        .matching_substrings(&accepted)
        .map(|prefix| prefix.iter().collect())
        .collect();
    println!("prefixes of \"ab01\": {prefixes:?}");

    // random members of the language
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..3 {
        let word: String = dfa.generate(&mut rng, 0.4).unwrap().into_iter().collect();
        println!("random:  {word:?}");
    }

    // the first few identifiers, shortest first, then by symbol order
    let mut cache = CountCache::new();
    let first: Vec<String> = (0..10)
        .map(|rank| {
            dfa.nth_string_with(&mut cache, rank)
                .unwrap()
                .into_iter()
                .collect()
        })
        .collect();
    println!("first:   {first:?}");
}
