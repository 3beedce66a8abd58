//! Textual front-end for character expressions.
//!
//! Parses the classic surface syntax — character runs, `[abc]` and `[a-z]`
//! classes, `(…)` groups, `e|e`, `e*`, `e+`, `e?`, and backslash escapes for
//! `| + * ? \` — into canonical expressions of an [`Algebra<char>`].
//!
//! Regular characters are ASCII letters, digits, and space; anything else
//! must be escaped or is rejected. A postfix operator binds to the whole
//! preceding character run, so `ab*` denotes `(ab)*`.

use std::collections::BTreeSet;

use combine::parser::char::char;
use combine::{between, choice, many, many1, optional, parser, satisfy, ParseError, Parser, Stream};

use crate::algebra::{Algebra, ExprId};
use crate::errors::Error;

fn is_regular(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' '
}

fn is_special(c: char) -> bool {
    matches!(c, '|' | '+' | '*' | '?' | '\\')
}

fn is_suffix(c: char) -> bool {
    matches!(c, '*' | '+' | '?')
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Ast {
    Epsilon,
    Run(String),
    Class(char, Vec<ClassItem>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Maybe(Box<Ast>),
    Concatenation(Vec<Ast>),
    Alternation(Box<Ast>, Box<Ast>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassItem {
    Single(char),
    RangeTo(char),
}

fn apply_suffix(ast: Ast, suffix: Option<char>) -> Ast {
    match suffix {
        Some('*') => Ast::Star(Box::new(ast)),
        Some('+') => Ast::Plus(Box::new(ast)),
        Some('?') => Ast::Maybe(Box::new(ast)),
        _ => ast,
    }
}

fn collapse(mut items: Vec<Ast>) -> Ast {
    match items.len() {
        0 => Ast::Epsilon,
        1 => items.remove(0),
        _ => Ast::Concatenation(items),
    }
}

fn pattern_expr_<Input>() -> impl Parser<Input, Output = Ast>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let symbol = || satisfy(is_regular).or(char('\\').with(satisfy(is_special)));

    let run = many1::<String, _, _>(symbol()).map(Ast::Run);

    let class_item = char('-')
        .with(symbol())
        .map(ClassItem::RangeTo)
        .or(symbol().map(ClassItem::Single));
    let class = between(
        char('['),
        char(']'),
        symbol().and(many::<Vec<_>, _, _>(class_item)),
    )
    .map(|(first, items)| Ast::Class(first, items));

    let group = between(char('('), char(')'), pattern_expr());

    let suffixed = choice((group, class, run))
        .and(optional(satisfy(is_suffix)))
        .map(|(ast, suffix)| apply_suffix(ast, suffix));

    let concatenated = many::<Vec<_>, _, _>(suffixed).map(collapse);

    (
        concatenated,
        optional(char('|').with(pattern_expr())),
        optional(satisfy(is_suffix)),
    )
        .map(|(head, tail, suffix)| {
            let ast = match tail {
                Some(rhs) => Ast::Alternation(Box::new(head), Box::new(rhs)),
                None => head,
            };
            apply_suffix(ast, suffix)
        })
}

parser! {
    fn pattern_expr[Input]()(Input) -> Ast
    where [Input: Stream<Token = char>]
    {
        pattern_expr_()
    }
}

fn expand_class(first: char, items: &[ClassItem]) -> Result<BTreeSet<char>, Error> {
    let mut tokens = Vec::with_capacity(items.len() + 1);
    tokens.push(ClassItem::Single(first));
    tokens.extend_from_slice(items);

    let mut set = BTreeSet::new();
    let mut position = 0;
    while position < tokens.len() {
        match (tokens[position], tokens.get(position + 1)) {
            (ClassItem::Single(low), Some(&ClassItem::RangeTo(high))) => {
                // a descending range is simply empty
                for c in low..=high {
                    set.insert(c);
                }
                position += 2;
            }
            (ClassItem::Single(c), _) => {
                set.insert(c);
                position += 1;
            }
            (ClassItem::RangeTo(_), _) => {
                return Err(Error::Pattern(
                    "character range is missing its lower bound".to_owned(),
                ));
            }
        }
    }
    Ok(set)
}

fn lower(algebra: &Algebra<char>, ast: &Ast) -> Result<ExprId, Error> {
    Ok(match ast {
        Ast::Epsilon => ExprId::EMPTY,
        Ast::Run(text) => algebra.literal(text.chars()),
        Ast::Class(first, items) => {
            let parts: Vec<ExprId> = expand_class(*first, items)?
                .into_iter()
                .map(|c| algebra.literal([c]))
                .collect();
            algebra.alternation(parts)
        }
        Ast::Star(inner) => {
            let child = lower(algebra, inner)?;
            algebra.repetition(child)
        }
        Ast::Plus(inner) => {
            let child = lower(algebra, inner)?;
            algebra.concatenation([child, algebra.repetition(child)])
        }
        Ast::Maybe(inner) => {
            let child = lower(algebra, inner)?;
            algebra.optional(child)
        }
        Ast::Concatenation(items) => {
            let parts = items
                .iter()
                .map(|item| lower(algebra, item))
                .collect::<Result<Vec<_>, _>>()?;
            algebra.concatenation(parts)
        }
        Ast::Alternation(left, right) => {
            let left = lower(algebra, left)?;
            let right = lower(algebra, right)?;
            algebra.alternation([left, right])
        }
    })
}

/// Parses `input` into a canonical expression of `algebra`.
///
/// # Example
/// ```rust
/// use seqlang::{pattern, Algebra};
///
/// let algebra = Algebra::new();
/// let expr = pattern::parse(&algebra, "(foo|bar) baz?").unwrap();
/// let dfa = algebra.compile(expr).unwrap();
///
/// let input: Vec<char> = "foo baz".chars().collect();
/// assert!(dfa.matches(&input));
/// ```
pub fn parse(algebra: &Algebra<char>, input: &str) -> Result<ExprId, Error> {
    let (ast, rest) = pattern_expr()
        .parse(input)
        .map_err(|failure| Error::Pattern(failure.to_string()))?;
    if !rest.is_empty() {
        return Err(Error::Pattern(format!("unexpected trailing input {rest:?}")));
    }
    lower(algebra, &ast)
}
