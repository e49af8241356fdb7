//! Permutation engine: turns a token tree into every string it denotes.
//!
//! Tokens are processed left to right against a running accumulator of
//! partial results. Literals are appended to every partial result; a group
//! is expanded per variant and then mixed in, so that earlier tokens vary
//! slowest and the current group's choices vary fastest.
//!
//! The tree is walked with an explicit frame stack, so nesting depth is only
//! limited by memory.

use std::slice;

use log::trace;

use crate::ast::{Group, Token, Variant};

/// Post-order reduction over a token tree, see [`fold_tokens`]
pub trait Fold {
    type Acc;

    /// Fresh accumulator for a token sequence (top level, variant body)
    fn sequence(&self) -> Self::Acc;
    /// Fresh accumulator for the variants of a group
    fn group(&self) -> Self::Acc;
    fn literal(&self, acc: &mut Self::Acc, text: &str);
    /// Merge a finished group (or bare variant) into the enclosing sequence
    fn combine(&self, acc: &mut Self::Acc, child: Self::Acc);
    /// Add a finished variant to its group
    fn collect(&self, acc: &mut Self::Acc, variant: Self::Acc);
}

enum Frame<'a, A> {
    Sequence {
        tokens: slice::Iter<'a, Token>,
        acc: A,
    },
    Group {
        variants: slice::Iter<'a, Variant>,
        acc: A,
    },
}

enum Step<'a, A> {
    Continue,
    Descend(Frame<'a, A>),
    Done,
}

impl<'a, A> Frame<'a, A> {
    fn sequence<F: Fold<Acc = A>>(fold: &F, tokens: &'a [Token]) -> Self {
        Frame::Sequence {
            tokens: tokens.iter(),
            acc: fold.sequence(),
        }
    }

    fn group<F: Fold<Acc = A>>(fold: &F, group: &'a Group) -> Self {
        Frame::Group {
            variants: group.variants.iter(),
            acc: fold.group(),
        }
    }

    fn into_acc(self) -> A {
        match self {
            Frame::Sequence { acc, .. } | Frame::Group { acc, .. } => acc,
        }
    }

    fn advance<F: Fold<Acc = A>>(&mut self, fold: &F, finished: Option<A>) -> Step<'a, A> {
        match self {
            Frame::Sequence { tokens, acc } => {
                if let Some(child) = finished {
                    fold.combine(acc, child);
                }
                match tokens.next() {
                    Some(Token::Literal(s)) => {
                        fold.literal(acc, s);
                        Step::Continue
                    }
                    Some(Token::Group(g)) => Step::Descend(Frame::group(fold, g)),
                    Some(Token::Variant(v)) => Step::Descend(Frame::sequence(fold, &v.tokens)),
                    None => Step::Done,
                }
            }
            Frame::Group { variants, acc } => {
                if let Some(variant) = finished {
                    fold.collect(acc, variant);
                }
                match variants.next() {
                    Some(v) => Step::Descend(Frame::sequence(fold, &v.tokens)),
                    None => Step::Done,
                }
            }
        }
    }
}

fn run<'a, F: Fold>(fold: &F, root: Frame<'a, F::Acc>) -> F::Acc {
    let mut stack = vec![root];
    let mut finished = None;

    while let Some(frame) = stack.last_mut() {
        match frame.advance(fold, finished.take()) {
            Step::Continue => {}
            Step::Descend(child) => stack.push(child),
            Step::Done => finished = stack.pop().map(Frame::into_acc),
        }
    }

    // The root frame is the last one popped
    finished.unwrap_or_else(|| fold.sequence())
}

/// Reduce a sibling sequence
pub fn fold_tokens<F: Fold>(fold: &F, tokens: &[Token]) -> F::Acc {
    run(fold, Frame::sequence(fold, tokens))
}

/// Reduce a single group as if it were the only token of a sequence
pub fn fold_group<F: Fold>(fold: &F, group: &Group) -> F::Acc {
    let mut acc = fold.sequence();
    let variants = run(fold, Frame::group(fold, group));
    fold.combine(&mut acc, variants);
    acc
}

/// Collects every permutation as a string
struct Permutations;

impl Fold for Permutations {
    type Acc = Vec<String>;

    fn sequence(&self) -> Vec<String> {
        vec![String::new()]
    }

    fn group(&self) -> Vec<String> {
        Vec::new()
    }

    fn literal(&self, acc: &mut Vec<String>, text: &str) {
        append_to_all(acc, text);
    }

    fn combine(&self, acc: &mut Vec<String>, child: Vec<String>) {
        mix(acc, &child);
    }

    fn collect(&self, acc: &mut Vec<String>, variant: Vec<String>) {
        acc.extend(variant);
    }
}

/// Counts permutations without building them, `None` on overflow
pub struct Count;

impl Fold for Count {
    type Acc = Option<u128>;

    fn sequence(&self) -> Option<u128> {
        Some(1)
    }

    fn group(&self) -> Option<u128> {
        Some(0)
    }

    fn literal(&self, _acc: &mut Option<u128>, _text: &str) {}

    fn combine(&self, acc: &mut Option<u128>, child: Option<u128>) {
        *acc = acc.zip(child).and_then(|(a, b)| a.checked_mul(b));
    }

    fn collect(&self, acc: &mut Option<u128>, variant: Option<u128>) {
        *acc = acc.zip(variant).and_then(|(a, b)| a.checked_add(b));
    }
}

/// Expand a sibling sequence into all of its permutations
pub fn permutations(tokens: &[Token]) -> Vec<String> {
    let res = fold_tokens(&Permutations, tokens);
    trace!("expanded {} tokens into {} permutations", tokens.len(), res.len());
    res
}

/// Replace `res` with every `p + s` for `p` in `res` (outer) and `s` in `variants` (inner)
fn mix(res: &mut Vec<String>, variants: &[String]) {
    if variants.len() == 1 {
        append_to_all(res, &variants[0]);
        return;
    }

    let mut mixed = Vec::with_capacity(res.len() * variants.len());
    for prefix in res.iter() {
        for suffix in variants {
            let mut s = String::with_capacity(prefix.len() + suffix.len());
            s.push_str(prefix);
            s.push_str(suffix);
            mixed.push(s);
        }
    }
    *res = mixed;
}

fn append_to_all(res: &mut [String], s: &str) {
    if s.is_empty() {
        return;
    }
    for item in res.iter_mut() {
        item.push_str(s);
    }
}
