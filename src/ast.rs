use std::io::{self, Write};

use crate::expander::{self, Count};

/// Node of a parsed spintax tree
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Fixed run of text, never empty when produced by the parser
    Literal(String),
    /// Set of mutually exclusive variants: `{a|b|c}`
    Group(Group),
    /// A single variant, i.e. a sequence of child tokens
    Variant(Variant),
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    /// Text along the first variant of every group.
    ///
    /// Only meant for diagnostics; use [`Structure::permutations`] to get real output.
    pub fn text(&self) -> String {
        first_path_text(std::slice::from_ref(self))
    }

    /// Number of alternatives this token chooses between.
    ///
    /// Literals and variants are inert (1); a group reports its variant count.
    pub fn num_variants(&self) -> usize {
        match self {
            Token::Literal(_) | Token::Variant(_) => 1,
            Token::Group(g) => g.num_variants(),
        }
    }

    /// Number of distinct paths through this token, `None` on overflow
    pub fn permutation_count(&self) -> Option<u128> {
        expander::fold_tokens(&Count, std::slice::from_ref(self))
    }

    /// Indented dump of the tree below this token
    pub fn structure_string(&self, prefix: &str) -> String {
        let mut out = String::new();
        dump(vec![Node::Token(self)], prefix, &mut out);
        out
    }
}

impl From<Group> for Token {
    fn from(group: Group) -> Self {
        Token::Group(group)
    }
}

impl From<Variant> for Token {
    fn from(variant: Variant) -> Self {
        Token::Variant(variant)
    }
}

/// One variant ("fork") of a group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variant {
    pub tokens: Vec<Token>,
}

impl Variant {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    pub fn text(&self) -> String {
        first_path_text(&self.tokens)
    }

    /// Product of the children's counts
    pub fn permutation_count(&self) -> Option<u128> {
        expander::fold_tokens(&Count, &self.tokens)
    }
}

impl Drop for Variant {
    // Nested tokens are moved into a flat list first, so deep trees drop
    // without recursing.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.tokens);
        while let Some(token) = pending.pop() {
            match token {
                Token::Literal(_) => {}
                Token::Group(mut g) => {
                    for v in g.variants.iter_mut() {
                        pending.append(&mut v.tokens);
                    }
                }
                Token::Variant(mut v) => pending.append(&mut v.tokens),
            }
        }
    }
}

/// Spintax group: `{variant|variant|...}`
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub variants: Vec<Variant>,
}

impl Default for Group {
    /// A freshly opened group already holds one empty variant
    fn default() -> Self {
        Self {
            variants: vec![Variant::default()],
        }
    }
}

impl Group {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self { variants }
    }

    pub fn num_variants(&self) -> usize {
        self.variants.len()
    }

    pub fn push_variant(&mut self, variant: Variant) {
        self.variants.push(variant);
    }

    /// Variant currently receiving tokens while the group is being parsed
    pub fn last_variant_mut(&mut self) -> &mut Variant {
        if self.variants.is_empty() {
            self.variants.push(Variant::default());
        }
        let last = self.variants.len() - 1;
        &mut self.variants[last]
    }

    pub fn text(&self) -> String {
        self.variants.first().map(Variant::text).unwrap_or_default()
    }

    /// Sum of the variants' counts
    pub fn permutation_count(&self) -> Option<u128> {
        expander::fold_group(&Count, self)
    }
}

fn first_path_text(tokens: &[Token]) -> String {
    let mut stack: Vec<&Token> = tokens.iter().rev().collect();
    let mut out = String::new();
    while let Some(token) = stack.pop() {
        match token {
            Token::Literal(s) => out.push_str(s),
            Token::Group(g) => {
                if let Some(first) = g.variants.first() {
                    stack.extend(first.tokens.iter().rev());
                }
            }
            Token::Variant(v) => stack.extend(v.tokens.iter().rev()),
        }
    }
    out
}

enum Node<'a> {
    Token(&'a Token),
    Variant(&'a Variant),
}

/// Pre-order dump, two extra spaces of indentation per level
fn dump(roots: Vec<Node<'_>>, prefix: &str, out: &mut String) {
    let mut stack: Vec<(Node<'_>, usize)> = roots.into_iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        out.push_str(prefix);
        for _ in 0..depth {
            out.push_str("  ");
        }
        match node {
            Node::Token(Token::Literal(s)) => {
                out.push_str("S: '");
                out.push_str(s);
                out.push_str("'\n");
            }
            Node::Token(Token::Group(g)) => {
                out.push_str("G:\n");
                stack.extend(g.variants.iter().rev().map(|v| (Node::Variant(v), depth + 1)));
            }
            Node::Token(Token::Variant(v)) | Node::Variant(v) => {
                out.push_str("V:\n");
                stack.extend(v.tokens.iter().rev().map(|t| (Node::Token(t), depth + 1)));
            }
        }
    }
}

/// Parsed spintax: the ordered top-level tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    tokens: Vec<Token>,
}

impl Structure {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Append a top-level token
    pub fn push(&mut self, token: impl Into<Token>) {
        self.tokens.push(token.into());
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Every string this structure denotes, in expansion order
    pub fn permutations(&self) -> Vec<String> {
        expander::permutations(&self.tokens)
    }

    /// Size of [`Structure::permutations`] without materializing it.
    ///
    /// An empty structure still expands to a single empty string.
    pub fn permutation_count(&self) -> Option<u128> {
        expander::fold_tokens(&Count, &self.tokens)
    }

    /// Write each permutation followed by a newline
    pub fn write_permutations<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.permutations() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn structure_string(&self) -> String {
        let mut out = String::new();
        dump(self.tokens.iter().map(Node::Token).collect(), "", &mut out);
        out
    }

    pub fn write_structure<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.structure_string().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(variants: Vec<Vec<Token>>) -> Token {
        Token::Group(Group::new(variants.into_iter().map(Variant::new).collect()))
    }

    #[test]
    fn test_num_variants() {
        assert_eq!(Token::literal("abc").num_variants(), 1);
        assert_eq!(Token::Variant(Variant::default()).num_variants(), 1);

        let g = group(vec![
            vec![Token::literal("a")],
            vec![Token::literal("b")],
            vec![Token::literal("c")],
        ]);
        assert_eq!(g.num_variants(), 3);
    }

    #[test]
    fn test_text_follows_first_variant() {
        let g = group(vec![
            vec![
                Token::literal("a"),
                group(vec![vec![Token::literal("x")], vec![Token::literal("y")]]),
            ],
            vec![Token::literal("b")],
        ]);
        assert_eq!(g.text(), "ax");
        assert_eq!(Token::Group(Group::new(vec![])).text(), "");
    }

    #[test]
    fn test_permutation_count() {
        // x{a|b{c|d}}y
        let s = Structure::new(vec![
            Token::literal("x"),
            group(vec![
                vec![Token::literal("a")],
                vec![
                    Token::literal("b"),
                    group(vec![vec![Token::literal("c")], vec![Token::literal("d")]]),
                ],
            ]),
            Token::literal("y"),
        ]);
        assert_eq!(s.permutation_count(), Some(3));
        assert_eq!(Structure::default().permutation_count(), Some(1));
    }

    #[test]
    fn test_permutation_count_overflow() {
        let wide = group(
            (0..1 << 16)
                .map(|_| vec![Token::literal("z")])
                .collect(),
        );
        let s = Structure::new(vec![wide; 9]);
        assert_eq!(s.permutation_count(), None);
    }

    #[test]
    fn test_structure_string() {
        let s = Structure::new(vec![
            Token::literal("a"),
            group(vec![vec![Token::literal("b")], vec![]]),
        ]);
        assert_eq!(s.structure_string(), "S: 'a'\nG:\n  V:\n    S: 'b'\n  V:\n");
    }

    #[test]
    fn test_last_variant_mut() {
        let mut g = Group::default();
        g.last_variant_mut().push(Token::literal("a"));
        g.push_variant(Variant::default());
        g.last_variant_mut().push(Token::literal("b"));
        assert_eq!(
            g.variants,
            vec![
                Variant::new(vec![Token::literal("a")]),
                Variant::new(vec![Token::literal("b")]),
            ]
        );
    }

    #[test]
    fn test_write_permutations() {
        let s = Structure::new(vec![group(vec![
            vec![Token::literal("a")],
            vec![Token::literal("b")],
        ])]);
        let mut out = Vec::new();
        s.write_permutations(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }

    fn nested(depth: usize) -> Token {
        let mut token = group(vec![vec![Token::literal("x")], vec![Token::literal("y")]]);
        for _ in 0..depth {
            token = group(vec![vec![Token::literal("a"), token]]);
        }
        token
    }

    #[test]
    fn test_deep_tree_queries_and_drop() {
        let token = nested(100_000);
        assert_eq!(token.num_variants(), 1);
        assert_eq!(token.permutation_count(), Some(2));
        assert_eq!(token.text(), format!("{}x", "a".repeat(100_000)));

        let s = Structure::new(vec![token]);
        assert_eq!(s.permutation_count(), Some(2));
        drop(s);
    }

    #[test]
    fn test_token_structure_string_prefix() {
        let g = group(vec![vec![Token::literal("a")], vec![Token::literal("b")]]);
        assert_eq!(
            g.structure_string("> "),
            "> G:\n>   V:\n>     S: 'a'\n>   V:\n>     S: 'b'\n"
        );
    }
}
