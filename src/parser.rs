use log::debug;
use pest::Parser as _;
use pest::iterators::Pair;

use crate::ast::{Group, Structure, Token, Variant};
use crate::diagnostics::{ConsoleErrorHandler, ErrorHandler};
use crate::error::ParseError;

#[derive(pest_derive::Parser)]
#[grammar = "src/spintax.pest"]
pub struct SpintaxGrammar;

/// Flat lexical unit of spintax input. Positions are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    GroupStart(usize),
    GroupEnd(usize),
    VariantSep(usize),
    Text(&'a str),
}

impl<'a> Piece<'a> {
    fn from_pair(pair: Pair<'a, Rule>) -> Option<Self> {
        let position = pair.as_span().start();
        match pair.as_rule() {
            Rule::group_start => Some(Piece::GroupStart(position)),
            Rule::group_end => Some(Piece::GroupEnd(position)),
            Rule::variant_sep => Some(Piece::VariantSep(position)),
            Rule::text => Some(Piece::Text(pair.as_str())),
            _ => None,
        }
    }
}

impl SpintaxGrammar {
    /// Split input into maximal text runs and delimiters, without checking nesting.
    ///
    /// Every string tokenizes: anything that is not a delimiter is text.
    pub fn tokenize(input: &str) -> Vec<Piece<'_>> {
        SpintaxGrammar::parse(Rule::file, input)
            .expect("file rule accepts any input")
            .flat_map(|file| file.into_inner())
            .filter_map(Piece::from_pair)
            .collect()
    }
}

/// Spintax parser.
///
/// Builds a [`Structure`] from text, reporting problems to an [`ErrorHandler`].
/// Each call to [`Parser::parse`] starts from scratch. A parser holds state while
/// parsing, so use one instance per thread.
#[derive(Debug)]
pub struct Parser<H: ErrorHandler = ConsoleErrorHandler> {
    structure: Structure,
    handler: H,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_handler(ConsoleErrorHandler)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ErrorHandler> Parser<H> {
    pub fn with_handler(handler: H) -> Self {
        Self {
            structure: Structure::default(),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Result of the last parse; empty if it failed
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn into_structure(self) -> Structure {
        self.structure
    }

    /// Convert the input string into a spintax [`Structure`].
    ///
    /// On a fatal error the handler is notified, the structure is left empty
    /// and the error is returned.
    pub fn parse(&mut self, input: &str) -> Result<&Structure, ParseError> {
        self.structure.clear();
        debug!("parsing {} bytes of spintax", input.len());

        match self.build(input) {
            Ok(()) => {
                debug!("parsed {} top-level tokens", self.structure.tokens().len());
                Ok(&self.structure)
            }
            Err(err) => {
                self.handler.on_error(err.kind(), &err.to_string());
                debug!("finishing due to errors encountered");
                self.structure.clear();
                Err(err)
            }
        }
    }

    fn build(&mut self, input: &str) -> Result<(), ParseError> {
        let pieces = SpintaxGrammar::tokenize(input);

        // Groups that are still open, innermost last. A group is attached to its
        // parent once it closes.
        let mut groups: Vec<Group> = Vec::new();

        for piece in pieces {
            match piece {
                Piece::Text(text) => self.attach(&mut groups, Token::literal(text)),
                Piece::GroupStart(_) => groups.push(Group::default()),
                Piece::VariantSep(position) => groups
                    .last_mut()
                    .ok_or(ParseError::SeparatorOutsideGroup { position })?
                    .push_variant(Variant::default()),
                Piece::GroupEnd(position) => {
                    let group = groups
                        .pop()
                        .ok_or(ParseError::UnmatchedClose { position })?;
                    if group.num_variants() < 2 {
                        self.handler.on_warning(&format!(
                            "Group with less than 2 variants ends at position {position}."
                        ));
                    }
                    self.attach(&mut groups, group.into());
                }
            }
        }

        if !groups.is_empty() {
            return Err(ParseError::UnclosedGroups {
                count: groups.len(),
            });
        }
        Ok(())
    }

    /// Place a token in the innermost open group, or at the top level
    fn attach(&mut self, groups: &mut [Group], token: Token) {
        match groups.last_mut() {
            Some(group) => group.last_variant_mut().push(token),
            None => self.structure.push(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingErrorHandler, Severity};
    use crate::error::ErrorKind;

    fn parse(input: &str) -> (Result<Structure, ParseError>, CollectingErrorHandler) {
        let mut parser = Parser::with_handler(CollectingErrorHandler::new());
        let result = parser.parse(input).map(Clone::clone);
        (result, parser.into_handler())
    }

    #[test]
    fn test_tokenize() {
        let pieces = SpintaxGrammar::tokenize("ab{c|d}\n");
        assert_eq!(
            pieces,
            vec![
                Piece::Text("ab"),
                Piece::GroupStart(2),
                Piece::Text("c"),
                Piece::VariantSep(4),
                Piece::Text("d"),
                Piece::GroupEnd(6),
                Piece::Text("\n"),
            ]
        );
        assert!(SpintaxGrammar::tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_accepts_anything() {
        let input = "}}\0\u{fffd}|{\r\n\t{";
        let pieces = SpintaxGrammar::tokenize(input);
        assert_eq!(
            pieces,
            vec![
                Piece::GroupEnd(0),
                Piece::GroupEnd(1),
                Piece::Text("\0\u{fffd}"),
                Piece::VariantSep(6),
                Piece::GroupStart(7),
                Piece::Text("\r\n\t"),
                Piece::GroupStart(11),
            ]
        );
    }

    #[test]
    fn test_parse_plain_text() {
        let (result, handler) = parse("no choices here");
        let structure = result.unwrap();
        assert_eq!(structure.tokens(), &[Token::literal("no choices here")]);
        assert!(handler.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_nested() {
        let (result, _) = parse("x{a|b{c|d}}y");
        let structure = result.unwrap();
        assert_eq!(
            structure.tokens(),
            &[
                Token::literal("x"),
                Token::Group(Group::new(vec![
                    Variant::new(vec![Token::literal("a")]),
                    Variant::new(vec![
                        Token::literal("b"),
                        Token::Group(Group::new(vec![
                            Variant::new(vec![Token::literal("c")]),
                            Variant::new(vec![Token::literal("d")]),
                        ])),
                    ]),
                ])),
                Token::literal("y"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_variants() {
        let (result, handler) = parse("{|}");
        let structure = result.unwrap();
        assert_eq!(
            structure.tokens(),
            &[Token::Group(Group::new(vec![Variant::default(), Variant::default()]))]
        );
        assert!(handler.diagnostics.is_empty());
    }

    #[test]
    fn test_single_variant_warns() {
        let (result, handler) = parse("ab{c}");
        let structure = result.unwrap();
        assert_eq!(structure.tokens().len(), 2);
        assert_eq!(structure.tokens()[1].num_variants(), 1);

        assert_eq!(handler.errors().count(), 0);
        let warnings: Vec<_> = handler.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "Group with less than 2 variants ends at position 4."
        );
    }

    #[test]
    fn test_unmatched_close() {
        let (result, handler) = parse("a{b|c}}d");
        assert!(matches!(
            result,
            Err(ParseError::UnmatchedClose { position: 6 })
        ));
        assert_eq!(handler.diagnostics.len(), 1);
        assert_eq!(handler.diagnostics[0].severity, Severity::Error);
        assert_eq!(handler.diagnostics[0].kind, Some(ErrorKind::BracketsMismatch));
        assert_eq!(
            handler.diagnostics[0].message,
            "Closing group that was not opened. Brackets mismatch at position 6."
        );
    }

    #[test]
    fn test_unclosed_groups() {
        let (result, handler) = parse("a{b|{c|d}|{e");
        assert!(matches!(
            result,
            Err(ParseError::UnclosedGroups { count: 2 })
        ));
        let errors: Vec<_> = handler.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "Brackets mismatch: 2 group(s) have not been closed."
        );
    }

    #[test]
    fn test_separator_outside_group() {
        let (result, handler) = parse("a|b");
        assert!(matches!(
            result,
            Err(ParseError::SeparatorOutsideGroup { position: 1 })
        ));
        assert_eq!(handler.errors().next().unwrap().kind, Some(ErrorKind::StraySeparator));
    }

    #[test]
    fn test_error_clears_previous_structure() {
        let mut parser = Parser::with_handler(CollectingErrorHandler::new());
        assert!(!parser.parse("{a|b}").unwrap().is_empty());
        assert!(parser.parse("{a|b").is_err());
        assert!(parser.structure().is_empty());
    }

    #[test]
    fn test_reparse_replaces_structure() {
        let mut parser = Parser::with_handler(CollectingErrorHandler::new());
        parser.parse("first").unwrap();
        let structure = parser.parse("second").unwrap();
        assert_eq!(structure.tokens(), &[Token::literal("second")]);
    }

    #[test]
    fn test_borrowed_handler() {
        let mut handler = CollectingErrorHandler::new();
        {
            let mut parser = Parser::with_handler(&mut handler);
            parser.parse("{only}").unwrap();
        }
        assert_eq!(handler.warnings().count(), 1);
    }
}
