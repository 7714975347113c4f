use std::ops::Range;

use logos::Logos;

use crate::syntax::kind::TokenKind;

/// One lexed token with its byte span in the input.
///
/// `kind` is `None` for characters the lexer does not recognise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: Option<TokenKind>,
    pub text: &'a str,
    pub span: Range<usize>,
}

impl Lexeme<'_> {
    pub fn is(
        &self,
        kind: TokenKind,
    ) -> bool {
        self.kind == Some(kind)
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_some_and(TokenKind::is_trivia)
    }
}

/// A lexer that wraps `logos::Lexer` and keeps spans.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token_result = self.inner.next()?;
        Some(Lexeme {
            kind: token_result.ok(),
            text: self.inner.slice(),
            span: self.inner.span(),
        })
    }
}

/// Length of the token that starts exactly at `offset`.
///
/// Whitespace, comments and out-of-range offsets measure as zero, so a range
/// extended by this length never swallows blank space.
pub fn measure_token_length(
    source: &str,
    offset: usize,
) -> usize {
    let Some(rest) = source.get(offset..) else {
        return 0;
    };
    match Lexer::new(rest).next() {
        Some(lexeme) if lexeme.is_trivia() => 0,
        Some(lexeme) => lexeme.text.len(),
        None => 0,
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/lexer_tests.rs"]
mod tests;
