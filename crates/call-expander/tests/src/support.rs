//! Source fixtures for unit tests: locations and ranges are looked up by the
//! text they cover, so trees can be assembled by hand against real code.

use std::sync::Arc;

use crate::{
    source::{FileLocation, FilePosition, SourceLocation, SourceManager, SourceRange, line_col_from_byte_offset},
    syntax::{Lexer, measure_token_length},
    tree::{Node, NodeKind},
};

pub(crate) struct Fixture {
    pub(crate) file: Arc<str>,
    pub(crate) text: String,
}

impl Fixture {
    pub(crate) fn new(
        file: &str,
        text: &str,
    ) -> Self {
        Self {
            file: Arc::from(file),
            text: text.to_string(),
        }
    }

    pub(crate) fn sources(&self) -> SourceManager {
        let sources = SourceManager::in_memory();
        sources.insert(self.file.to_string(), self.text.as_str());
        sources
    }

    pub(crate) fn offset(
        &self,
        needle: &str,
        nth: usize,
    ) -> usize {
        self.text
            .match_indices(needle)
            .nth(nth)
            .map(|(index, _)| index)
            .unwrap_or_else(|| panic!("`{needle}` #{nth} is not in the fixture"))
    }

    pub(crate) fn file_loc(
        &self,
        offset: usize,
    ) -> FileLocation {
        let (line, col) = line_col_from_byte_offset(&self.text, offset);
        FileLocation {
            file: self.file.clone(),
            offset,
            line,
            col,
            tok_len: measure_token_length(&self.text, offset),
        }
    }

    /// Location of the first occurrence of `needle`.
    pub(crate) fn loc(
        &self,
        needle: &str,
    ) -> SourceLocation {
        self.loc_nth(needle, 0)
    }

    pub(crate) fn loc_nth(
        &self,
        needle: &str,
        nth: usize,
    ) -> SourceLocation {
        SourceLocation::at(self.file_loc(self.offset(needle, nth)))
    }

    /// Location of `inner` inside the first occurrence of `snippet`.
    pub(crate) fn loc_in(
        &self,
        snippet: &str,
        inner: &str,
    ) -> SourceLocation {
        let start = self.offset(snippet, 0);
        let within = snippet.find(inner).unwrap_or_else(|| panic!("`{inner}` is not in `{snippet}`"));
        SourceLocation::at(self.file_loc(start + within))
    }

    /// Token range of the first occurrence of `snippet`: from its first byte
    /// to the start of its last token.
    pub(crate) fn range(
        &self,
        snippet: &str,
    ) -> SourceRange {
        self.range_nth(snippet, 0)
    }

    pub(crate) fn range_nth(
        &self,
        snippet: &str,
        nth: usize,
    ) -> SourceRange {
        let begin = self.offset(snippet, nth);
        let last = Lexer::new(snippet)
            .filter(|lexeme| !lexeme.is_trivia())
            .last()
            .map(|lexeme| lexeme.span.start)
            .unwrap_or_default();
        SourceRange::new(SourceLocation::at(self.file_loc(begin)), SourceLocation::at(self.file_loc(begin + last)))
    }

    /// Token range of `inner` inside the first occurrence of `snippet`.
    pub(crate) fn range_in(
        &self,
        snippet: &str,
        inner: &str,
    ) -> SourceRange {
        let start = self.offset(snippet, 0);
        let within = snippet.find(inner).unwrap_or_else(|| panic!("`{inner}` is not in `{snippet}`"));
        let nth = self.text.match_indices(inner).take_while(|(index, _)| *index < start + within).count();
        self.range_nth(inner, nth)
    }

    pub(crate) fn position(
        &self,
        needle: &str,
    ) -> FilePosition {
        self.position_nth(needle, 0)
    }

    pub(crate) fn position_nth(
        &self,
        needle: &str,
        nth: usize,
    ) -> FilePosition {
        FilePosition {
            file: self.file.clone(),
            offset: self.offset(needle, nth),
        }
    }

    /// A node covering the first occurrence of `snippet`.
    pub(crate) fn node(
        &self,
        kind: NodeKind,
        snippet: &str,
    ) -> Node {
        Node::new(kind).with_range(self.range(snippet))
    }

    pub(crate) fn node_nth(
        &self,
        kind: NodeKind,
        snippet: &str,
        nth: usize,
    ) -> Node {
        Node::new(kind).with_range(self.range_nth(snippet, nth))
    }
}
