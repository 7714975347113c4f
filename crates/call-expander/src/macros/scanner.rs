use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};

use tracing::debug;

use crate::{
    macros::{MacroDefinition, MacroExpansion, MacroToken, MacroTokenKind, MacroTrace, VA_ARGS},
    source::{FileLocation, SourceManager},
    syntax::{Lexeme, Lexer, TokenKind},
};

/// Where `#include`d headers are looked up.
///
/// Quoted includes try the including file's directory first, then the
/// include paths in order. Angled includes only try the include paths, and
/// absolute includes are read as they are.
pub struct HeaderSearch<'a> {
    sources: &'a SourceManager,
    include_paths: &'a [String],
}

impl<'a> HeaderSearch<'a> {
    pub fn new(
        sources: &'a SourceManager,
        include_paths: &'a [String],
    ) -> Self {
        Self {
            sources,
            include_paths,
        }
    }

    /// Path and text of `header` as included from `includer`.
    pub fn find(
        &self,
        includer: &str,
        header: &str,
        angled: bool,
    ) -> Option<(String, Arc<str>)> {
        let include = Path::new(header);
        let local = Path::new(includer).parent().filter(|_| !angled).map(|dir| dir.join(include));
        let candidates = if include.is_absolute() {
            vec![include.to_path_buf()]
        } else {
            local.into_iter().chain(self.include_paths.iter().map(|dir| Path::new(dir).join(include))).collect()
        };
        for candidate in candidates {
            let path = candidate.display().to_string();
            match self.sources.buffer(&path) {
                Ok(text) => return Some((path, text)),
                Err(err) => debug!("[macro-trace] {header} is not {path}: {err}"),
            }
        }
        None
    }
}

/// Record the `#define`s of `text` and every later invocation of a macro
/// that is defined at that point.
///
/// Only directives that start a line are recognised and only `#define` and
/// `#undef` are interpreted; includes and conditionals are not followed.
pub fn scan_macros(
    file: &str,
    text: &str,
) -> MacroTrace {
    trace(file, text, None)
}

/// Like [`scan_macros`], but `#include` directives are followed through
/// `headers`. Each header is scanned once, at its first include, so its
/// macros are defined for the rest of the including file.
pub fn trace_macros(
    file: &str,
    text: &str,
    headers: &HeaderSearch<'_>,
) -> MacroTrace {
    trace(file, text, Some(headers))
}

fn trace(
    file: &str,
    text: &str,
    headers: Option<&HeaderSearch<'_>>,
) -> MacroTrace {
    let mut state = TraceState {
        headers,
        visited: HashSet::from([file.to_owned()]),
        active: HashMap::new(),
        trace: MacroTrace::default(),
    };
    Scanner::new(&mut state, file, text).run();

    debug!(
        "[macro-trace] {}: {} definitions, {} expansions, {} files",
        file,
        state.trace.definitions.len(),
        state.trace.expansions.len(),
        state.visited.len(),
    );
    state.trace
}

/// State shared by the main file and every header it pulls in.
struct TraceState<'h> {
    headers: Option<&'h HeaderSearch<'h>>,
    visited: HashSet<String>,
    /// Currently defined macros by name.
    active: HashMap<String, usize>,
    trace: MacroTrace,
}

struct Scanner<'a, 'h> {
    state: &'a mut TraceState<'h>,
    file: Arc<str>,
    text: &'a str,
    lexemes: Vec<Lexeme<'a>>,
    line_starts: Vec<usize>,
}

/// A significant directive token and whether blank space preceded it.
type Spaced = (usize, bool);

impl<'a, 'h> Scanner<'a, 'h> {
    fn new(
        state: &'a mut TraceState<'h>,
        file: &str,
        text: &'a str,
    ) -> Self {
        Self {
            state,
            file: Arc::from(file),
            text,
            lexemes: Lexer::new(text).collect(),
            line_starts: line_starts(text),
        }
    }

    fn run(&mut self) {
        let mut index = 0;
        let mut at_line_start = true;
        while index < self.lexemes.len() {
            let lexeme = &self.lexemes[index];
            if lexeme.is_trivia() {
                if lexeme.is(TokenKind::Whitespace) && lexeme.text.contains('\n') {
                    at_line_start = true;
                }
                index += 1;
                continue;
            }

            if at_line_start && lexeme.is(TokenKind::Hash) {
                index = self.directive(index);
                continue;
            }
            at_line_start = false;

            if lexeme.is(TokenKind::Ident)
                && let Some(&definition) = self.state.active.get(lexeme.text)
            {
                self.invocation(index, definition);
            }
            index += 1;
        }
    }

    /// Consume the directive starting at the `#` at `start`; returns the index
    /// of the newline that ends it.
    fn directive(
        &mut self,
        start: usize,
    ) -> usize {
        let mut items: Vec<Spaced> = Vec::new();
        let mut index = start + 1;
        let mut continued = false;
        let mut spaced = false;

        while let Some(lexeme) = self.lexemes.get(index) {
            match lexeme.kind {
                Some(TokenKind::Whitespace) => {
                    let newlines = lexeme.text.matches('\n').count();
                    if newlines > 0 && !(continued && newlines == 1) {
                        break;
                    }
                    continued = false;
                    spaced = true;
                },
                Some(TokenKind::Comment) => spaced = true,
                Some(TokenKind::Backslash) => continued = true,
                _ => {
                    continued = false;
                    items.push((index, spaced));
                    spaced = false;
                },
            }
            index += 1;
        }

        match items.first().map(|&(i, _)| self.lexemes[i].text) {
            Some("define") => self.define(&items[1..]),
            Some("undef") => {
                if let Some(&(i, _)) = items.get(1) {
                    self.state.active.remove(self.lexemes[i].text);
                }
            },
            Some("include") => self.include(&items[1..]),
            _ => {},
        }
        index
    }

    fn define(
        &mut self,
        items: &[Spaced],
    ) {
        let Some(&(name_index, _)) = items.first() else {
            return;
        };
        let name = &self.lexemes[name_index];
        if !name.is(TokenKind::Ident) {
            return;
        }

        let mut rest = 1;
        let mut params = Vec::new();
        let mut variadic = false;
        let function_like = items.get(1).is_some_and(|&(i, _)| {
            let paren = &self.lexemes[i];
            paren.is(TokenKind::LParen) && paren.span.start == name.span.end
        });

        if function_like {
            rest = 2;
            loop {
                let Some(&(i, _)) = items.get(rest) else {
                    debug!("[macro-trace] unterminated parameter list of {}", name.text);
                    return;
                };
                rest += 1;
                let lexeme = &self.lexemes[i];
                match lexeme.kind {
                    Some(TokenKind::RParen) => break,
                    Some(TokenKind::Comma) => {},
                    Some(TokenKind::Ident) => params.push(lexeme.text.to_owned()),
                    Some(TokenKind::Ellipsis) => {
                        variadic = true;
                        // `args...` names the variadic parameter itself.
                        let named = items
                            .get(rest - 2)
                            .is_some_and(|&(prev, _)| self.lexemes[prev].is(TokenKind::Ident));
                        if !named {
                            params.push(VA_ARGS.to_owned());
                        }
                    },
                    _ => {
                        debug!("[macro-trace] malformed parameter list of {}", name.text);
                        return;
                    },
                }
            }
        }

        let body_items = &items[rest.min(items.len())..];
        let (body, tokens) = match (body_items.first(), body_items.last()) {
            (Some(&(first, _)), Some(&(last, _))) => {
                let begin = self.lexemes[first].span.start;
                let end = self.lexemes[last].span.end;
                let tokens = body_items
                    .iter()
                    .enumerate()
                    .map(|(position, &(i, spaced))| {
                        let lexeme = &self.lexemes[i];
                        MacroToken {
                            kind: token_kind(lexeme),
                            spelling: lexeme.text.to_owned(),
                            offset: lexeme.span.start - begin,
                            leading_space: position > 0 && spaced,
                        }
                    })
                    .collect();
                (self.text[begin..end].to_owned(), tokens)
            },
            _ => (String::new(), Vec::new()),
        };

        let definition = MacroDefinition {
            name: name.text.to_owned(),
            location: self.location(name.span.start, name.text.len()),
            function_like,
            variadic,
            params,
            body,
            tokens,
        };
        let index = self.state.trace.definitions.len();
        self.state.active.insert(name.text.to_owned(), index);
        self.state.trace.definitions.push(definition);
    }

    /// `#include "file"` or `#include <file>`: scan the header in place.
    fn include(
        &mut self,
        items: &[Spaced],
    ) {
        let Some(headers) = self.state.headers else {
            return;
        };
        let Some(&(first, _)) = items.first() else {
            return;
        };
        let opening = &self.lexemes[first];
        let (header, angled) = if opening.is(TokenKind::String) {
            (opening.text.trim_matches('"'), false)
        } else if opening.is(TokenKind::Less)
            && let Some(&(last, _)) = items.iter().find(|&&(i, _)| self.lexemes[i].is(TokenKind::Greater))
        {
            (&self.text[opening.span.end..self.lexemes[last].span.start], true)
        } else {
            debug!("[macro-trace] {}: unsupported include form at offset {}", self.file, opening.span.start);
            return;
        };

        let Some((path, text)) = headers.find(&self.file, header, angled) else {
            debug!("[macro-trace] {}: header {header} not found", self.file);
            return;
        };
        if !self.state.visited.insert(path.clone()) {
            return;
        }
        debug!("[macro-trace] {}: following {path}", self.file);
        Scanner::new(&mut *self.state, &path, &text).run();
    }

    fn invocation(
        &mut self,
        name_index: usize,
        definition: usize,
    ) {
        let name = &self.lexemes[name_index];
        let name_location = self.location(name.span.start, name.text.len());

        if !self.state.trace.definitions[definition].function_like {
            let end = self.location(name.span.end, 0);
            self.state.trace.expansions.push(MacroExpansion {
                definition,
                name: name_location,
                end,
                args: Vec::new(),
            });
            return;
        }

        let Some(open) = (name_index + 1..self.lexemes.len()).find(|&i| !self.lexemes[i].is_trivia()) else {
            return;
        };
        if !self.lexemes[open].is(TokenKind::LParen) {
            return;
        }

        let mut args = Vec::new();
        let mut current = Vec::new();
        let mut depth = 1usize;
        let mut spaced = false;
        for lexeme in &self.lexemes[open + 1..] {
            if lexeme.is_trivia() {
                spaced = true;
                continue;
            }
            match lexeme.kind {
                Some(TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace) => depth += 1,
                Some(TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace) => depth -= 1,
                Some(TokenKind::Comma) if depth == 1 => {
                    args.push(std::mem::take(&mut current));
                    spaced = false;
                    continue;
                },
                _ => {},
            }
            if depth == 0 {
                args.push(current);
                let end = self.location(lexeme.span.end, 0);
                self.state.trace.expansions.push(MacroExpansion {
                    definition,
                    name: name_location,
                    end,
                    args,
                });
                return;
            }
            current.push(MacroToken {
                kind: token_kind(lexeme),
                spelling: lexeme.text.to_owned(),
                offset: lexeme.span.start,
                leading_space: spaced,
            });
            spaced = false;
        }
        debug!("[macro-trace] unterminated invocation of {} at offset {}", name.text, name.span.start);
    }

    fn location(
        &self,
        offset: usize,
        tok_len: usize,
    ) -> FileLocation {
        let line = self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1);
        FileLocation {
            file: self.file.clone(),
            offset,
            line: line as u32 + 1,
            col: (offset - self.line_starts[line]) as u32 + 1,
            tok_len,
        }
    }
}

fn token_kind(lexeme: &Lexeme<'_>) -> MacroTokenKind {
    match lexeme.kind {
        Some(TokenKind::Ident) => MacroTokenKind::Identifier,
        Some(TokenKind::Hash) => MacroTokenKind::Hash,
        Some(TokenKind::HashHash) => MacroTokenKind::HashHash,
        _ => MacroTokenKind::Other,
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1)).collect()
}

#[cfg(test)]
#[path = "../../tests/src/macros/scanner_tests.rs"]
mod tests;
