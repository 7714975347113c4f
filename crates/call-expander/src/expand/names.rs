use crate::{
    error::Result,
    source::{FileLocation, SourceLocation, SourceManager},
    syntax::{Lexeme, Lexer, TokenKind},
    tree::{NodeId, NodeKind, Tree},
};

const OPERATOR_KEYWORD: &str = "operator";

/// Location of the name token of a reference or member access.
///
/// Clang dumps no `loc` for expressions, only a token range. A one-token range
/// is the name itself. Longer ranges are searched for the name: qualified
/// names (`ns::f`) and template arguments (`f<int>`, `obj.get<T>`) put other
/// tokens around it, and operator references cover the whole bracket pair
/// (`v[i]`, `obj(a, b)`) or start at their symbol (`a += b`). Spelled
/// operators, `a.operator+=(b)`, resolve to the `operator` keyword.
pub fn name_location(
    tree: &Tree,
    sources: &SourceManager,
    id: NodeId,
) -> Result<Option<SourceLocation>> {
    let node = tree.node(id);
    if let Some(loc) = &node.loc {
        return Ok(Some(loc.clone()));
    }
    let Some(range) = &node.range else {
        return Ok(None);
    };
    let name = match tree.kind(id) {
        NodeKind::DeclRef {
            name,
            ..
        }
        | NodeKind::Member {
            name,
            ..
        } => name.as_str(),
        _ => return Ok(Some(range.begin.clone())),
    };
    let (Some(begin), Some(end)) = (range.begin.canonical(), range.end.canonical()) else {
        return Ok(None);
    };
    if begin.offset == end.offset || range.begin.is_macro_expansion() || range.end.is_macro_expansion() {
        return Ok(Some(range.begin.clone()));
    }

    let text = sources.text(range)?;
    let tokens: Vec<Lexeme<'_>> = Lexer::new(&text).filter(|lexeme| !lexeme.is_trivia()).collect();
    let found = if is_operator_name(name) {
        Some(tokens.iter().position(|token| token.text == OPERATOR_KEYWORD).unwrap_or(0))
    } else {
        name_index(&tokens, name)
    };
    let Some(token) = found.and_then(|index| tokens.get(index)) else {
        return Ok(Some(range.end.clone()));
    };

    let offset = begin.offset + token.span.start;
    let location = sources.location_at(&begin.file, offset)?;
    Ok(Some(SourceLocation::at(FileLocation {
        file: begin.file.clone(),
        offset,
        line: location.line,
        col: location.column,
        tok_len: token.text.len(),
    })))
}

/// `operator+=`, `operator()`, but not `operator_count` or `operator bool`.
fn is_operator_name(name: &str) -> bool {
    name.strip_prefix(OPERATOR_KEYWORD)
        .map(str::trim_start)
        .and_then(|symbol| symbol.chars().next())
        .is_some_and(|c| !c.is_alphanumeric() && c != '_')
}

/// The name is the last token, or the token before a trailing template
/// argument list.
fn name_index(
    tokens: &[Lexeme<'_>],
    name: &str,
) -> Option<usize> {
    let mut index = tokens.len().checked_sub(1)?;
    if tokens[index].is(TokenKind::Greater) || tokens[index].is(TokenKind::RightShift) {
        let mut depth = 0isize;
        loop {
            depth += match tokens[index].kind {
                Some(TokenKind::Greater) => 1,
                Some(TokenKind::RightShift) => 2,
                Some(TokenKind::Less) => -1,
                _ => 0,
            };
            if depth <= 0 {
                break;
            }
            index = index.checked_sub(1)?;
        }
        index = index.checked_sub(1)?;
    }
    if tokens[index].text == name {
        return Some(index);
    }
    tokens.iter().rposition(|token| token.text == name)
}

#[cfg(test)]
#[path = "../../tests/src/expand/names_tests.rs"]
mod tests;
