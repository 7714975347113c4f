use crate::{
    error::{ExpandError, Result},
    expand::ParameterMap,
    macros::{MacroDefinition, MacroToken, MacroTokenKind, argument_text},
};

/// Map each parameter of `definition` to the text of its argument run.
///
/// The variadic parameter receives every remaining argument, joined by `, `.
/// Missing arguments map to the empty string.
pub fn create_parameter_map(
    definition: &MacroDefinition,
    args: &[Vec<MacroToken>],
) -> Result<ParameterMap> {
    let mut map = ParameterMap::new();
    if definition.params.is_empty() {
        return Ok(map);
    }
    if !definition.variadic && args.len() > definition.params.len() {
        return Err(ExpandError::invariant(format!(
            "macro {} takes {} arguments but {} were given",
            definition.name,
            definition.params.len(),
            args.len(),
        )));
    }

    let last = definition.params.len() - 1;
    for (index, param) in definition.params.iter().enumerate() {
        let text = if definition.variadic && index == last {
            args.get(index..).unwrap_or_default().iter().map(|arg| argument_text(arg)).collect::<Vec<_>>().join(", ")
        } else {
            args.get(index).map(|arg| argument_text(arg)).unwrap_or_default()
        };
        map.insert(param.clone(), text);
    }
    Ok(map)
}

/// The replacement list of `definition` with parameters substituted.
///
/// A parameter after a single `#` becomes its quoted argument text. Every
/// `##` disappears together with the blank space around it, gluing its
/// neighbours. Anything else in the body is kept byte for byte.
pub fn rewrite_macro(
    definition: &MacroDefinition,
    parameters: &ParameterMap,
) -> String {
    let tokens = &definition.tokens;
    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    let mut hashes = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            MacroTokenKind::Hash => {
                hashes += 1;
                continue;
            },
            MacroTokenKind::HashHash => {
                hashes += 2;
                let begin = index.checked_sub(1).map_or(token.offset, |prev| tokens[prev].end());
                let end = tokens.get(index + 1).map_or(token.end(), |next| next.offset);
                edits.push((begin, end, String::new()));
                continue;
            },
            MacroTokenKind::Identifier => {
                if let Some(argument) = parameters.get(&token.spelling)
                    && definition.param_index(&token.spelling).is_some()
                {
                    if hashes == 1 && index > 0 {
                        let hash = &tokens[index - 1];
                        edits.push((hash.offset, token.end(), format!("\"{argument}\"")));
                    } else {
                        edits.push((token.offset, token.end(), argument.clone()));
                    }
                }
            },
            MacroTokenKind::Other => {},
        }
        hashes = 0;
    }

    edits.sort_by_key(|&(begin, _, _)| begin);
    let body = definition.body.as_str();
    let mut rewritten = String::with_capacity(body.len());
    let mut cursor = 0;
    for (begin, end, replacement) in edits {
        if begin < cursor {
            continue;
        }
        rewritten.push_str(&body[cursor..begin]);
        rewritten.push_str(&replacement);
        cursor = end;
    }
    rewritten.push_str(&body[cursor..]);
    rewritten
}

#[cfg(test)]
#[path = "../../tests/src/macros/rewriter_tests.rs"]
mod tests;
