/// Reduce a clang type name to the bare name of the class it denotes.
///
/// E.g. `const ns::Foo &` -> `Foo`, `struct Bar *` -> `Bar`,
/// `Vec<int>` -> `Vec`. Used to find the record behind a variable's type.
pub fn normalize_type_name(qual_type: &str) -> Option<String> {
    let mut s = qual_type.trim();
    if s.is_empty() {
        return None;
    }

    if let Some((base, _)) = s.split_once('<') {
        s = base.trim();
    }

    loop {
        let before = s;
        for prefix in ["const ", "volatile ", "struct ", "class ", "union ", "enum "] {
            if let Some(rest) = before.strip_prefix(prefix) {
                s = rest.trim_start();
                break;
            }
        }
        if before == s {
            break;
        }
    }

    s = s.trim_end_matches(['*', '&', ' ', '\t']);
    if let Some(rest) = s.strip_suffix("const")
        && rest.ends_with([' ', '*', '&'])
    {
        s = rest.trim_end_matches(['*', '&', ' ', '\t']);
    }

    let token = s.split_whitespace().last().unwrap_or(s);
    let token = token.trim_end_matches(['*', '&']);

    let token = token.rsplit("::").next().unwrap_or(token).trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/src/tree/types_tests.rs"]
mod tests;
