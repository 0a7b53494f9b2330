//! SQL LIKE pattern compilation.
//!
//! Translates a SQL `LIKE` pattern (`%` = any run, `_` = any single
//! character, an optional escape character literalizes the next `%`/`_`/
//! escape) into an anchored regular expression, in the spirit of
//! `like_pattern::compile` dispatched to from
//! `transparencies-materialize`'s `scalar/func.rs::is_like_match_case_sensitive`.

use fancy_regex::Regex;

use crate::error::EvalError;

/// Translates `pattern` (with optional `escape`) into an anchored regex.
pub fn compile(pattern: &str, escape: Option<char>) -> Result<Regex, EvalError> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            match chars.next() {
                Some(next) => push_literal(&mut out, next),
                None => {
                    return Err(EvalError::unsupported(
                        "LIKE pattern ends with a dangling escape character",
                    ));
                }
            }
            continue;
        }
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => push_literal(&mut out, other),
        }
    }
    out.push('$');

    Regex::new(&out).map_err(|e| EvalError::unsupported(format!("invalid LIKE pattern: {e}")))
}

fn push_literal(out: &mut String, c: char) {
    if regex_syntax_needs_escape(c) {
        out.push('\\');
    }
    out.push(c);
}

fn regex_syntax_needs_escape(c: char) -> bool {
    matches!(
        c,
        '.' | '^'
            | '$'
            | '*'
            | '+'
            | '?'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '|'
            | '\\'
    )
}

/// True when `pattern` contains no wildcard metacharacters, meaning a LIKE
/// against it degenerates to a plain equality comparison (§4.1).
pub fn is_plain(pattern: &str, escape: Option<char>) -> bool {
    if escape.is_some() {
        // An escape character in play means `%`/`_` might be literalized,
        // but determining that still requires walking the pattern; treat
        // the conservative case (escape present at all) as non-plain, a
        // wildcard-free pattern with an unused escape is rare enough not
        // to special-case.
        return false;
    }
    !pattern.contains('%') && !pattern.contains('_')
}
