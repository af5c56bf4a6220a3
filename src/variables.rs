//! Renaming the lone unknown in a problem to `x`, and back again.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::collections::BTreeSet;

static ALPHABETIC_RUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z]+").expect("hard-coded patterns are always valid")
});
static STANDALONE_X: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bx\b").expect("hard-coded patterns are always valid")
});

/// Single letters which always mean something else (Euler's number and the
/// imaginary unit).
const RESERVED: &[char] = &['e', 'i'];

/// The canonical name for the unknown in a single-variable problem.
pub const CANONICAL_VARIABLE: char = 'x';

/// The result of [`canonicalize()`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMapping {
    /// The expression, with its variable renamed to `x` if we could.
    pub expression: String,
    /// The variable's original name, set only when it was actually renamed.
    pub original_var: Option<char>,
}

/// Find every distinct single-letter variable (lower-cased) mentioned in an
/// expression, ignoring the reserved names `e` and `i`.
pub fn single_letter_variables(expr: &str) -> BTreeSet<char> {
    ALPHABETIC_RUNS
        .find_iter(expr)
        .map(|m| m.as_str())
        .filter(|token| token.len() == 1)
        .filter_map(|token| token.chars().next())
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| !RESERVED.contains(c))
        .collect()
}

/// If an expression has exactly one unknown, rename it to `x`.
///
/// Only occurrences that aren't part of a longer word are renamed, so in
/// `sqrt(t) + t` the `t` inside `sqrt` is left untouched. Expressions with no
/// unknowns, several unknowns, or which already use `x` come back unchanged.
pub fn canonicalize(expr: &str) -> VariableMapping {
    let variables = single_letter_variables(expr);

    let primary = match variables.iter().next() {
        Some(&primary) if variables.len() == 1 => primary,
        _ => return unchanged(expr),
    };

    if primary == CANONICAL_VARIABLE {
        return unchanged(expr);
    }

    VariableMapping {
        expression: rename_standalone(expr, primary, CANONICAL_VARIABLE),
        original_var: Some(primary),
    }
}

fn unchanged(expr: &str) -> VariableMapping {
    VariableMapping {
        expression: expr.to_string(),
        original_var: None,
    }
}

fn rename_standalone(expr: &str, from: char, to: char) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let is_letter = |ix: Option<&char>| {
        ix.map(|c| c.is_ascii_alphabetic()).unwrap_or(false)
    };

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let before = if i == 0 { None } else { chars.get(i - 1) };
            let after = chars.get(i + 1);

            if c.to_ascii_lowercase() == from
                && !is_letter(before)
                && !is_letter(after)
            {
                to
            } else {
                c
            }
        })
        .collect()
}

/// Undo [`canonicalize()`] for display, turning each standalone `x` back
/// into the variable the user actually wrote.
pub fn restore_for_display(text: &str, original_var: Option<char>) -> String {
    match original_var {
        Some(var) if var != CANONICAL_VARIABLE => {
            let name = var.to_string();
            STANDALONE_X.replace_all(text, NoExpand(&name)).into_owned()
        },
        _ => text.to_string(),
    }
}
