//! Turning noisy, hand-written (or OCR'd) maths into something the parser
//! understands.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("hard-coded patterns are always valid")
}

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| pattern(r"\s*\n\s*"));
static SPACES: Lazy<Regex> = Lazy::new(|| pattern(r"[^\S\n]+"));
static DASHES: Lazy<Regex> = Lazy::new(|| pattern(r"[–—]"));
static DECIMAL_COMMA: Lazy<Regex> = Lazy::new(|| pattern(r", ?"));
static UPPERCASE_X: Lazy<Regex> = Lazy::new(|| pattern(r"\bX\b"));
static ROOT_OF_GROUP: Lazy<Regex> = Lazy::new(|| pattern(r"√\s*\("));
static ROOT_OF_NUMBER: Lazy<Regex> =
    Lazy::new(|| pattern(r"√\s*(\d+(?:\.\d+)?)"));
static SUPERSCRIPTS: Lazy<Regex> =
    Lazy::new(|| pattern(r"⁻?[⁰¹²³⁴⁵⁶⁷⁸⁹]+"));
static LEADING_JUNK: Lazy<Regex> = Lazy::new(|| pattern(r"^[^0-9A-Za-z(]+"));
static TRAILING_JUNK: Lazy<Regex> = Lazy::new(|| pattern(r"[^0-9A-Za-z)]+$"));
static X_BEFORE_PAREN: Lazy<Regex> = Lazy::new(|| pattern(r"\bx\("));
static PAREN_BEFORE_X: Lazy<Regex> = Lazy::new(|| pattern(r"\)x\b"));

/// Localised (mostly Spanish) function names and their canonical spelling.
///
/// Order matters, `coseno` contains `seno` which contains `sen`.
static FUNCTION_NAMES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (pattern(r"(?i)coseno"), "cos"),
        (pattern(r"(?i)tangente"), "tan"),
        (pattern(r"(?i)seno"), "sin"),
        (pattern(r"(?i)sen"), "sin"),
        (pattern(r"(?i)tg"), "tan"),
        (pattern(r"(?i)ra[ií]z"), "sqrt"),
    ]
});

/// Rewrite raw text into canonical ASCII maths.
///
/// This never fails. Garbage in just means an empty (or otherwise useless)
/// string out, and it's up to the caller to decide what to do with that.
/// Newlines are kept so a system of equations can still be split into lines
/// afterwards.
pub fn normalize(raw: &str) -> String {
    let text = LINE_BREAKS.replace_all(raw, "\n");
    let text = SPACES.replace_all(&text, " ");

    let text = text.replace('×', "*");
    let text = DASHES.replace_all(&text, "-");
    let text = DECIMAL_COMMA.replace_all(&text, ".");

    let mut text = UPPERCASE_X.replace_all(&text, "x").into_owned();

    for (localised, canonical) in FUNCTION_NAMES.iter() {
        text = localised.replace_all(&text, *canonical).into_owned();
    }
    let text = text.replace("PI", "pi").replace('π', "pi");

    let text = ROOT_OF_GROUP.replace_all(&text, "sqrt(");
    let text = ROOT_OF_NUMBER.replace_all(&text, "sqrt(${1})");

    let text = SUPERSCRIPTS.replace_all(&text, |caps: &Captures<'_>| {
        let digits: String = caps[0].chars().filter_map(superscript).collect();
        format!("^{}", digits)
    });

    let text = LEADING_JUNK.replace(&text, "");
    let text = TRAILING_JUNK.replace(&text, "");

    text.into_owned()
}

fn superscript(c: char) -> Option<char> {
    let normal = match c {
        '⁻' => '-',
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        _ => return None,
    };

    Some(normal)
}

/// Make implicit multiplication explicit, turning `2x` into `2*x`,
/// `2(x+1)` into `2*(x+1)`, and `(a)(b)` into `(a)*(b)`.
///
/// Digits which are part of an identifier (e.g. `log10(`) are left alone.
pub fn insert_implicit_multiplication(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut previous = None;
    let mut in_identifier = false;

    for c in expr.chars() {
        if let Some(previous) = previous {
            let after_number = is_digit(previous) && !in_identifier;

            if (after_number && (c.is_ascii_alphabetic() || c == '('))
                || (previous == ')' && c == '(')
            {
                out.push('*');
            }
        }

        in_identifier = if c.is_ascii_alphabetic() || c == '_' {
            true
        } else {
            in_identifier && is_digit(c)
        };

        out.push(c);
        previous = Some(c);
    }

    out
}

fn is_digit(c: char) -> bool { c.is_ascii_digit() }

/// Once the main variable has been renamed to `x` we may have created new
/// adjacencies (`y(` becomes `x(`), so patch those up too.
pub(crate) fn expand_canonical_adjacency(expr: &str) -> String {
    let text = X_BEFORE_PAREN.replace_all(expr, "x*(");
    PAREN_BEFORE_X.replace_all(&text, ")*x").into_owned()
}
