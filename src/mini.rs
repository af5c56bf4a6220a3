//! A tiny numeric rewriter for explaining plain arithmetic when nothing
//! smarter is available.

use crate::{
    ops::{self, Context},
    steps::{format_number, ChangeType, Step},
    Expression, SolverOptions,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ROOT_OF_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"sqrt\(([-+]?[0-9]+(?:\.[0-9]+)?)\)")
        .expect("hard-coded patterns are always valid")
});

// The base is unsigned on purpose, in "3-2^2" the "-" is a subtraction.
static POWER_OF_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]+(?:\.[0-9]+)?)\s*\^\s*([-+]?[0-9]+)\b")
        .expect("hard-coded patterns are always valid")
});

/// Reduce a purely numeric expression one small rewrite at a time.
///
/// Each round evaluates the first `sqrt(number)`, else the first
/// `number^integer`, else the whole expression. We stop as soon as a round
/// changes nothing, and never do more than
/// [`SolverOptions::max_mini_steps`] rounds so cyclic rewrites still
/// terminate. Equations are ignored.
pub fn evaluation_steps<C>(
    expr: &str,
    ctx: &C,
    options: &SolverOptions,
) -> Vec<Step>
where
    C: Context,
{
    let mut steps = Vec::new();

    if expr.contains('=') {
        return steps;
    }

    let mut current = expr.trim().to_string();

    for round in 0..options.max_mini_steps {
        let rewrite = evaluate_first_root(&current)
            .map(|next| (next, ChangeType::EvaluateRoot))
            .or_else(|| {
                evaluate_first_power(&current)
                    .map(|next| (next, ChangeType::EvaluatePower))
            })
            .or_else(|| {
                evaluate_everything(&current, ctx)
                    .filter(|next| *next != current)
                    .map(|next| (next, ChangeType::Evaluate))
            });

        match rewrite {
            Some((next, change)) => {
                log::trace!(
                    "Round {}: {} => {} ({})",
                    round,
                    current,
                    next,
                    change
                );
                steps.push(Step::new(current.as_str(), next.as_str(), change));
                current = next;
            },
            None => break,
        }
    }

    steps
}

fn evaluate_first_root(current: &str) -> Option<String> {
    ROOT_OF_NUMBER.captures_iter(current).find_map(|caps| {
        let radicand: f64 = caps[1].parse().ok()?;
        let value = radicand.sqrt();

        if value.is_finite() {
            Some(splice(current, &caps, &format_number(value)))
        } else {
            None
        }
    })
}

fn evaluate_first_power(current: &str) -> Option<String> {
    POWER_OF_NUMBER.captures_iter(current).find_map(|caps| {
        let whole = caps.get(0)?;

        // "2^3.5" or "2^3^2" would be evaluated wrongly
        let rest = &current[whole.end()..];
        if rest.starts_with('.') || rest.trim_start().starts_with('^') {
            return None;
        }

        let base: f64 = caps[1].parse().ok()?;
        let exponent: i32 = caps[2].parse().ok()?;
        let value = base.powi(exponent);

        if value.is_finite() {
            Some(splice(current, &caps, &format_number(value)))
        } else {
            None
        }
    })
}

fn evaluate_everything<C: Context>(current: &str, ctx: &C) -> Option<String> {
    let expr: Expression = current.parse().ok()?;
    let value = ops::evaluate_constant(&expr, ctx).ok()?;

    if value.is_finite() {
        Some(format_number(value))
    } else {
        None
    }
}

/// Replace the whole match with some new text.
fn splice(src: &str, caps: &Captures<'_>, replacement: &str) -> String {
    let whole = caps.get(0).expect("Group 0 is always the whole match");
    format!("{}{}{}", &src[..whole.start()], replacement, &src[whole.end()..])
}
