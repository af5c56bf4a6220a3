//! Explaining how to solve `a*x + c = 0` when nothing else can.

use crate::{
    equations::split_equation,
    ops::{self, Context},
    steps::{format_number, ChangeType, Step},
    variables::CANONICAL_VARIABLE,
    Equation, Expression, Parameter, SolverOptions,
};
use arrayvec::ArrayVec;
use std::collections::BTreeSet;

/// Where we sample `lhs - rhs` when checking it's a straight line.
const SAMPLE_POINTS: [f64; 3] = [0.0, 1.0, 2.0];

/// Try to solve an equation in `x` which is linear, producing a short
/// derivation.
///
/// The equation is treated as a black box, `f(x) = lhs(x) - rhs(x)`, which
/// is sampled at 0, 1, and 2. If the second difference vanishes we assume
/// `f(x) = a*x + c` with `a = f(1) - f(0)` and `c = f(0)`.
///
/// Returns `None` when the equation isn't well formed, mentions anything
/// other than `x`, can't be evaluated, or isn't linear.
pub fn linear_equation_steps<C>(
    equation: &str,
    ctx: &C,
    options: &SolverOptions,
) -> Option<Vec<Step>>
where
    C: Context,
{
    let (left_src, right_src) = split_equation(equation)?;
    let equation =
        Equation::new(left_src.parse().ok()?, right_src.parse().ok()?);

    let x = Parameter::named(CANONICAL_VARIABLE.to_string());
    let unknowns: BTreeSet<&Parameter> =
        equation.params().filter(|p| !ctx.is_constant(p)).collect();

    if unknowns.len() != 1 || !unknowns.contains(&x) {
        return None;
    }

    let body = equation.body();
    let samples: ArrayVec<[f64; 3]> = SAMPLE_POINTS
        .iter()
        .map(|&value| sample(&body, &x, value, ctx))
        .collect::<Option<_>>()?;
    let (f0, f1, f2) = (samples[0], samples[1], samples[2]);

    let second_difference = (f2 - f1) - (f1 - f0);
    if second_difference.abs() > options.linearity_tolerance {
        log::trace!(
            "\"{}\" isn't linear (second difference is {})",
            equation_text(equation.left(), equation.right()),
            second_difference
        );
        return None;
    }

    let a = f1 - f0;
    let c = f0;

    let simplified_left = ops::fold_constants(equation.left(), ctx);
    let simplified_right = ops::fold_constants(equation.right(), ctx);
    let moved = format!(
        "{}*{} + ({}) = 0",
        format_number(a),
        x,
        format_number(c)
    );

    let mut steps = vec![
        Step::new(
            format!("{} = {}", left_src, right_src),
            equation_text(&simplified_left, &simplified_right),
            ChangeType::SimplifyBothSides,
        ),
        Step::new(
            format!("{} - ({}) = 0", simplified_left, simplified_right),
            moved.as_str(),
            ChangeType::MoveTerms,
        ),
    ];

    if a.abs() > options.coefficient_epsilon {
        steps.push(Step::new(
            format!("{}*{} = {}", format_number(a), x, format_number(-c)),
            format!("{} = {}", x, format_number(-c / a)),
            ChangeType::DivideByCoefficient,
        ));
    } else {
        let classification = if c.abs() < options.coefficient_epsilon {
            "identity, infinitely many solutions"
        } else {
            "inconsistent, no solution"
        };
        steps.push(Step::new(moved, classification, ChangeType::Classify));
    }

    Some(steps)
}

fn sample<C: Context>(
    body: &Expression,
    x: &Parameter,
    value: f64,
    ctx: &C,
) -> Option<f64> {
    let lookup = |p: &Parameter| if p == x { Some(value) } else { None };

    ops::evaluate(body, lookup, ctx)
        .ok()
        .filter(|y| y.is_finite())
}

fn equation_text(left: &Expression, right: &Expression) -> String {
    format!("{} = {}", left, right)
}
