//! Explanatory steps and the engines that produce them.

use crate::{
    ops::{self, Context},
    variables, Expression,
};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// One recorded transformation, `before` → `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub before: String,
    pub after: String,
    pub change: ChangeType,
}

impl Step {
    pub fn new<B, A>(before: B, after: A, change: ChangeType) -> Self
    where
        B: Into<String>,
        A: Into<String>,
    {
        Step {
            before: before.into(),
            after: after.into(),
            change,
        }
    }

    /// Rewrite the step so it talks about the variable the user wrote instead
    /// of the canonical `x`.
    pub fn restore_variable(self, original_var: Option<char>) -> Self {
        Step {
            before: variables::restore_for_display(&self.before, original_var),
            after: variables::restore_for_display(&self.after, original_var),
            change: self.change,
        }
    }
}

/// Steps coming from another engine are usually just a
/// `(before, after, label)` triple.
impl<B, A, L> From<(B, A, L)> for Step
where
    B: Into<String>,
    A: Into<String>,
    L: AsRef<str>,
{
    fn from((before, after, label): (B, A, L)) -> Self {
        Step::new(before, after, ChangeType::External(label.as_ref().into()))
    }
}

/// Values this close to an integer are treated as that integer.
const INTEGER_TOLERANCE: f64 = 1e-12;

/// Round away floating point noise like `2.0000000000000004`.
fn snap_to_integer(value: f64) -> f64 {
    let rounded = value.round();

    if approx::abs_diff_eq!(value, rounded, epsilon = INTEGER_TOLERANCE) {
        rounded
    } else {
        value
    }
}

/// Format a number for use in a step, printing values which are within
/// rounding error of an integer without a fractional part.
pub(crate) fn format_number(value: f64) -> String {
    let value = snap_to_integer(value);

    if value == 0.0 {
        // avoid "-0"
        String::from("0")
    } else {
        value.to_string()
    }
}

/// Apply [`snap_to_integer()`] to every constant in a tree.
fn snap_constants(expr: Expression) -> Expression {
    match expr {
        Expression::Constant(value) => {
            let value = snap_to_integer(value);
            Expression::Constant(if value == 0.0 { 0.0 } else { value })
        },
        Expression::Binary { left, right, op } => Expression::Binary {
            left: Box::new(snap_constants(*left)),
            right: Box::new(snap_constants(*right)),
            op,
        },
        Expression::Negate(inner) => {
            Expression::Negate(Box::new(snap_constants(*inner)))
        },
        Expression::FunctionCall { function, argument } => {
            Expression::FunctionCall {
                function,
                argument: Box::new(snap_constants(*argument)),
            }
        },
        Expression::Parameter(p) => Expression::Parameter(p),
    }
}

/// What kind of transformation a [`Step`] performed.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeType {
    SimplifyBothSides,
    MoveTerms,
    DivideByCoefficient,
    /// The equation has no unique solution, `after` says which way it went.
    Classify,
    EvaluateRoot,
    EvaluatePower,
    Evaluate,
    Simplify,
    /// A label provided by an external step generator.
    External(SmolStr),
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::SimplifyBothSides => write!(f, "simplify both sides"),
            ChangeType::MoveTerms => write!(f, "move terms"),
            ChangeType::DivideByCoefficient => {
                write!(f, "divide by coefficient")
            },
            ChangeType::Classify => write!(f, "classification"),
            ChangeType::EvaluateRoot => write!(f, "evaluate root"),
            ChangeType::EvaluatePower => write!(f, "evaluate power"),
            ChangeType::Evaluate => write!(f, "evaluate"),
            ChangeType::Simplify => write!(f, "simplify"),
            ChangeType::External(label) => write!(f, "{}", label),
        }
    }
}

/// The three things a [`StepSource`] can tell us.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Steps(Vec<Step>),
    /// The engine understood the input but had nothing to say about it.
    NoProgress,
    /// The engine couldn't handle the input at all.
    Failed(String),
}

impl StepOutcome {
    /// The steps, if there were any.
    pub fn into_steps(self) -> Option<Vec<Step>> {
        match self {
            StepOutcome::Steps(steps) if !steps.is_empty() => Some(steps),
            _ => None,
        }
    }
}

/// Something which can explain how to simplify an expression or solve an
/// equation.
///
/// This is the seam for plugging in a proper symbolic engine. Nothing is
/// assumed about whether it will succeed.
pub trait StepSource {
    fn simplify(&self, expression: &str) -> StepOutcome;

    fn solve_equation(&self, equation: &str) -> StepOutcome;
}

/// A [`StepSource`] which never has anything to say.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct NoSteps;

impl StepSource for NoSteps {
    fn simplify(&self, _expression: &str) -> StepOutcome {
        StepOutcome::NoProgress
    }

    fn solve_equation(&self, _equation: &str) -> StepOutcome {
        StepOutcome::NoProgress
    }
}

/// A [`StepSource`] which simplifies expressions with
/// [`ops::fold_constants()`]. It doesn't know how to solve equations.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FoldingStepSource<C> {
    ctx: C,
}

impl<C> FoldingStepSource<C> {
    pub fn new(ctx: C) -> Self { FoldingStepSource { ctx } }
}

impl<C: Context> StepSource for FoldingStepSource<C> {
    fn simplify(&self, expression: &str) -> StepOutcome {
        if expression.contains('=') {
            return StepOutcome::Failed(String::from(
                "equations can't be simplified",
            ));
        }

        let parsed: Expression = match expression.parse() {
            Ok(parsed) => parsed,
            Err(e) => return StepOutcome::Failed(e.to_string()),
        };
        let folded = ops::fold_constants(&parsed, &self.ctx);

        if folded == parsed {
            StepOutcome::NoProgress
        } else {
            StepOutcome::Steps(vec![Step::new(
                expression.trim(),
                snap_constants(folded).to_string(),
                ChangeType::Simplify,
            )])
        }
    }

    fn solve_equation(&self, _equation: &str) -> StepOutcome {
        StepOutcome::NoProgress
    }
}
