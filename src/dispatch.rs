//! Deciding how to treat a problem and running the matching strategy.

use crate::{
    linear, mini,
    normalize::{
        expand_canonical_adjacency, insert_implicit_multiplication, normalize,
    },
    ops::{self, Builtins, Context},
    solve::{self, SystemSolution},
    steps::{FoldingStepSource, Step, StepOutcome, StepSource},
    variables, Expression, SolveError, SolverOptions,
};
use smol_str::SmolStr;
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

/// What we managed to do with a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// A plain number.
    Evaluate { value: f64 },
    /// Steps for simplifying an expression.
    Simplify {
        steps: Vec<Step>,
        original_var: Option<char>,
    },
    /// Steps for solving an equation.
    Equation {
        steps: Vec<Step>,
        original_var: Option<char>,
    },
    /// The solution to a system of linear equations.
    System {
        solution: BTreeMap<SmolStr, f64>,
        system_repr: Vec<String>,
    },
}

impl SolveResult {
    /// The steps taken, if this kind of result has any.
    pub fn steps(&self) -> Option<&[Step]> {
        match self {
            SolveResult::Simplify { steps, .. }
            | SolveResult::Equation { steps, .. } => Some(steps),
            _ => None,
        }
    }
}

impl From<SystemSolution> for SolveResult {
    fn from(s: SystemSolution) -> Self {
        SolveResult::System {
            solution: s.solution,
            system_repr: s.system_repr,
        }
    }
}

impl Display for SolveResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Evaluate { value } => write!(f, "= {}", value),
            SolveResult::Simplify { steps, .. }
            | SolveResult::Equation { steps, .. } => {
                for (i, step) in steps.iter().enumerate() {
                    writeln!(
                        f,
                        "{}. {} => {} ({})",
                        i + 1,
                        step.before,
                        step.after,
                        step.change
                    )?;
                }
                Ok(())
            },
            SolveResult::System {
                solution,
                system_repr,
            } => {
                for equation in system_repr {
                    writeln!(f, "{}", equation)?;
                }
                for (name, value) in solution {
                    writeln!(f, "{} = {}", name, value)?;
                }
                Ok(())
            },
        }
    }
}

/// Solve a problem using the builtin functions, constant folding for
/// simplification, and the default [`SolverOptions`].
///
/// # Examples
///
/// ```rust
/// use stepsolve::SolveResult;
///
/// let got = stepsolve::solve("3y - 6 = 0").unwrap();
///
/// match got {
///     SolveResult::Equation { steps, original_var } => {
///         assert_eq!(original_var, Some('y'));
///         assert_eq!(steps.last().unwrap().after, "y = 2");
///     },
///     other => panic!("Unexpected result: {:?}", other),
/// }
/// ```
pub fn solve(raw: &str) -> Result<SolveResult, SolveError> {
    let source = FoldingStepSource::new(Builtins);
    solve_with(raw, &Builtins, &source, &SolverOptions::default())
}

/// Solve a problem, consulting `source` for simplification and equation
/// steps.
///
/// Strategies are tried from most to least specific (systems, linear
/// equations, `source`, the mini evaluation stepper, then plain evaluation)
/// and the first one to produce something wins. Only the final fallback's
/// failure is ever reported.
pub fn solve_with<C, S>(
    raw: &str,
    ctx: &C,
    source: &S,
    options: &SolverOptions,
) -> Result<SolveResult, SolveError>
where
    C: Context,
    S: StepSource + ?Sized,
{
    let normalized = normalize(raw);
    log::trace!("Normalized {:?} to {:?}", raw, normalized);

    let segments: Vec<&str> = normalized
        .split(|c: char| c == '\n' || c == ';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() >= 2 && segments.iter().all(|s| s.contains('=')) {
        log::debug!("Treating the input as a system of {}", segments.len());
        return solve::solve_system(&segments, ctx, options)
            .map(SolveResult::from);
    }

    if normalized.trim().is_empty() {
        return Err(SolveError::EmptyInput);
    }

    let explicit = insert_implicit_multiplication(&normalized);
    let mapping = variables::canonicalize(&explicit);
    let original_var = mapping.original_var;
    let input = expand_canonical_adjacency(&mapping.expression);

    if let Some(var) = original_var {
        log::debug!("Renamed \"{}\" to \"x\"", var);
    }

    let restore = |steps: Vec<Step>| -> Vec<Step> {
        steps
            .into_iter()
            .map(|step| step.restore_variable(original_var))
            .collect()
    };

    if input.contains('=') {
        if let Some(steps) = linear::linear_equation_steps(&input, ctx, options)
        {
            log::debug!("Solved \"{}\" as a linear equation", input);
            return Ok(SolveResult::Equation {
                steps: restore(steps),
                original_var,
            });
        }

        if let Some(steps) = outcome(source.solve_equation(&input), "solve") {
            return Ok(SolveResult::Equation {
                steps: restore(steps),
                original_var,
            });
        }
    }

    if let Some(steps) = outcome(source.simplify(&input), "simplify") {
        return Ok(SolveResult::Simplify {
            steps: restore(steps),
            original_var,
        });
    }

    let steps = mini::evaluation_steps(&input, ctx, options);
    if !steps.is_empty() {
        log::debug!("Evaluated \"{}\" in {} small steps", input, steps.len());
        return Ok(SolveResult::Simplify {
            steps: restore(steps),
            original_var,
        });
    }

    evaluate(&input, ctx).map(|value| SolveResult::Evaluate { value })
}

fn outcome(outcome: StepOutcome, what: &str) -> Option<Vec<Step>> {
    match outcome {
        StepOutcome::Failed(reason) => {
            log::debug!("Unable to {}: {}", what, reason);
            None
        },
        other => other.into_steps(),
    }
}

fn evaluate<C: Context>(input: &str, ctx: &C) -> Result<f64, SolveError> {
    let expr: Expression = input.parse()?;
    let value = ops::evaluate_constant(&expr, ctx)?;

    if value.is_finite() {
        Ok(value)
    } else {
        log::debug!("\"{}\" evaluated to {}", input, value);
        Err(SolveError::UnparsableExpression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{ChangeType, NoSteps};

    fn final_step(result: &SolveResult) -> &str {
        &result.steps().unwrap().last().unwrap().after
    }

    #[test]
    fn linear_equations_get_steps() {
        let got = solve("2x+1=5").unwrap();

        assert!(matches!(
            got,
            SolveResult::Equation {
                original_var: None,
                ..
            }
        ));
        assert_eq!(final_step(&got), "x = 2");
    }

    #[test]
    fn steps_use_the_original_variable_name() {
        let got = solve("3y-6=0").unwrap();

        match &got {
            SolveResult::Equation {
                steps,
                original_var,
            } => {
                assert_eq!(*original_var, Some('y'));
                assert_eq!(steps[0].before, "3*y-6 = 0");
                assert_eq!(steps[1].after, "3*y + (-6) = 0");
            },
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(final_step(&got), "y = 2");
    }

    #[test]
    fn spaced_coefficients_are_products() {
        let got = solve("2 X + 1 = 5").unwrap();
        assert_eq!(final_step(&got), "x = 2");

        let got = solve("3 t - 6 = 0").unwrap();
        assert_eq!(final_step(&got), "t = 2");
    }

    #[test]
    fn a_number_next_to_brackets_is_a_product() {
        let got = solve("3 (2+1)").unwrap();

        assert!(matches!(got, SolveResult::Simplify { .. }));
        assert_eq!(final_step(&got), "9");
    }

    #[test]
    fn folding_noise_is_rounded_away() {
        let got = solve("sqrt(2)^2").unwrap();

        assert_eq!(final_step(&got), "2");
    }

    #[test]
    fn pure_arithmetic_is_simplified() {
        let got = solve("sqrt(16)+2^3").unwrap();

        assert!(matches!(got, SolveResult::Simplify { .. }));
        assert_eq!(final_step(&got), "12");
    }

    #[test]
    fn plain_numbers_are_evaluated() {
        assert_eq!(solve("42").unwrap(), SolveResult::Evaluate { value: 42.0 });
        assert_eq!(
            solve("3,5").unwrap(),
            SolveResult::Evaluate { value: 3.5 }
        );
    }

    #[test]
    fn the_mini_stepper_is_a_fallback() {
        let options = SolverOptions::default();

        let got =
            solve_with("√16 + 2²", &Builtins, &NoSteps, &options).unwrap();

        assert_eq!(
            got,
            SolveResult::Simplify {
                steps: vec![
                    Step::new(
                        "sqrt(16) + 2^2",
                        "4 + 2^2",
                        ChangeType::EvaluateRoot
                    ),
                    Step::new("4 + 2^2", "4 + 4", ChangeType::EvaluatePower),
                    Step::new("4 + 4", "8", ChangeType::Evaluate),
                ],
                original_var: None,
            }
        );
    }

    #[test]
    fn systems_of_equations() {
        let got = solve("x+y=3\nx-y=1").unwrap();
        let semicolons = solve("x + y = 3; x - y = 1").unwrap();

        assert_eq!(got, semicolons);
        match got {
            SolveResult::System { solution, .. } => {
                assert_eq!(solution[&SmolStr::from("x")], 2.0);
                assert_eq!(solution[&SmolStr::from("y")], 1.0);
            },
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn a_single_line_with_a_semicolon_is_not_a_system() {
        let got = solve("2x+1=5;").unwrap();

        assert_eq!(final_step(&got), "x = 2");
    }

    #[test]
    fn garbage_input() {
        assert_eq!(solve(""), Err(SolveError::EmptyInput));
        assert_eq!(solve("*/"), Err(SolveError::EmptyInput));
        assert_eq!(solve("foo(3"), Err(SolveError::UnparsableExpression));
        assert_eq!(solve("1/0"), Err(SolveError::UnparsableExpression));
        assert_eq!(solve("x^2 = 4"), Err(SolveError::UnparsableExpression));
    }

    #[test]
    fn expressions_with_unknowns_can_still_be_simplified() {
        let got = solve("2t + 3t*1").unwrap();

        match got {
            SolveResult::Simplify {
                steps,
                original_var,
            } => {
                assert_eq!(original_var, Some('t'));
                assert_eq!(steps[0].before, "2*t + 3*t*1");
                assert_eq!(steps[0].after, "2*t + 3*t");
            },
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    struct Canned;

    impl StepSource for Canned {
        fn simplify(&self, _expression: &str) -> StepOutcome {
            StepOutcome::Failed(String::from("not today"))
        }

        fn solve_equation(&self, equation: &str) -> StepOutcome {
            StepOutcome::Steps(vec![(equation, "x = 2", "FACTOR").into()])
        }
    }

    #[test]
    fn defer_to_the_step_source_for_non_linear_equations() {
        let got = solve_with(
            "y^2 = 4",
            &Builtins,
            &Canned,
            &SolverOptions::default(),
        )
        .unwrap();

        assert_eq!(
            got,
            SolveResult::Equation {
                steps: vec![Step::new(
                    "y^2 = 4",
                    "y = 2",
                    ChangeType::External("FACTOR".into())
                )],
                original_var: Some('y'),
            }
        );
    }

    #[test]
    fn step_sources_can_be_trait_objects() {
        let source: &dyn StepSource = &NoSteps;

        let options = SolverOptions::default();

        let got = solve_with("1+1", &Builtins, source, &options).unwrap();

        assert_eq!(
            got,
            SolveResult::Simplify {
                steps: vec![Step::new("1+1", "2", ChangeType::Evaluate)],
                original_var: None,
            }
        );
    }
}
