use pretty_assertions::assert_eq;
use smol_str::SmolStr;
use std::{collections::BTreeMap, sync::Once};
use stepsolve::{
    ops::Builtins,
    steps::{FoldingStepSource, NoSteps},
    ChangeType, SolveError, SolveResult, SolverOptions, Step, StepOutcome,
    StepSource,
};

fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn solve(src: &str) -> Result<SolveResult, SolveError> {
    init_logger();
    stepsolve::solve(src)
}

fn last_step(result: &SolveResult) -> Step {
    result
        .steps()
        .and_then(|steps| steps.last())
        .cloned()
        .unwrap_or_else(|| panic!("{:?} has no steps", result))
}

macro_rules! final_step_is {
    ($name:ident, $src:expr => $should_be:expr) => {
        #[test]
        fn $name() {
            let got = solve($src).unwrap();

            assert_eq!(last_step(&got).after, $should_be);
        }
    };
}

final_step_is!(simple_linear_equation, "2x+1=5" => "x = 2");
final_step_is!(variable_is_renamed_back, "3y-6=0" => "y = 2");
final_step_is!(uppercase_x, "4X = 2" => "x = 0.5");
final_step_is!(decimal_commas, "0,5x = 2" => "x = 4");
final_step_is!(unicode_dashes, "3a – 9 = 0" => "a = 3");
final_step_is!(brackets, "2(t+1) = 10" => "t = 4");
final_step_is!(identity, "x+1=x+1" => "identity, infinitely many solutions");
final_step_is!(contradiction, "x+1=x+2" => "inconsistent, no solution");
final_step_is!(arithmetic, "sqrt(16)+2^3" => "12");
final_step_is!(spanish_functions, "raíz(9) + sen(0)" => "3");

#[test]
fn ocr_noise_around_an_equation() {
    let got = solve("  = 2x + 1 = 5 . ").unwrap();
    assert_eq!(last_step(&got).after, "x = 2");

    let got = solve("¿ 2x + 1 = 5 ?").unwrap();
    assert_eq!(last_step(&got).after, "x = 2");
}

#[test]
fn systems_on_separate_lines() {
    let got = solve("2x + 3y = 7\r\n\r\n  x - y = 1\n").unwrap();

    let should_be: BTreeMap<SmolStr, f64> =
        vec![(SmolStr::from("x"), 2.0), (SmolStr::from("y"), 1.0)]
            .into_iter()
            .collect();

    match got {
        SolveResult::System {
            solution,
            system_repr,
        } => {
            assert_eq!(solution, should_be);
            assert_eq!(system_repr.len(), 2);
        },
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn three_unknowns() {
    let got = solve("x + y + z = 6; x - y = 0; 2z = 6").unwrap();

    match got {
        SolveResult::System { solution, .. } => {
            let values: Vec<f64> = solution.values().copied().collect();
            assert_eq!(values, vec![1.5, 1.5, 3.0]);
        },
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn system_failures() {
    assert_eq!(
        solve("x + y = 3\n2x + 2y = 6"),
        Err(SolveError::SingularSystem)
    );
    assert_eq!(
        solve("x*y = 2\nx + y = 3"),
        Err(SolveError::NonLinearSystem {
            equation: String::from("x*y = 2")
        })
    );
    assert_eq!(solve("1 = 1\n2 = 2"), Err(SolveError::NoVariableDetected));
}

#[test]
fn error_messages() {
    let inputs = vec![
        ("*/", "no usable input"),
        ("foo(3", "expression could not be interpreted"),
        (
            "x + y = 3\n2x + 2y = 6",
            "system is singular or not linearly solvable",
        ),
        ("1 = 1\n2 = 2", "no variables detected in the system"),
    ];

    for (src, should_be) in inputs {
        let got = solve(src).unwrap_err();

        assert_eq!(got.to_string(), should_be);
    }
}

#[test]
fn plain_evaluation() {
    assert_eq!(solve("7").unwrap(), SolveResult::Evaluate { value: 7.0 });
    assert_eq!(solve("2,5").unwrap(), SolveResult::Evaluate { value: 2.5 });
}

#[test]
fn mini_steps_explain_arithmetic() {
    init_logger();

    let got = stepsolve::solve_with(
        "2³ + √(9)",
        &Builtins,
        &NoSteps,
        &SolverOptions::default(),
    )
    .unwrap();

    let changes: Vec<ChangeType> = got
        .steps()
        .unwrap()
        .iter()
        .map(|step| step.change.clone())
        .collect();
    assert_eq!(
        changes,
        vec![
            ChangeType::EvaluateRoot,
            ChangeType::EvaluatePower,
            ChangeType::Evaluate
        ]
    );
    assert_eq!(last_step(&got).after, "11");
}

#[test]
fn the_mini_stepper_gives_up_eventually() {
    init_logger();
    let src = vec!["sqrt(4)"; 25].join("+");
    let options = SolverOptions::default().with_max_mini_steps(3);

    let got =
        stepsolve::solve_with(&src, &Builtins, &NoSteps, &options).unwrap();

    assert_eq!(got.steps().unwrap().len(), 3);
}

/// Pretends to be a full symbolic engine by replaying a canned answer.
struct Recorded {
    equation: &'static str,
    steps: Vec<(&'static str, &'static str, &'static str)>,
}

impl StepSource for Recorded {
    fn simplify(&self, _expression: &str) -> StepOutcome {
        StepOutcome::NoProgress
    }

    fn solve_equation(&self, equation: &str) -> StepOutcome {
        if equation == self.equation {
            StepOutcome::Steps(
                self.steps.iter().cloned().map(Step::from).collect(),
            )
        } else {
            StepOutcome::Failed(format!("no recording for \"{}\"", equation))
        }
    }
}

#[test]
fn external_engines_handle_non_linear_equations() {
    init_logger();
    let source = Recorded {
        equation: "x^2 = 9",
        steps: vec![
            ("x^2 = 9", "x = sqrt(9)", "TAKE_ROOT"),
            ("x = sqrt(9)", "x = 3", "SIMPLIFY_RIGHT_SIDE"),
        ],
    };

    let got = stepsolve::solve_with(
        "k² = 9",
        &Builtins,
        &source,
        &SolverOptions::default(),
    )
    .unwrap();

    assert_eq!(
        got,
        SolveResult::Equation {
            steps: vec![
                Step::new(
                    "k^2 = 9",
                    "k = sqrt(9)",
                    ChangeType::External("TAKE_ROOT".into())
                ),
                Step::new(
                    "k = sqrt(9)",
                    "k = 3",
                    ChangeType::External("SIMPLIFY_RIGHT_SIDE".into())
                ),
            ],
            original_var: Some('k'),
        }
    );
}

#[test]
fn the_linear_stepper_wins_over_external_engines() {
    init_logger();
    let source = Recorded {
        equation: "2*x = 4",
        steps: vec![("2*x = 4", "x = 2", "DIVIDE")],
    };

    let got = stepsolve::solve_with(
        "2x = 4",
        &Builtins,
        &source,
        &SolverOptions::default(),
    )
    .unwrap();

    let labels: Vec<String> = got
        .steps()
        .unwrap()
        .iter()
        .map(|step| step.change.to_string())
        .collect();
    assert_eq!(
        labels,
        vec!["simplify both sides", "move terms", "divide by coefficient"]
    );
}

#[test]
fn folding_simplifies_symbolic_expressions() {
    init_logger();
    let source = FoldingStepSource::new(Builtins);

    let got = stepsolve::solve_with(
        "3a*1 + 0",
        &Builtins,
        &source,
        &SolverOptions::default(),
    )
    .unwrap();

    assert_eq!(
        got,
        SolveResult::Simplify {
            steps: vec![Step::new("3*a*1 + 0", "3*a", ChangeType::Simplify)],
            original_var: Some('a'),
        }
    );
}
