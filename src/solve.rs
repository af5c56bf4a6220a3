//! Solving systems of linear equations.

use crate::{
    normalize::{insert_implicit_multiplication, normalize},
    ops::{self, Context},
    render, Equation, Parameter, SolveError, SolverOptions, SystemOfEquations,
};
use nalgebra::{DMatrix as Matrix, DVector as Vector};
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};

/// The answer to a system of equations, plus how we interpreted it.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolution {
    /// The value of each variable, rounded to
    /// [`SolverOptions::system_decimals`] places.
    pub solution: BTreeMap<SmolStr, f64>,
    /// Each equation, as LaTeX.
    pub system_repr: Vec<String>,
}

/// Solve several `lhs = rhs` equations which are linear in their unknowns.
///
/// Each equation gets the same clean-up as a single problem would
/// (normalisation and explicit multiplication) but variables keep their
/// names.
pub fn solve_system<S, C>(
    equations: &[S],
    ctx: &C,
    options: &SolverOptions,
) -> Result<SystemSolution, SolveError>
where
    S: AsRef<str>,
    C: Context,
{
    let system = SystemOfEquations::from_equations(
        equations
            .iter()
            .map(|eq| insert_implicit_multiplication(&normalize(eq.as_ref()))),
    )?;

    let solution = system.solve(ctx, options)?;
    let system_repr = (&system)
        .into_iter()
        .map(render::equation_to_latex)
        .collect();

    Ok(SystemSolution {
        solution,
        system_repr,
    })
}

impl SystemOfEquations {
    /// Find the value of every unknown, assuming the equations are linear.
    ///
    /// Square systems are solved directly, anything else is solved in the
    /// least-squares sense using the normal equations.
    pub fn solve<C>(
        &self,
        ctx: &C,
        options: &SolverOptions,
    ) -> Result<BTreeMap<SmolStr, f64>, SolveError>
    where
        C: Context,
    {
        if self.is_empty() {
            return Err(SolveError::NoVariableDetected);
        }

        let linear =
            LinearSystem::from_equations(self.equations(), ctx, options)?;
        log::debug!(
            "Solving a {}x{} linear system in {}",
            self.len(),
            linear.coefficients.ncols(),
            linear
                .variables
                .iter()
                .map(SmolStr::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let values = linear.solve().ok_or(SolveError::SingularSystem)?;

        Ok(linear.collate_unknowns(values.as_slice(), options.system_decimals))
    }

    /// Every variable mentioned by this system (lower-cased), ignoring named
    /// constants like `pi`.
    pub fn unknowns<C: Context>(&self, ctx: &C) -> BTreeSet<SmolStr> {
        unknowns(self.equations(), ctx)
    }
}

fn unknowns<C: Context>(equations: &[Equation], ctx: &C) -> BTreeSet<SmolStr> {
    equations
        .iter()
        .flat_map(|eq| eq.params())
        .filter(|p| !ctx.is_constant(p))
        .map(|p| SmolStr::from(p.name().to_lowercase()))
        .collect()
}

/// A system of equations written as `A.x = b`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    variables: Vec<SmolStr>,
    coefficients: Matrix<f64>,
    constants: Vector<f64>,
}

impl LinearSystem {
    /// Extract the coefficients of each variable by probing the equations.
    ///
    /// For each equation, `g = lhs - rhs`, we evaluate `g` at the origin to
    /// get the constant term and at each unit vector to get that variable's
    /// coefficient. A couple of extra samples make sure `g` really is linear,
    /// because otherwise the coefficients would be meaningless.
    pub fn from_equations<C>(
        equations: &[Equation],
        ctx: &C,
        options: &SolverOptions,
    ) -> Result<Self, SolveError>
    where
        C: Context,
    {
        let variables: Vec<SmolStr> =
            unknowns(equations, ctx).into_iter().collect();

        if variables.is_empty() {
            return Err(SolveError::NoVariableDetected);
        }

        let columns = variables.len();
        let mut coefficients = Vec::with_capacity(equations.len() * columns);
        let mut constants = Vec::with_capacity(equations.len());

        for equation in equations {
            let row = Probe {
                equation,
                variables: &variables,
                ctx,
                tolerance: options.linearity_tolerance,
            }
            .coefficients()?;

            coefficients.extend(row.coefficients);
            constants.push(-row.constant);
        }

        Ok(LinearSystem {
            coefficients: Matrix::from_row_slice(
                equations.len(),
                columns,
                &coefficients,
            ),
            constants: Vector::from_vec(constants),
            variables,
        })
    }

    pub fn variables(&self) -> &[SmolStr] { &self.variables }

    pub fn coefficients(&self) -> &Matrix<f64> { &self.coefficients }

    pub fn constants(&self) -> &Vector<f64> { &self.constants }

    /// Solve the system using LU decomposition, returning `None` if it is
    /// singular.
    pub fn solve(&self) -> Option<Vector<f64>> {
        let a = &self.coefficients;
        let b = &self.constants;

        let solution = if a.is_square() {
            a.clone().lu().solve(b)?
        } else {
            // (AᵀA).x = Aᵀb
            let a_transpose = a.transpose();
            (&a_transpose * a).lu().solve(&(&a_transpose * b))?
        };

        if solution.iter().all(|value| value.is_finite()) {
            Some(solution)
        } else {
            None
        }
    }

    pub(crate) fn collate_unknowns(
        &self,
        parameter_values: &[f64],
        decimals: i32,
    ) -> BTreeMap<SmolStr, f64> {
        self.variables
            .iter()
            .cloned()
            .zip(parameter_values.iter().map(|&v| round_to(v, decimals)))
            .collect()
    }
}

/// One row of a [`LinearSystem`].
#[derive(Debug, Clone, PartialEq)]
struct Row {
    coefficients: Vec<f64>,
    constant: f64,
}

struct Probe<'a, C> {
    equation: &'a Equation,
    variables: &'a [SmolStr],
    ctx: &'a C,
    tolerance: f64,
}

impl<'a, C: Context> Probe<'a, C> {
    fn coefficients(&self) -> Result<Row, SolveError> {
        let zeros = vec![0.0; self.variables.len()];
        let constant = self.evaluate(&zeros)?;

        let mut coefficients = Vec::with_capacity(self.variables.len());
        let mut point = zeros.clone();

        for ix in 0..self.variables.len() {
            point[ix] = 1.0;
            let once = self.evaluate(&point)?;
            point[ix] = 2.0;
            let twice = self.evaluate(&point)?;
            point[ix] = 0.0;

            let coefficient = once - constant;
            self.check_linear((twice - once) - coefficient)?;
            coefficients.push(coefficient);
        }

        // catches cross terms like "x*y", which look linear along each axis
        let ones = vec![1.0; self.variables.len()];
        let everything = self.evaluate(&ones)?;
        let predicted = constant + coefficients.iter().sum::<f64>();
        self.check_linear(everything - predicted)?;

        Ok(Row {
            coefficients,
            constant,
        })
    }

    fn evaluate(&self, parameter_values: &[f64]) -> Result<f64, SolveError> {
        let lookup = self.lookup_value_by_name(parameter_values);
        let value = ops::evaluate(&self.equation.body(), lookup, self.ctx)?;

        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.not_linear())
        }
    }

    fn lookup_value_by_name<'p>(
        &'p self,
        parameter_values: &'p [f64],
    ) -> impl Fn(&Parameter) -> Option<f64> + 'p {
        move |parameter| {
            if self.ctx.is_constant(parameter) {
                return None;
            }

            let name = parameter.name().to_lowercase();
            self.variables
                .iter()
                .position(|v| v.as_str() == name)
                .map(|ix| parameter_values[ix])
        }
    }

    fn check_linear(&self, residual: f64) -> Result<(), SolveError> {
        if residual.abs() <= self.tolerance {
            Ok(())
        } else {
            log::debug!(
                "\"{}\" isn't linear (residual {})",
                self.equation,
                residual
            );
            Err(self.not_linear())
        }
    }

    fn not_linear(&self) -> SolveError {
        SolveError::NonLinearSystem {
            equation: self.equation.to_string(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    let rounded = (value * scale).round() / scale;

    if rounded == 0.0 {
        // no "-0"
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Builtins;

    fn system(equations: &[&str]) -> SystemOfEquations {
        SystemOfEquations::from_equations(equations).unwrap()
    }

    fn named(values: &[(&str, f64)]) -> BTreeMap<SmolStr, f64> {
        values.iter().map(|&(name, v)| (SmolStr::from(name), v)).collect()
    }

    #[test]
    fn single_equality() {
        let got = system(&["x = 5", "2*x = 10"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();

        assert_eq!(got, named(&[("x", 5.0)]));
    }

    #[test]
    fn extract_coefficients() {
        let system = system(&["x + y = 3", "x - y = 1"]);

        let got = LinearSystem::from_equations(
            system.equations(),
            &Builtins,
            &SolverOptions::default(),
        )
        .unwrap();

        let variables: Vec<&str> =
            got.variables().iter().map(SmolStr::as_str).collect();
        assert_eq!(variables, vec!["x", "y"]);
        assert_eq!(
            got.coefficients(),
            &Matrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, -1.0])
        );
        assert_eq!(got.constants(), &Vector::from_vec(vec![3.0, 1.0]));
    }

    #[test]
    fn solve_simple_equations() {
        let got = system(&["x - 1 = 0", "y = 2", "z + 0*x = 3"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();

        assert_eq!(got, named(&[("x", 1.0), ("y", 2.0), ("z", 3.0)]));
    }

    #[test]
    fn upper_and_lower_case_are_the_same_variable() {
        let got = system(&["X + y = 3", "x - Y = 1"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();

        assert_eq!(got, named(&[("x", 2.0), ("y", 1.0)]));
    }

    #[test]
    fn constants_and_functions_are_not_unknowns() {
        let system = system(&["sin(0)*x + y = pi", "x - y = 0"]);

        assert_eq!(
            system.unknowns(&Builtins),
            vec![SmolStr::from("x"), SmolStr::from("y")]
                .into_iter()
                .collect()
        );
        let got = system.solve(&Builtins, &SolverOptions::default()).unwrap();
        assert_eq!(got, named(&[("x", 3.141593), ("y", 3.141593)]));
    }

    #[test]
    fn overdetermined_systems_use_least_squares() {
        let got = system(&["x = 1", "x = 3"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();

        assert_eq!(got, named(&[("x", 2.0)]));
    }

    #[test]
    fn results_are_rounded() {
        let got = system(&["3*x = 1", "y = 2/3"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();
        assert_eq!(got, named(&[("x", 0.333333), ("y", 0.666667)]));

        let got = system(&["3*x = 1", "y = 2/3"])
            .solve(&Builtins, &SolverOptions::new().with_system_decimals(2))
            .unwrap();
        assert_eq!(got, named(&[("x", 0.33), ("y", 0.67)]));
    }

    #[test]
    fn never_report_negative_zero() {
        let got = system(&["x + y = 0", "x - y = 0"])
            .solve(&Builtins, &SolverOptions::default())
            .unwrap();

        for value in got.values() {
            assert!(value.is_sign_positive());
        }
    }

    #[test]
    fn singular_systems_have_no_solution() {
        let got = system(&["x + y = 3", "2*x + 2*y = 6"])
            .solve(&Builtins, &SolverOptions::default());

        assert_eq!(got, Err(SolveError::SingularSystem));
    }

    #[test]
    fn non_linear_systems_are_rejected() {
        let inputs = vec![
            (vec!["x^2 + y = 3", "x - y = 1"], "x^2 + y = 3"),
            (vec!["x*y = 1", "x + y = 3"], "x*y = 1"),
            (vec!["x + y = 3", "1/x = 1"], "1/x = 1"),
        ];

        for (equations, culprit) in inputs {
            let got = system(&equations)
                .solve(&Builtins, &SolverOptions::default());

            assert_eq!(
                got,
                Err(SolveError::NonLinearSystem {
                    equation: culprit.to_string()
                })
            );
        }
    }

    #[test]
    fn systems_need_unknowns() {
        let got = system(&["1 = 1", "2 = 2"])
            .solve(&Builtins, &SolverOptions::default());

        assert_eq!(got, Err(SolveError::NoVariableDetected));

        let got = SystemOfEquations::new()
            .solve(&Builtins, &SolverOptions::default());
        assert_eq!(got, Err(SolveError::NoVariableDetected));
    }

    #[test]
    fn solve_messy_text() {
        let got = solve_system(
            &["2x + 3y = 7", " x – y = 1 "],
            &Builtins,
            &SolverOptions::default(),
        )
        .unwrap();

        assert_eq!(got.solution, named(&[("x", 2.0), ("y", 1.0)]));
        assert_eq!(
            got.system_repr,
            vec![
                "2\\cdot x+3\\cdot y = 7".to_string(),
                "x-y = 1".to_string()
            ]
        );
    }

    #[test]
    fn every_equation_must_parse() {
        let got = solve_system(
            &["x + y = 3", "x - = 1"],
            &Builtins,
            &SolverOptions::default(),
        );

        assert_eq!(got, Err(SolveError::UnparsableExpression));

        let got = solve_system(
            &["x + y = 3", "x = y = 1"],
            &Builtins,
            &SolverOptions::default(),
        );

        assert_eq!(got, Err(SolveError::UnparsableExpression));
    }
}
