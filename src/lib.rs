//! Turn messy, hand-written maths into step-by-step solutions.
//!
//! Text is cleaned up (decimal commas, superscripts, Spanish function names,
//! implicit multiplication), the lone unknown is renamed to `x`, and then the
//! most specific strategy which understands the problem is used. Systems of
//! linear equations are solved directly, linear equations get a short
//! derivation, and anything else is simplified or evaluated.
//!
//! ```rust
//! use stepsolve::SolveResult;
//!
//! let got = stepsolve::solve("x + y = 3; x - y = 1").unwrap();
//!
//! if let SolveResult::System { solution, .. } = got {
//!     let values: Vec<f64> = solution.values().copied().collect();
//!     assert_eq!(values, vec![2.0, 1.0]);
//! }
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod dispatch;
mod equations;
mod error;
mod expr;
pub mod linear;
pub mod mini;
pub mod normalize;
pub mod ops;
mod options;
mod parse;
pub mod render;
mod solve;
pub mod steps;
pub mod variables;

pub use dispatch::{solve, solve_with, SolveResult};
pub use equations::{split_equation, Equation, SystemOfEquations};
pub use error::SolveError;
pub use expr::{BinaryOperation, Expression, Parameter};
pub use options::SolverOptions;
pub use parse::{parse, ParseError, TokenKind};
pub use solve::{solve_system, LinearSystem, SystemSolution};
pub use steps::{ChangeType, Step, StepOutcome, StepSource};
