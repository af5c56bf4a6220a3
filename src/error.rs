use crate::{ops::EvaluationError, ParseError};

/// The ways a solve request can fail.
///
/// Individual strategies fail quietly and hand over to the next one, so only
/// the last strategy's failure ever makes it back to the caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("no usable input")]
    EmptyInput,
    #[error("expression could not be interpreted")]
    UnparsableExpression,
    #[error("system is singular or not linearly solvable")]
    SingularSystem,
    #[error("system is not linearly solvable (\"{equation}\" is not linear)")]
    NonLinearSystem { equation: String },
    #[error("no variables detected in the system")]
    NoVariableDetected,
}

impl From<ParseError> for SolveError {
    fn from(_: ParseError) -> Self { SolveError::UnparsableExpression }
}

impl From<EvaluationError> for SolveError {
    fn from(_: EvaluationError) -> Self { SolveError::UnparsableExpression }
}
