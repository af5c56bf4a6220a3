//! [`Expression`] operations.

use crate::{BinaryOperation, Expression, Parameter};
use euclid::approxeq::ApproxEq;
use smol_str::SmolStr;

/// Contextual information used when evaluating an [`Expression`].
pub trait Context {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError>;

    /// Look up a named constant (e.g. `pi`).
    fn constant(&self, name: &str) -> Option<f64>;

    /// Is this name reserved for a constant rather than an unknown?
    fn is_constant(&self, param: &Parameter) -> bool {
        self.constant(param.name()).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("unknown function \"{name}\"")]
    UnknownFunction { name: SmolStr },
    #[error("no value for \"{name}\"")]
    UnknownVariable { name: SmolStr },
}

/// The set of builtin functions and constants. Angles are in radians.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins;

impl Context for Builtins {
    fn evaluate_function(
        &self,
        name: &str,
        argument: f64,
    ) -> Result<f64, EvaluationError> {
        match name {
            "sin" => Ok(argument.sin()),
            "cos" => Ok(argument.cos()),
            "tan" => Ok(argument.tan()),
            "asin" => Ok(argument.asin()),
            "acos" => Ok(argument.acos()),
            "atan" => Ok(argument.atan()),
            "sqrt" => Ok(argument.sqrt()),
            "abs" => Ok(argument.abs()),
            "exp" => Ok(argument.exp()),
            "ln" => Ok(argument.ln()),
            "log" => Ok(argument.ln()),
            "log10" => Ok(argument.log10()),
            _ => Err(EvaluationError::UnknownFunction { name: name.into() }),
        }
    }

    fn constant(&self, name: &str) -> Option<f64> {
        match name {
            "pi" => Some(std::f64::consts::PI),
            "e" => Some(std::f64::consts::E),
            _ => None,
        }
    }
}

/// Evaluate an [`Expression`] numerically, using `lookup_parameter_value` to
/// find the value of each unknown.
pub fn evaluate<F, C>(
    expr: &Expression,
    lookup_parameter_value: F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
    C: Context,
{
    evaluate_inner(expr, &lookup_parameter_value, ctx)
}

fn evaluate_inner<F, C>(
    expr: &Expression,
    lookup: &F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&Parameter) -> Option<f64>,
    C: Context,
{
    match expr {
        Expression::Parameter(p) => lookup(p)
            .or_else(|| ctx.constant(p.name()))
            .ok_or_else(|| EvaluationError::UnknownVariable {
                name: p.name().into(),
            }),
        Expression::Constant(value) => Ok(*value),
        Expression::Binary { left, right, op } => {
            let left = evaluate_inner(left, lookup, ctx)?;
            let right = evaluate_inner(right, lookup, ctx)?;
            Ok(apply(*op, left, right))
        },
        Expression::Negate(inner) => Ok(-evaluate_inner(inner, lookup, ctx)?),
        Expression::FunctionCall { function, argument } => {
            let argument = evaluate_inner(argument, lookup, ctx)?;
            ctx.evaluate_function(function, argument)
        },
    }
}

/// Evaluate an [`Expression`] which shouldn't contain any unknowns.
pub fn evaluate_constant<C>(
    expr: &Expression,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    C: Context,
{
    evaluate(expr, |_| None, ctx)
}

fn apply(op: BinaryOperation, left: f64, right: f64) -> f64 {
    match op {
        BinaryOperation::Plus => left + right,
        BinaryOperation::Minus => left - right,
        BinaryOperation::Times => left * right,
        BinaryOperation::Divide => left / right,
        BinaryOperation::Power => left.powf(right),
    }
}

/// Simplify an expression by evaluating all constant operations.
///
/// Named constants like `pi` are left symbolic, and operations which would
/// produce a non-finite number (e.g. `1/0`) are left unevaluated.
pub fn fold_constants<C>(expr: &Expression, ctx: &C) -> Expression
where
    C: Context,
{
    match expr {
        Expression::Binary { left, right, op } => {
            fold_binary_op(left, right, *op, ctx)
        },
        Expression::Negate(expr) => match fold_constants(expr, ctx) {
            Expression::Constant(value) => Expression::Constant(-value),
            // double negative
            Expression::Negate(inner) => *inner,
            other => Expression::Negate(Box::new(other)),
        },
        Expression::FunctionCall { function, argument } => {
            let argument = fold_constants(argument, ctx);

            if let Expression::Constant(argument) = argument {
                match ctx.evaluate_function(function, argument) {
                    Ok(result) if result.is_finite() => {
                        return Expression::Constant(result);
                    },
                    _ => {},
                }
            }

            Expression::FunctionCall {
                function: function.clone(),
                argument: Box::new(argument),
            }
        },
        _ => expr.clone(),
    }
}

fn fold_binary_op<C>(
    left: &Expression,
    right: &Expression,
    op: BinaryOperation,
    ctx: &C,
) -> Expression
where
    C: Context,
{
    let left = fold_constants(left, ctx);
    let right = fold_constants(right, ctx);

    if let (Expression::Constant(l), Expression::Constant(r)) = (&left, &right)
    {
        let value = apply(op, *l, *r);
        if value.is_finite() {
            return Expression::Constant(value);
        }
    }

    // otherwise fall back to arithmetic's identity laws
    match op {
        BinaryOperation::Plus => fold_sum(left, right),
        BinaryOperation::Minus => fold_difference(left, right),
        BinaryOperation::Times => fold_product(left, right),
        BinaryOperation::Divide => fold_quotient(left, right),
        BinaryOperation::Power => fold_power(left, right),
    }
}

fn is_value(expr: &Expression, value: f64) -> bool {
    matches!(expr, Expression::Constant(c) if c.approx_eq(&value))
}

fn binary(
    left: Expression,
    op: BinaryOperation,
    right: Expression,
) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        right: Box::new(right),
        op,
    }
}

fn fold_sum(left: Expression, right: Expression) -> Expression {
    if left == right {
        Expression::Constant(2.0) * left
    } else if is_value(&left, 0.0) {
        right
    } else if is_value(&right, 0.0) {
        left
    } else {
        binary(left, BinaryOperation::Plus, right)
    }
}

fn fold_difference(left: Expression, right: Expression) -> Expression {
    if left == right {
        Expression::Constant(0.0)
    } else if is_value(&right, 0.0) {
        left
    } else if is_value(&left, 0.0) {
        -right
    } else {
        binary(left, BinaryOperation::Minus, right)
    }
}

fn fold_product(left: Expression, right: Expression) -> Expression {
    if is_value(&left, 0.0) || is_value(&right, 0.0) {
        return Expression::Constant(0.0);
    } else if is_value(&left, 1.0) {
        return right;
    } else if is_value(&right, 1.0) {
        return left;
    }

    match (left, right) {
        // 2 * (3 * x) = 6 * x
        (
            Expression::Constant(a),
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
        )
        | (
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            Expression::Constant(a),
        ) if left.is_constant() || right.is_constant() => {
            let (b, rest) = split_constant_factor(*left, *right);
            Expression::Constant(a * b) * rest
        },
        (left, right) => binary(left, BinaryOperation::Times, right),
    }
}

fn fold_quotient(left: Expression, right: Expression) -> Expression {
    if left == right && !left.is_constant() {
        Expression::Constant(1.0)
    } else if is_value(&left, 0.0) && !right.is_constant() {
        Expression::Constant(0.0)
    } else if is_value(&right, 1.0) {
        left
    } else {
        binary(left, BinaryOperation::Divide, right)
    }
}

fn fold_power(base: Expression, exponent: Expression) -> Expression {
    if is_value(&exponent, 1.0) {
        base
    } else if is_value(&exponent, 0.0) && !base.is_constant() {
        Expression::Constant(1.0)
    } else {
        binary(base, BinaryOperation::Power, exponent)
    }
}

/// Pull the constant out of a product where at least one side is known to be
/// a constant.
fn split_constant_factor(
    left: Expression,
    right: Expression,
) -> (f64, Expression) {
    match (left, right) {
        (Expression::Constant(value), other)
        | (other, Expression::Constant(value)) => (value, other),
        _ => unreachable!("One side is always a constant"),
    }
}
