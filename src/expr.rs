use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A free variable or a named constant like `pi`.
    Parameter(Parameter),
    Constant(f64),
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
    /// Invoke a builtin function.
    FunctionCall {
        function: SmolStr,
        argument: Box<Expression>,
    },
}

impl Expression {
    /// Iterate over all the [`Parameter`]s this expression refers to.
    pub fn params(&self) -> impl Iterator<Item = &Parameter> + '_ {
        let mut params = Vec::new();
        self.collect_params(&mut params);
        params.into_iter()
    }

    fn collect_params<'a>(&'a self, params: &mut Vec<&'a Parameter>) {
        match self {
            Expression::Parameter(p) => params.push(p),
            Expression::Constant(_) => {},
            Expression::Binary { left, right, .. } => {
                left.collect_params(params);
                right.collect_params(params);
            },
            Expression::Negate(inner) => inner.collect_params(params),
            Expression::FunctionCall { argument, .. } => {
                argument.collect_params(params)
            },
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    /// How tightly this expression binds when printed next to an operator.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Negate(_) => NEGATE_PRECEDENCE,
            Expression::Constant(value) if value.is_sign_negative() => {
                NEGATE_PRECEDENCE
            },
            Expression::Parameter(_)
            | Expression::Constant(_)
            | Expression::FunctionCall { .. } => ATOM_PRECEDENCE,
        }
    }
}

const NEGATE_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

/// A named unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter {
    name: SmolStr,
}

impl Parameter {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        Parameter { name: name.into() }
    }

    pub fn name(&self) -> &str { &self.name }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOperation::Plus | BinaryOperation::Minus => 1,
            BinaryOperation::Times | BinaryOperation::Divide => 2,
            BinaryOperation::Power => 4,
        }
    }

    /// Work out whether the left and right operands need to be wrapped in
    /// parentheses so the printed form parses back to the same tree.
    pub(crate) fn needs_parens(
        self,
        left: &Expression,
        right: &Expression,
    ) -> (bool, bool) {
        let precedence = self.precedence();

        match self {
            // right associative
            BinaryOperation::Power => (
                left.precedence() <= precedence,
                right.precedence() < precedence,
            ),
            BinaryOperation::Minus | BinaryOperation::Divide => (
                left.precedence() < precedence,
                right.precedence() <= precedence,
            ),
            BinaryOperation::Plus | BinaryOperation::Times => (
                left.precedence() < precedence,
                right.precedence() < precedence,
            ),
        }
    }

    pub(crate) fn needs_parens_when_negated(inner: &Expression) -> bool {
        inner.precedence() < NEGATE_PRECEDENCE
    }
}

/// Operator overloads so `a + b` builds an [`Expression::Binary`].
macro_rules! binary_operator {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl $trait for Expression {
                type Output = Expression;

                fn $method(self, rhs: Expression) -> Expression {
                    Expression::Binary {
                        left: Box::new(self),
                        right: Box::new(rhs),
                        op: BinaryOperation::$op,
                    }
                }
            }
        )*
    };
}

binary_operator! {
    Add::add => Plus,
    Sub::sub => Minus,
    Mul::mul => Times,
    Div::div => Divide,
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::Negate(Box::new(self)) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Parameter(p) => write!(f, "{}", p),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Binary { left, right, op } => {
                let (left_parens, right_parens) = op.needs_parens(left, right);
                write_operand(left, left_parens, f)?;

                let op = match op {
                    BinaryOperation::Plus => " + ",
                    BinaryOperation::Minus => " - ",
                    BinaryOperation::Times => "*",
                    BinaryOperation::Divide => "/",
                    BinaryOperation::Power => "^",
                };
                write!(f, "{}", op)?;

                write_operand(right, right_parens, f)?;

                Ok(())
            },
            Expression::Negate(inner) => {
                write!(f, "-")?;
                let parens = BinaryOperation::needs_parens_when_negated(inner);
                write_operand(inner, parens, f)
            },
            Expression::FunctionCall { function, argument } => {
                write!(f, "{}({})", function, argument)
            },
        }
    }
}

fn write_operand(
    expr: &Expression,
    parens: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if parens {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
