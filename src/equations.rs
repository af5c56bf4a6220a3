use crate::{Expression, Parameter, ParseError};
use std::{
    fmt::{self, Display, Formatter},
    iter::FromIterator,
    str::FromStr,
};

/// Split `lhs = rhs` into its two (trimmed) halves.
///
/// Returns `None` unless there is exactly one `=` and both sides are
/// non-empty.
pub fn split_equation(src: &str) -> Option<(&str, &str)> {
    let index = src.find('=')?;
    let (left, right) = src.split_at(index);
    let right = &right[1..];

    if right.contains('=') {
        return None;
    }

    let (left, right) = (left.trim(), right.trim());

    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// An equality between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    left: Expression,
    right: Expression,
}

impl Equation {
    pub fn new(left: Expression, right: Expression) -> Self {
        Equation { left, right }
    }

    pub fn left(&self) -> &Expression { &self.left }

    pub fn right(&self) -> &Expression { &self.right }

    /// The equation rearranged as `lhs - rhs`, which is zero for any solution.
    pub fn body(&self) -> Expression {
        self.left.clone() - self.right.clone()
    }

    pub fn params(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.left.params().chain(self.right.params())
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

impl FromStr for Equation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_equation(s) {
            Some((left, right)) => {
                Ok(Equation::new(left.parse()?, right.parse()?))
            },
            None => Err(ParseError::NotAnEquation {
                equals_signs: s.matches('=').count(),
            }),
        }
    }
}

/// A builder for constructing a system of equations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SystemOfEquations {
    pub(crate) equations: Vec<Equation>,
}

impl SystemOfEquations {
    pub fn new() -> Self { SystemOfEquations::default() }

    pub fn push(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    pub fn equations(&self) -> &[Equation] { &self.equations }

    pub fn len(&self) -> usize { self.equations.len() }

    pub fn is_empty(&self) -> bool { self.equations.is_empty() }

    pub fn from_equations<E, S>(equations: E) -> Result<Self, ParseError>
    where
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        equations
            .into_iter()
            .map(|equation| equation.as_ref().parse::<Equation>())
            .collect()
    }
}

impl FromIterator<Equation> for SystemOfEquations {
    fn from_iter<T: IntoIterator<Item = Equation>>(iter: T) -> Self {
        let mut system = SystemOfEquations::new();

        for equation in iter {
            system.push(equation);
        }

        system
    }
}

impl<'a> IntoIterator for &'a SystemOfEquations {
    type IntoIter = <&'a [Equation] as IntoIterator>::IntoIter;
    type Item = &'a Equation;

    fn into_iter(self) -> Self::IntoIter { self.equations.iter() }
}
