//! Typeset rendering for showing expressions to a human.

use crate::{BinaryOperation, Equation, Expression};
use std::fmt::Write;

/// Render an [`Expression`] as LaTeX, suitable for MathJax or KaTeX.
pub fn to_latex(expr: &Expression) -> String {
    let mut buffer = String::new();
    write_latex(expr, &mut buffer);
    buffer
}

/// Render both sides of an [`Equation`] as `lhs = rhs`.
pub fn equation_to_latex(equation: &Equation) -> String {
    format!(
        "{} = {}",
        to_latex(equation.left()),
        to_latex(equation.right())
    )
}

fn write_latex(expr: &Expression, out: &mut String) {
    match expr {
        Expression::Parameter(p) => match p.name() {
            "pi" => out.push_str("\\pi"),
            name => out.push_str(name),
        },
        Expression::Constant(value) => {
            let _ = write!(out, "{}", value);
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Divide,
        } => {
            // fractions group their operands already
            out.push_str("\\frac{");
            write_latex(left, out);
            out.push_str("}{");
            write_latex(right, out);
            out.push('}');
        },
        Expression::Binary {
            left,
            right,
            op: BinaryOperation::Power,
        } => {
            let (left_parens, _) =
                BinaryOperation::Power.needs_parens(left, right);
            write_grouped(left, left_parens, out);
            out.push_str("^{");
            write_latex(right, out);
            out.push('}');
        },
        Expression::Binary { left, right, op } => {
            let (left_parens, right_parens) = op.needs_parens(left, right);
            write_grouped(left, left_parens, out);

            out.push_str(match op {
                BinaryOperation::Plus => "+",
                BinaryOperation::Minus => "-",
                _ => "\\cdot ",
            });

            write_grouped(right, right_parens, out);
        },
        Expression::Negate(inner) => {
            out.push('-');
            let parens = BinaryOperation::needs_parens_when_negated(inner);
            write_grouped(inner, parens, out);
        },
        Expression::FunctionCall { function, argument } => {
            match function.as_str() {
                "sqrt" => {
                    out.push_str("\\sqrt{");
                    write_latex(argument, out);
                    out.push('}');
                    return;
                },
                "sin" | "cos" | "tan" | "exp" | "ln" | "log" => {
                    out.push('\\');
                    out.push_str(function);
                },
                other => {
                    let _ = write!(out, "\\mathrm{{{}}}", other);
                },
            }

            out.push_str("\\left(");
            write_latex(argument, out);
            out.push_str("\\right)");
        },
    }
}

fn write_grouped(expr: &Expression, parens: bool, out: &mut String) {
    if parens {
        out.push_str("\\left(");
        write_latex(expr, out);
        out.push_str("\\right)");
    } else {
        write_latex(expr, out);
    }
}
