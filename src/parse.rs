use crate::{BinaryOperation, Expression, Parameter};
use std::{
    iter::Peekable,
    ops::Range,
    str::{CharIndices, FromStr},
};

/// Parse an [`Expression`] tree from some text.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A precedence-climbing parser for converting a string into an expression
/// tree.
///
/// Each operator has a pair of binding powers. Addition and multiplication
/// are left associative, exponentiation is right associative and binds
/// tighter than negation, so `-2^2` is `-(2^2)` and `2^-1` still works.
///
/// Operands are numbers, variables, function calls like `sqrt(x)`, or
/// anything in parentheses.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

/// Tokens which are allowed to start an operand.
const OPERAND_START: &[TokenKind] = &[
    TokenKind::Number,
    TokenKind::Identifier,
    TokenKind::Minus,
    TokenKind::Plus,
    TokenKind::OpenParen,
];

/// How tightly a prefix `-` or `+` binds its operand.
const PREFIX_BINDING_POWER: u8 = 5;

/// Juxtaposition (`2 x`, `3 (1 + 2)`) multiplies, binding like `*`.
const IMPLICIT_TIMES: (BinaryOperation, u8, u8) =
    (BinaryOperation::Times, 3, 4);

/// Can `next` start the right operand of an implicit multiplication?
///
/// Two numbers next to each other (`1 2`) are left alone because that's
/// more likely a typo than a product.
fn starts_implicit_product(left: &Expression, next: TokenKind) -> bool {
    match next {
        TokenKind::Identifier | TokenKind::OpenParen => true,
        TokenKind::Number => !left.is_constant(),
        _ => false,
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression(0)?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::TrailingInput {
                found: token.kind,
                span: token.span,
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        match self.tokens.peek() {
            Some(Ok(token)) => Some(token.kind),
            _ => None,
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        self.tokens
            .next()
            .unwrap_or(Err(ParseError::UnexpectedEndOfInput))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.next_token()?;

        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: match kind {
                    TokenKind::CloseParen => &[TokenKind::CloseParen],
                    _ => OPERAND_START,
                },
            })
        }
    }

    /// Parse an expression where every operator binds at least as tightly as
    /// `min_binding_power`.
    fn expression(
        &mut self,
        min_binding_power: u8,
    ) -> Result<Expression, ParseError> {
        let mut left = self.operand()?;

        while let Some(kind) = self.peek() {
            let (op, left_power, right_power) = match kind.infix() {
                Some(infix) => infix,
                None if starts_implicit_product(&left, kind) => {
                    IMPLICIT_TIMES
                },
                None => break,
            };

            if left_power < min_binding_power {
                break;
            }

            if kind.infix().is_some() {
                self.next_token()?;
            }
            let right = self.expression(right_power)?;

            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op,
            };
        }

        Ok(left)
    }

    fn operand(&mut self) -> Result<Expression, ParseError> {
        let token = self.next_token()?;

        match token.kind {
            TokenKind::Number => token
                .text
                .parse()
                .map(Expression::Constant)
                .map_err(|_| ParseError::InvalidNumber { span: token.span }),
            TokenKind::Identifier => self.variable_or_function_call(token),
            TokenKind::OpenParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            },
            TokenKind::Minus => {
                let operand = self.expression(PREFIX_BINDING_POWER)?;
                Ok(Expression::Negate(Box::new(operand)))
            },
            // "+x" is just "x"
            TokenKind::Plus => self.expression(PREFIX_BINDING_POWER),
            found => Err(ParseError::UnexpectedToken {
                found,
                span: token.span,
                expected: OPERAND_START,
            }),
        }
    }

    fn variable_or_function_call(
        &mut self,
        name: Token<'a>,
    ) -> Result<Expression, ParseError> {
        if self.peek() != Some(TokenKind::OpenParen) {
            return Ok(Expression::Parameter(Parameter::named(name.text)));
        }

        self.expect(TokenKind::OpenParen)?;
        let argument = self.expression(0)?;
        self.expect(TokenKind::CloseParen)?;

        Ok(Expression::FunctionCall {
            function: name.text.into(),
            argument: Box::new(argument),
        })
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("invalid number at {span:?}")]
    InvalidNumber { span: Range<usize> },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("found {found:?} at {span:?} but expected one of {expected:?}")]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("unexpected {found:?} at {span:?} after the end of the expression")]
    TrailingInput { found: TokenKind, span: Range<usize> },
    #[error("an equation needs exactly one \"=\", found {equals_signs}")]
    NotAnEquation { equals_signs: usize },
}

/// Splits text into [`Token`]s, reporting (and skipping) characters which
/// don't belong in an expression.
#[derive(Debug, Clone)]
struct Tokens<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Tokens {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn starts_with_digit(&self, index: usize) -> bool {
        self.src[index..]
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_digit())
    }

    /// Consume characters while `predicate` holds, returning the index just
    /// past the last one.
    fn skip_while<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(char) -> bool,
    {
        while let Some(&(_, c)) = self.chars.peek() {
            if !predicate(c) {
                break;
            }
            self.chars.next();
        }

        self.chars.peek().map_or(self.src.len(), |&(ix, _)| ix)
    }

    fn number(&mut self, start: usize) -> Token<'a> {
        let mut seen_dot = false;
        let end = self.skip_while(|c| match c {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            },
            _ => false,
        });

        self.token(start..end, TokenKind::Number)
    }

    fn identifier(&mut self, start: usize) -> Token<'a> {
        let end = self.skip_while(|c| c.is_ascii_alphanumeric() || c == '_');
        self.token(start..end, TokenKind::Identifier)
    }

    fn token(&self, span: Range<usize>, kind: TokenKind) -> Token<'a> {
        Token {
            text: &self.src[span.clone()],
            span,
            kind,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_while(char::is_whitespace);
        let (start, c) = self.chars.next()?;

        if let Some(kind) = TokenKind::symbol(c) {
            return Some(Ok(self.token(start..start + 1, kind)));
        }

        let token = match c {
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(start),
            c if c.is_ascii_digit() => self.number(start),
            '.' if self.starts_with_digit(start + 1) => self.number(start),
            other => {
                return Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: start,
                }))
            },
        };

        Some(Ok(token))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Divide,
    Caret,
}

impl TokenKind {
    fn symbol(c: char) -> Option<TokenKind> {
        match c {
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Times),
            '/' => Some(TokenKind::Divide),
            '^' => Some(TokenKind::Caret),
            _ => None,
        }
    }

    /// The operator and its `(left, right)` binding powers, if this token can
    /// sit between two operands.
    fn infix(self) -> Option<(BinaryOperation, u8, u8)> {
        match self {
            TokenKind::Plus => Some((BinaryOperation::Plus, 1, 2)),
            TokenKind::Minus => Some((BinaryOperation::Minus, 1, 2)),
            TokenKind::Times => Some((BinaryOperation::Times, 3, 4)),
            TokenKind::Divide => Some((BinaryOperation::Divide, 3, 4)),
            TokenKind::Caret => Some((BinaryOperation::Power, 8, 7)),
            _ => None,
        }
    }
}
