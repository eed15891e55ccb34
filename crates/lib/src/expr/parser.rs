//! Recursive-descent parser for the expression language.
//!
//! The grammar is a small, side-effect free subset of Python expressions:
//!
//! ```text
//! expression_list := expression ("," expression)* [","]
//! expression      := or_expr ["if" or_expr "else" expression]
//! or_expr         := and_expr ("or" and_expr)*
//! and_expr        := not_expr ("and" not_expr)*
//! not_expr        := "not" not_expr | comparison
//! comparison      := sum (comp_op sum)*
//! sum             := term (("+" | "-") term)*
//! term            := unary (("*" | "/" | "//" | "%") unary)*
//! unary           := ("-" | "+") unary | power
//! power           := postfix ["**" unary]
//! postfix         := atom ("[" expression "]" | "(" args ")")*
//! atom            := literal | name | "(" [expression_list] ")"
//!                  | "[" [expression_list | comprehension] "]"
//!                  | "{" [expression ":" expression ("," ...)*] "}"
//! ```

use super::{
    ExprError,
    lexer::{Spanned, Token, tokenize},
    value::EvalValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(EvalValue),
    Name(String),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Chained comparison, `a < b <= c`
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    ListComp {
        element: Box<Expr>,
        targets: Vec<String>,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
}

impl Expr {
    /// Returns `true` for a plain literal, including a signed number.
    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Unary(_, inner) => matches!(
                inner.as_ref(),
                Expr::Literal(EvalValue::Int(_) | EvalValue::Float(_))
            ),
            _ => false,
        }
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        &self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)].token
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].offset
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), ExprError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {token:?}, found {:?}", self.peek())))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Syntax {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.peek(),
            Token::RParen
                | Token::RBracket
                | Token::RBrace
                | Token::Comma
                | Token::Colon
                | Token::Eof
                | Token::For
                | Token::Else
        )
    }

    fn expression_list(&mut self, closing: &Token) -> Result<(Vec<Expr>, bool), ExprError> {
        let mut items = vec![self.expression()?];
        let mut trailing_comma = false;
        while self.eat(&Token::Comma) {
            trailing_comma = true;
            if self.peek() == closing || !self.starts_expression() {
                break;
            }
            trailing_comma = false;
            items.push(self.expression()?);
        }
        let is_tuple = items.len() > 1 || trailing_comma;
        Ok((items, is_tuple))
    }

    fn expression(&mut self) -> Result<Expr, ExprError> {
        let value = self.or_expr()?;
        if self.eat(&Token::If) {
            let condition = self.or_expr()?;
            self.expect(&Token::Else)?;
            let otherwise = self.expression()?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(value),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(value)
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.comparison()
    }

    fn compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek().clone() {
            Token::EqEq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::In => CompareOp::In,
            Token::Not if self.peek_at(1) == &Token::In => {
                self.advance();
                CompareOp::NotIn
            }
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.sum()?;
        let mut rest = Vec::new();
        while let Some(op) = self.compare_op() {
            rest.push((op, self.sum()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare(Box::new(first), rest))
        }
    }

    fn sum(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::DoubleSlash => BinaryOp::FloorDiv,
                Token::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            _ => return self.power(),
        };
        self.advance();
        Ok(Expr::Unary(op, Box::new(self.unary()?)))
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.postfix()?;
        if self.eat(&Token::DoubleStar) {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Token::LBracket) {
                let index = self.expression()?;
                self.expect(&Token::RBracket)?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&Token::LParen) {
                let mut args = Vec::new();
                if !self.eat(&Token::RParen) {
                    let (items, _) = self.expression_list(&Token::RParen)?;
                    args = items;
                    self.expect(&Token::RParen)?;
                }
                expr = Expr::Call {
                    function: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn comprehension_targets(&mut self) -> Result<Vec<String>, ExprError> {
        let parenthesized = self.eat(&Token::LParen);
        let mut targets = Vec::new();
        loop {
            match self.advance() {
                Token::Name(name) => targets.push(name),
                other => return Err(self.error(format!("expected loop variable, found {other:?}"))),
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        if parenthesized {
            self.expect(&Token::RParen)?;
        }
        Ok(targets)
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(EvalValue::Int(n))),
            Token::Float(f) => Ok(Expr::Literal(EvalValue::Float(f))),
            Token::Str(mut s) => {
                // Adjacent string literals concatenate
                while let Token::Str(next) = self.peek().clone() {
                    self.advance();
                    s.push_str(&next);
                }
                Ok(Expr::Literal(EvalValue::Str(s)))
            }
            Token::True => Ok(Expr::Literal(EvalValue::Bool(true))),
            Token::False => Ok(Expr::Literal(EvalValue::Bool(false))),
            Token::None => Ok(Expr::Literal(EvalValue::None)),
            Token::Name(name) => Ok(Expr::Name(name)),
            Token::LParen => {
                if self.eat(&Token::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let (mut items, is_tuple) = self.expression_list(&Token::RParen)?;
                self.expect(&Token::RParen)?;
                if is_tuple {
                    Ok(Expr::Tuple(items))
                } else {
                    Ok(items.remove(0))
                }
            }
            Token::LBracket => {
                if self.eat(&Token::RBracket) {
                    return Ok(Expr::List(Vec::new()));
                }
                let first = self.expression()?;
                if self.eat(&Token::For) {
                    let targets = self.comprehension_targets()?;
                    self.expect(&Token::In)?;
                    let iterable = self.or_expr()?;
                    let condition = if self.eat(&Token::If) {
                        Some(Box::new(self.or_expr()?))
                    } else {
                        None
                    };
                    self.expect(&Token::RBracket)?;
                    return Ok(Expr::ListComp {
                        element: Box::new(first),
                        targets,
                        iterable: Box::new(iterable),
                        condition,
                    });
                }
                let mut items = vec![first];
                while self.eat(&Token::Comma) {
                    if self.peek() == &Token::RBracket {
                        break;
                    }
                    items.push(self.expression()?);
                }
                self.expect(&Token::RBracket)?;
                Ok(Expr::List(items))
            }
            Token::LBrace => {
                let mut entries = Vec::new();
                while self.peek() != &Token::RBrace {
                    let key = self.expression()?;
                    self.expect(&Token::Colon)?;
                    let value = self.expression()?;
                    entries.push((key, value));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RBrace)?;
                Ok(Expr::Dict(entries))
            }
            other => Err(ExprError::Syntax {
                offset: self.tokens[self.pos.saturating_sub(1)].offset,
                message: format!("unexpected {other:?}"),
            }),
        }
    }
}

/// Parses a complete source string. Top-level commas build a tuple.
pub fn parse(src: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(src)?,
        pos: 0,
    };
    if parser.peek() == &Token::Eof {
        return Err(parser.error("empty expression"));
    }
    let (mut items, is_tuple) = parser.expression_list(&Token::Eof)?;
    if parser.peek() != &Token::Eof {
        return Err(parser.error(format!("unexpected {:?}", parser.peek())));
    }
    Ok(if is_tuple {
        Expr::Tuple(items)
    } else {
        items.remove(0)
    })
}
