//! Recursive descent parser for filter expressions.
//!
//! GRAMMAR:
//!   expression     --> or
//!   or             --> and ( ("or" | "|") and )*
//!   and            --> not ( ("and" | "&") not )*
//!   not            --> ("not" | "~") not | comparison
//!   comparison     --> additive ( compare_op additive )*
//!   compare_op     --> "==" | "!=" | "<" | "<=" | ">" | ">=" | "in" | "not" "in"
//!   additive       --> multiplicative ( ("+" | "-") multiplicative )*
//!   multiplicative --> unary ( ("*" | "/" | "%") unary )*
//!   unary          --> "-" unary | primary
//!   primary        --> NUMBER | STRING | BOOLEAN | NONE | NAME | "(" expression ")" | list
//!   list           --> "[" ( expression ( "," expression )* ","? )? "]"
//!
//! `&` and `|` bind like `and`/`or`, so `a > 1 & b < 2` needs no parentheses.

use frameview_model::Value;

use super::QueryError;
use super::ast::{BinaryOp, CompareOp, Expr, UnaryOp};
use super::lexer::{Lexer, Token};

pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let tokens = Lexer::new(input).tokenize()?;
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(QueryError::UnexpectedToken {
            found: token.describe(),
            expected: "end of expression",
        }),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), QueryError> {
        match self.advance() {
            Some(found) if &found == token => Ok(()),
            Some(found) => Err(QueryError::UnexpectedToken {
                found: found.describe(),
                expected,
            }),
            None => Err(QueryError::UnexpectedEnd { expected }),
        }
    }

    fn expression(&mut self) -> Result<Expr, QueryError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and()?;
        while self.at_keyword("or") || self.peek() == Some(&Token::Pipe) {
            self.advance();
            let right = self.and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.not()?;
        while self.at_keyword("and") || self.peek() == Some(&Token::Amp) {
            self.advance();
            let right = self.not()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expr, QueryError> {
        if self.at_keyword("not") || self.peek() == Some(&Token::Tilde) {
            self.advance();
            let operand = self.not()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn compare_op(&self) -> Option<(CompareOp, usize)> {
        let op = match self.peek()? {
            Token::Eq => CompareOp::Eq,
            Token::NotEq => CompareOp::NotEq,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            Token::Ident(name) if name == "in" => CompareOp::In,
            Token::Ident(name)
                if name == "not"
                    && matches!(self.peek_at(1), Some(Token::Ident(next)) if next == "in") =>
            {
                return Some((CompareOp::NotIn, 2));
            }
            _ => return None,
        };
        Some((op, 1))
    }

    fn comparison(&mut self) -> Result<Expr, QueryError> {
        let first = self.additive()?;
        let mut rest = Vec::new();
        while let Some((op, width)) = self.compare_op() {
            self.pos += width;
            rest.push((op, self.additive()?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn additive(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            let operand = self.unary()?;
            return Ok(match operand {
                Expr::Literal(Value::Int(v)) => Expr::Literal(Value::Int(-v)),
                Expr::Literal(Value::Float(v)) => Expr::Literal(Value::Float(-v)),
                other => Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(other),
                },
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, QueryError> {
        let expected = "a value, name or '('";
        let Some(token) = self.advance() else {
            return Err(QueryError::UnexpectedEnd { expected });
        };
        match token {
            Token::Int(v) => Ok(Expr::Literal(Value::Int(v))),
            Token::Float(v) => Ok(Expr::Literal(Value::Float(v))),
            Token::Str(v) => Ok(Expr::Literal(Value::Text(v))),
            Token::Quoted(name) => Ok(Expr::Name(name)),
            Token::Ident(name) => {
                let literal = match name.as_str() {
                    "True" | "true" => Some(Value::Bool(true)),
                    "False" | "false" => Some(Value::Bool(false)),
                    "None" | "null" => Some(Value::Null),
                    "and" | "or" | "not" | "in" => {
                        return Err(QueryError::UnexpectedToken {
                            found: name.clone(),
                            expected,
                        });
                    }
                    _ => None,
                };
                Ok(literal.map_or(Expr::Name(name), Expr::Literal))
            }
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => self.list(),
            other => Err(QueryError::UnexpectedToken {
                found: other.describe(),
                expected,
            }),
        }
    }

    fn list(&mut self) -> Result<Expr, QueryError> {
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(&Token::RBracket) {
                self.advance();
                break;
            }
            items.push(self.expression()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::RBracket) => break,
                Some(found) => {
                    return Err(QueryError::UnexpectedToken {
                        found: found.describe(),
                        expected: "',' or ']'",
                    });
                }
                None => return Err(QueryError::UnexpectedEnd { expected: "']'" }),
            }
        }
        Ok(Expr::List(items))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn int(v: i64) -> Expr {
        Expr::Literal(Value::Int(v))
    }

    #[test]
    fn parses_simple_comparison() {
        assert_eq!(
            parse("age > 30").unwrap(),
            Expr::Compare {
                first: Box::new(name("age")),
                rest: vec![(CompareOp::Gt, int(30))],
            }
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a == 1 or b == 2 and c == 3").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn ampersand_has_boolean_precedence() {
        let expr = parse("a > 1 & b < 2").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn parses_not_in_list() {
        let expr = parse("kind not in ['a', 'b']").unwrap();
        let Expr::Compare { rest, .. } = expr else {
            panic!("expected comparison");
        };
        assert_eq!(rest[0].0, CompareOp::NotIn);
        assert!(matches!(&rest[0].1, Expr::List(items) if items.len() == 2));
    }

    #[test]
    fn chained_comparison_keeps_every_step() {
        let Expr::Compare { rest, .. } = parse("1 < x <= 5").unwrap() else {
            panic!("expected comparison");
        };
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn negative_literal_folds() {
        assert_eq!(
            parse("x > -3").unwrap(),
            Expr::Compare {
                first: Box::new(name("x")),
                rest: vec![(CompareOp::Gt, int(-3))],
            }
        );
    }

    #[test]
    fn reports_trailing_tokens() {
        assert!(matches!(
            parse("a > 1 )"),
            Err(QueryError::UnexpectedToken { .. })
        ));
        assert!(matches!(parse("a >"), Err(QueryError::UnexpectedEnd { .. })));
        assert!(matches!(parse("   "), Err(QueryError::Empty)));
    }
}
