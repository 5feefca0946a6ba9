//! Scans filter text into tokens.
//!
//! Keywords (`and`, `or`, `not`, `in`, `True`, `False`, `None`) come out as
//! plain identifiers; the parser gives them meaning. Backtick-quoted names are
//! kept separate so a column called `and` can still be referenced.

use std::iter::Peekable;
use std::str::CharIndices;

use super::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    /// Backtick-quoted name: `first name`
    Quoted(String),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Amp,
    Pipe,
    Tilde,

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Str(v) => format!("{v:?}"),
            Self::Ident(v) => v.clone(),
            Self::Quoted(v) => format!("`{v}`"),
            Self::Plus => "+".into(),
            Self::Minus => "-".into(),
            Self::Star => "*".into(),
            Self::Slash => "/".into(),
            Self::Percent => "%".into(),
            Self::Eq => "==".into(),
            Self::NotEq => "!=".into(),
            Self::Lt => "<".into(),
            Self::Le => "<=".into(),
            Self::Gt => ">".into(),
            Self::Ge => ">=".into(),
            Self::Amp => "&".into(),
            Self::Pipe => "|".into(),
            Self::Tilde => "~".into(),
            Self::LParen => "(".into(),
            Self::RParen => ")".into(),
            Self::LBracket => "[".into(),
            Self::RBracket => "]".into(),
            Self::Comma => ",".into(),
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Scans the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>, QueryError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, QueryError> {
        while self.chars.next_if(|(_, ch)| ch.is_whitespace()).is_some() {}

        let Some((offset, ch)) = self.chars.next() else {
            return Ok(None);
        };
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '&' => self.doubled('&', Token::Amp),
            '|' => self.doubled('|', Token::Pipe),
            '~' => Token::Tilde,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '=' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(QueryError::UnexpectedChar { ch, offset });
                }
                Token::Eq
            }
            '!' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_none() {
                    return Err(QueryError::UnexpectedChar { ch, offset });
                }
                Token::NotEq
            }
            '<' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.chars.next_if(|(_, c)| *c == '=').is_some() {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '"' | '\'' => Token::Str(self.read_delimited(ch, offset)?),
            '`' => Token::Quoted(self.read_delimited('`', offset)?),
            c if c.is_ascii_digit() || (c == '.' && self.peek_is_digit()) => {
                self.read_number(offset)?
            }
            c if c.is_alphabetic() || c == '_' => self.read_identifier(offset),
            _ => return Err(QueryError::UnexpectedChar { ch, offset }),
        };
        Ok(Some(token))
    }

    /// `&&` and `||` are accepted as spellings of `&` and `|`.
    fn doubled(&mut self, ch: char, token: Token) -> Token {
        self.chars.next_if(|(_, c)| *c == ch);
        token
    }

    fn peek_is_digit(&mut self) -> bool {
        self.chars.peek().is_some_and(|(_, c)| c.is_ascii_digit())
    }

    fn read_delimited(&mut self, quote: char, start: usize) -> Result<String, QueryError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\\')) if quote != '`' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, other)) => out.push(other),
                    None => return Err(QueryError::UnterminatedString { offset: start }),
                },
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(QueryError::UnterminatedString { offset: start }),
            }
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token, QueryError> {
        let mut end = start + 1;
        let mut is_float = &self.input[start..end] == ".";
        while let Some(&(idx, c)) = self.chars.peek() {
            let exponent_sign = (c == '-' || c == '+')
                && matches!(self.input[..idx].chars().last(), Some('e' | 'E'));
            if c.is_ascii_digit() || c == '_' || exponent_sign {
                self.chars.next();
                end = idx + c.len_utf8();
            } else if c == '.' || c == 'e' || c == 'E' {
                is_float = true;
                self.chars.next();
                end = idx + c.len_utf8();
            } else {
                break;
            }
        }
        let literal: String = self.input[start..end].chars().filter(|c| *c != '_').collect();
        let invalid = || QueryError::InvalidNumber {
            literal: self.input[start..end].to_string(),
        };
        if is_float {
            literal.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            literal.parse::<i64>().map(Token::Int).map_err(|_| invalid())
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        let mut end = start + self.input[start..].chars().next().map_or(1, char::len_utf8);
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.chars.next();
                end = idx + c.len_utf8();
            } else {
                break;
            }
        }
        Token::Ident(self.input[start..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn scans_comparison() {
        assert_eq!(
            lex("age >= 30"),
            vec![Token::Ident("age".into()), Token::Ge, Token::Int(30)]
        );
    }

    #[test]
    fn scans_strings_and_quoted_names() {
        assert_eq!(
            lex("`first name` == 'ann'"),
            vec![
                Token::Quoted("first name".into()),
                Token::Eq,
                Token::Str("ann".into())
            ]
        );
    }

    #[test]
    fn scans_floats_and_exponents() {
        assert_eq!(lex("1.5"), vec![Token::Float(1.5)]);
        assert_eq!(lex(".5"), vec![Token::Float(0.5)]);
        assert_eq!(lex("2e-3"), vec![Token::Float(0.002)]);
        assert_eq!(lex("1_000"), vec![Token::Int(1000)]);
    }

    #[test]
    fn doubled_operators_collapse() {
        assert_eq!(lex("a && b"), lex("a & b"));
    }

    #[test]
    fn rejects_single_equals() {
        assert!(matches!(
            Lexer::new("a = 1").tokenize(),
            Err(QueryError::UnexpectedChar { ch: '=', offset: 2 })
        ));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(matches!(
            Lexer::new("name == 'ann").tokenize(),
            Err(QueryError::UnterminatedString { offset: 8 })
        ));
    }
}
