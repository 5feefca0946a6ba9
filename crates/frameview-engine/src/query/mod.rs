//! Predicate evaluator for row filters.
//!
//! Filter text is a small expression language in the spirit of
//! `DataFrame.query`:
//!
//! ```text
//! age > 30 and city in ['Oslo', 'Bergen']
//! `first name` != 'ann' | not active
//! 1 < score * 2 <= 10
//! ```
//!
//! Compilation binds every name to a column or index level, so a reference
//! to an unknown column fails even when the dataset has no rows.

mod ast;
mod eval;
mod lexer;
mod parser;

use frameview_model::Dataset;
use thiserror::Error;

pub use ast::{BinaryOp, CompareOp, Expr, UnaryOp};
pub use parser::parse;

use eval::{Bound, bind, truthy};

/// Why a filter expression could not be compiled or evaluated.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number literal '{literal}'")]
    InvalidNumber { literal: String },

    #[error("unexpected '{found}', expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("name '{name}' is not a column or index level")]
    UnknownName { name: String },

    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("expression must evaluate to a boolean, got {found}")]
    NotBoolean { found: &'static str },

    #[error("integer overflow")]
    Overflow,
}

/// A filter expression compiled against one dataset.
#[derive(Debug, Clone)]
pub struct Predicate {
    root: Bound,
}

impl Predicate {
    pub fn compile(text: &str, dataset: &Dataset) -> Result<Self, QueryError> {
        let expr = parse(text)?;
        Ok(Self {
            root: bind(expr, dataset)?,
        })
    }

    /// Evaluates the predicate for one row of `dataset`.
    pub fn matches(&self, dataset: &Dataset, row: usize) -> Result<bool, QueryError> {
        truthy(&self.root.eval(dataset, row)?)
    }

    /// Keeps the rows of `rows` that satisfy the predicate, in order.
    ///
    /// Fails as a whole if any row fails to evaluate.
    pub fn select(&self, dataset: &Dataset, rows: &[usize]) -> Result<Vec<usize>, QueryError> {
        let mut kept = Vec::with_capacity(rows.len());
        for &row in rows {
            if self.matches(dataset, row)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use frameview_model::{Column, Label, Value};

    use super::*;

    fn people() -> Dataset {
        Dataset::new(vec![
            Column::from_values("name", ["ann", "bob", "cid", "dee"]),
            Column::new(
                "age",
                vec![Value::Int(31), Value::Int(25), Value::Null, Value::Int(52)],
            ),
            Column::from_values("score", [1.5, 2.0, 3.5, 0.5]),
            Column::from_values("active", [true, false, true, true]),
        ])
        .unwrap()
    }

    fn select(text: &str) -> Result<Vec<usize>, QueryError> {
        let ds = people();
        let predicate = Predicate::compile(text, &ds)?;
        predicate.select(&ds, &[0, 1, 2, 3])
    }

    #[test]
    fn numeric_comparison_skips_nulls() {
        assert_eq!(select("age > 30").unwrap(), vec![0, 3]);
        assert_eq!(select("age != 25").unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn boolean_combinations() {
        assert_eq!(select("age > 30 and score > 1").unwrap(), vec![0]);
        assert_eq!(select("name == 'bob' | score > 3").unwrap(), vec![1, 2]);
        assert_eq!(select("not active").unwrap(), vec![1]);
        assert_eq!(select("~(age < 40)").unwrap(), vec![2, 3]);
    }

    #[test]
    fn type_error_behind_and_or_still_fails() {
        assert!(select("name > 5").is_err());
        assert!(select("age > 100 and name > 5").is_err());
        assert!(select("score > 0 or name > 5").is_err());
    }

    #[test]
    fn membership_and_list_equality() {
        assert_eq!(select("name in ['ann', 'dee']").unwrap(), vec![0, 3]);
        assert_eq!(select("name not in ['ann', 'dee']").unwrap(), vec![1, 2]);
        assert_eq!(select("name == ['bob']").unwrap(), vec![1]);
    }

    #[test]
    fn arithmetic_and_chains() {
        assert_eq!(select("score * 2 >= 3").unwrap(), vec![0, 1, 2]);
        assert_eq!(select("1 < score <= 2").unwrap(), vec![0, 1]);
        assert_eq!(select("age % 2 == 1").unwrap(), vec![0, 1]);
    }

    #[test]
    fn index_alias_reads_row_labels() {
        assert_eq!(select("index >= 2").unwrap(), vec![2, 3]);
    }

    #[test]
    fn named_index_level_is_resolvable() {
        let ds = people()
            .with_index(
                vec![
                    Label::single("a"),
                    Label::single("b"),
                    Label::single("c"),
                    Label::single("d"),
                ],
                vec![Some("key".to_string())],
            )
            .unwrap();
        let predicate = Predicate::compile("key == 'c'", &ds).unwrap();
        assert_eq!(predicate.select(&ds, &[0, 1, 2, 3]).unwrap(), vec![2]);
    }

    #[test]
    fn unknown_column_fails_at_compile_time() {
        let empty = people().take(&[]);
        assert_eq!(
            Predicate::compile("height > 3", &empty).unwrap_err(),
            QueryError::UnknownName {
                name: "height".to_string()
            }
        );
    }

    #[test]
    fn ordering_text_against_number_is_an_error() {
        assert!(matches!(
            select("name > 3"),
            Err(QueryError::TypeMismatch { op: ">", .. })
        ));
    }

    #[test]
    fn non_boolean_result_is_an_error() {
        assert_eq!(
            select("age + 1").unwrap_err(),
            QueryError::NotBoolean { found: "int" }
        );
    }

    #[test]
    fn backticks_quote_names() {
        let ds = Dataset::new(vec![Column::from_values("first name", ["ann", "bob"])]).unwrap();
        let predicate = Predicate::compile("`first name` == 'bob'", &ds).unwrap();
        assert_eq!(predicate.select(&ds, &[0, 1]).unwrap(), vec![1]);
    }
}
