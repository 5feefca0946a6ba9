//! Binding and row-wise evaluation of parsed expressions.

use std::borrow::Cow;
use std::cmp::Ordering;

use frameview_model::{Dataset, Value};

use super::QueryError;
use super::ast::{BinaryOp, CompareOp, Expr, UnaryOp};

/// Expression with every name resolved against one dataset.
#[derive(Debug, Clone)]
pub(crate) enum Bound {
    Literal(Value),
    Column(usize),
    Level(usize),
    List(Vec<Bound>),
    Unary {
        op: UnaryOp,
        operand: Box<Bound>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Bound>,
        right: Box<Bound>,
    },
    Compare {
        first: Box<Bound>,
        rest: Vec<(CompareOp, Bound)>,
    },
}

/// Name lookup order: column display name, index level name, then `index`
/// as an alias of the first index level.
pub(crate) fn bind(expr: Expr, dataset: &Dataset) -> Result<Bound, QueryError> {
    Ok(match expr {
        Expr::Literal(value) => Bound::Literal(value),
        Expr::Name(name) => {
            if let Some(col) = dataset.column_position(&name) {
                Bound::Column(col)
            } else if let Some(level) = dataset.index_level_position(&name) {
                Bound::Level(level)
            } else if name == "index" {
                Bound::Level(0)
            } else {
                return Err(QueryError::UnknownName { name });
            }
        }
        Expr::List(items) => Bound::List(
            items
                .into_iter()
                .map(|item| bind(item, dataset))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Unary { op, operand } => Bound::Unary {
            op,
            operand: Box::new(bind(*operand, dataset)?),
        },
        Expr::Binary { op, left, right } => Bound::Binary {
            op,
            left: Box::new(bind(*left, dataset)?),
            right: Box::new(bind(*right, dataset)?),
        },
        Expr::Compare { first, rest } => Bound::Compare {
            first: Box::new(bind(*first, dataset)?),
            rest: rest
                .into_iter()
                .map(|(op, expr)| Ok((op, bind(expr, dataset)?)))
                .collect::<Result<_, QueryError>>()?,
        },
    })
}

/// Result of evaluating a sub-expression for one row.
pub(crate) enum Operand<'a> {
    One(Cow<'a, Value>),
    Many(Vec<Value>),
}

impl Operand<'_> {
    fn type_name(&self) -> &'static str {
        match self {
            Self::One(value) => type_name(value),
            Self::Many(_) => "list",
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Text(_) => "str",
    }
}

impl Bound {
    pub(crate) fn eval<'a>(
        &'a self,
        dataset: &'a Dataset,
        row: usize,
    ) -> Result<Operand<'a>, QueryError> {
        match self {
            Self::Literal(value) => Ok(Operand::One(Cow::Borrowed(value))),
            Self::Column(col) => Ok(Operand::One(
                dataset
                    .cell(row, *col)
                    .map_or(Cow::Owned(Value::Null), Cow::Borrowed),
            )),
            Self::Level(level) => Ok(Operand::One(
                dataset
                    .row_label(row)
                    .and_then(|label| label.level(*level))
                    .map_or(Cow::Owned(Value::Null), Cow::Borrowed),
            )),
            Self::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item.eval(dataset, row)? {
                        Operand::One(value) => values.push(value.into_owned()),
                        Operand::Many(_) => {
                            return Err(QueryError::TypeMismatch {
                                op: "[]",
                                left: "list",
                                right: "list",
                            });
                        }
                    }
                }
                Ok(Operand::Many(values))
            }
            Self::Unary { op, operand } => {
                let value = operand.eval(dataset, row)?;
                let result = match op {
                    UnaryOp::Not => Value::Bool(!truthy(&value)?),
                    UnaryOp::Neg => match value {
                        Operand::One(v) => match v.as_ref() {
                            Value::Null => Value::Null,
                            Value::Int(i) => {
                                Value::Int(i.checked_neg().ok_or(QueryError::Overflow)?)
                            }
                            Value::Float(f) => Value::Float(-f),
                            other => {
                                return Err(QueryError::TypeMismatch {
                                    op: "-",
                                    left: type_name(other),
                                    right: type_name(other),
                                });
                            }
                        },
                        Operand::Many(_) => {
                            return Err(QueryError::TypeMismatch {
                                op: "-",
                                left: "list",
                                right: "list",
                            });
                        }
                    },
                };
                Ok(Operand::One(Cow::Owned(result)))
            }
            // both sides are evaluated on every row, so an error on the
            // right fails the filter even where the left decides the result
            Self::Binary { op, left, right } => match op {
                BinaryOp::And | BinaryOp::Or => {
                    let lhs = truthy(&left.eval(dataset, row)?)?;
                    let rhs = truthy(&right.eval(dataset, row)?)?;
                    let result = if *op == BinaryOp::And {
                        lhs && rhs
                    } else {
                        lhs || rhs
                    };
                    Ok(Operand::One(Cow::Owned(Value::Bool(result))))
                }
                _ => {
                    let lhs = left.eval(dataset, row)?;
                    let rhs = right.eval(dataset, row)?;
                    match (lhs, rhs) {
                        (Operand::One(a), Operand::One(b)) => {
                            Ok(Operand::One(Cow::Owned(arithmetic(*op, &a, &b)?)))
                        }
                        (a, b) => Err(QueryError::TypeMismatch {
                            op: op.symbol(),
                            left: a.type_name(),
                            right: b.type_name(),
                        }),
                    }
                }
            },
            Self::Compare { first, rest } => {
                let mut left = first.eval(dataset, row)?;
                for (op, next) in rest {
                    let right = next.eval(dataset, row)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Operand::One(Cow::Owned(Value::Bool(false))));
                    }
                    left = right;
                }
                Ok(Operand::One(Cow::Owned(Value::Bool(true))))
            }
        }
    }
}

/// Boolean reading of an operand. Null counts as false.
pub(crate) fn truthy(operand: &Operand<'_>) -> Result<bool, QueryError> {
    match operand {
        Operand::One(value) => match value.as_ref() {
            Value::Bool(flag) => Ok(*flag),
            Value::Null => Ok(false),
            other => Err(QueryError::NotBoolean {
                found: type_name(other),
            }),
        },
        Operand::Many(_) => Err(QueryError::NotBoolean { found: "list" }),
    }
}

fn arithmetic(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, QueryError> {
    let mismatch = || QueryError::TypeMismatch {
        op: op.symbol(),
        left: type_name(a),
        right: type_name(b),
    };
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => {
            if other.is_null() || other.is_numeric() {
                Ok(Value::Null)
            } else {
                Err(mismatch())
            }
        }
        (Value::Int(x), Value::Int(y)) => int_arithmetic(op, *x, *y),
        (Value::Text(x), Value::Text(y)) if op == BinaryOp::Add => {
            Ok(Value::Text(format!("{x}{y}")))
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(float_arithmetic(op, x, y)),
            _ => Err(mismatch()),
        },
    }
}

fn int_arithmetic(op: BinaryOp, x: i64, y: i64) -> Result<Value, QueryError> {
    let result = match op {
        BinaryOp::Add => x.checked_add(y),
        BinaryOp::Sub => x.checked_sub(y),
        BinaryOp::Mul => x.checked_mul(y),
        BinaryOp::Div => return Ok(float_arithmetic(op, x as f64, y as f64)),
        BinaryOp::Rem => {
            if y == 0 {
                return Ok(Value::Null);
            }
            x.checked_rem(y)
                .map(|r| if r != 0 && (r < 0) != (y < 0) { r + y } else { r })
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("boolean operators are evaluated before arithmetic"),
    };
    result.map(Value::Int).ok_or(QueryError::Overflow)
}

/// Float arithmetic; `%` takes the sign of the divisor.
fn float_arithmetic(op: BinaryOp, x: f64, y: f64) -> Value {
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => x / y,
        BinaryOp::Rem => {
            if y == 0.0 {
                return Value::Null;
            }
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) {
                r + y
            } else {
                r
            }
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("boolean operators are evaluated before arithmetic"),
    };
    Value::Float(result)
}

fn compare(op: CompareOp, left: &Operand<'_>, right: &Operand<'_>) -> Result<bool, QueryError> {
    let mismatch = || QueryError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };
    let Operand::One(lhs) = left else {
        return Err(mismatch());
    };
    match (op, right) {
        (CompareOp::In | CompareOp::Eq, Operand::Many(items)) => {
            Ok(items.iter().any(|item| lhs.loose_eq(item)))
        }
        (CompareOp::NotIn | CompareOp::NotEq, Operand::Many(items)) => {
            Ok(!items.iter().any(|item| lhs.loose_eq(item)))
        }
        (_, Operand::Many(_)) => Err(mismatch()),
        (CompareOp::Eq | CompareOp::In, Operand::One(rhs)) => Ok(lhs.loose_eq(rhs)),
        (CompareOp::NotEq | CompareOp::NotIn, Operand::One(rhs)) => Ok(!lhs.loose_eq(rhs)),
        (_, Operand::One(rhs)) => {
            let is_nan = |v: &Value| v.as_f64().is_some_and(f64::is_nan);
            if lhs.is_null() || rhs.is_null() || is_nan(lhs.as_ref()) || is_nan(rhs.as_ref()) {
                return Ok(false);
            }
            let ordering = lhs.compare(rhs).ok_or_else(mismatch)?;
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
                _ => unreachable!("equality handled above"),
            })
        }
    }
}
