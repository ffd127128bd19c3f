//! Built-in formula functions and their argument signatures.
//!
//! Conventions:
//! - Function names are matched case-insensitively; the table holds them lowercase.
//! - Every argument position is declared as a scalar or a range, and calls
//!   are checked against that before anything is evaluated.
//! - Adding a function means adding an entry to `BUILTINS`.

use crate::engine::{CellPosition, Evaluator, ExprId, Expression, Range};
use crate::error::CellError;

/// Shape an argument position accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    Scalar,
    Range,
}

/// An argument after shape checking. Ranges are already shifted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg {
    Scalar(f64),
    Range(Range),
}

pub type BuiltinFn = fn(&mut Evaluator<'_>, &[Arg]) -> Result<f64, CellError>;

pub struct Builtin {
    pub name: &'static str,
    pub args: &'static [ArgKind],
    pub description: &'static str,
    pub eval: BuiltinFn,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "sqrt",
        args: &[ArgKind::Scalar],
        description: "Principal square root of a value",
        eval: builtin_sqrt,
    },
    Builtin {
        name: "abs",
        args: &[ArgKind::Scalar],
        description: "Absolute value",
        eval: builtin_abs,
    },
    Builtin {
        name: "sum",
        args: &[ArgKind::Range],
        description: "Sum of numeric values in a cell range",
        eval: builtin_sum,
    },
    Builtin {
        name: "avg",
        args: &[ArgKind::Range],
        description: "Average of numeric values in a cell range",
        eval: builtin_avg,
    },
    Builtin {
        name: "min",
        args: &[ArgKind::Range],
        description: "Minimum numeric value in a cell range",
        eval: builtin_min,
    },
    Builtin {
        name: "max",
        args: &[ArgKind::Range],
        description: "Maximum numeric value in a cell range",
        eval: builtin_max,
    },
    Builtin {
        name: "count",
        args: &[ArgKind::Range],
        description: "Count of numeric cells in a cell range",
        eval: builtin_count,
    },
];

/// Find a builtin by name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Check a call against the builtin's signature, evaluate its arguments
/// left to right and run it.
pub(crate) fn call(
    evaluator: &mut Evaluator<'_>,
    name: &str,
    args: &[ExprId],
    shift: CellPosition,
) -> Result<f64, CellError> {
    let builtin = lookup(name).ok_or_else(|| CellError::UnknownFunction(name.to_string()))?;
    if args.len() != builtin.args.len() {
        return Err(CellError::Arity {
            name: builtin.name,
            expected: builtin.args.len(),
            found: args.len(),
        });
    }

    let arena = evaluator.arena();
    for (position, (&id, kind)) in args.iter().zip(builtin.args).enumerate() {
        let is_range = matches!(arena.get(id), Expression::Range(_));
        match (kind, is_range) {
            (ArgKind::Scalar, true) => {
                return Err(CellError::ExpectedScalar {
                    name: builtin.name,
                    position: position + 1,
                });
            }
            (ArgKind::Range, false) => {
                return Err(CellError::ExpectedRange {
                    name: builtin.name,
                    position: position + 1,
                });
            }
            _ => {}
        }
    }

    let mut values = Vec::with_capacity(args.len());
    for &id in args {
        let value = match arena.get(id) {
            Expression::Range(range) => Arg::Range(range.shift(shift)),
            _ => Arg::Scalar(evaluator.evaluate_expression(id, shift)?),
        };
        values.push(value);
    }

    (builtin.eval)(evaluator, &values)
}

fn builtin_sqrt(_: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    let [Arg::Scalar(x)] = args else {
        return Err(CellError::NotANumber);
    };
    if *x < 0.0 {
        return Err(CellError::NegativeSqrt);
    }
    Ok(x.sqrt())
}

fn builtin_abs(_: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    let [Arg::Scalar(x)] = args else {
        return Err(CellError::NotANumber);
    };
    Ok(x.abs())
}

fn range_values(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<Vec<f64>, CellError> {
    let [Arg::Range(range)] = args else {
        return Err(CellError::NotANumber);
    };
    evaluator.range_numbers(*range)
}

fn builtin_sum(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    Ok(range_values(evaluator, args)?.iter().sum())
}

fn builtin_avg(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    let values = range_values(evaluator, args)?;
    if values.is_empty() {
        return Err(CellError::EmptyRange);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn builtin_min(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    range_values(evaluator, args)?
        .into_iter()
        .reduce(f64::min)
        .ok_or(CellError::EmptyRange)
}

fn builtin_max(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    range_values(evaluator, args)?
        .into_iter()
        .reduce(f64::max)
        .ok_or(CellError::EmptyRange)
}

fn builtin_count(evaluator: &mut Evaluator<'_>, args: &[Arg]) -> Result<f64, CellError> {
    Ok(range_values(evaluator, args)?.len() as f64)
}
