// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pure value-producing nodes of the RAM IR.

/// A domain scalar. The full language also has float and symbol constants;
/// this crate's scope only needs the two that the passes reason about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Signed(i64),
    Unsigned(u64),
}

/// Arithmetic/logic/string primitives available to [`Expression::IntrinsicOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Negate,
    StrCat,
    Ord,
}

/// A pure value-producing node.
///
/// `Expression` trees are owned by value (via `Vec`, not `Box`) because the
/// passes in scope never relocate sub-expressions independently of their
/// parent condition/operation; only whole `Condition`s and `Operation`s
/// move. Expressions are read by the level analyses, never rewritten.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Constant(Constant),
    /// The `column`-th attribute of the tuple bound at nesting `level`.
    TupleElement { level: u32, column: u32 },
    /// A fresh counter per query.
    AutoIncrement,
    IntrinsicOp {
        op: IntrinsicOp,
        args: Vec<Expression>,
    },
    UserDefinedOp {
        name: String,
        args: Vec<Expression>,
    },
    PackRecord {
        args: Vec<Expression>,
    },
    SubroutineArg(u32),
    /// Wildcard/placeholder in query patterns.
    UndefValue,
}

impl Expression {
    pub fn constant(value: i64) -> Self {
        Expression::Constant(Constant::Signed(value))
    }

    pub fn tuple_element(level: u32, column: u32) -> Self {
        Expression::TupleElement { level, column }
    }

    /// Applies `f` to every direct child expression.
    pub fn for_each_child(&self, mut f: impl FnMut(&Expression)) {
        match self {
            Expression::IntrinsicOp { args, .. }
            | Expression::UserDefinedOp { args, .. }
            | Expression::PackRecord { args } => {
                for a in args {
                    f(a);
                }
            }
            Expression::Constant(_)
            | Expression::TupleElement { .. }
            | Expression::AutoIncrement
            | Expression::SubroutineArg(_)
            | Expression::UndefValue => {}
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Constant(Constant::Signed(n)) => write!(f, "{n}"),
            Expression::Constant(Constant::Unsigned(n)) => write!(f, "{n}u"),
            Expression::TupleElement { level, column } => write!(f, "t{level}.{column}"),
            Expression::AutoIncrement => write!(f, "autoinc()"),
            Expression::IntrinsicOp { op, args } => {
                write!(f, "{op:?}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expression::UserDefinedOp { name, args } => {
                write!(f, "@{name}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Expression::PackRecord { args } => {
                write!(f, "[")?;
                write_args(f, args)?;
                write!(f, "]")
            }
            Expression::SubroutineArg(idx) => write!(f, "arg{idx}"),
            Expression::UndefValue => write!(f, "_"),
        }
    }
}

fn write_args(f: &mut std::fmt::Formatter<'_>, args: &[Expression]) -> std::fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_nested_ops() {
        let e = Expression::IntrinsicOp {
            op: IntrinsicOp::Add,
            args: vec![Expression::tuple_element(0, 1), Expression::constant(5)],
        };
        assert_eq!(e.to_string(), "Add(t0.1, 5)");
    }
}
