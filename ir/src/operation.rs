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

//! Operations that introduce or consume tuple bindings inside a `Query`.
//!
//! `Operation` is the tree the optimization passes actually rewrite. Each
//! variant that nests a `body` owns it exclusively via `Box`; a transformer
//! replaces a child by consuming the old `Operation` (pattern-matching moves
//! the `Box` out) and producing a new one. There is no in-place field
//! mutation that could bypass the translation unit's analysis-cache
//! invalidation.

use crate::condition::Condition;
use crate::expr::Expression;
use crate::symtab::RelationId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Count,
    Sum,
    Min,
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Scan {
        relation: RelationId,
        level: u32,
        body: Box<Operation>,
    },
    IndexScan {
        relation: RelationId,
        level: u32,
        pattern: Vec<Expression>,
        body: Box<Operation>,
    },
    Choice {
        relation: RelationId,
        level: u32,
        cond: Condition,
        body: Box<Operation>,
    },
    IndexChoice {
        relation: RelationId,
        level: u32,
        pattern: Vec<Expression>,
        cond: Condition,
        body: Box<Operation>,
    },
    Aggregate {
        op: AggregateOp,
        relation: RelationId,
        level: u32,
        cond: Condition,
        expr: Expression,
        body: Box<Operation>,
    },
    IndexAggregate {
        op: AggregateOp,
        relation: RelationId,
        level: u32,
        pattern: Vec<Expression>,
        cond: Condition,
        expr: Expression,
        body: Box<Operation>,
    },
    Filter {
        cond: Condition,
        body: Box<Operation>,
    },
    Break {
        cond: Condition,
        body: Box<Operation>,
    },
    Project {
        relation: RelationId,
        args: Vec<Expression>,
    },
    SubroutineReturn {
        args: Vec<Expression>,
    },
}

impl Operation {
    /// The tuple level this operation introduces, if any.
    pub fn binding_level(&self) -> Option<u32> {
        match self {
            Operation::Scan { level, .. }
            | Operation::IndexScan { level, .. }
            | Operation::Choice { level, .. }
            | Operation::IndexChoice { level, .. }
            | Operation::Aggregate { level, .. }
            | Operation::IndexAggregate { level, .. } => Some(*level),
            Operation::Filter { .. }
            | Operation::Break { .. }
            | Operation::Project { .. }
            | Operation::SubroutineReturn { .. } => None,
        }
    }

    /// A shared reference to the nested body, if this variant has one.
    pub fn body(&self) -> Option<&Operation> {
        match self {
            Operation::Scan { body, .. }
            | Operation::IndexScan { body, .. }
            | Operation::Choice { body, .. }
            | Operation::IndexChoice { body, .. }
            | Operation::Aggregate { body, .. }
            | Operation::IndexAggregate { body, .. }
            | Operation::Filter { body, .. }
            | Operation::Break { body, .. } => Some(body),
            Operation::Project { .. } | Operation::SubroutineReturn { .. } => None,
        }
    }

    /// Replaces the nested body in place by calling `f` with the owned old
    /// body and installing whatever it returns. A no-op for leaf variants.
    /// This is the node-mapper "take ownership, install new" contract.
    pub fn map_body(self, f: impl FnOnce(Operation) -> Operation) -> Operation {
        match self {
            Operation::Scan {
                relation,
                level,
                body,
            } => Operation::Scan {
                relation,
                level,
                body: Box::new(f(*body)),
            },
            Operation::IndexScan {
                relation,
                level,
                pattern,
                body,
            } => Operation::IndexScan {
                relation,
                level,
                pattern,
                body: Box::new(f(*body)),
            },
            Operation::Choice {
                relation,
                level,
                cond,
                body,
            } => Operation::Choice {
                relation,
                level,
                cond,
                body: Box::new(f(*body)),
            },
            Operation::IndexChoice {
                relation,
                level,
                pattern,
                cond,
                body,
            } => Operation::IndexChoice {
                relation,
                level,
                pattern,
                cond,
                body: Box::new(f(*body)),
            },
            Operation::Aggregate {
                op,
                relation,
                level,
                cond,
                expr,
                body,
            } => Operation::Aggregate {
                op,
                relation,
                level,
                cond,
                expr,
                body: Box::new(f(*body)),
            },
            Operation::IndexAggregate {
                op,
                relation,
                level,
                pattern,
                cond,
                expr,
                body,
            } => Operation::IndexAggregate {
                op,
                relation,
                level,
                pattern,
                cond,
                expr,
                body: Box::new(f(*body)),
            },
            Operation::Filter { cond, body } => Operation::Filter {
                cond,
                body: Box::new(f(*body)),
            },
            Operation::Break { cond, body } => Operation::Break {
                cond,
                body: Box::new(f(*body)),
            },
            leaf @ (Operation::Project { .. } | Operation::SubroutineReturn { .. }) => leaf,
        }
    }

    /// True if any `TupleElement(level, _)` occurs anywhere in this subtree
    /// (including in conditions and expressions of nested operations).
    pub fn references_level(&self, level: u32) -> bool {
        let self_refs = match self {
            Operation::Scan { .. } | Operation::IndexScan { .. } => false,
            Operation::Choice { cond, .. } | Operation::IndexChoice { cond, .. } => {
                cond.references_level(level)
            }
            Operation::Aggregate { cond, expr, .. } | Operation::IndexAggregate { cond, expr, .. } => {
                cond.references_level(level) || crate::condition::expr_references_level(expr, level)
            }
            Operation::Filter { cond, .. } | Operation::Break { cond, .. } => {
                cond.references_level(level)
            }
            Operation::Project { args, .. } | Operation::SubroutineReturn { args } => args
                .iter()
                .any(|e| crate::condition::expr_references_level(e, level)),
        };
        let pattern_refs = match self {
            Operation::IndexScan { pattern, .. }
            | Operation::IndexChoice { pattern, .. }
            | Operation::IndexAggregate { pattern, .. } => pattern
                .iter()
                .any(|e| crate::condition::expr_references_level(e, level)),
            _ => false,
        };
        self_refs || pattern_refs || self.body().is_some_and(|b| b.references_level(level))
    }

    /// True if a `Break` occurs anywhere in this subtree.
    pub fn contains_break(&self) -> bool {
        matches!(self, Operation::Break { .. }) || self.body().is_some_and(|b| b.contains_break())
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_indented(self, f, 0)
    }
}

fn fmt_indented(op: &Operation, f: &mut std::fmt::Formatter<'_>, indent: usize) -> std::fmt::Result {
    let pad = "  ".repeat(indent);
    match op {
        Operation::Scan { relation, level, body } => {
            writeln!(f, "{pad}SCAN R{} AS t{level}", relation.0)?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::IndexScan {
            relation,
            level,
            pattern,
            body,
        } => {
            writeln!(f, "{pad}INDEX SCAN R{} AS t{level} [{}]", relation.0, fmt_pattern(pattern))?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::Choice {
            relation,
            level,
            cond,
            body,
        } => {
            writeln!(f, "{pad}CHOICE R{} AS t{level} WHERE {cond}", relation.0)?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::IndexChoice {
            relation,
            level,
            pattern,
            cond,
            body,
        } => {
            writeln!(
                f,
                "{pad}INDEX CHOICE R{} AS t{level} [{}] WHERE {cond}",
                relation.0,
                fmt_pattern(pattern)
            )?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::Aggregate {
            op,
            relation,
            level,
            cond,
            expr,
            body,
        } => {
            writeln!(
                f,
                "{pad}{op:?} R{} AS t{level} WHERE {cond} OF {expr}",
                relation.0
            )?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::IndexAggregate {
            op,
            relation,
            level,
            pattern,
            cond,
            expr,
            body,
        } => {
            writeln!(
                f,
                "{pad}INDEX {op:?} R{} AS t{level} [{}] WHERE {cond} OF {expr}",
                relation.0,
                fmt_pattern(pattern)
            )?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::Filter { cond, body } => {
            writeln!(f, "{pad}IF {cond}")?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::Break { cond, body } => {
            writeln!(f, "{pad}BREAK IF {cond}")?;
            fmt_indented(body, f, indent + 1)
        }
        Operation::Project { relation, args } => {
            writeln!(f, "{pad}PROJECT R{} ({})", relation.0, fmt_pattern(args))
        }
        Operation::SubroutineReturn { args } => {
            writeln!(f, "{pad}RETURN ({})", fmt_pattern(args))
        }
    }
}

fn fmt_pattern(pattern: &[Expression]) -> String {
    pattern
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::RelationId;

    fn r(n: u32) -> RelationId {
        RelationId(n)
    }

    #[test]
    fn map_body_replaces_child_and_keeps_shape() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Project {
                relation: r(1),
                args: vec![],
            }),
        };
        let op = op.map_body(|inner| {
            assert!(matches!(inner, Operation::Project { .. }));
            Operation::Project {
                relation: r(2),
                args: vec![],
            }
        });
        match op {
            Operation::Scan { body, .. } => {
                assert!(matches!(*body, Operation::Project { relation, .. } if relation == r(2)));
            }
            _ => panic!("expected Scan"),
        }
    }

    #[test]
    fn references_level_true_when_project_reads_bound_tuple() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Project {
                relation: r(1),
                args: vec![Expression::tuple_element(0, 0)],
            }),
        };
        assert!(op.references_level(0));
    }

    #[test]
    fn references_level_false_when_project_ignores_bound_tuple() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Project {
                relation: r(1),
                args: vec![Expression::constant(0)],
            }),
        };
        assert!(!op.references_level(0));
    }

    #[test]
    fn contains_break_detects_nested_break() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Break {
                cond: Condition::eq(Expression::constant(1), Expression::constant(1)),
                body: Box::new(Operation::Project {
                    relation: r(1),
                    args: vec![],
                }),
            }),
        };
        assert!(op.contains_break());
    }
}
