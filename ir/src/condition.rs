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

//! Boolean-producing nodes of the RAM IR.

use crate::expr::Expression;
use crate::symtab::RelationId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// A boolean-producing node.
///
/// Per the level discipline invariant, any `Filter` sitting directly inside
/// a query nest holds a single `Condition` whose outermost connective is not
/// `Conjunction`: conjunctions arrive (and are kept) in *split form*, as
/// nested `Filter(c1, Filter(c2, body))` rather than one `Filter` wrapping
/// an n-ary AND.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Conjunction(Box<Condition>, Box<Condition>),
    Negation(Box<Condition>),
    Constraint {
        op: CmpOp,
        lhs: Expression,
        rhs: Expression,
    },
    ExistenceCheck {
        relation: RelationId,
        pattern: Vec<Expression>,
    },
    ProvenanceExistenceCheck {
        relation: RelationId,
        pattern: Vec<Expression>,
    },
    EmptinessCheck {
        relation: RelationId,
    },
}

impl Condition {
    pub fn eq(lhs: Expression, rhs: Expression) -> Self {
        Condition::Constraint {
            op: CmpOp::Eq,
            lhs,
            rhs,
        }
    }

    /// Applies `f` to every direct expression child of this condition (not
    /// recursing into sub-conditions).
    pub fn for_each_expr_child(&self, mut f: impl FnMut(&Expression)) {
        match self {
            Condition::Constraint { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            Condition::ExistenceCheck { pattern, .. }
            | Condition::ProvenanceExistenceCheck { pattern, .. } => {
                for e in pattern {
                    f(e);
                }
            }
            Condition::Conjunction(_, _) | Condition::Negation(_) | Condition::EmptinessCheck { .. } => {}
        }
    }

    /// Applies `f` to every direct sub-condition child.
    pub fn for_each_cond_child(&self, mut f: impl FnMut(&Condition)) {
        match self {
            Condition::Conjunction(a, b) => {
                f(a);
                f(b);
            }
            Condition::Negation(c) => f(c),
            Condition::Constraint { .. }
            | Condition::ExistenceCheck { .. }
            | Condition::ProvenanceExistenceCheck { .. }
            | Condition::EmptinessCheck { .. } => {}
        }
    }

    /// True if `TupleElement(level, _)` occurs anywhere in this condition.
    pub fn references_level(&self, level: u32) -> bool {
        let mut found = false;
        self.for_each_expr_child(|e| found |= expr_references_level(e, level));
        self.for_each_cond_child(|c| found |= c.references_level(level));
        found
    }
}

pub(crate) fn expr_references_level(e: &Expression, level: u32) -> bool {
    match e {
        Expression::TupleElement { level: l, .. } => *l == level,
        _ => {
            let mut found = false;
            e.for_each_child(|child| found |= expr_references_level(child, level));
            found
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Conjunction(a, b) => write!(f, "({a} AND {b})"),
            Condition::Negation(c) => write!(f, "NOT {c}"),
            Condition::Constraint { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Condition::ExistenceCheck { relation, pattern } => {
                write!(f, "∃ R{}(", relation.0)?;
                write_pattern(f, pattern)?;
                write!(f, ")")
            }
            Condition::ProvenanceExistenceCheck { relation, pattern } => {
                write!(f, "∃! R{}(", relation.0)?;
                write_pattern(f, pattern)?;
                write!(f, ")")
            }
            Condition::EmptinessCheck { relation } => write!(f, "R{} = ∅", relation.0),
        }
    }
}

fn write_pattern(f: &mut std::fmt::Formatter<'_>, pattern: &[Expression]) -> std::fmt::Result {
    for (i, e) in pattern.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{e}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_level_true_for_matching_tuple_element() {
        let c = Condition::eq(Expression::tuple_element(1, 0), Expression::constant(5));
        assert!(c.references_level(1));
        assert!(!c.references_level(0));
    }

    #[test]
    fn references_level_recurses_into_conjunctions() {
        let c = Condition::Conjunction(
            Box::new(Condition::eq(Expression::constant(1), Expression::constant(1))),
            Box::new(Condition::eq(Expression::tuple_element(2, 0), Expression::constant(1))),
        );
        assert!(c.references_level(2));
        assert!(!c.references_level(3));
    }
}
