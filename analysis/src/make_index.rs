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

//! Turns a `Scan`/`Aggregate` plus a run of equality filters immediately
//! inside it into an `IndexScan`/`IndexAggregate` carrying the equalities as
//! an index pattern, leaving whatever doesn't fit as residual filters.

use crate::expression_level::ExpressionLevelAnalysis;
use crate::transformer::Transformer;
use ram_ir::{AnalysisCache, CmpOp, Condition, Expression, Operation, RelationId, SymbolTable, TranslationUnit};

pub struct MakeIndexTransformer;

impl Transformer for MakeIndexTransformer {
    fn name(&self) -> &'static str {
        "MakeIndex"
    }

    fn transform(&self, unit: &mut TranslationUnit) -> bool {
        let cache = AnalysisCache::default();
        let mut changed = false;
        unit.program.for_each_query_mut(|op| {
            let taken = std::mem::replace(op, Operation::SubroutineReturn { args: Vec::new() });
            *op = rewrite(taken, &unit.symtab, &cache, &mut changed);
        });
        if changed {
            unit.invalidate_analyses();
        }
        changed
    }
}

fn arity_of(symtab: &SymbolTable, relation: RelationId) -> usize {
    symtab.arity(relation).unwrap_or_else(|| {
        log::error!("MakeIndex: R{} has no declared arity", relation.0);
        panic!("MakeIndex: relation R{} referenced by a Scan has no declared arity", relation.0);
    })
}

fn rewrite(op: Operation, symtab: &SymbolTable, cache: &AnalysisCache, changed: &mut bool) -> Operation {
    match op {
        Operation::Scan { relation, level, body } => {
            let arity = arity_of(symtab, relation);
            let (pattern, residual, rest) = classify_filters(*body, level, arity, cache);
            let rest = rewrite(rest, symtab, cache, changed);
            let wrapped = wrap_residual(rest, &residual);
            if pattern.iter().any(|e| !matches!(e, Expression::UndefValue)) {
                *changed = true;
                Operation::IndexScan {
                    relation,
                    level,
                    pattern,
                    body: Box::new(wrapped),
                }
            } else {
                Operation::Scan {
                    relation,
                    level,
                    body: Box::new(wrapped),
                }
            }
        }
        Operation::Aggregate {
            op: agg,
            relation,
            level,
            cond,
            expr,
            body,
        } => {
            let arity = arity_of(symtab, relation);
            let (pattern, residual, rest) = classify_filters(*body, level, arity, cache);
            let rest = rewrite(rest, symtab, cache, changed);
            let wrapped = wrap_residual(rest, &residual);
            if pattern.iter().any(|e| !matches!(e, Expression::UndefValue)) {
                *changed = true;
                Operation::IndexAggregate {
                    op: agg,
                    relation,
                    level,
                    pattern,
                    cond,
                    expr,
                    body: Box::new(wrapped),
                }
            } else {
                Operation::Aggregate {
                    op: agg,
                    relation,
                    level,
                    cond,
                    expr,
                    body: Box::new(wrapped),
                }
            }
        }
        other => other.map_body(|body| rewrite(body, symtab, cache, changed)),
    }
}

/// Peels the contiguous run of `Filter`s at the front of `body`, filling one
/// pattern slot per index-eligible equality (first writer wins per column;
/// later equalities for an already-filled column stay residual).
fn classify_filters(
    mut body: Operation,
    level: u32,
    arity: usize,
    cache: &AnalysisCache,
) -> (Vec<Expression>, Vec<Condition>, Operation) {
    let mut pattern = vec![Expression::UndefValue; arity];
    let mut filled = vec![false; arity];
    let mut residual = Vec::new();
    loop {
        match body {
            Operation::Filter { cond, body: inner } => {
                match eligible_column(&cond, level, cache) {
                    Some(column) if column < arity && !filled[column] => {
                        filled[column] = true;
                        pattern[column] = other_side(&cond, level);
                    }
                    _ => residual.push(cond),
                }
                body = *inner;
            }
            other => {
                body = other;
                break;
            }
        }
    }
    (pattern, residual, body)
}

/// If `cond` is `TupleElement(level, col) = e` or `e = TupleElement(level, col)`
/// with `L(e) < level`, returns `col`.
fn eligible_column(cond: &Condition, level: u32, cache: &AnalysisCache) -> Option<usize> {
    let Condition::Constraint { op: CmpOp::Eq, lhs, rhs } = cond else {
        return None;
    };
    for (tuple_side, other_side) in [(lhs, rhs), (rhs, lhs)] {
        if let Expression::TupleElement { level: l, column } = tuple_side {
            if *l == level && ExpressionLevelAnalysis::level_of(cache, other_side) < level as i32 {
                return Some(*column as usize);
            }
        }
    }
    None
}

fn other_side(cond: &Condition, level: u32) -> Expression {
    let Condition::Constraint { lhs, rhs, .. } = cond else {
        unreachable!("eligible_column only returns Some for Constraint conditions")
    };
    match lhs {
        Expression::TupleElement { level: l, .. } if *l == level => rhs.clone(),
        _ => lhs.clone(),
    }
}

fn wrap_residual(body: Operation, residual: &[Condition]) -> Operation {
    let mut result = body;
    for cond in residual.iter().rev() {
        result = Operation::Filter {
            cond: cond.clone(),
            body: Box::new(result),
        };
    }
    result
}
