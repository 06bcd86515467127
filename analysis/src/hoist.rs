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

//! Moves every `Filter` to the outermost position in its query where the
//! filter's level still holds. `Break` never moves: it is a non-local
//! control effect, not a pure predicate.

use crate::condition_level::ConditionLevelAnalysis;
use crate::transformer::Transformer;
use ram_ir::{AnalysisCache, Condition, Operation, TranslationUnit};

pub struct HoistConditionsTransformer;

impl Transformer for HoistConditionsTransformer {
    fn name(&self) -> &'static str {
        "HoistConditions"
    }

    fn transform(&self, unit: &mut TranslationUnit) -> bool {
        let cache = AnalysisCache::default();
        let mut changed = false;
        unit.program.for_each_query_mut(|op| {
            let before = op.clone();
            let taken = std::mem::replace(op, Operation::SubroutineReturn { args: Vec::new() });
            let mut pending = Vec::new();
            let stripped = strip_filters(taken, &cache, &mut pending);
            let rebuilt = wrap_at_level(reinsert(stripped, &pending), -1, &pending);
            if rebuilt != before {
                changed = true;
            }
            *op = rebuilt;
        });
        if changed {
            unit.invalidate_analyses();
        }
        changed
    }
}

/// Removes every `Filter` from the chain, recording `(L(c), c)` for each in
/// top-down discovery order.
fn strip_filters(op: Operation, cache: &AnalysisCache, pending: &mut Vec<(i32, Condition)>) -> Operation {
    match op {
        Operation::Filter { cond, body } => {
            let level = ConditionLevelAnalysis::level_of(cache, &cond);
            pending.push((level, cond));
            strip_filters(*body, cache, pending)
        }
        other => other.map_body(|body| strip_filters(body, cache, pending)),
    }
}

/// Walks the filter-stripped chain, wrapping the body of every binding with
/// the pending filters whose level matches that binding's level.
fn reinsert(op: Operation, pending: &[(i32, Condition)]) -> Operation {
    match op.binding_level() {
        Some(level) => op.map_body(|body| {
            let body = reinsert(body, pending);
            wrap_at_level(body, level as i32, pending)
        }),
        None => match op {
            Operation::Break { cond, body } => Operation::Break {
                cond,
                body: Box::new(reinsert(*body, pending)),
            },
            leaf => leaf,
        },
    }
}

/// Wraps `body` in `Filter(c, ·)` for every pending condition at `level`,
/// preserving original relative order (earlier conditions end up outermost).
fn wrap_at_level(body: Operation, level: i32, pending: &[(i32, Condition)]) -> Operation {
    let mut result = body;
    for (l, c) in pending.iter().rev() {
        if *l == level {
            result = Operation::Filter {
                cond: c.clone(),
                body: Box::new(result),
            };
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ram_ir::{Expression, RelationId, Statement, SymbolTable};

    fn r(n: u32) -> RelationId {
        RelationId(n)
    }

    fn unit_with(op: Operation) -> TranslationUnit {
        TranslationUnit::new(
            ram_ir::Program::new(vec![r(0), r(1)], Statement::Query(op)),
            SymbolTable::new(),
        )
    }

    #[test]
    fn hoists_filter_to_binding_of_matching_level() {
        // SCAN R0 t0 { SCAN R1 t1 { IF t0.0 = 3 { PROJECT } } }
        // The filter only needs t0, so it belongs right under the t0 scan.
        let inner = Operation::Filter {
            cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(3)),
            body: Box::new(Operation::Project {
                relation: r(0),
                args: vec![],
            }),
        };
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Scan {
                relation: r(1),
                level: 1,
                body: Box::new(inner),
            }),
        };
        let mut unit = unit_with(op);
        let changed = HoistConditionsTransformer.transform(&mut unit);
        assert!(changed);
        match &unit.program.main {
            Statement::Query(Operation::Scan { body, .. }) => match body.as_ref() {
                Operation::Filter { body, .. } => {
                    assert!(matches!(**body, Operation::Scan { .. }));
                }
                other => panic!("expected filter directly under outer scan, got {other:?}"),
            },
            other => panic!("expected query, got {other:?}"),
        }
    }

    #[test]
    fn level_minus_one_filter_moves_to_query_root() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Filter {
                cond: Condition::eq(Expression::constant(1), Expression::constant(1)),
                body: Box::new(Operation::Project {
                    relation: r(0),
                    args: vec![],
                }),
            }),
        };
        let mut unit = unit_with(op);
        HoistConditionsTransformer.transform(&mut unit);
        match &unit.program.main {
            Statement::Query(Operation::Filter { body, .. }) => {
                assert!(matches!(**body, Operation::Scan { .. }));
            }
            other => panic!("expected filter hoisted above the scan, got {other:?}"),
        }
    }

    #[test]
    fn idempotent_on_already_hoisted_program() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Filter {
                cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(1)),
                body: Box::new(Operation::Project {
                    relation: r(0),
                    args: vec![],
                }),
            }),
        };
        let mut unit = unit_with(op);
        let first = HoistConditionsTransformer.transform(&mut unit);
        assert!(!first, "already in hoisted normal form");
        let second = HoistConditionsTransformer.transform(&mut unit);
        assert!(!second);
    }

    #[test]
    fn break_is_never_relocated() {
        let op = Operation::Scan {
            relation: r(0),
            level: 0,
            body: Box::new(Operation::Break {
                cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(1)),
                body: Box::new(Operation::Project {
                    relation: r(0),
                    args: vec![],
                }),
            }),
        };
        let mut unit = unit_with(op);
        HoistConditionsTransformer.transform(&mut unit);
        match &unit.program.main {
            Statement::Query(Operation::Scan { body, .. }) => {
                assert!(matches!(**body, Operation::Break { .. }));
            }
            other => panic!("expected break to remain directly under scan, got {other:?}"),
        }
    }
}
