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

//! Rewrites an `IndexScan` that never reads the tuple it binds into a plain
//! existence check: the scan was only ever testing whether a matching tuple
//! exists, not projecting any of its columns downstream.

use crate::transformer::Transformer;
use ram_ir::{Condition, Operation, TranslationUnit};

pub struct IfConversionTransformer;

impl Transformer for IfConversionTransformer {
    fn name(&self) -> &'static str {
        "IfConversion"
    }

    fn transform(&self, unit: &mut TranslationUnit) -> bool {
        let mut changed = false;
        unit.program.for_each_query_mut(|op| {
            let taken = std::mem::replace(op, Operation::SubroutineReturn { args: Vec::new() });
            *op = rewrite(taken, &mut changed);
        });
        if changed {
            unit.invalidate_analyses();
        }
        changed
    }
}

fn rewrite(op: Operation, changed: &mut bool) -> Operation {
    match op {
        Operation::IndexScan {
            relation,
            level,
            pattern,
            body,
        } => {
            let body = rewrite(*body, changed);
            if !body.references_level(level) {
                *changed = true;
                Operation::Filter {
                    cond: Condition::ExistenceCheck { relation, pattern },
                    body: Box::new(body),
                }
            } else {
                Operation::IndexScan {
                    relation,
                    level,
                    pattern,
                    body: Box::new(body),
                }
            }
        }
        other => other.map_body(|body| rewrite(body, changed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ram_ir::{Expression, RelationId, Statement, SymbolTable};

    fn unit_with(op: Operation) -> TranslationUnit {
        TranslationUnit::new(
            ram_ir::Program::new(vec![RelationId(0)], Statement::Query(op)),
            SymbolTable::new(),
        )
    }

    #[test]
    fn converts_unread_index_scan_to_existence_check() {
        let op = Operation::IndexScan {
            relation: RelationId(0),
            level: 0,
            pattern: vec![Expression::constant(1), Expression::UndefValue],
            body: Box::new(Operation::Project {
                relation: RelationId(1),
                args: vec![Expression::constant(9)],
            }),
        };
        let mut unit = unit_with(op);
        let changed = IfConversionTransformer.transform(&mut unit);
        assert!(changed);
        assert!(matches!(
            unit.program.main,
            Statement::Query(Operation::Filter {
                cond: Condition::ExistenceCheck { .. },
                ..
            })
        ));
    }

    #[test]
    fn leaves_index_scan_whose_tuple_is_projected() {
        let op = Operation::IndexScan {
            relation: RelationId(0),
            level: 0,
            pattern: vec![Expression::constant(1)],
            body: Box::new(Operation::Project {
                relation: RelationId(1),
                args: vec![Expression::tuple_element(0, 0)],
            }),
        };
        let mut unit = unit_with(op);
        let changed = IfConversionTransformer.transform(&mut unit);
        assert!(!changed);
        assert!(matches!(unit.program.main, Statement::Query(Operation::IndexScan { .. })));
    }

    #[test]
    fn applies_recursively_to_nested_index_scans() {
        let op = Operation::IndexScan {
            relation: RelationId(0),
            level: 0,
            pattern: vec![Expression::constant(1)],
            body: Box::new(Operation::IndexScan {
                relation: RelationId(1),
                level: 1,
                pattern: vec![Expression::constant(2)],
                body: Box::new(Operation::Project {
                    relation: RelationId(2),
                    args: vec![],
                }),
            }),
        };
        let mut unit = unit_with(op);
        IfConversionTransformer.transform(&mut unit);
        match &unit.program.main {
            Statement::Query(Operation::Filter { body, .. }) => {
                assert!(matches!(**body, Operation::Filter { .. }));
            }
            other => panic!("expected both scans converted, got {other:?}"),
        }
    }
}
