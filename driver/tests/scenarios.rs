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

//! End-to-end scenarios over relations of arity 3 (attributes x, y, z),
//! each exercising one pass (or a pair of passes in sequence) through
//! `Pipeline::run`.

use ram_driver::{Pipeline, PipelineConfig};
use ram_ir::{Condition, Expression, Operation, Program, RelationId, Statement, SymbolTable, TranslationUnit};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn unit_with(relations: Vec<(RelationId, usize)>, op: Operation) -> TranslationUnit {
    let mut symtab = SymbolTable::new();
    for (id, arity) in &relations {
        let declared = symtab.declare_relation(format!("rel{}", id.0), *arity);
        assert_eq!(declared, *id);
    }
    TranslationUnit::new(
        Program::new(relations.into_iter().map(|(id, _)| id).collect(), Statement::Query(op)),
        symtab,
    )
}

fn const_true() -> Condition {
    Condition::eq(Expression::constant(1), Expression::constant(1))
}

/// S1 (pure hoist): `Const(true)` ends up wrapping the whole query, and the
/// `TE(0,0) = 5` filter moves immediately below the outer scan.
#[test]
fn s1_pure_hoist() {
    init_logging();
    let a = RelationId(0);
    let b = RelationId(1);
    let c = RelationId(2);

    let op = Operation::Scan {
        relation: a,
        level: 0,
        body: Box::new(Operation::Scan {
            relation: b,
            level: 1,
            body: Box::new(Operation::Filter {
                cond: const_true(),
                body: Box::new(Operation::Filter {
                    cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(5)),
                    body: Box::new(Operation::Project {
                        relation: c,
                        args: vec![Expression::tuple_element(1, 0)],
                    }),
                }),
            }),
        }),
    };
    let mut unit = unit_with(vec![(a, 3), (b, 3), (c, 3)], op);
    let config = PipelineConfig {
        make_index: false,
        if_conversion: false,
        choice_conversion: false,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(config).run(&mut unit).unwrap();
    assert!(report.passes[0].changed);

    match &unit.program.main {
        Statement::Query(Operation::Filter { cond, body }) => {
            assert_eq!(*cond, const_true());
            match body.as_ref() {
                Operation::Scan { relation, body, .. } => {
                    assert_eq!(*relation, a);
                    match body.as_ref() {
                        Operation::Filter { cond, body } => {
                            assert_eq!(
                                *cond,
                                Condition::eq(Expression::tuple_element(0, 0), Expression::constant(5))
                            );
                            assert!(matches!(**body, Operation::Scan { relation, .. } if relation == b));
                        }
                        other => panic!("expected TE(0,0)=5 filter directly below scan A, got {other:?}"),
                    }
                }
                other => panic!("expected scan A directly below the hoisted true-filter, got {other:?}"),
            }
        }
        other => panic!("expected the always-true filter to wrap the whole query, got {other:?}"),
    }
}

/// S2 (hoist + index): following S1's hoist, MakeIndex folds the `TE(0,0)=5`
/// filter into an index pattern on the scan of `A`.
#[test]
fn s2_hoist_then_index() {
    init_logging();
    let a = RelationId(0);
    let b = RelationId(1);
    let c = RelationId(2);

    let op = Operation::Scan {
        relation: a,
        level: 0,
        body: Box::new(Operation::Scan {
            relation: b,
            level: 1,
            body: Box::new(Operation::Filter {
                cond: const_true(),
                body: Box::new(Operation::Filter {
                    cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(5)),
                    body: Box::new(Operation::Project {
                        relation: c,
                        args: vec![Expression::tuple_element(1, 0)],
                    }),
                }),
            }),
        }),
    };
    let mut unit = unit_with(vec![(a, 3), (b, 3), (c, 3)], op);
    let config = PipelineConfig {
        if_conversion: false,
        choice_conversion: false,
        ..PipelineConfig::default()
    };
    Pipeline::new(config).run(&mut unit).unwrap();

    match &unit.program.main {
        Statement::Query(Operation::Filter { body, .. }) => match body.as_ref() {
            Operation::IndexScan { relation, pattern, .. } => {
                assert_eq!(*relation, a);
                assert_eq!(pattern[0], Expression::constant(5));
                assert!(matches!(pattern[1], Expression::UndefValue));
                assert!(matches!(pattern[2], Expression::UndefValue));
            }
            other => panic!("expected scan A folded into an IndexScan, got {other:?}"),
        },
        other => panic!("expected the hoisted true-filter still wrapping the query, got {other:?}"),
    }
}

/// S3 (if-conversion): an index-scan whose bound tuple is never read
/// degenerates into an existence check.
#[test]
fn s3_if_conversion() {
    init_logging();
    let r = RelationId(0);
    let s = RelationId(1);
    let pattern = vec![Expression::constant(1), Expression::UndefValue, Expression::UndefValue];
    let op = Operation::IndexScan {
        relation: r,
        level: 2,
        pattern: pattern.clone(),
        body: Box::new(Operation::Project {
            relation: s,
            args: vec![Expression::constant(0)],
        }),
    };
    let mut unit = unit_with(vec![(r, 3), (s, 1)], op);
    let config = PipelineConfig {
        hoist_conditions: false,
        make_index: false,
        choice_conversion: false,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(config).run(&mut unit).unwrap();
    assert!(report.passes[0].changed);
    match &unit.program.main {
        Statement::Query(Operation::Filter {
            cond: Condition::ExistenceCheck { relation, pattern: got },
            body,
        }) => {
            assert_eq!(*relation, r);
            assert_eq!(*got, pattern);
            assert!(matches!(**body, Operation::Project { .. }));
        }
        other => panic!("expected an existence check, got {other:?}"),
    }
}

/// S4 (non-conversion): the same shape, but the body reads the bound tuple,
/// so IfConversion must leave it alone.
#[test]
fn s4_if_conversion_skipped_when_tuple_is_live() {
    init_logging();
    let r = RelationId(0);
    let s = RelationId(1);
    let op = Operation::IndexScan {
        relation: r,
        level: 2,
        pattern: vec![Expression::constant(1), Expression::UndefValue, Expression::UndefValue],
        body: Box::new(Operation::Project {
            relation: s,
            args: vec![Expression::tuple_element(2, 1)],
        }),
    };
    let mut unit = unit_with(vec![(r, 3), (s, 1)], op);
    let config = PipelineConfig {
        hoist_conditions: false,
        make_index: false,
        choice_conversion: false,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(config).run(&mut unit).unwrap();
    assert!(!report.passes[0].changed);
    assert!(matches!(unit.program.main, Statement::Query(Operation::IndexScan { .. })));
}

/// S5 (choice): a scan immediately filtered, with no `Break` in its body,
/// becomes a `Choice`.
#[test]
fn s5_choice_conversion() {
    init_logging();
    let r = RelationId(0);
    let s = RelationId(1);
    let op = Operation::Scan {
        relation: r,
        level: 1,
        body: Box::new(Operation::Filter {
            cond: Condition::eq(Expression::tuple_element(1, 0), Expression::constant(7)),
            body: Box::new(Operation::Project {
                relation: s,
                args: vec![Expression::tuple_element(1, 1)],
            }),
        }),
    };
    let mut unit = unit_with(vec![(r, 3), (s, 3)], op);
    let config = PipelineConfig {
        hoist_conditions: false,
        make_index: false,
        if_conversion: false,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(config).run(&mut unit).unwrap();
    assert!(report.passes[0].changed);
    match &unit.program.main {
        Statement::Query(Operation::Choice { relation, level, cond, body }) => {
            assert_eq!(*relation, r);
            assert_eq!(*level, 1);
            assert_eq!(*cond, Condition::eq(Expression::tuple_element(1, 0), Expression::constant(7)));
            assert!(matches!(**body, Operation::Project { .. }));
        }
        other => panic!("expected a Choice, got {other:?}"),
    }
}

/// S6 (residual filter): of two filters immediately inside a scan body, only
/// the first fills an index slot; the second survives as a residual filter.
#[test]
fn s6_make_index_leaves_residual_filter() {
    init_logging();
    let r = RelationId(0);
    let s = RelationId(1);
    let op = Operation::Scan {
        relation: r,
        level: 0,
        body: Box::new(Operation::Filter {
            cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(5)),
            body: Box::new(Operation::Filter {
                cond: Condition::Constraint {
                    op: ram_ir::CmpOp::Gt,
                    lhs: Expression::tuple_element(0, 1),
                    rhs: Expression::tuple_element(0, 0),
                },
                body: Box::new(Operation::Project {
                    relation: s,
                    args: vec![],
                }),
            }),
        }),
    };
    let mut unit = unit_with(vec![(r, 3), (s, 0)], op);
    let config = PipelineConfig {
        hoist_conditions: false,
        if_conversion: false,
        choice_conversion: false,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(config).run(&mut unit).unwrap();
    assert!(report.passes[0].changed);
    match &unit.program.main {
        Statement::Query(Operation::IndexScan { pattern, body, .. }) => {
            assert_eq!(pattern[0], Expression::constant(5));
            assert!(matches!(pattern[1], Expression::UndefValue));
            match body.as_ref() {
                Operation::Filter { cond, body } => {
                    assert!(matches!(
                        cond,
                        Condition::Constraint { op: ram_ir::CmpOp::Gt, .. }
                    ));
                    assert!(matches!(**body, Operation::Project { .. }));
                }
                other => panic!("expected the Gt condition to survive as a residual filter, got {other:?}"),
            }
        }
        other => panic!("expected an IndexScan, got {other:?}"),
    }
}
