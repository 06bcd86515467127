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

//! Collapses a `Scan`/`IndexScan` immediately followed by a single `Filter`
//! into a `Choice`/`IndexChoice`: the executor can stop scanning at the
//! first tuple that satisfies the condition instead of visiting every tuple
//! and filtering afterwards. Unsound if the loop body can `Break`, since a
//! `Choice` only ever evaluates its body for the first match.

use crate::transformer::Transformer;
use ram_ir::{Operation, TranslationUnit};

pub struct ChoiceConversionTransformer;

impl Transformer for ChoiceConversionTransformer {
    fn name(&self) -> &'static str {
        "ChoiceConversion"
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
        Operation::Scan { relation, level, body } => match *body {
            Operation::Filter { cond, body: inner } if !inner.contains_break() => {
                debug_assert!(
                    cond.references_level(level),
                    "ChoiceConversion: filter directly under SCAN t{level} doesn't reference t{level}; \
                     HoistConditions should already have lifted it above the scan"
                );
                *changed = true;
                let inner = rewrite(*inner, changed);
                Operation::Choice {
                    relation,
                    level,
                    cond,
                    body: Box::new(inner),
                }
            }
            other => {
                let other = rewrite(other, changed);
                Operation::Scan {
                    relation,
                    level,
                    body: Box::new(other),
                }
            }
        },
        Operation::IndexScan {
            relation,
            level,
            pattern,
            body,
        } => match *body {
            Operation::Filter { cond, body: inner } if !inner.contains_break() => {
                debug_assert!(
                    cond.references_level(level),
                    "ChoiceConversion: filter directly under INDEX SCAN t{level} doesn't reference t{level}; \
                     HoistConditions should already have lifted it above the scan"
                );
                *changed = true;
                let inner = rewrite(*inner, changed);
                Operation::IndexChoice {
                    relation,
                    level,
                    pattern,
                    cond,
                    body: Box::new(inner),
                }
            }
            other => {
                let other = rewrite(other, changed);
                Operation::IndexScan {
                    relation,
                    level,
                    pattern,
                    body: Box::new(other),
                }
            }
        },
        other => other.map_body(|body| rewrite(body, changed)),
    }
}
