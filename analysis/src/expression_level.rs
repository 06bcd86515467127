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

//! For each `Expression`, the minimum tuple-nesting level at which it is
//! well-scoped.

use ram_ir::{AnalysisCache, Expression};

pub struct ExpressionLevelAnalysis;

impl ExpressionLevelAnalysis {
    /// `L(e)`: -1 if `e` reads no tuple binding, otherwise the deepest level
    /// any `TupleElement` reachable from `e` names.
    pub fn level_of(cache: &AnalysisCache, expr: &Expression) -> i32 {
        let key = expr as *const Expression as usize;
        cache.get_or_compute_expression_level(key, || Self::compute(cache, expr))
    }

    fn compute(cache: &AnalysisCache, expr: &Expression) -> i32 {
        match expr {
            Expression::TupleElement { level, .. } => *level as i32,
            Expression::Constant(_)
            | Expression::AutoIncrement
            | Expression::SubroutineArg(_)
            | Expression::UndefValue => -1,
            Expression::IntrinsicOp { args, .. }
            | Expression::UserDefinedOp { args, .. }
            | Expression::PackRecord { args } => args
                .iter()
                .map(|a| Self::level_of(cache, a))
                .max()
                .unwrap_or(-1),
        }
    }
}
