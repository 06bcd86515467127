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

//! Whether an expression's value is fixed independently of any tuple
//! binding and of evaluation order: the property `MakeIndex` needs before
//! it can lift an expression into an index pattern that may be evaluated
//! once per outer tuple instead of per inner tuple.

use crate::expression_level::ExpressionLevelAnalysis;
use ram_ir::{AnalysisCache, Expression};

pub struct ConstValueAnalysis;

impl ConstValueAnalysis {
    /// True if `e` has no tuple dependency (`L(e) == -1`) and contains
    /// no `AutoIncrement`, `SubroutineArg`, or `UserDefinedOp`. All three
    /// either carry side effects or depend on evaluation order, and so
    /// cannot be freely duplicated or reordered even though they are
    /// level-independent.
    pub fn is_const(cache: &AnalysisCache, expr: &Expression) -> bool {
        let key = expr as *const Expression as usize;
        cache.get_or_compute_const_value(key, || Self::compute(cache, expr))
    }

    fn compute(cache: &AnalysisCache, expr: &Expression) -> bool {
        if ExpressionLevelAnalysis::level_of(cache, expr) != -1 {
            return false;
        }
        match expr {
            Expression::AutoIncrement | Expression::SubroutineArg(_) | Expression::UserDefinedOp { .. } => false,
            Expression::Constant(_) | Expression::UndefValue => true,
            Expression::TupleElement { .. } => false,
            Expression::IntrinsicOp { args, .. } | Expression::PackRecord { args } => {
                args.iter().all(|a| Self::is_const(cache, a))
            }
        }
    }
}
