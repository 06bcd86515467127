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

//! For each `Condition`, the minimum tuple-nesting level at which all of
//! its referenced tuple identifiers are in scope.

use crate::expression_level::ExpressionLevelAnalysis;
use ram_ir::{AnalysisCache, Condition};

pub struct ConditionLevelAnalysis;

impl ConditionLevelAnalysis {
    /// `L(c)`: -1 if `c` depends on no tuple binding, otherwise the deepest
    /// level any of its sub-expressions reference.
    pub fn level_of(cache: &AnalysisCache, cond: &Condition) -> i32 {
        let key = cond as *const Condition as usize;
        cache.get_or_compute_condition_level(key, || Self::compute(cache, cond))
    }

    fn compute(cache: &AnalysisCache, cond: &Condition) -> i32 {
        match cond {
            Condition::Conjunction(a, b) => Self::level_of(cache, a).max(Self::level_of(cache, b)),
            Condition::Negation(c) => Self::level_of(cache, c),
            Condition::Constraint { lhs, rhs, .. } => {
                ExpressionLevelAnalysis::level_of(cache, lhs)
                    .max(ExpressionLevelAnalysis::level_of(cache, rhs))
            }
            Condition::ExistenceCheck { pattern, .. }
            | Condition::ProvenanceExistenceCheck { pattern, .. } => pattern
                .iter()
                .map(|e| ExpressionLevelAnalysis::level_of(cache, e))
                .max()
                .unwrap_or(-1),
            Condition::EmptinessCheck { .. } => -1,
        }
    }
}
