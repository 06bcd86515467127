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

//! Analyses and optimization passes over the RAM IR.
//!
//! # Passes
//!
//! 1. **Condition/expression level** ([`ConditionLevelAnalysis`],
//!    [`ExpressionLevelAnalysis`]) and **const-value** ([`ConstValueAnalysis`])
//!    are the pure analyses the transformers below are built on.
//!
//! 2. **HoistConditions** ([`HoistConditionsTransformer`]) moves every filter
//!    to the shallowest point at which it is well-scoped.
//!
//! 3. **MakeIndex** ([`MakeIndexTransformer`]) turns eligible equality
//!    filters into an index pattern on the scan they guard.
//!
//! 4. **IfConversion** ([`IfConversionTransformer`]) drops an index scan down
//!    to a plain existence check when nothing downstream reads its tuple.
//!
//! 5. **ChoiceConversion** ([`ChoiceConversionTransformer`]) collapses a
//!    scan-then-filter into a short-circuiting choice.
//!
//! [`Transformer`] is the common contract the pass manager in `ram-driver`
//! drives; [`DebugReport`] decorates any transformer with before/after
//! snapshot logging.

mod condition_level;
pub use condition_level::ConditionLevelAnalysis;

mod expression_level;
pub use expression_level::ExpressionLevelAnalysis;

mod const_value;
pub use const_value::ConstValueAnalysis;

mod transformer;
pub use transformer::{DebugReport, Transformer};

mod hoist;
pub use hoist::HoistConditionsTransformer;

mod make_index;
pub use make_index::MakeIndexTransformer;

mod if_conversion;
pub use if_conversion::IfConversionTransformer;

mod choice_conversion;
pub use choice_conversion::ChoiceConversionTransformer;
