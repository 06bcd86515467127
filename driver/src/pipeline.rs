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

//! Wires the four optimization passes into the fixed order the normal-form
//! contract requires: `HoistConditions` → `MakeIndex` → `IfConversion` →
//! `ChoiceConversion`. Each pass depends on the normal form the previous one
//! produces, so the pipeline never reorders or skips ahead.

use crate::validate::validate;
use ram_analysis::{
    ChoiceConversionTransformer, DebugReport, HoistConditionsTransformer, IfConversionTransformer,
    MakeIndexTransformer, Transformer,
};
use ram_ir::{RamError, TranslationUnit};

/// Which passes run, and whether the debug-report decorator captures a
/// before/after snapshot of the program around each one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub hoist_conditions: bool,
    pub make_index: bool,
    pub if_conversion: bool,
    pub choice_conversion: bool,
    /// Off by default: each snapshot deep-copies the whole program.
    pub debug_snapshots: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hoist_conditions: true,
            make_index: true,
            if_conversion: true,
            choice_conversion: true,
            debug_snapshots: false,
        }
    }
}

/// Per-pass outcome, in the order the passes ran.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassOutcome {
    pub name: &'static str,
    pub changed: bool,
}

/// Result of one `Pipeline::run`: which passes ran and whether each changed
/// the program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub passes: Vec<PassOutcome>,
}

impl PipelineReport {
    pub fn changed_count(&self) -> usize {
        self.passes.iter().filter(|p| p.changed).count()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs the configured passes once, in fixed order, over `unit`.
    ///
    /// Validates the program's internal consistency first; a broken
    /// invariant is reported as `Err(RamError)` rather than discovered
    /// partway through a pass.
    pub fn run(&self, unit: &mut TranslationUnit) -> Result<PipelineReport, RamError> {
        validate(&unit.program, &unit.symtab)?;

        let mut report = PipelineReport::default();
        self.run_if_enabled(self.config.hoist_conditions, HoistConditionsTransformer, unit, &mut report);
        self.run_if_enabled(self.config.make_index, MakeIndexTransformer, unit, &mut report);
        self.run_if_enabled(self.config.if_conversion, IfConversionTransformer, unit, &mut report);
        self.run_if_enabled(self.config.choice_conversion, ChoiceConversionTransformer, unit, &mut report);

        validate(&unit.program, &unit.symtab)?;

        log::info!(
            "pipeline: {} of {} passes changed the program",
            report.changed_count(),
            report.passes.len()
        );
        Ok(report)
    }

    fn run_if_enabled<T: Transformer>(&self, enabled: bool, pass: T, unit: &mut TranslationUnit, report: &mut PipelineReport) {
        if !enabled {
            return;
        }
        let decorated = DebugReport::new(pass, self.config.debug_snapshots);
        let name = decorated.name();
        let changed = decorated.transform(unit);
        report.passes.push(PassOutcome { name, changed });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ram_ir::{Condition, Expression, Operation, Program, RelationId, Statement, SymbolTable};

    fn sample_unit() -> TranslationUnit {
        let mut symtab = SymbolTable::new();
        let r = symtab.declare_relation("edge", 2);
        let op = Operation::Scan {
            relation: r,
            level: 0,
            body: Box::new(Operation::Filter {
                cond: Condition::eq(Expression::tuple_element(0, 0), Expression::constant(1)),
                body: Box::new(Operation::Project {
                    relation: r,
                    args: vec![Expression::tuple_element(0, 1)],
                }),
            }),
        };
        TranslationUnit::new(Program::new(vec![r], Statement::Query(op)), symtab)
    }

    #[test]
    fn default_pipeline_runs_all_four_passes() {
        let mut unit = sample_unit();
        let report = Pipeline::new(PipelineConfig::default()).run(&mut unit).unwrap();
        assert_eq!(report.passes.len(), 4);
        assert_eq!(report.passes[0].name, "HoistConditions");
        assert_eq!(report.passes[3].name, "ChoiceConversion");
    }

    #[test]
    fn disabling_a_pass_skips_it() {
        let mut unit = sample_unit();
        let config = PipelineConfig {
            choice_conversion: false,
            ..PipelineConfig::default()
        };
        let report = Pipeline::new(config).run(&mut unit).unwrap();
        assert_eq!(report.passes.len(), 3);
        assert!(report.passes.iter().all(|p| p.name != "ChoiceConversion"));
    }

    #[test]
    fn run_rejects_program_with_unknown_relation() {
        let mut unit = TranslationUnit::new(
            Program::new(
                vec![RelationId(0)],
                Statement::Query(Operation::Project {
                    relation: RelationId(0),
                    args: vec![],
                }),
            ),
            SymbolTable::new(),
        );
        let err = Pipeline::new(PipelineConfig::default()).run(&mut unit).unwrap_err();
        assert_eq!(err, RamError::UnknownRelation(RelationId(0)));
    }
}
