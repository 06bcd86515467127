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

//! The RAM optimization pipeline driver.
//!
//! This crate wires `ram-analysis`'s four passes into the fixed order their
//! normal-form contract requires, and validates the program's internal
//! consistency before and after running them.
//!
//! # Key Responsibilities
//!
//! * **Configuration**: [`PipelineConfig`] controls which passes run and
//!   whether the debug-report decorator captures before/after snapshots.
//! * **Validation**: [`Pipeline::run`] rejects a program with a broken
//!   invariant (unknown relation, wrong pattern arity) before any pass
//!   touches it.
//! * **Execution**: runs `HoistConditions`, `MakeIndex`, `IfConversion`, and
//!   `ChoiceConversion` in sequence, logging each pass's name and whether it
//!   changed the program.
//!
//! # Example
//!
//! ```no_run
//! use ram_driver::{Pipeline, PipelineConfig};
//! use ram_ir::{Operation, Program, Statement, SymbolTable, TranslationUnit};
//!
//! let mut symtab = SymbolTable::new();
//! let edge = symtab.declare_relation("edge", 2);
//! let program = Program::new(
//!     vec![edge],
//!     Statement::Query(Operation::Project { relation: edge, args: vec![] }),
//! );
//! let mut unit = TranslationUnit::new(program, symtab);
//!
//! let report = Pipeline::new(PipelineConfig::default()).run(&mut unit).expect("consistent program");
//! println!("{} passes changed the program", report.changed_count());
//! ```

mod pipeline;
mod validate;

pub use pipeline::{PassOutcome, Pipeline, PipelineConfig, PipelineReport};

/// Convenience wrapper around [`Pipeline::run`] for callers that don't need
/// to match on the specific [`ram_ir::RamError`] variant.
pub fn run(unit: &mut ram_ir::TranslationUnit, config: PipelineConfig) -> anyhow::Result<PipelineReport> {
    Ok(Pipeline::new(config).run(unit)?)
}
