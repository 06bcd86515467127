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

//! Canonical textual serialization of the RAM IR for debug reporting.
//!
//! This is the one node-per-line, indentation-encodes-nesting format used
//! by the debug-report decorator to snapshot the program before and after
//! each pass. It is a thin wrapper over the `Display` impls in [`crate::operation`]
//! and [`crate::statement`], which already produce this format.

use crate::statement::Program;

/// Renders a program to its canonical S-expression-like text form.
pub fn render_program(program: &Program) -> String {
    format!(
        "PROGRAM ({})\n{}",
        program
            .relations
            .iter()
            .map(|r| format!("R{}", r.0))
            .collect::<Vec<_>>()
            .join(", "),
        program.main
    )
}
