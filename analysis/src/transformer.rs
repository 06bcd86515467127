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

//! The transformer contract the pass manager drives, plus a debug-reporting
//! decorator that snapshots the program around an inner pass.

use ram_ir::{pretty, TranslationUnit};

/// One rewrite pass over a `TranslationUnit`. `transform` returns whether it
/// changed the program; the pass manager uses that both for logging and to
/// decide whether to invalidate the analysis cache.
pub trait Transformer {
    fn name(&self) -> &'static str;
    fn transform(&self, unit: &mut TranslationUnit) -> bool;
}

/// Wraps an inner transformer, capturing a canonical text snapshot of the
/// program immediately before and after it runs when `enabled`. The snapshot
/// itself is only ever logged, never retained, since it exists purely for
/// diagnostic output.
pub struct DebugReport<T> {
    inner: T,
    enabled: bool,
}

impl<T: Transformer> DebugReport<T> {
    pub fn new(inner: T, enabled: bool) -> Self {
        Self { inner, enabled }
    }
}

impl<T: Transformer> Transformer for DebugReport<T> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn transform(&self, unit: &mut TranslationUnit) -> bool {
        let before = self.enabled.then(|| pretty::render_program(&unit.program));
        let changed = self.inner.transform(unit);
        if let Some(before) = before {
            let after = pretty::render_program(&unit.program);
            log::debug!("{}: before\n{before}", self.inner.name());
            log::debug!("{}: after\n{after}", self.inner.name());
        }
        log::debug!(
            "{}: {}",
            self.inner.name(),
            if changed { "changed" } else { "no change" }
        );
        changed
    }
}
