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

//! [`TranslationUnit`]: owns the program tree, the symbol table, a
//! diagnostics sink, and the analysis cache that transformers invalidate.

use crate::statement::Program;
use crate::symtab::SymbolTable;
use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;

/// Internal consistency violations: a broken invariant from the data model,
/// never a recoverable condition from well-formed input.
#[derive(Error, Debug, PartialEq)]
pub enum RamError {
    #[error("unsplit conjunction found directly inside a filter: {0}")]
    UnsplitConjunction(String),
    #[error("index pattern for relation {relation:?} has {got} slots, expected arity {expected}")]
    PatternArityMismatch {
        relation: crate::symtab::RelationId,
        got: usize,
        expected: usize,
    },
    #[error("reference to unknown relation {0:?}")]
    UnknownRelation(crate::symtab::RelationId),
    #[error("dangling tuple reference to level {0}")]
    DanglingTupleReference(u32),
}

/// Memoizes analysis results keyed by the address of the node that was
/// analyzed. This is sound only because results are never read across a
/// mutation: every mutating transformer calls [`TranslationUnit::invalidate_analyses`]
/// before the cache could observe a moved or freed node, and analyses are
/// pure functions of the current tree. This mirrors the Soufflé C++
/// implementation's `mutable std::map<const Node*, int>` caches, adapted to
/// Rust's ownership model: the pointer is a snapshot identity, not a
/// retained reference.
#[derive(Default)]
pub struct AnalysisCache {
    condition_level: RefCell<HashMap<usize, i32>>,
    expression_level: RefCell<HashMap<usize, i32>>,
    const_value: RefCell<HashMap<usize, bool>>,
}

impl AnalysisCache {
    pub fn get_or_compute_condition_level(&self, key: usize, compute: impl FnOnce() -> i32) -> i32 {
        if let Some(&v) = self.condition_level.borrow().get(&key) {
            return v;
        }
        let v = compute();
        self.condition_level.borrow_mut().insert(key, v);
        v
    }

    pub fn get_or_compute_expression_level(&self, key: usize, compute: impl FnOnce() -> i32) -> i32 {
        if let Some(&v) = self.expression_level.borrow().get(&key) {
            return v;
        }
        let v = compute();
        self.expression_level.borrow_mut().insert(key, v);
        v
    }

    pub fn get_or_compute_const_value(&self, key: usize, compute: impl FnOnce() -> bool) -> bool {
        if let Some(&v) = self.const_value.borrow().get(&key) {
            return v;
        }
        let v = compute();
        self.const_value.borrow_mut().insert(key, v);
        v
    }

    fn clear(&self) {
        self.condition_level.borrow_mut().clear();
        self.expression_level.borrow_mut().clear();
        self.const_value.borrow_mut().clear();
    }
}

/// Owns the `Program`, the symbol table, and the analysis cache for one
/// compilation. Transformers borrow it mutably to rewrite the program and
/// must invalidate the cache on any positive "changed" return.
pub struct TranslationUnit {
    pub program: Program,
    pub symtab: SymbolTable,
    cache: AnalysisCache,
    diagnostics: Vec<String>,
}

impl TranslationUnit {
    pub fn new(program: Program, symtab: SymbolTable) -> Self {
        Self {
            program,
            symtab,
            cache: AnalysisCache::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn analysis_cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Clears all cached analysis results. Called by the pass manager after
    /// any transformer reports `changed == true`; the simplest sound
    /// invalidation policy, per the translation unit's contract.
    pub fn invalidate_analyses(&mut self) {
        log::trace!("invalidating analysis cache");
        self.cache.clear();
    }

    pub fn report(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{message}");
        self.diagnostics.push(message);
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Statement;

    #[test]
    fn invalidate_analyses_clears_cache() {
        let unit = TranslationUnit::new(
            Program::new(vec![], Statement::Sequence(vec![])),
            SymbolTable::new(),
        );
        let key = 42usize;
        let v = unit
            .analysis_cache()
            .get_or_compute_condition_level(key, || 7);
        assert_eq!(v, 7);
        let v2 = unit
            .analysis_cache()
            .get_or_compute_condition_level(key, || panic!("should be cached"));
        assert_eq!(v2, 7);

        let mut unit = unit;
        unit.invalidate_analyses();
        let v3 = unit
            .analysis_cache()
            .get_or_compute_condition_level(key, || 9);
        assert_eq!(v3, 9);
    }
}
