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

//! The RAM (Relational Algebra Machine) intermediate representation.
//!
//! This is a tagged tree, not a flat/indexed IR: every node owns its
//! children exclusively (`Box`), and a transformer rewrites the tree by
//! taking ownership of an old child and installing a new one in its place.
//! Structural sharing is forbidden so that analysis-cache invalidation stays
//! simple.
//!
//! # Layers
//!
//! * [`expr`]: pure value-producing [`Expression`] nodes.
//! * [`condition`]: boolean-producing [`Condition`] nodes.
//! * [`operation`]: tuple-binding [`Operation`] nodes nested inside a query.
//! * [`statement`]: top-level control flow and the [`Program`] container.
//! * [`symtab`]: the minimal relation-arity lookup the passes need.
//! * [`unit`]: [`TranslationUnit`], the owner of a `Program`, a symbol
//!   table, diagnostics, and the analysis cache.

pub mod condition;
pub mod expr;
pub mod operation;
pub mod pretty;
pub mod statement;
pub mod symtab;
pub mod unit;

pub use condition::{CmpOp, Condition};
pub use expr::{Constant, Expression, IntrinsicOp};
pub use operation::{AggregateOp, Operation};
pub use statement::{Program, Statement};
pub use symtab::{RelationId, SymbolTable};
pub use unit::{AnalysisCache, RamError, TranslationUnit};

use fxhash::FxHashMap;

/// A simple interner for relation and string names, following the
/// `matklad.github.io` fast-simple-interner pattern.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, u32>,
    vec: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: impl Into<String>) -> u32 {
        let name = name.into();
        if let Some(&id) = self.map.get(&name) {
            return id;
        }
        let id = self.vec.len() as u32;
        self.vec.push(name.clone());
        self.map.insert(name, id);
        id
    }

    pub fn resolve(&self, id: u32) -> &str {
        &self.vec[id as usize]
    }

    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.map.get(name).copied()
    }
}
