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

//! A minimal stand-in for Soufflé's symbol table.
//!
//! The full symbol table and the runtime tuple/index representation belong
//! to the executor, which is out of scope here. The one fact the passes
//! actually need is a relation's arity, used by [`MakeIndex`] to build a
//! pattern of the right length and to check the pattern-arity invariant.
//!
//! [`MakeIndex`]: https://docs.rs/ram-analysis

use crate::Interner;
use fxhash::FxHashMap;

/// Identifies a relation by its interned name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(pub u32);

/// Relation-arity lookup, keyed by interned relation name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Interner,
    arities: FxHashMap<RelationId, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a relation with the given arity, interning its name.
    pub fn declare_relation(&mut self, name: impl Into<String>, arity: usize) -> RelationId {
        let id = RelationId(self.names.intern(name));
        self.arities.insert(id, arity);
        id
    }

    pub fn relation_id(&self, name: &str) -> Option<RelationId> {
        self.names.lookup(name).map(RelationId)
    }

    pub fn relation_name(&self, id: RelationId) -> &str {
        self.names.resolve(id.0)
    }

    /// Returns the arity of `relation`, or `None` if it was never declared.
    pub fn arity(&self, relation: RelationId) -> Option<usize> {
        self.arities.get(&relation).copied()
    }
}
