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

//! Top-level control flow and the `Program` container.

use crate::condition::Condition;
use crate::operation::Operation;
use crate::symtab::RelationId;

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Query(Operation),
    Sequence(Vec<Statement>),
    Parallel(Vec<Statement>),
    Loop(Box<Statement>),
    Exit(Condition),
    /// Insert all tuples of `source` into `target`.
    Insert { target: RelationId, source: RelationId },
    /// Merge `source` into `target` (used to fold deltas into the full relation).
    Merge { target: RelationId, source: RelationId },
    /// Swap the underlying storage of two relations.
    Swap { first: RelationId, second: RelationId },
    Clear { relation: RelationId },
    IO {
        relation: RelationId,
        directives: Vec<(String, String)>,
    },
    LogSize {
        relation: RelationId,
        message: String,
    },
    DebugInfo {
        message: String,
        body: Box<Statement>,
    },
    Program {
        relations: Vec<RelationId>,
        main: Box<Statement>,
    },
}

impl Statement {
    /// Applies `f` to every direct `Operation` reachable through a `Query`
    /// in this statement (recursing through `Sequence`/`Parallel`/`Loop`/
    /// `DebugInfo`/`Program`, but not descending into the operation tree
    /// itself; callers that need that use `Operation`'s own walkers).
    pub fn for_each_query_mut(&mut self, f: &mut impl FnMut(&mut Operation)) {
        match self {
            Statement::Query(op) => f(op),
            Statement::Sequence(stmts) | Statement::Parallel(stmts) => {
                for s in stmts {
                    s.for_each_query_mut(f);
                }
            }
            Statement::Loop(body) | Statement::DebugInfo { body, .. } => {
                body.for_each_query_mut(f)
            }
            Statement::Program { main, .. } => main.for_each_query_mut(f),
            Statement::Exit(_)
            | Statement::Insert { .. }
            | Statement::Merge { .. }
            | Statement::Swap { .. }
            | Statement::Clear { .. }
            | Statement::IO { .. }
            | Statement::LogSize { .. } => {}
        }
    }

    /// Read-only counterpart of [`Statement::for_each_query_mut`], used by
    /// consistency checks that only need to inspect the tree.
    pub fn for_each_query(&self, f: &mut impl FnMut(&Operation)) {
        match self {
            Statement::Query(op) => f(op),
            Statement::Sequence(stmts) | Statement::Parallel(stmts) => {
                for s in stmts {
                    s.for_each_query(f);
                }
            }
            Statement::Loop(body) | Statement::DebugInfo { body, .. } => body.for_each_query(f),
            Statement::Program { main, .. } => main.for_each_query(f),
            Statement::Exit(_)
            | Statement::Insert { .. }
            | Statement::Merge { .. }
            | Statement::Swap { .. }
            | Statement::Clear { .. }
            | Statement::IO { .. }
            | Statement::LogSize { .. } => {}
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Query(op) => write!(f, "{op}"),
            Statement::Sequence(stmts) => {
                for s in stmts {
                    write!(f, "{s}")?;
                }
                Ok(())
            }
            Statement::Parallel(stmts) => {
                writeln!(f, "PARALLEL")?;
                for s in stmts {
                    write!(f, "{s}")?;
                }
                Ok(())
            }
            Statement::Loop(body) => {
                writeln!(f, "LOOP")?;
                write!(f, "{body}")
            }
            Statement::Exit(cond) => writeln!(f, "EXIT {cond}"),
            Statement::Insert { target, source } => {
                writeln!(f, "INSERT R{} INTO R{}", source.0, target.0)
            }
            Statement::Merge { target, source } => {
                writeln!(f, "MERGE R{} INTO R{}", source.0, target.0)
            }
            Statement::Swap { first, second } => writeln!(f, "SWAP R{} R{}", first.0, second.0),
            Statement::Clear { relation } => writeln!(f, "CLEAR R{}", relation.0),
            Statement::IO { relation, directives } => {
                writeln!(f, "IO R{} {:?}", relation.0, directives)
            }
            Statement::LogSize { relation, message } => {
                writeln!(f, "LOGSIZE R{} {message:?}", relation.0)
            }
            Statement::DebugInfo { message, body } => {
                writeln!(f, "DEBUG {message:?}")?;
                write!(f, "{body}")
            }
            Statement::Program { relations, main } => {
                writeln!(
                    f,
                    "PROGRAM ({})",
                    relations.iter().map(|r| format!("R{}", r.0)).collect::<Vec<_>>().join(", ")
                )?;
                write!(f, "{main}")
            }
        }
    }
}

/// The program tree owned by a [`crate::TranslationUnit`]: a top-level
/// `Program` statement plus the set of declared relations.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub relations: Vec<RelationId>,
    pub main: Statement,
}

impl Program {
    pub fn new(relations: Vec<RelationId>, main: Statement) -> Self {
        Self { relations, main }
    }

    /// Applies `f` to every top-level `Query` operation in program order.
    pub fn for_each_query_mut(&mut self, mut f: impl FnMut(&mut Operation)) {
        self.main.for_each_query_mut(&mut f);
    }

    /// Read-only counterpart of [`Program::for_each_query_mut`].
    pub fn for_each_query(&self, mut f: impl FnMut(&Operation)) {
        self.main.for_each_query(&mut f);
    }
}
