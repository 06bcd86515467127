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

//! Consistency checks run at the pipeline's fallible entry point. Everything
//! here should hold by construction for a well-formed program; a failure
//! means the input handed to the pipeline was not, which is reported through
//! [`RamError`] rather than discovered as a panic partway through a pass.

use ram_ir::{Condition, Expression, Operation, Program, RamError, RelationId, SymbolTable};

pub fn validate(program: &Program, symtab: &SymbolTable) -> Result<(), RamError> {
    for &relation in &program.relations {
        check_relation(relation, symtab)?;
    }
    let mut result = Ok(());
    program.for_each_query(|op| {
        if result.is_ok() {
            result = validate_operation(op, symtab, &mut Vec::new());
        }
    });
    result
}

/// `bound_levels` holds the tuple levels bound by this operation and every
/// enclosing one, so a `TupleElement` anywhere in its fields can be checked
/// against the levels actually in scope at that point (the level discipline
/// invariant from the data model).
fn validate_operation(op: &Operation, symtab: &SymbolTable, bound_levels: &mut Vec<u32>) -> Result<(), RamError> {
    let own_level = op.binding_level();
    if let Some(level) = own_level {
        bound_levels.push(level);
    }
    let result = validate_operation_fields(op, symtab, bound_levels).and_then(|()| match op.body() {
        Some(body) => validate_operation(body, symtab, bound_levels),
        None => Ok(()),
    });
    if own_level.is_some() {
        bound_levels.pop();
    }
    result
}

fn validate_operation_fields(op: &Operation, symtab: &SymbolTable, bound_levels: &[u32]) -> Result<(), RamError> {
    match op {
        Operation::Scan { relation, .. } => check_relation(*relation, symtab),
        Operation::IndexScan { relation, pattern, .. } => {
            check_relation(*relation, symtab)?;
            check_pattern_arity(*relation, pattern.len(), symtab)?;
            check_expr_levels_all(pattern, bound_levels)
        }
        Operation::Choice { relation, cond, .. } => {
            check_relation(*relation, symtab)?;
            validate_condition(cond, symtab, bound_levels)
        }
        Operation::IndexChoice {
            relation,
            pattern,
            cond,
            ..
        } => {
            check_relation(*relation, symtab)?;
            check_pattern_arity(*relation, pattern.len(), symtab)?;
            check_expr_levels_all(pattern, bound_levels)?;
            validate_condition(cond, symtab, bound_levels)
        }
        Operation::Aggregate { relation, cond, expr, .. } => {
            check_relation(*relation, symtab)?;
            validate_condition(cond, symtab, bound_levels)?;
            check_expr_levels(expr, bound_levels)
        }
        Operation::IndexAggregate {
            relation,
            pattern,
            cond,
            expr,
            ..
        } => {
            check_relation(*relation, symtab)?;
            check_pattern_arity(*relation, pattern.len(), symtab)?;
            check_expr_levels_all(pattern, bound_levels)?;
            validate_condition(cond, symtab, bound_levels)?;
            check_expr_levels(expr, bound_levels)
        }
        Operation::Filter { cond, .. } | Operation::Break { cond, .. } => {
            if matches!(cond, Condition::Conjunction(_, _)) {
                return Err(RamError::UnsplitConjunction(cond.to_string()));
            }
            validate_condition(cond, symtab, bound_levels)
        }
        Operation::Project { relation, args } => {
            check_relation(*relation, symtab)?;
            check_expr_levels_all(args, bound_levels)
        }
        Operation::SubroutineReturn { args } => check_expr_levels_all(args, bound_levels),
    }
}

fn validate_condition(cond: &Condition, symtab: &SymbolTable, bound_levels: &[u32]) -> Result<(), RamError> {
    match cond {
        Condition::ExistenceCheck { relation, pattern } | Condition::ProvenanceExistenceCheck { relation, pattern } => {
            check_relation(*relation, symtab)?;
            check_pattern_arity(*relation, pattern.len(), symtab)?;
            check_expr_levels_all(pattern, bound_levels)?;
        }
        Condition::EmptinessCheck { relation } => check_relation(*relation, symtab)?,
        Condition::Constraint { lhs, rhs, .. } => {
            check_expr_levels(lhs, bound_levels)?;
            check_expr_levels(rhs, bound_levels)?;
        }
        Condition::Conjunction(a, b) => {
            validate_condition(a, symtab, bound_levels)?;
            validate_condition(b, symtab, bound_levels)?;
        }
        Condition::Negation(c) => validate_condition(c, symtab, bound_levels)?,
    }
    Ok(())
}

fn check_expr_levels_all(exprs: &[Expression], bound_levels: &[u32]) -> Result<(), RamError> {
    for e in exprs {
        check_expr_levels(e, bound_levels)?;
    }
    Ok(())
}

/// Rejects a `TupleElement` whose level is not among `bound_levels`: a
/// reference to a tuple that no enclosing `Scan`/`IndexScan`/`Choice`/
/// `IndexChoice`/`Aggregate`/`IndexAggregate` actually bound.
fn check_expr_levels(expr: &Expression, bound_levels: &[u32]) -> Result<(), RamError> {
    if let Expression::TupleElement { level, .. } = expr {
        if !bound_levels.contains(level) {
            return Err(RamError::DanglingTupleReference(*level));
        }
    }
    let mut result = Ok(());
    expr.for_each_child(|child| {
        if result.is_ok() {
            result = check_expr_levels(child, bound_levels);
        }
    });
    result
}

fn check_relation(relation: RelationId, symtab: &SymbolTable) -> Result<(), RamError> {
    if symtab.arity(relation).is_some() {
        Ok(())
    } else {
        Err(RamError::UnknownRelation(relation))
    }
}

fn check_pattern_arity(relation: RelationId, got: usize, symtab: &SymbolTable) -> Result<(), RamError> {
    let expected = symtab.arity(relation).ok_or(RamError::UnknownRelation(relation))?;
    if got == expected {
        Ok(())
    } else {
        Err(RamError::PatternArityMismatch {
            relation,
            got,
            expected,
        })
    }
}
