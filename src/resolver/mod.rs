//=====================================================
// File: resolver.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Symbol resolution for the TinyScript backend
// Objective: Track declared names, types, and lexical scope with an explicit
//            scope stack; innermost-to-outermost lookup with shadowing
//=====================================================

use std::collections::HashMap;

use crate::ast::Position;
use crate::error::SemanticError;
use crate::value::Type;

/// Symbol table entry owned by the scope that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub depth: usize,
    pub order: usize,
}

/// Stack of lexical scopes. Push/pop are the only mutation points; a scope
/// and its symbols are discarded on exit.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
    declared: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            declared: 0,
        }
    }

    /// Depth of the innermost scope; the root scope is depth 0.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot exit the root scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare `name` in the innermost scope. Fails if the same scope already
    /// holds a declaration for it; shadowing an outer scope is permitted.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        ty: Type,
        position: Option<Position>,
    ) -> Result<&Symbol, SemanticError> {
        let name = name.into();
        let depth = self.depth();
        let scope = self
            .scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("scope stack is never empty"));
        if scope.contains_key(&name) {
            return Err(SemanticError::Redeclaration { name, position });
        }
        let symbol = Symbol {
            name: name.clone(),
            ty,
            depth,
            order: self.declared,
        };
        self.declared += 1;
        Ok(scope.entry(name).or_insert(symbol))
    }

    /// Search scopes innermost-to-outermost and return the first match.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Like [`lookup`](Self::lookup), but fails with an undeclared-identifier
    /// error carrying the use-site position.
    pub fn resolve(
        &self,
        name: &str,
        position: Option<&Position>,
    ) -> Result<&Symbol, SemanticError> {
        self.lookup(name)
            .ok_or_else(|| SemanticError::UndeclaredIdentifier {
                name: name.to_string(),
                position: position.copied(),
            })
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

//=====================================================
// End of file
//=====================================================
