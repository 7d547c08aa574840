//=====================================================
// File: analyzer.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: TinyScript semantic analysis
// Objective: Type-check statements and expressions in evaluation order and
//            record resolved expression types for the IR builder
//=====================================================

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{BinaryOp, Expr, NodeId, Program, Stmt, UnaryOp};
use crate::error::SemanticError;
use crate::resolver::SymbolTable;
use crate::value::Type;

/// Side table produced by analysis: resolved type per expression node.
#[derive(Debug, Default)]
pub struct Analysis {
    types: HashMap<NodeId, Type>,
}

impl Analysis {
    pub fn type_of(&self, node: NodeId) -> Option<Type> {
        self.types.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Analyze a program depth-first, failing fast on the first semantic error.
/// No code generation ever proceeds past a failure.
pub fn analyze(program: &Program) -> Result<Analysis, SemanticError> {
    let mut analyzer = Analyzer::new();
    for stmt in &program.statements {
        analyzer.check_stmt(stmt)?;
    }
    debug!(expressions = analyzer.types.len(), "semantic analysis finished");
    Ok(Analysis {
        types: analyzer.types,
    })
}

struct Analyzer {
    table: SymbolTable,
    types: HashMap<NodeId, Type>,
}

impl Analyzer {
    fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            types: HashMap::new(),
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::VarDecl {
                name,
                declared,
                value,
                position,
            } => {
                let value_ty = self.check_expr(value)?;
                if value_ty != *declared {
                    return Err(SemanticError::TypeMismatch {
                        message: format!(
                            "cannot assign {value_ty} to {declared} variable '{name}'"
                        ),
                        position: *position,
                    });
                }
                self.table.declare(name.clone(), *declared, *position)?;
                Ok(())
            }
            Stmt::Assign {
                name,
                value,
                position,
            } => {
                let target_ty = self.table.resolve(name, position.as_ref())?.ty;
                let value_ty = self.check_expr(value)?;
                if value_ty != target_ty {
                    return Err(SemanticError::TypeMismatch {
                        message: format!(
                            "cannot assign {value_ty} to {target_ty} variable '{name}'"
                        ),
                        position: *position,
                    });
                }
                Ok(())
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                position,
            } => {
                let cond_ty = self.check_expr(condition)?;
                if cond_ty != Type::Bool {
                    return Err(SemanticError::TypeMismatch {
                        message: format!("if condition must be bool, got {cond_ty}"),
                        position: *position,
                    });
                }
                self.check_block(then_block)?;
                self.check_block(else_block)
            }
            Stmt::While {
                condition,
                body,
                position,
            } => {
                let cond_ty = self.check_expr(condition)?;
                if cond_ty != Type::Bool {
                    return Err(SemanticError::TypeMismatch {
                        message: format!("while condition must be bool, got {cond_ty}"),
                        position: *position,
                    });
                }
                self.check_block(body)
            }
            Stmt::Print { value, .. } => {
                self.check_expr(value)?;
                Ok(())
            }
            Stmt::Block { statements, .. } => self.check_block(statements),
        }
    }

    fn check_block(&mut self, statements: &[Stmt]) -> Result<(), SemanticError> {
        self.table.enter_scope();
        let result = statements
            .iter()
            .try_for_each(|stmt| self.check_stmt(stmt));
        self.table.exit_scope();
        result
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        let ty = match expr {
            Expr::Literal { value, .. } => value.ty(),
            Expr::Identifier { name, position, .. } => {
                self.table.resolve(name, position.as_ref())?.ty
            }
            Expr::Binary {
                op,
                left,
                right,
                position,
                ..
            } => {
                let left_ty = self.check_expr(left)?;
                let right_ty = self.check_expr(right)?;
                self.check_binary(*op, left_ty, right_ty, position.as_ref())?
            }
            Expr::Unary {
                op,
                operand,
                position,
                ..
            } => {
                let operand_ty = self.check_expr(operand)?;
                match op {
                    UnaryOp::Negate if operand_ty == Type::Int => Type::Int,
                    UnaryOp::Not if operand_ty == Type::Bool => Type::Bool,
                    UnaryOp::Negate => {
                        return Err(SemanticError::TypeMismatch {
                            message: format!("unary '-' requires an int operand, got {operand_ty}"),
                            position: position.as_ref().copied(),
                        });
                    }
                    UnaryOp::Not => {
                        return Err(SemanticError::TypeMismatch {
                            message: format!("unary '!' requires a bool operand, got {operand_ty}"),
                            position: position.as_ref().copied(),
                        });
                    }
                }
            }
        };
        self.types.insert(expr.node_id(), ty);
        Ok(ty)
    }

    fn check_binary(
        &self,
        op: BinaryOp,
        left: Type,
        right: Type,
        position: Option<&crate::ast::Position>,
    ) -> Result<Type, SemanticError> {
        if op.is_arithmetic() {
            if left != Type::Int || right != Type::Int {
                return Err(SemanticError::TypeMismatch {
                    message: format!(
                        "arithmetic operator '{op}' requires int operands, got {left} and {right}"
                    ),
                    position: position.copied(),
                });
            }
            return Ok(Type::Int);
        }
        if op.is_comparison() {
            if left != right {
                return Err(SemanticError::TypeMismatch {
                    message: format!(
                        "comparison operator '{op}' requires matching operand types, got {left} and {right}"
                    ),
                    position: position.copied(),
                });
            }
            return Ok(Type::Bool);
        }
        debug_assert!(op.is_logical());
        if left != Type::Bool || right != Type::Bool {
            return Err(SemanticError::TypeMismatch {
                message: format!(
                    "logical operator '{op}' requires bool operands, got {left} and {right}"
                ),
                position: position.copied(),
            });
        }
        Ok(Type::Bool)
    }
}

//=====================================================
// End of file
//=====================================================
