//=====================================================
// File: builder.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: AST to three-address code lowering
// Objective: Lower type-checked statements to flat TAC with fresh
//            temporaries and symbolic labels, in source order
//=====================================================

use tracing::debug;

use crate::analyzer::Analysis;
use crate::ast::{Expr, Program, Stmt};
use crate::tac::{LabelId, Operand, Place, TacInstruction, TempId};
use crate::value::Type;

/// Lower a type-checked program to TAC. The analysis side table backs the
/// lowering-time invariant that every branch condition typed to bool.
pub fn lower(program: &Program, analysis: &Analysis) -> Vec<TacInstruction> {
    let mut builder = TacBuilder::new(analysis);
    for stmt in &program.statements {
        builder.lower_stmt(stmt);
    }
    debug!(instructions = builder.instructions.len(), "lowered program to TAC");
    builder.instructions
}

struct TacBuilder<'a> {
    analysis: &'a Analysis,
    instructions: Vec<TacInstruction>,
    next_temp: u32,
    next_label: u32,
}

impl<'a> TacBuilder<'a> {
    fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            instructions: Vec::new(),
            next_temp: 0,
            next_label: 0,
        }
    }

    fn fresh_temp(&mut self) -> TempId {
        let temp = TempId(self.next_temp);
        self.next_temp += 1;
        temp
    }

    fn fresh_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        label
    }

    fn emit(&mut self, instruction: TacInstruction) {
        self.instructions.push(instruction);
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { name, value, .. } | Stmt::Assign { name, value, .. } => {
                let src = self.lower_expr(value);
                self.emit(TacInstruction::Copy {
                    dst: Place::Var(name.clone()),
                    src,
                });
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                debug_assert_eq!(
                    self.analysis.type_of(condition.node_id()),
                    Some(Type::Bool),
                    "if condition must have typed to bool"
                );
                let cond = self.lower_expr(condition);
                let else_label = self.fresh_label();
                let end_label = self.fresh_label();
                self.emit(TacInstruction::JumpIfFalse {
                    condition: cond,
                    target: else_label,
                });
                self.lower_block(then_block);
                self.emit(TacInstruction::Jump(end_label));
                self.emit(TacInstruction::Label(else_label));
                self.lower_block(else_block);
                self.emit(TacInstruction::Label(end_label));
            }
            Stmt::While {
                condition, body, ..
            } => {
                debug_assert_eq!(
                    self.analysis.type_of(condition.node_id()),
                    Some(Type::Bool),
                    "while condition must have typed to bool"
                );
                let start_label = self.fresh_label();
                let end_label = self.fresh_label();
                self.emit(TacInstruction::Label(start_label));
                let cond = self.lower_expr(condition);
                self.emit(TacInstruction::JumpIfFalse {
                    condition: cond,
                    target: end_label,
                });
                self.lower_block(body);
                self.emit(TacInstruction::Jump(start_label));
                self.emit(TacInstruction::Label(end_label));
            }
            Stmt::Print { value, .. } => {
                let operand = self.lower_expr(value);
                self.emit(TacInstruction::Print { value: operand });
            }
            Stmt::Block { statements, .. } => self.lower_block(statements),
        }
    }

    fn lower_block(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.lower_stmt(stmt);
        }
    }

    /// Lower an expression post-order and return the operand holding its
    /// value. Literals and identifiers are operands themselves; every
    /// operator application lands in a fresh temporary.
    fn lower_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Literal { value, .. } => Operand::Const(*value),
            Expr::Identifier { name, .. } => Operand::Var(name.clone()),
            Expr::Binary {
                op, left, right, ..
            } => {
                let lhs = self.lower_expr(left);
                let rhs = self.lower_expr(right);
                let dst = self.fresh_temp();
                self.emit(TacInstruction::Binary {
                    dst,
                    op: *op,
                    lhs,
                    rhs,
                });
                Operand::Temp(dst)
            }
            Expr::Unary { op, operand, .. } => {
                let operand = self.lower_expr(operand);
                let dst = self.fresh_temp();
                self.emit(TacInstruction::Unary {
                    dst,
                    op: *op,
                    operand,
                });
                Operand::Temp(dst)
            }
        }
    }
}

//=====================================================
// End of file
//=====================================================
