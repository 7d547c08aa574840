//=====================================================
// File: emit.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: TAC to bytecode emission
// Objective: Translate optimized TAC to stack-machine instructions in two
//            passes: emit while recording label positions, then patch every
//            jump with its label's absolute index
//=====================================================

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{BinaryOp, UnaryOp};
use crate::bytecode::{Instruction, Program, Slot};
use crate::tac::{LabelId, Operand, Place, TacInstruction};

/// Placeholder jump target overwritten by the patch pass.
const UNPATCHED: usize = usize::MAX;

/// Emit bytecode for an optimized TAC sequence. A jump referencing a label
/// with no matching `Label` instruction is a pipeline defect and panics.
pub fn emit(tac: &[TacInstruction]) -> Program {
    let mut emitter = Emitter::default();
    for instruction in tac {
        emitter.emit_tac(instruction);
    }
    emitter.instructions.push(Instruction::Halt);
    emitter.patch_jumps();
    debug!(instructions = emitter.instructions.len(), "emitted bytecode");
    Program::new(emitter.instructions)
}

#[derive(Default)]
struct Emitter {
    instructions: Vec<Instruction>,
    labels: HashMap<LabelId, usize>,
    fixups: Vec<(usize, LabelId)>,
}

impl Emitter {
    fn emit_tac(&mut self, instruction: &TacInstruction) {
        match instruction {
            TacInstruction::Copy { dst, src } => {
                self.push_operand(src);
                self.instructions.push(Instruction::Store(slot_of(dst)));
            }
            TacInstruction::Binary { dst, op, lhs, rhs } => {
                self.push_operand(lhs);
                self.push_operand(rhs);
                self.instructions.push(binary_instruction(*op));
                self.instructions
                    .push(Instruction::Store(Slot::Temp(dst.0)));
            }
            TacInstruction::Unary { dst, op, operand } => {
                self.push_operand(operand);
                self.instructions.push(unary_instruction(*op));
                self.instructions
                    .push(Instruction::Store(Slot::Temp(dst.0)));
            }
            TacInstruction::Label(label) => {
                // Labels are pure positions; they emit no bytecode.
                let previous = self.labels.insert(*label, self.instructions.len());
                debug_assert!(previous.is_none(), "label {label} defined twice");
            }
            TacInstruction::Jump(label) => {
                self.fixups.push((self.instructions.len(), *label));
                self.instructions.push(Instruction::Jump(UNPATCHED));
            }
            TacInstruction::JumpIfFalse { condition, target } => {
                self.push_operand(condition);
                self.fixups.push((self.instructions.len(), *target));
                self.instructions.push(Instruction::JumpIfFalse(UNPATCHED));
            }
            TacInstruction::Print { value } => {
                self.push_operand(value);
                self.instructions.push(Instruction::Print);
            }
        }
    }

    fn push_operand(&mut self, operand: &Operand) {
        let instruction = match operand {
            Operand::Const(value) => Instruction::PushConst(*value),
            Operand::Var(name) => Instruction::Load(Slot::Var(name.clone())),
            Operand::Temp(temp) => Instruction::Load(Slot::Temp(temp.0)),
        };
        self.instructions.push(instruction);
    }

    fn patch_jumps(&mut self) {
        for (index, label) in &self.fixups {
            let target = match self.labels.get(label) {
                Some(target) => *target,
                None => panic!("unresolved label {label} referenced by jump at {index}"),
            };
            match &mut self.instructions[*index] {
                Instruction::Jump(slot) | Instruction::JumpIfFalse(slot) => *slot = target,
                other => panic!("fixup at {index} does not point at a jump: {other}"),
            }
        }
    }
}

fn slot_of(place: &Place) -> Slot {
    match place {
        Place::Var(name) => Slot::Var(name.clone()),
        Place::Temp(temp) => Slot::Temp(temp.0),
    }
}

fn binary_instruction(op: BinaryOp) -> Instruction {
    match op {
        BinaryOp::Add => Instruction::Add,
        BinaryOp::Subtract => Instruction::Sub,
        BinaryOp::Multiply => Instruction::Mul,
        BinaryOp::Divide => Instruction::Div,
        BinaryOp::Modulo => Instruction::Mod,
        BinaryOp::Less => Instruction::Less,
        BinaryOp::Greater => Instruction::Greater,
        BinaryOp::LessEqual => Instruction::LessEqual,
        BinaryOp::GreaterEqual => Instruction::GreaterEqual,
        BinaryOp::Equal => Instruction::Equal,
        BinaryOp::NotEqual => Instruction::NotEqual,
        BinaryOp::And => Instruction::And,
        BinaryOp::Or => Instruction::Or,
    }
}

fn unary_instruction(op: UnaryOp) -> Instruction {
    match op {
        UnaryOp::Negate => Instruction::Neg,
        UnaryOp::Not => Instruction::Not,
    }
}

//=====================================================
// End of file
//=====================================================
