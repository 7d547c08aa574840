//=====================================================
// File: optimizer.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Semantics-preserving rewrites over TAC
// Objective: Run the fixed pass pipeline (constant folding, algebraic
//            simplification, dead-temporary elimination) over a lowered
//            instruction sequence
//=====================================================

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::ast::{BinaryOp, UnaryOp};
use crate::tac::{Operand, Place, TacInstruction, TempId};
use crate::value::Value;

/// Result of an optimisation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimisation {
    /// Optimisation changed the instruction sequence.
    Changed,
    /// No changes were made.
    Unchanged,
}

/// Run the full pipeline once, in its fixed order. Each pass is total over
/// well-formed TAC and preserves observable semantics for every reachable
/// program state.
pub fn optimize(instructions: Vec<TacInstruction>) -> Vec<TacInstruction> {
    let before = instructions.len();
    let instructions = fold_constants(instructions);
    let instructions = simplify_algebra(instructions);
    let instructions = eliminate_dead_temps(instructions);
    debug!(before, after = instructions.len(), "optimisation pipeline finished");
    instructions
}

/// Constant folding. Temporaries are single-assignment, so a temporary copied
/// from a literal holds that literal for the whole program; such temporaries
/// are substituted into binary/unary operand positions, and operations whose
/// operands are then both literal are replaced by a copy of the computed
/// value. Division and modulo with a literal zero divisor are left unfolded
/// for the runtime to fault on.
pub fn fold_constants(instructions: Vec<TacInstruction>) -> Vec<TacInstruction> {
    let mut known: HashMap<TempId, Value> = HashMap::new();
    let mut folded = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        match instruction {
            TacInstruction::Copy { dst, src } => {
                if let (Place::Temp(temp), Operand::Const(value)) = (&dst, &src) {
                    known.insert(*temp, *value);
                }
                folded.push(TacInstruction::Copy { dst, src });
            }
            TacInstruction::Binary { dst, op, lhs, rhs } => {
                let lhs = substitute(lhs, &known);
                let rhs = substitute(rhs, &known);
                match (lhs.as_const(), rhs.as_const()) {
                    (Some(a), Some(b)) => match eval_binary(op, a, b) {
                        Some(value) => {
                            known.insert(dst, value);
                            folded.push(TacInstruction::Copy {
                                dst: Place::Temp(dst),
                                src: Operand::Const(value),
                            });
                        }
                        None => folded.push(TacInstruction::Binary { dst, op, lhs, rhs }),
                    },
                    _ => folded.push(TacInstruction::Binary { dst, op, lhs, rhs }),
                }
            }
            TacInstruction::Unary { dst, op, operand } => {
                let operand = substitute(operand, &known);
                match operand.as_const().and_then(|value| eval_unary(op, value)) {
                    Some(value) => {
                        known.insert(dst, value);
                        folded.push(TacInstruction::Copy {
                            dst: Place::Temp(dst),
                            src: Operand::Const(value),
                        });
                    }
                    None => folded.push(TacInstruction::Unary { dst, op, operand }),
                }
            }
            other => folded.push(other),
        }
    }

    folded
}

/// Algebraic simplification: identities that are safe for every value of the
/// non-literal operand. Division and modulo by a literal zero are never
/// rewritten.
pub fn simplify_algebra(instructions: Vec<TacInstruction>) -> Vec<TacInstruction> {
    instructions
        .into_iter()
        .map(|instruction| match instruction {
            TacInstruction::Binary { dst, op, lhs, rhs } => {
                match simplify_binary(op, &lhs, &rhs) {
                    Some(src) => TacInstruction::Copy {
                        dst: Place::Temp(dst),
                        src,
                    },
                    None => TacInstruction::Binary { dst, op, lhs, rhs },
                }
            }
            other => other,
        })
        .collect()
}

fn simplify_binary(op: BinaryOp, lhs: &Operand, rhs: &Operand) -> Option<Operand> {
    match op {
        BinaryOp::Add => {
            if is_int(rhs, 0) {
                return Some(lhs.clone());
            }
            if is_int(lhs, 0) {
                return Some(rhs.clone());
            }
            None
        }
        BinaryOp::Subtract => is_int(rhs, 0).then(|| lhs.clone()),
        BinaryOp::Multiply => {
            if is_int(rhs, 1) {
                return Some(lhs.clone());
            }
            if is_int(lhs, 1) {
                return Some(rhs.clone());
            }
            if is_int(rhs, 0) || is_int(lhs, 0) {
                return Some(Operand::Const(Value::Int(0)));
            }
            None
        }
        BinaryOp::Divide => is_int(rhs, 1).then(|| lhs.clone()),
        BinaryOp::And => {
            if is_bool(rhs, true) {
                return Some(lhs.clone());
            }
            if is_bool(lhs, true) {
                return Some(rhs.clone());
            }
            None
        }
        BinaryOp::Or => {
            if is_bool(rhs, false) {
                return Some(lhs.clone());
            }
            if is_bool(lhs, false) {
                return Some(rhs.clone());
            }
            None
        }
        _ => None,
    }
}

/// Dead-temporary elimination. Backward-propagated liveness restricted to
/// temporaries: an assignment to a temporary never read afterwards is
/// removed. Variables are always considered live. Sweeps repeat until a
/// fixpoint, since removing one dead instruction can strand its operands'
/// producers.
pub fn eliminate_dead_temps(instructions: Vec<TacInstruction>) -> Vec<TacInstruction> {
    let mut instructions = instructions;
    loop {
        let (swept, outcome) = sweep_dead_temps(instructions);
        instructions = swept;
        if outcome == Optimisation::Unchanged {
            return instructions;
        }
    }
}

fn sweep_dead_temps(instructions: Vec<TacInstruction>) -> (Vec<TacInstruction>, Optimisation) {
    let mut read: HashSet<TempId> = HashSet::new();
    for instruction in &instructions {
        match instruction {
            TacInstruction::Copy { src, .. } => collect_temp(src, &mut read),
            TacInstruction::Binary { lhs, rhs, .. } => {
                collect_temp(lhs, &mut read);
                collect_temp(rhs, &mut read);
            }
            TacInstruction::Unary { operand, .. } => collect_temp(operand, &mut read),
            TacInstruction::JumpIfFalse { condition, .. } => collect_temp(condition, &mut read),
            TacInstruction::Print { value } => collect_temp(value, &mut read),
            TacInstruction::Label(_) | TacInstruction::Jump(_) => {}
        }
    }

    let before = instructions.len();
    let retained: Vec<TacInstruction> = instructions
        .into_iter()
        .filter(|instruction| match dead_candidate(instruction) {
            Some(temp) => read.contains(&temp),
            None => true,
        })
        .collect();

    let outcome = if retained.len() == before {
        Optimisation::Unchanged
    } else {
        Optimisation::Changed
    };
    (retained, outcome)
}

/// The temporary an instruction assigns, when removing the instruction would
/// be side-effect free. Print and control flow are never candidates.
fn dead_candidate(instruction: &TacInstruction) -> Option<TempId> {
    match instruction {
        TacInstruction::Copy { dst, .. } => dst.as_temp(),
        TacInstruction::Binary { dst, op, rhs, .. } => {
            // A division or modulo that may fault at runtime must survive
            // even if its result is unread.
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo)
                && !matches!(rhs.as_const(), Some(Value::Int(divisor)) if divisor != 0)
            {
                return None;
            }
            Some(*dst)
        }
        TacInstruction::Unary { dst, .. } => Some(*dst),
        _ => None,
    }
}

fn collect_temp(operand: &Operand, read: &mut HashSet<TempId>) {
    if let Operand::Temp(temp) = operand {
        read.insert(*temp);
    }
}

fn substitute(operand: Operand, known: &HashMap<TempId, Value>) -> Operand {
    match operand {
        Operand::Temp(temp) => match known.get(&temp) {
            Some(value) => Operand::Const(*value),
            None => Operand::Temp(temp),
        },
        other => other,
    }
}

/// Evaluate a binary operator over two literals with the runtime's exact
/// semantics. Returns None when folding must not happen: a zero divisor, or
/// operand types an analyzer-approved program cannot produce.
pub fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Option<Value> {
    match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_add(b))),
        (BinaryOp::Subtract, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_sub(b))),
        (BinaryOp::Multiply, Value::Int(a), Value::Int(b)) => Some(Value::Int(a.wrapping_mul(b))),
        (BinaryOp::Divide, Value::Int(a), Value::Int(b)) => {
            (b != 0).then(|| Value::Int(a.wrapping_div(b)))
        }
        (BinaryOp::Modulo, Value::Int(a), Value::Int(b)) => {
            (b != 0).then(|| Value::Int(a.wrapping_rem(b)))
        }
        (BinaryOp::Less, Value::Int(a), Value::Int(b)) => Some(Value::Bool(a < b)),
        (BinaryOp::Greater, Value::Int(a), Value::Int(b)) => Some(Value::Bool(a > b)),
        (BinaryOp::LessEqual, Value::Int(a), Value::Int(b)) => Some(Value::Bool(a <= b)),
        (BinaryOp::GreaterEqual, Value::Int(a), Value::Int(b)) => Some(Value::Bool(a >= b)),
        (BinaryOp::Less, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a < b)),
        (BinaryOp::Greater, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a > b)),
        (BinaryOp::LessEqual, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a <= b)),
        (BinaryOp::GreaterEqual, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a >= b)),
        (BinaryOp::Equal, a, b) if a.ty() == b.ty() => Some(Value::Bool(a == b)),
        (BinaryOp::NotEqual, a, b) if a.ty() == b.ty() => Some(Value::Bool(a != b)),
        (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a && b)),
        (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Some(Value::Bool(a || b)),
        _ => None,
    }
}

/// Evaluate a unary operator over a literal. None for operand types an
/// analyzer-approved program cannot produce.
pub fn eval_unary(op: UnaryOp, operand: Value) -> Option<Value> {
    match (op, operand) {
        (UnaryOp::Negate, Value::Int(value)) => Some(Value::Int(value.wrapping_neg())),
        (UnaryOp::Not, Value::Bool(flag)) => Some(Value::Bool(!flag)),
        _ => None,
    }
}

fn is_int(operand: &Operand, expected: i64) -> bool {
    matches!(operand, Operand::Const(Value::Int(value)) if *value == expected)
}

fn is_bool(operand: &Operand, expected: bool) -> bool {
    matches!(operand, Operand::Const(Value::Bool(flag)) if *flag == expected)
}

//=====================================================
// End of file
//=====================================================
