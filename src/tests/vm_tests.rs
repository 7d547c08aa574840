//=============================================
// tinyscript/src/tests/vm_tests.rs
//=============================================
// Purpose: Validate the stack machine instruction by instruction:
//          operand order, faults, jumps, and the step-limit guard.
//=============================================

use crate::bytecode::{Instruction, Program, Slot};
use crate::error::RuntimeError;
use crate::value::Value;
use crate::vm::{StackVm, VmOptions};

fn run(instructions: Vec<Instruction>) -> crate::vm::Output {
    StackVm::new()
        .execute(&Program::new(instructions))
        .expect("program runs")
}

fn var(name: &str) -> Slot {
    Slot::Var(name.into())
}

#[test]
fn pops_right_operand_first() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(7)),
        Instruction::PushConst(Value::Int(3)),
        Instruction::Sub,
        Instruction::Store(var("r")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables["r"], Value::Int(4));
}

#[test]
fn integer_division_truncates_toward_zero() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(-7)),
        Instruction::PushConst(Value::Int(2)),
        Instruction::Div,
        Instruction::Store(var("q")),
        Instruction::PushConst(Value::Int(-7)),
        Instruction::PushConst(Value::Int(2)),
        Instruction::Mod,
        Instruction::Store(var("r")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables["q"], Value::Int(-3));
    assert_eq!(output.variables["r"], Value::Int(-1));
}

#[test]
fn division_by_zero_faults() {
    let err = StackVm::new()
        .execute(&Program::new(vec![
            Instruction::PushConst(Value::Int(10)),
            Instruction::PushConst(Value::Int(0)),
            Instruction::Div,
            Instruction::Halt,
        ]))
        .expect_err("division faults");
    assert_eq!(err, RuntimeError::DivisionByZero);
}

#[test]
fn modulo_by_zero_faults() {
    let err = StackVm::new()
        .execute(&Program::new(vec![
            Instruction::PushConst(Value::Int(10)),
            Instruction::PushConst(Value::Int(0)),
            Instruction::Mod,
            Instruction::Halt,
        ]))
        .expect_err("modulo faults");
    assert_eq!(err, RuntimeError::DivisionByZero);
}

#[test]
fn comparisons_and_logical_operators() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(2)),
        Instruction::PushConst(Value::Int(3)),
        Instruction::Less,
        Instruction::Store(var("lt")),
        Instruction::PushConst(Value::Bool(true)),
        Instruction::PushConst(Value::Bool(false)),
        Instruction::Equal,
        Instruction::Store(var("eq")),
        Instruction::PushConst(Value::Bool(true)),
        Instruction::PushConst(Value::Bool(false)),
        Instruction::Or,
        Instruction::Store(var("or")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables["lt"], Value::Bool(true));
    assert_eq!(output.variables["eq"], Value::Bool(false));
    assert_eq!(output.variables["or"], Value::Bool(true));
}

#[test]
fn unary_operators() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(5)),
        Instruction::Neg,
        Instruction::Store(var("n")),
        Instruction::PushConst(Value::Bool(false)),
        Instruction::Not,
        Instruction::Store(var("f")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables["n"], Value::Int(-5));
    assert_eq!(output.variables["f"], Value::Bool(true));
}

#[test]
fn jump_if_false_falls_through_on_true() {
    let output = run(vec![
        Instruction::PushConst(Value::Bool(true)),
        Instruction::JumpIfFalse(4),
        Instruction::PushConst(Value::Int(1)),
        Instruction::Print,
        Instruction::Halt,
    ]);
    assert_eq!(output.printed, vec![Value::Int(1)]);
}

#[test]
fn jump_if_false_redirects_on_false() {
    let output = run(vec![
        Instruction::PushConst(Value::Bool(false)),
        Instruction::JumpIfFalse(4),
        Instruction::PushConst(Value::Int(1)),
        Instruction::Print,
        Instruction::Halt,
    ]);
    assert_eq!(output.printed, vec![]);
}

#[test]
fn unconditional_jump_skips_instructions() {
    let output = run(vec![
        Instruction::Jump(3),
        Instruction::PushConst(Value::Int(1)),
        Instruction::Print,
        Instruction::PushConst(Value::Int(2)),
        Instruction::Print,
        Instruction::Halt,
    ]);
    assert_eq!(output.printed, vec![Value::Int(2)]);
}

#[test]
fn print_appends_to_output_in_order() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(1)),
        Instruction::Print,
        Instruction::PushConst(Value::Bool(true)),
        Instruction::Print,
        Instruction::Halt,
    ]);
    assert_eq!(output.printed, vec![Value::Int(1), Value::Bool(true)]);
}

#[test]
fn temporaries_never_appear_in_the_variable_snapshot() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(9)),
        Instruction::Store(Slot::Temp(0)),
        Instruction::PushConst(Value::Int(1)),
        Instruction::Store(var("x")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables.len(), 1);
    assert_eq!(output.variables["x"], Value::Int(1));
}

#[test]
fn store_overwrites_prior_binding() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(1)),
        Instruction::Store(var("x")),
        Instruction::PushConst(Value::Int(2)),
        Instruction::Store(var("x")),
        Instruction::Halt,
    ]);
    assert_eq!(output.variables["x"], Value::Int(2));
}

#[test]
fn execution_ends_one_past_the_last_instruction_without_halt() {
    let output = run(vec![
        Instruction::PushConst(Value::Int(5)),
        Instruction::Print,
    ]);
    assert_eq!(output.printed, vec![Value::Int(5)]);
}

#[test]
fn step_limit_aborts_runaway_loops() {
    let err = StackVm::with_options(VmOptions::default().with_step_limit(10))
        .execute(&Program::new(vec![Instruction::Jump(0)]))
        .expect_err("loop exceeds limit");
    assert_eq!(err, RuntimeError::StepLimitExceeded(10));
}

#[test]
fn step_limit_does_not_alter_finishing_programs() {
    let program = vec![
        Instruction::PushConst(Value::Int(3)),
        Instruction::Print,
        Instruction::Halt,
    ];
    let plain = run(program.clone());
    let guarded = StackVm::with_options(VmOptions::default().with_step_limit(100))
        .execute(&Program::new(program))
        .expect("finishes within limit");
    assert_eq!(plain, guarded);
}

#[test]
fn trace_option_does_not_change_observables() {
    let program = vec![
        Instruction::PushConst(Value::Int(3)),
        Instruction::PushConst(Value::Int(4)),
        Instruction::Add,
        Instruction::Print,
        Instruction::Halt,
    ];
    let plain = run(program.clone());
    let traced = StackVm::with_options(VmOptions::with_trace(true))
        .execute(&Program::new(program))
        .expect("traced run");
    assert_eq!(plain, traced);
}
