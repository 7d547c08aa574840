//=====================================================
// File: lib.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: TinyScript compiler backend and runtime
// Objective: Wire the pipeline stages together: semantic analysis, TAC
//            lowering, optimisation, bytecode emission, and execution
//=====================================================

pub mod analyzer;
pub mod ast;
pub mod bytecode;
pub mod error;
pub mod optimizer;
pub mod resolver;
pub mod tac;
pub mod value;
pub mod vm;

#[cfg(test)]
mod tests;

pub use error::{
    Diagnostic, ErrorCode, RuntimeError, ScriptError, ScriptResult, SemanticError,
};
pub use value::{Type, Value};
pub use vm::{Output, StackVm, VmOptions};

/// Compilation flags. The optimiser pipeline is on by default; switching it
/// off must never change a program's observable behavior.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Compile a parsed program to bytecode with default options.
pub fn compile(program: &ast::Program) -> Result<bytecode::Program, SemanticError> {
    compile_with(program, CompileOptions::default())
}

/// Compile a parsed program to bytecode. Data flows strictly forward:
/// AST -> analysis -> TAC -> optimised TAC -> bytecode. The first semantic
/// error aborts the run; nothing is emitted after a failure.
pub fn compile_with(
    program: &ast::Program,
    options: CompileOptions,
) -> Result<bytecode::Program, SemanticError> {
    let analysis = analyzer::analyze(program)?;
    let tac = tac::builder::lower(program, &analysis);
    let tac = if options.optimize {
        optimizer::optimize(tac)
    } else {
        tac
    };
    Ok(bytecode::emit::emit(&tac))
}

/// Compile and run a parsed program with default options.
pub fn execute(program: &ast::Program) -> ScriptResult<Output> {
    execute_with(program, CompileOptions::default(), VmOptions::default())
}

/// Compile and run a parsed program. The VM is only ever invoked on
/// programs that passed semantic analysis.
pub fn execute_with(
    program: &ast::Program,
    compile_options: CompileOptions,
    vm_options: VmOptions,
) -> ScriptResult<Output> {
    let bytecode = compile_with(program, compile_options)?;
    let mut machine = StackVm::with_options(vm_options);
    Ok(machine.execute(&bytecode)?)
}

//=====================================================
// End of file
//=====================================================
