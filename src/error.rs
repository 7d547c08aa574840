//=====================================================
// File: error.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: TinyScript error taxonomy
// Objective: Define the semantic and runtime error enumerations, the unified
//            ScriptError, and the structured diagnostic record handed to the
//            external reporting layer
//=====================================================

use serde::Serialize;
use thiserror::Error;

use crate::ast::Position;

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// Stable error codes surfaced alongside diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    Redeclaration,
    UndeclaredIdentifier,
    TypeMismatch,
    DivisionByZero,
    StepLimit,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Redeclaration => "E001",
            ErrorCode::UndeclaredIdentifier => "E002",
            ErrorCode::TypeMismatch => "E003",
            ErrorCode::DivisionByZero => "E004",
            ErrorCode::StepLimit => "E005",
        }
    }
}

/// Compile-time failures raised by semantic analysis. The pipeline stops at
/// the first one; no code is generated afterwards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("variable '{name}' is already declared in this scope")]
    Redeclaration {
        name: String,
        position: Option<Position>,
    },
    #[error("undeclared identifier '{name}'")]
    UndeclaredIdentifier {
        name: String,
        position: Option<Position>,
    },
    #[error("type mismatch: {message}")]
    TypeMismatch {
        message: String,
        position: Option<Position>,
    },
}

impl SemanticError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SemanticError::Redeclaration { .. } => ErrorCode::Redeclaration,
            SemanticError::UndeclaredIdentifier { .. } => ErrorCode::UndeclaredIdentifier,
            SemanticError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            SemanticError::Redeclaration { position, .. }
            | SemanticError::UndeclaredIdentifier { position, .. }
            | SemanticError::TypeMismatch { position, .. } => position.as_ref(),
        }
    }
}

/// Execution-time failures. Fatal to the running program; the host process
/// continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("instruction limit of {0} exceeded")]
    StepLimitExceeded(u64),
}

impl RuntimeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuntimeError::DivisionByZero => ErrorCode::DivisionByZero,
            RuntimeError::StepLimitExceeded(_) => ErrorCode::StepLimit,
        }
    }
}

/// Any failure the pipeline can report across its boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl ScriptError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ScriptError::Semantic(error) => error.code(),
            ScriptError::Runtime(error) => error.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let position = match self {
            ScriptError::Semantic(error) => error.position().copied(),
            ScriptError::Runtime(_) => None,
        };
        Diagnostic {
            code: self.code().as_str(),
            message: self.to_string(),
            position,
        }
    }
}

/// Opaque {kind, message, position} record consumed by the external
/// reporting layer. The core never formats or prints diagnostics itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub position: Option<Position>,
}

//=====================================================
// End of file
//=====================================================
