//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while decoding instructions
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BytecodeError {
    /// Opcode byte with no table entry
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// Byte stream ended before the instruction's size table was satisfied
    #[error("unexpected end of bytecode")]
    UnexpectedEnd,
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
