//! VM error types

use thiserror::Error;

/// VM execution errors
///
/// All are detected synchronously at the point of violation. A machine that
/// raised one of these is faulted: its state is not guaranteed consistent
/// and should be discarded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// Memory access beyond capacity
    #[error("out of bounds memory access at {addr:#06x}")]
    OutOfBounds {
        /// The offending address
        addr: usize,
    },

    /// Opcode byte with no table entry
    #[error("illegal instruction: {0:#04x}")]
    IllegalInstruction(u8),

    /// Operand value outside the legal range for the opcode
    #[error("invalid operand {value:#06x} for {opcode}")]
    InvalidOperand {
        /// Mnemonic of the opcode that rejected the operand
        opcode: &'static str,
        /// The rejected operand word
        value: u16,
    },

    /// Divide with a zero base register
    #[error("division by zero")]
    DivisionByZero,

    /// Push with the stack pointer within two bytes of address zero
    #[error("stack overflow")]
    StackOverflow,

    /// Pop with nothing left on the stack
    #[error("stack underflow")]
    StackUnderflow,
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;
