//! # Civet Bytecode
//!
//! This crate defines the instruction model for the civet 16-bit virtual CPU.
//!
//! ## Design Principles
//!
//! - **Closed opcode space**: every byte either maps to exactly one opcode
//!   or decodes to an error; sizes and behavior are exhaustive matches, not
//!   mutable lookup tables
//! - **Fixed-size encoding per opcode**: one opcode byte followed by zero or
//!   one little-endian 16-bit operand (a two-operand, five-byte form is
//!   reserved by the encoding but unused by the current opcode set)
//! - **Serializable**: instruction records derive serde for embedders that
//!   want to store or transmit programs

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod instruction;
pub mod operand;

pub use error::BytecodeError;
pub use instruction::{Instruction, Opcode};
pub use operand::Reg;
