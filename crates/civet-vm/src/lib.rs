//! # Civet VM
//!
//! Core execution engine for the civet 16-bit virtual CPU: a fixed
//! instruction set executed against a flat 64 KiB memory image, four
//! general-purpose registers, a bit-encoded condition-flags register, and a
//! downward-growing call stack.
//!
//! ## Design Principles
//!
//! - **Bounds-checked everywhere**: every memory access is checked; nothing
//!   wraps or clamps silently
//! - **Typed faults**: illegal operations surface as [`VmError`] values, and
//!   the caller decides whether a fault ends the process
//! - **Single-threaded**: a machine owns all of its state; independent
//!   machines may run on independent threads with zero sharing

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod machine;
pub mod memory;
pub mod registers;

pub use error::{VmError, VmResult};
pub use machine::{HaltReport, Machine, State, Step};
pub use memory::Memory;
pub use registers::{Flag, Registers};
