//! Instruction set and byte encoding

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};
use crate::operand::Reg;

/// Instruction opcodes
///
/// The opcode space is closed. Every opcode has a fixed encoded size: one
/// byte for the opcode itself plus zero or one little-endian 16-bit operand.
/// The arithmetic opcodes implicitly operate on the (ax, bx) register pair
/// and never touch the condition flags; flags change only through their
/// dedicated set/clear opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // ==================== Basic ====================
    /// No operation
    Nop = 0x01,
    /// Halt execution; the machine reports its final state
    Hlt = 0x02,

    // ==================== Immediate moves ====================
    /// ax = imm16
    MovAx = 0x08,
    /// bx = imm16
    MovBx = 0x09,
    /// cx = imm16
    MovCx = 0x0A,
    /// dx = imm16
    MovDx = 0x0B,
    /// sp = imm16
    MovSp = 0x0C,

    // ==================== Flag set/clear ====================
    /// Set the Equal flag
    Ste = 0x10,
    /// Clear the Equal flag
    Cle = 0x11,
    /// Set the Greater flag
    Stg = 0x12,
    /// Clear the Greater flag
    Clg = 0x13,
    /// Set the Higher flag
    Sth = 0x14,
    /// Clear the Higher flag
    Clh = 0x15,
    /// Set the Lower flag
    Stl = 0x16,
    /// Clear the Lower flag
    Cll = 0x17,

    // ==================== Stack ====================
    /// Push a general register; the operand is a register selector (0..=3)
    Push = 0x1A,
    /// Pop into a general register; the operand is a register selector (0..=3)
    Pop = 0x1B,

    // ==================== Arithmetic ====================
    /// ax = ax + bx (wrapping)
    Add = 0x20,
    /// ax = ax - bx (wrapping)
    Sub = 0x21,
    /// ax = ax * bx (wrapping)
    Mul = 0x22,
    /// ax = ax / bx; bx == 0 is a division-by-zero fault
    Div = 0x23,
}

impl Opcode {
    /// Convert from raw byte
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Nop),
            0x02 => Some(Self::Hlt),

            0x08 => Some(Self::MovAx),
            0x09 => Some(Self::MovBx),
            0x0A => Some(Self::MovCx),
            0x0B => Some(Self::MovDx),
            0x0C => Some(Self::MovSp),

            0x10 => Some(Self::Ste),
            0x11 => Some(Self::Cle),
            0x12 => Some(Self::Stg),
            0x13 => Some(Self::Clg),
            0x14 => Some(Self::Sth),
            0x15 => Some(Self::Clh),
            0x16 => Some(Self::Stl),
            0x17 => Some(Self::Cll),

            0x1A => Some(Self::Push),
            0x1B => Some(Self::Pop),

            0x20 => Some(Self::Add),
            0x21 => Some(Self::Sub),
            0x22 => Some(Self::Mul),
            0x23 => Some(Self::Div),

            _ => None,
        }
    }

    /// Convert to raw byte
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Encoded size in bytes: the opcode byte plus its operand bytes.
    ///
    /// 1 = no operand, 3 = one 16-bit operand. A 5-byte two-operand form is
    /// reserved by the encoding; no current opcode uses it.
    pub const fn size(self) -> usize {
        match self {
            Self::Nop
            | Self::Hlt
            | Self::Ste
            | Self::Cle
            | Self::Stg
            | Self::Clg
            | Self::Sth
            | Self::Clh
            | Self::Stl
            | Self::Cll
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div => 1,
            Self::MovAx
            | Self::MovBx
            | Self::MovCx
            | Self::MovDx
            | Self::MovSp
            | Self::Push
            | Self::Pop => 3,
        }
    }

    /// Get the mnemonic of this opcode
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Hlt => "HLT",
            Self::MovAx => "MOV",
            Self::MovBx => "MOV_BX",
            Self::MovCx => "MOV_CX",
            Self::MovDx => "MOV_DX",
            Self::MovSp => "MOV_SP",
            Self::Ste => "STE",
            Self::Cle => "CLE",
            Self::Stg => "STG",
            Self::Clg => "CLG",
            Self::Sth => "STH",
            Self::Clh => "CLH",
            Self::Stl => "STL",
            Self::Cll => "CLL",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
        }
    }
}

/// A decoded instruction: opcode tag plus two 16-bit operand slots
///
/// Slots the opcode does not use stay zero. The second slot belongs to the
/// reserved five-byte encoding and is carried for forward compatibility; no
/// current opcode reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation tag
    pub opcode: Opcode,
    /// First operand slot (immediate value or register selector)
    pub a: u16,
    /// Second operand slot (reserved)
    pub b: u16,
}

impl Instruction {
    /// An instruction with no operands
    pub const fn new(opcode: Opcode) -> Self {
        Self { opcode, a: 0, b: 0 }
    }

    /// An instruction with one operand
    pub const fn with_operand(opcode: Opcode, a: u16) -> Self {
        Self { opcode, a, b: 0 }
    }

    /// PUSH of a general register
    pub const fn push(reg: Reg) -> Self {
        Self::with_operand(Opcode::Push, reg.to_word())
    }

    /// POP into a general register
    pub const fn pop(reg: Reg) -> Self {
        Self::with_operand(Opcode::Pop, reg.to_word())
    }

    /// Encoded size in bytes
    #[inline]
    pub const fn encoded_len(&self) -> usize {
        self.opcode.size()
    }

    /// Append the byte encoding: opcode byte, then the operand slots the
    /// size table calls for, low byte first
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.opcode.to_byte());
        if self.opcode.size() >= 3 {
            out.extend_from_slice(&self.a.to_le_bytes());
        }
        if self.opcode.size() == 5 {
            out.extend_from_slice(&self.b.to_le_bytes());
        }
    }

    /// Decode one instruction from the front of `bytes`.
    ///
    /// The size is computed purely from the opcode byte; exactly that many
    /// further bytes are read, never more, never fewer. Returns the
    /// instruction and its total encoded size.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        let raw = *bytes.first().ok_or(BytecodeError::UnexpectedEnd)?;
        let opcode = Opcode::from_byte(raw).ok_or(BytecodeError::InvalidOpcode(raw))?;

        let size = opcode.size();
        if bytes.len() < size {
            return Err(BytecodeError::UnexpectedEnd);
        }

        let mut a = 0;
        let mut b = 0;
        if size >= 3 {
            a = u16::from_le_bytes([bytes[1], bytes[2]]);
        }
        if size == 5 {
            b = u16::from_le_bytes([bytes[3], bytes[4]]);
        }

        Ok((Self { opcode, a, b }, size))
    }
}
