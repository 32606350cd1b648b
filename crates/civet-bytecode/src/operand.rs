//! Instruction operands

use serde::{Deserialize, Serialize};

/// General-purpose register selector, carried as the operand of the stack
/// opcodes (PUSH/POP)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Reg {
    /// Primary accumulator
    Ax = 0x00,
    /// Base register
    Bx = 0x01,
    /// Count register
    Cx = 0x02,
    /// Data register
    Dx = 0x03,
}

impl Reg {
    /// Decode a selector operand. Words above `0x03` name no register.
    pub const fn from_word(word: u16) -> Option<Self> {
        match word {
            0x00 => Some(Self::Ax),
            0x01 => Some(Self::Bx),
            0x02 => Some(Self::Cx),
            0x03 => Some(Self::Dx),
            _ => None,
        }
    }

    /// Encode as a selector operand
    #[inline]
    pub const fn to_word(self) -> u16 {
        self as u16
    }

    /// Conventional register name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ax => "ax",
            Self::Bx => "bx",
            Self::Cx => "cx",
            Self::Dx => "dx",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_roundtrip() {
        for reg in [Reg::Ax, Reg::Bx, Reg::Cx, Reg::Dx] {
            assert_eq!(Reg::from_word(reg.to_word()), Some(reg));
        }
    }

    #[test]
    fn test_invalid_selector() {
        assert_eq!(Reg::from_word(0x04), None);
        assert_eq!(Reg::from_word(0xFFFF), None);
    }
}
