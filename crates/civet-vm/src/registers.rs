//! Register file and condition flags

use civet_bytecode::Reg;

/// Condition flag bits in the flags word
///
/// Flags are an explicitly-managed channel: only the eight dedicated
/// set/clear opcodes touch them. Arithmetic and comparison results are
/// never wired into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Flag {
    /// Equal flag (bit 3)
    Equal = 0x08,
    /// Greater flag (bit 2)
    Greater = 0x04,
    /// Higher flag (bit 1)
    Higher = 0x02,
    /// Lower flag (bit 0)
    Lower = 0x01,
}

impl Flag {
    /// Bit mask of this flag in the flags word
    #[inline]
    pub const fn mask(self) -> u16 {
        self as u16
    }
}

/// The machine register file: four general-purpose 16-bit registers, the
/// stack pointer, the instruction pointer, and the flags word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    /// Primary accumulator; arithmetic results land here
    pub ax: u16,
    /// Base register; the second arithmetic operand
    pub bx: u16,
    /// Count register
    pub cx: u16,
    /// Data register
    pub dx: u16,
    /// Stack pointer: address of the next free byte below the stack top.
    /// The stack grows toward lower addresses; push/pop move it by ±2.
    pub sp: u16,
    /// Instruction pointer: address of the next instruction byte to fetch
    pub ip: u16,
    /// Condition flags word; only the four low-order bits are defined
    pub flags: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            ax: 0,
            bx: 0,
            cx: 0,
            dx: 0,
            sp: 0xFFFF,
            ip: 0,
            flags: 0,
        }
    }
}

impl Registers {
    /// Read a general-purpose register through its selector
    pub fn general(&self, reg: Reg) -> u16 {
        match reg {
            Reg::Ax => self.ax,
            Reg::Bx => self.bx,
            Reg::Cx => self.cx,
            Reg::Dx => self.dx,
        }
    }

    /// Write a general-purpose register through its selector
    pub fn set_general(&mut self, reg: Reg, value: u16) {
        match reg {
            Reg::Ax => self.ax = value,
            Reg::Bx => self.bx = value,
            Reg::Cx => self.cx = value,
            Reg::Dx => self.dx = value,
        }
    }

    /// Whether a condition flag is set
    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        self.flags & flag.mask() != 0
    }

    /// Set or clear exactly one condition flag bit, leaving every other bit
    /// untouched
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        if value {
            self.flags |= flag.mask();
        } else {
            self.flags &= !flag.mask();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_register_state() {
        let regs = Registers::default();
        assert_eq!(regs.sp, 0xFFFF);
        assert_eq!(regs.ip, 0);
        assert_eq!(regs.flags, 0);
        assert_eq!((regs.ax, regs.bx, regs.cx, regs.dx), (0, 0, 0, 0));
    }

    #[test]
    fn test_flags_are_independent_bits() {
        let mut regs = Registers::default();
        regs.set_flag(Flag::Equal, true);
        regs.set_flag(Flag::Lower, true);
        assert!(regs.flag(Flag::Equal));
        assert!(regs.flag(Flag::Lower));
        assert!(!regs.flag(Flag::Greater));
        assert!(!regs.flag(Flag::Higher));

        // Clearing one flag leaves the others alone.
        regs.set_flag(Flag::Equal, false);
        assert!(!regs.flag(Flag::Equal));
        assert!(regs.flag(Flag::Lower));
        assert_eq!(regs.flags, Flag::Lower.mask());
    }

    #[test]
    fn test_general_register_selectors() {
        let mut regs = Registers::default();
        for (reg, value) in [
            (Reg::Ax, 0x1111),
            (Reg::Bx, 0x2222),
            (Reg::Cx, 0x3333),
            (Reg::Dx, 0x4444),
        ] {
            regs.set_general(reg, value);
            assert_eq!(regs.general(reg), value);
        }
    }
}
