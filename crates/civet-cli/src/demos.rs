//! Built-in demo programs.
//!
//! Each demo is a pre-built instruction list handed straight to the
//! machine; there is no assembly syntax or program file format.

use civet_bytecode::{Instruction, Opcode, Reg};

/// A named demo program
pub struct Demo {
    /// Short name used on the command line
    pub name: &'static str,
    /// Human-readable title printed in the run banner
    pub title: &'static str,
    /// Builds the instruction list
    pub program: fn() -> Vec<Instruction>,
}

/// The demo catalog
pub const DEMOS: &[Demo] = &[
    Demo {
        name: "mov",
        title: "Basic MOV and HLT",
        program: || {
            vec![
                Instruction::with_operand(Opcode::MovAx, 0x1234),
                Instruction::new(Opcode::Hlt),
            ]
        },
    },
    Demo {
        name: "stack",
        title: "PUSH & POP",
        program: || {
            vec![
                Instruction::with_operand(Opcode::MovAx, 0xABCD),
                Instruction::push(Reg::Ax),
                Instruction::pop(Reg::Bx),
                Instruction::new(Opcode::Hlt),
            ]
        },
    },
    Demo {
        name: "arith",
        title: "Arithmetic: 0x11 + 0x09",
        program: || {
            vec![
                Instruction::with_operand(Opcode::MovAx, 0x0011),
                Instruction::with_operand(Opcode::MovBx, 0x0009),
                Instruction::new(Opcode::Add),
                Instruction::new(Opcode::Hlt),
            ]
        },
    },
    Demo {
        name: "flags",
        title: "Flag set and clear",
        program: || {
            vec![
                Instruction::new(Opcode::Ste),
                Instruction::new(Opcode::Stg),
                Instruction::new(Opcode::Clg),
                Instruction::new(Opcode::Hlt),
            ]
        },
    },
    Demo {
        name: "fault",
        title: "Division by zero (faults)",
        program: || {
            vec![
                Instruction::with_operand(Opcode::MovAx, 0x0040),
                Instruction::with_operand(Opcode::MovBx, 0x0000),
                Instruction::new(Opcode::Div),
                Instruction::new(Opcode::Hlt),
            ]
        },
    },
];

/// Look up a demo by its short name
pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|demo| demo.name == name)
}
