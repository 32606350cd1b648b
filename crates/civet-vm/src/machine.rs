//! The execution engine: fetch, decode, dispatch

use std::fmt;

use civet_bytecode::{Instruction, Opcode, Reg};
use tracing::{debug, trace};

use crate::error::{VmError, VmResult};
use crate::memory::Memory;
use crate::registers::{Flag, Registers};

/// Number of trailing memory bytes captured in a halt report
const STACK_TAIL_LEN: usize = 32;

/// Execution state of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Executing instructions
    Running,
    /// A halt opcode was executed; terminal, no further fetch occurs
    Halted,
    /// An error was raised; the machine state is no longer trustworthy
    Faulted,
}

/// Outcome of a single successful step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction completed; more may follow
    Continue,
    /// A halt opcode was executed
    Halted,
}

/// Register state and trailing stack bytes captured when the machine halts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltReport {
    /// Primary accumulator at halt
    pub ax: u16,
    /// Base register at halt
    pub bx: u16,
    /// Count register at halt
    pub cx: u16,
    /// Data register at halt
    pub dx: u16,
    /// Stack pointer at halt
    pub sp: u16,
    /// The last 32 bytes of the address space (top of the stack region)
    pub stack_tail: Vec<u8>,
}

impl fmt::Display for HaltReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "AX: {:#06x}  BX: {:#06x}  CX: {:#06x}  DX: {:#06x}  SP: {:#06x}",
            self.ax, self.bx, self.cx, self.dx, self.sp
        )?;
        write!(f, "{}", civet_util::hex_dump(&self.stack_tail, ' '))
    }
}

/// One 16-bit virtual CPU: a register file, a flat 64 KiB memory, and a
/// load cursor for serializing programs into that memory
///
/// A machine executes exactly one instruction stream to completion or to
/// its first fatal error, then is typically discarded.
#[derive(Debug, Clone)]
pub struct Machine {
    registers: Registers,
    memory: Memory,
    load_cursor: usize,
    state: State,
}

impl Machine {
    /// Create a machine with zeroed registers, `sp` at the top of the
    /// address space, and 64 KiB of zeroed memory
    pub fn new() -> Self {
        Self {
            registers: Registers::default(),
            memory: Memory::new(),
            load_cursor: 0,
            state: State::Running,
        }
    }

    /// The register file
    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// The memory image
    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to the memory image, for callers that assemble or
    /// patch raw bytes directly
    #[inline]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Current execution state
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Serialize a program into memory at the load cursor, starting at
    /// address zero on a fresh machine.
    ///
    /// Each instruction is written as its byte encoding and the cursor
    /// advances by its encoded size. Previously loaded content is neither
    /// reset nor validated; loading twice concatenates.
    pub fn load_program(&mut self, program: &[Instruction]) -> VmResult<()> {
        let mut encoded = Vec::new();
        for instruction in program {
            instruction.encode_into(&mut encoded);
        }

        for byte in encoded {
            if self.load_cursor >= self.memory.capacity() {
                self.state = State::Faulted;
                return Err(VmError::OutOfBounds {
                    addr: self.load_cursor,
                });
            }
            self.memory.write(self.load_cursor as u16, byte)?;
            self.load_cursor += 1;
        }
        Ok(())
    }

    /// Execute one fetch → decode → dispatch → mutate transition.
    ///
    /// Errors leave the machine [`State::Faulted`] and are returned to the
    /// caller, who decides whether a fault ends the run or is merely
    /// reported; stepping a halted machine is a no-op that returns
    /// [`Step::Halted`].
    pub fn step(&mut self) -> VmResult<Step> {
        if self.state == State::Halted {
            return Ok(Step::Halted);
        }

        let outcome = self.dispatch();
        if outcome.is_err() {
            self.state = State::Faulted;
        }
        outcome
    }

    /// Run until the halt opcode or the first fault.
    ///
    /// There is no infinite-loop guard: a program with no halt reachable
    /// from the entry point loops forever, by design.
    pub fn run(&mut self) -> VmResult<HaltReport> {
        loop {
            match self.step()? {
                Step::Continue => {}
                Step::Halted => return Ok(self.halt_report()),
            }
        }
    }

    /// Capture the halt report: the four general registers, the stack
    /// pointer, and the trailing bytes at the top of the address space
    pub fn halt_report(&self) -> HaltReport {
        let bytes = self.memory.as_bytes();
        let tail_start = bytes.len().saturating_sub(STACK_TAIL_LEN);
        HaltReport {
            ax: self.registers.ax,
            bx: self.registers.bx,
            cx: self.registers.cx,
            dx: self.registers.dx,
            sp: self.registers.sp,
            stack_tail: bytes[tail_start..].to_vec(),
        }
    }

    /// Read the instruction at `ip` and advance `ip` past it.
    ///
    /// The advance happens before the instruction's side effects are
    /// applied; an opcode with jump behavior must overwrite `ip` with its
    /// absolute target to override the auto-advance.
    fn fetch(&mut self) -> VmResult<Instruction> {
        let ip = self.registers.ip;
        let raw = self.memory.read(ip)?;
        let opcode = Opcode::from_byte(raw).ok_or(VmError::IllegalInstruction(raw))?;

        let size = opcode.size();
        let mut a = 0;
        let mut b = 0;
        if size >= 3 {
            a = self.memory.read_word(ip.wrapping_add(1))?;
        }
        if size == 5 {
            b = self.memory.read_word(ip.wrapping_add(3))?;
        }

        self.registers.ip = ip.wrapping_add(size as u16);
        Ok(Instruction { opcode, a, b })
    }

    fn dispatch(&mut self) -> VmResult<Step> {
        let ip = self.registers.ip;
        let instruction = self.fetch()?;
        trace!("dispatch {} at {:#06x}", instruction.opcode.name(), ip);

        match instruction.opcode {
            Opcode::Nop => {}
            Opcode::Hlt => {
                debug!("machine halted at {:#06x}", self.registers.ip);
                self.state = State::Halted;
                return Ok(Step::Halted);
            }

            Opcode::MovAx => self.registers.ax = instruction.a,
            Opcode::MovBx => self.registers.bx = instruction.a,
            Opcode::MovCx => self.registers.cx = instruction.a,
            Opcode::MovDx => self.registers.dx = instruction.a,
            Opcode::MovSp => self.registers.sp = instruction.a,

            Opcode::Add => self.registers.ax = self.registers.ax.wrapping_add(self.registers.bx),
            Opcode::Sub => self.registers.ax = self.registers.ax.wrapping_sub(self.registers.bx),
            Opcode::Mul => self.registers.ax = self.registers.ax.wrapping_mul(self.registers.bx),
            Opcode::Div => {
                if self.registers.bx == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.registers.ax /= self.registers.bx;
            }

            Opcode::Ste => self.registers.set_flag(Flag::Equal, true),
            Opcode::Cle => self.registers.set_flag(Flag::Equal, false),
            Opcode::Stg => self.registers.set_flag(Flag::Greater, true),
            Opcode::Clg => self.registers.set_flag(Flag::Greater, false),
            Opcode::Sth => self.registers.set_flag(Flag::Higher, true),
            Opcode::Clh => self.registers.set_flag(Flag::Higher, false),
            Opcode::Stl => self.registers.set_flag(Flag::Lower, true),
            Opcode::Cll => self.registers.set_flag(Flag::Lower, false),

            Opcode::Push => {
                let reg = Self::selector(Opcode::Push, instruction.a)?;
                self.push(self.registers.general(reg))?;
            }
            Opcode::Pop => {
                let reg = Self::selector(Opcode::Pop, instruction.a)?;
                let value = self.pop()?;
                self.registers.set_general(reg, value);
            }
        }

        Ok(Step::Continue)
    }

    fn selector(opcode: Opcode, value: u16) -> VmResult<Reg> {
        Reg::from_word(value).ok_or(VmError::InvalidOperand {
            opcode: opcode.name(),
            value,
        })
    }

    /// Push a word onto the downward-growing stack. The overflow check
    /// runs before any write, so a failed push leaves memory untouched.
    fn push(&mut self, value: u16) -> VmResult<()> {
        if self.registers.sp < 2 {
            return Err(VmError::StackOverflow);
        }
        let sp = self.registers.sp - 2;
        self.memory.write_word(sp, value)?;
        self.registers.sp = sp;
        Ok(())
    }

    /// Pop a word off the stack, freeing its slot
    fn pop(&mut self) -> VmResult<u16> {
        if self.registers.sp as usize > self.memory.capacity().saturating_sub(2) {
            return Err(VmError::StackUnderflow);
        }
        let value = self.memory.read_word(self.registers.sp)?;
        self.registers.sp = self.registers.sp.wrapping_add(2);
        Ok(value)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(program: &[Instruction]) -> Machine {
        let mut machine = Machine::new();
        machine.load_program(program).unwrap();
        machine
    }

    #[test]
    fn test_load_serializes_at_address_zero() {
        let machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0x1234),
            Instruction::new(Opcode::Hlt),
        ]);
        assert_eq!(&machine.memory().as_bytes()[..4], [0x08, 0x34, 0x12, 0x02]);
    }

    #[test]
    fn test_load_twice_concatenates() {
        let mut machine = loaded(&[Instruction::with_operand(Opcode::MovCx, 1)]);
        machine
            .load_program(&[Instruction::new(Opcode::Hlt)])
            .unwrap();

        let report = machine.run().unwrap();
        assert_eq!(report.cx, 1);
    }

    #[test]
    fn test_fetch_advances_ip_by_instruction_size() {
        let mut machine = loaded(&[
            Instruction::new(Opcode::Nop),
            Instruction::with_operand(Opcode::MovAx, 7),
            Instruction::new(Opcode::Hlt),
        ]);

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.registers().ip, 1);
        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.registers().ip, 4);
    }

    #[test]
    fn test_step_after_halt_is_a_no_op() {
        let mut machine = loaded(&[Instruction::new(Opcode::Hlt)]);
        assert_eq!(machine.step(), Ok(Step::Halted));
        assert_eq!(machine.state(), State::Halted);

        let registers = machine.registers().clone();
        assert_eq!(machine.step(), Ok(Step::Halted));
        assert_eq!(machine.registers(), &registers);
    }

    #[test]
    fn test_arithmetic_wraps_at_sixteen_bits() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0xFFFF),
            Instruction::with_operand(Opcode::MovBx, 0x0002),
            Instruction::new(Opcode::Add),
            Instruction::new(Opcode::Hlt),
        ]);
        assert_eq!(machine.run().unwrap().ax, 0x0001);

        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0x0001),
            Instruction::with_operand(Opcode::MovBx, 0x0003),
            Instruction::new(Opcode::Sub),
            Instruction::new(Opcode::Hlt),
        ]);
        assert_eq!(machine.run().unwrap().ax, 0xFFFE);
    }

    #[test]
    fn test_arithmetic_never_mutates_flags() {
        let mut machine = loaded(&[
            Instruction::new(Opcode::Ste),
            Instruction::with_operand(Opcode::MovAx, 9),
            Instruction::with_operand(Opcode::MovBx, 3),
            Instruction::new(Opcode::Add),
            Instruction::new(Opcode::Mul),
            Instruction::new(Opcode::Div),
            Instruction::new(Opcode::Hlt),
        ]);
        machine.run().unwrap();
        assert_eq!(machine.registers().flags, Flag::Equal.mask());
    }

    #[test]
    fn test_div_by_zero_faults_without_touching_ax() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0x0040),
            Instruction::new(Opcode::Div),
            Instruction::new(Opcode::Hlt),
        ]);

        assert_eq!(machine.run(), Err(VmError::DivisionByZero));
        assert_eq!(machine.state(), State::Faulted);
        assert_eq!(machine.registers().ax, 0x0040);
    }

    #[test]
    fn test_push_pop_restores_stack_pointer() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovDx, 0xBEEF),
            Instruction::push(Reg::Dx),
            Instruction::pop(Reg::Ax),
            Instruction::new(Opcode::Hlt),
        ]);

        let report = machine.run().unwrap();
        assert_eq!(report.ax, 0xBEEF);
        assert_eq!(report.sp, 0xFFFF);
        assert_eq!(report.dx, 0xBEEF);
    }

    #[test]
    fn test_push_writes_little_endian_below_sp() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0xABCD),
            Instruction::push(Reg::Ax),
            Instruction::new(Opcode::Hlt),
        ]);
        machine.run().unwrap();

        assert_eq!(machine.registers().sp, 0xFFFD);
        assert_eq!(machine.memory().read(0xFFFD), Ok(0xCD));
        assert_eq!(machine.memory().read(0xFFFE), Ok(0xAB));
    }

    #[test]
    fn test_push_overflow_does_not_modify_memory() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovSp, 0x0001),
            Instruction::push(Reg::Ax),
            Instruction::new(Opcode::Hlt),
        ]);
        let before = machine.memory().clone();

        assert_eq!(machine.run(), Err(VmError::StackOverflow));
        assert_eq!(machine.state(), State::Faulted);
        assert_eq!(machine.memory(), &before);
    }

    #[test]
    fn test_pop_on_empty_stack_underflows() {
        let mut machine = loaded(&[
            Instruction::pop(Reg::Ax),
            Instruction::new(Opcode::Hlt),
        ]);
        assert_eq!(machine.run(), Err(VmError::StackUnderflow));
    }

    #[test]
    fn test_bad_register_selector_is_invalid_operand() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::Push, 0x0009),
            Instruction::new(Opcode::Hlt),
        ]);
        assert_eq!(
            machine.run(),
            Err(VmError::InvalidOperand {
                opcode: "PUSH",
                value: 0x0009,
            })
        );
    }

    #[test]
    fn test_unknown_opcode_byte_is_illegal_instruction() {
        let mut machine = Machine::new();
        machine.memory_mut().write(0, 0x7F).unwrap();
        assert_eq!(machine.run(), Err(VmError::IllegalInstruction(0x7F)));
        assert_eq!(machine.state(), State::Faulted);
    }

    #[test]
    fn test_halt_report_captures_stack_tail() {
        let mut machine = loaded(&[
            Instruction::with_operand(Opcode::MovAx, 0xABCD),
            Instruction::push(Reg::Ax),
            Instruction::new(Opcode::Hlt),
        ]);
        let report = machine.run().unwrap();

        assert_eq!(report.stack_tail.len(), STACK_TAIL_LEN);
        // The pushed word sits at 0xFFFD..0xFFFF, which the 32-byte tail
        // (0xFFE0..) sees at offsets 29 and 30.
        assert_eq!(report.stack_tail[29], 0xCD);
        assert_eq!(report.stack_tail[30], 0xAB);
    }

    #[test]
    fn test_halt_report_display_is_hex_dumped() {
        let mut machine = loaded(&[Instruction::new(Opcode::Hlt)]);
        let rendered = machine.run().unwrap().to_string();

        assert!(rendered.starts_with("AX: 0x0000"));
        assert!(rendered.ends_with('\n'));
        assert!(rendered.lines().nth(1).unwrap().contains("00 00 00"));
    }
}
