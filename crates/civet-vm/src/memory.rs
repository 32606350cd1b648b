//! Flat machine memory

use crate::error::{VmError, VmResult};

/// Fixed-capacity, bounds-checked byte memory
///
/// Every access is checked against capacity; an out-of-range address fails
/// with [`VmError::OutOfBounds`] rather than wrapping, clamping, or
/// corrupting adjacent state. The capacity is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Nominal address space: 64 KiB, covering every 16-bit address
    pub const SIZE: usize = 65536;

    /// Create a zeroed memory of the nominal capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::SIZE)
    }

    /// Create a zeroed memory of a custom capacity.
    ///
    /// The nominal space covers every `u16` address; a smaller capacity
    /// makes the out-of-bounds path reachable for callers that want it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
        }
    }

    /// Capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Read one byte
    pub fn read(&self, addr: u16) -> VmResult<u8> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(VmError::OutOfBounds { addr: addr as usize })
    }

    /// Write one byte
    pub fn write(&mut self, addr: u16, value: u8) -> VmResult<()> {
        let addr = addr as usize;
        let slot = self
            .bytes
            .get_mut(addr)
            .ok_or(VmError::OutOfBounds { addr })?;
        *slot = value;
        Ok(())
    }

    /// Read a little-endian word
    pub fn read_word(&self, addr: u16) -> VmResult<u16> {
        let base = addr as usize;
        if base + 1 >= self.bytes.len() {
            return Err(VmError::OutOfBounds { addr: base + 1 });
        }
        Ok(u16::from_le_bytes([self.bytes[base], self.bytes[base + 1]]))
    }

    /// Write a little-endian word; on failure nothing is written
    pub fn write_word(&mut self, addr: u16, word: u16) -> VmResult<()> {
        let base = addr as usize;
        if base + 1 >= self.bytes.len() {
            return Err(VmError::OutOfBounds { addr: base + 1 });
        }
        let [lo, hi] = word.to_le_bytes();
        self.bytes[base] = lo;
        self.bytes[base + 1] = hi;
        Ok(())
    }

    /// Raw view of the whole buffer, for bulk inspection
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
