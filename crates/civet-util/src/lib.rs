//! # Civet Util
//!
//! General-purpose byte and formatting helpers. These are collaborators of
//! the virtual CPU, not part of its core: the machine consumes only
//! [`hex_dump`] when it renders a halt report, and the rest stand on their
//! own.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

use std::fmt::Write;

/// Format bytes as two hex digits each, `delim`-separated and
/// newline-terminated
pub fn hex_dump(bytes: &[u8], delim: char) -> String {
    let mut out = String::with_capacity(bytes.len() * 3 + 1);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(delim);
        }
        write!(&mut out, "{byte:02x}").unwrap();
    }
    out.push('\n');
    out
}

/// Copy `src` into `dst`, truncating to the shorter of the two; returns the
/// number of bytes copied
pub fn copy(dst: &mut [u8], src: &[u8]) -> usize {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}

/// Zero a byte region
pub fn zero(buf: &mut [u8]) {
    buf.fill(0);
}

/// Convert a 16-bit value from network (big-endian) byte order to host order
#[inline]
pub const fn net_to_host16(value: u16) -> u16 {
    u16::from_be(value)
}

/// Render a 32-bit address as dotted decimal, highest octet first
pub fn dotted(addr: u32) -> String {
    let [a, b, c, d] = addr.to_be_bytes();
    format!("{a}.{b}.{c}.{d}")
}
