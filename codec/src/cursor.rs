//! Endian-aware byte cursors over in-memory data:
//! [`Source`] for reading from a borrowed slice
//! and [`Sink`] for writing into a growable buffer.

use byteordered::byteorder::{BigEndian, ByteOrder, LittleEndian};
use byteordered::Endianness;
use dcmio_core::Tag;
use snafu::{Backtrace, Snafu};

/// Error type for cursor operations.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A read went past the end of the data.
    #[snafu(display(
        "reading {} bytes at position {} goes past the end ({} remaining)",
        needed,
        position,
        remaining
    ))]
    OutOfBounds {
        position: usize,
        needed: usize,
        remaining: usize,
        backtrace: Backtrace,
    },
    /// A seek moved outside the data.
    #[snafu(display("seek by {} from position {} is out of range (length {})", delta, position, len))]
    SeekOutOfRange {
        position: usize,
        delta: i64,
        len: usize,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A read cursor over a borrowed byte slice,
/// with a position and a byte order for multi-byte reads.
///
/// Sub-regions can be split off with [`take`](Source::take):
/// the returned cursor covers exactly the requested span
/// and shares no position state with its parent,
/// which advances past the span.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    data: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> Source<'a> {
    /// Create a new cursor over the full slice.
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Source {
            data,
            pos: 0,
            endianness,
        }
    }

    /// The current byte order.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Replace the byte order for subsequent reads.
    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Run `f` with the given byte order,
    /// then restore the previous one.
    pub fn with_endianness<T>(
        &mut self,
        endianness: Endianness,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = self.endianness;
        self.endianness = endianness;
        let out = f(self);
        self.endianness = previous;
        out
    }

    /// The current position, in bytes from the start of the region.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor has reached the end of its region.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Read the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return OutOfBoundsSnafu {
                position: self.pos,
                needed: n,
                remaining: self.remaining(),
            }
            .fail();
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Split off an independent cursor over the next `n` bytes,
    /// advancing this cursor past them.
    pub fn take(&mut self, n: usize) -> Result<Source<'a>> {
        let data = self.read_bytes(n)?;
        Ok(Source {
            data,
            pos: 0,
            endianness: self.endianness,
        })
    }

    /// Advance past the next `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Move the position by a relative amount, in either direction.
    pub fn seek(&mut self, delta: i64) -> Result<()> {
        let target = self.pos as i64 + delta;
        if target < 0 || target > self.data.len() as i64 {
            return SeekOutOfRangeSnafu {
                position: self.pos,
                delta,
                len: self.data.len(),
            }
            .fail();
        }
        self.pos = target as usize;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_bytes(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u16(bytes),
            Endianness::Big => BigEndian::read_u16(bytes),
        })
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u32(bytes),
            Endianness::Big => BigEndian::read_u32(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(match self.endianness {
            Endianness::Little => LittleEndian::read_u64(bytes),
            Endianness::Big => BigEndian::read_u64(bytes),
        })
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_u64().map(|v| v as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_u64().map(f64::from_bits)
    }

    /// Read an attribute tag: a group number and an element number.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag(group, element))
    }

    /// Read `n` bytes as text, replacing invalid UTF-8 sequences.
    pub fn read_str(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read `n` bytes as an upper case hexadecimal string,
    /// two digits per byte.
    pub fn read_hex(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        let mut out = String::with_capacity(n * 2);
        for b in bytes {
            out.push_str(&format!("{:02X}", b));
        }
        Ok(out)
    }
}

/// A write cursor over a growable byte buffer,
/// with a position and a byte order for multi-byte writes.
///
/// Writing below the buffer's length overwrites in place,
/// then extends past the end.
#[derive(Debug, Clone)]
pub struct Sink {
    buf: Vec<u8>,
    pos: usize,
    endianness: Endianness,
}

impl Sink {
    /// Create a new empty sink.
    pub fn new(endianness: Endianness) -> Self {
        Sink {
            buf: Vec::new(),
            pos: 0,
            endianness,
        }
    }

    /// Create a new empty sink with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize, endianness: Endianness) -> Self {
        Sink {
            buf: Vec::with_capacity(capacity),
            pos: 0,
            endianness,
        }
    }

    /// The current byte order.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Replace the byte order for subsequent writes.
    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Run `f` with the given byte order,
    /// then restore the previous one.
    pub fn with_endianness<T>(
        &mut self,
        endianness: Endianness,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = self.endianness;
        self.endianness = endianness;
        let out = f(self);
        self.endianness = previous;
        out
    }

    /// The current position, in bytes from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The written content.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Unwrap the written content.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Move the position by a relative amount, in either direction,
    /// within the written content.
    pub fn seek(&mut self, delta: i64) -> Result<()> {
        let target = self.pos as i64 + delta;
        if target < 0 || target > self.buf.len() as i64 {
            return SeekOutOfRangeSnafu {
                position: self.pos,
                delta,
                len: self.buf.len(),
            }
            .fail();
        }
        self.pos = target as usize;
        Ok(())
    }

    /// Write the given bytes at the current position,
    /// overwriting existing content and extending as needed.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.pos < self.buf.len() {
            let overlap = (self.buf.len() - self.pos).min(bytes.len());
            self.buf[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
            self.buf.extend_from_slice(&bytes[overlap..]);
        } else {
            self.buf.extend_from_slice(bytes);
        }
        self.pos += bytes.len();
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&[value as u8]);
    }

    pub fn write_u16(&mut self, value: u16) {
        let mut bytes = [0; 2];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u16(&mut bytes, value),
            Endianness::Big => BigEndian::write_u16(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        let mut bytes = [0; 4];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u32(&mut bytes, value),
            Endianness::Big => BigEndian::write_u32(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_u64(&mut self, value: u64) {
        let mut bytes = [0; 8];
        match self.endianness {
            Endianness::Little => LittleEndian::write_u64(&mut bytes, value),
            Endianness::Big => BigEndian::write_u64(&mut bytes, value),
        }
        self.write_bytes(&bytes);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Write an attribute tag: a group number and an element number.
    pub fn write_tag(&mut self, tag: Tag) {
        self.write_u16(tag.group());
        self.write_u16(tag.element());
    }

    /// Write a string's UTF-8 bytes.
    pub fn write_str(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Append another sink's written content at the current position.
    pub fn append(&mut self, other: Sink) {
        self.write_bytes(other.as_bytes());
    }
}
