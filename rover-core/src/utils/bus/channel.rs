//! Byte-at-a-time access to a transfer, independent of bus role.
//!
//! The command codec reads and writes through `ByteChannel` and never sees bus status codes.
//! Bulk `read`/`write` stop at the first failed byte and report how many bytes moved; a short
//! count means the frame must be dropped, not applied partially.

use super::twi::{Twi, TwiRegisters};
use crate::utils::Error;

pub trait ByteChannel {
    /// Receive one byte. `last` marks the final byte the caller wants.
    fn get(&mut self, last: bool) -> Result<u8, Error>;
    /// Send one byte. `last` marks the terminal byte of the transfer.
    fn put(&mut self, byte: u8, last: bool) -> Result<(), Error>;
    /// Bytes moved through the channel so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf`, flagging its final byte as last. Returns the number of bytes received.
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len();
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.get(i + 1 == count) {
                Ok(byte) => *slot = byte,
                Err(_) => return i,
            }
        }
        count
    }

    /// Send `buf`; with `last` set its final byte ends the transfer. Returns the number sent.
    fn write(&mut self, buf: &[u8], last: bool) -> usize {
        let count = buf.len();
        for (i, &byte) in buf.iter().enumerate() {
            if self.put(byte, last && i + 1 == count).is_err() {
                return i;
            }
        }
        count
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let moved = self.read(buf);
        if moved < buf.len() {
            return Err(Error::IncompleteTransfer {
                moved,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8], last: bool) -> Result<(), Error> {
        let moved = self.write(buf, last);
        if moved < buf.len() {
            return Err(Error::IncompleteTransfer {
                moved,
                expected: buf.len(),
            });
        }
        Ok(())
    }
}

/// Channel over an open master transfer (after `send_to` or `request_from`).
pub struct MasterChannel<'a, R> {
    twi: &'a mut Twi<R>,
    moved: usize,
}

impl<'a, R: TwiRegisters> MasterChannel<'a, R> {
    pub fn new(twi: &'a mut Twi<R>) -> Self {
        Self { twi, moved: 0 }
    }
}

impl<R: TwiRegisters> ByteChannel for MasterChannel<'_, R> {
    fn get(&mut self, last: bool) -> Result<u8, Error> {
        let byte = self.twi.read_data(!last)?;
        self.moved += 1;
        Ok(byte)
    }

    fn put(&mut self, byte: u8, _last: bool) -> Result<(), Error> {
        self.twi.write_data(byte)?;
        self.moved += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.moved
    }
}

/// Channel over the transfer we are currently addressed in.
pub struct SlaveChannel<'a, R> {
    twi: &'a mut Twi<R>,
    moved: usize,
}

impl<'a, R: TwiRegisters> SlaveChannel<'a, R> {
    pub fn new(twi: &'a mut Twi<R>) -> Self {
        Self { twi, moved: 0 }
    }
}

impl<R: TwiRegisters> ByteChannel for SlaveChannel<'_, R> {
    fn get(&mut self, _last: bool) -> Result<u8, Error> {
        let byte = self.twi.read_byte()?;
        self.moved += 1;
        Ok(byte)
    }

    fn put(&mut self, byte: u8, last: bool) -> Result<(), Error> {
        self.twi.write_byte(byte, last)?;
        self.moved += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.moved
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let moved = self.twi.read(buf);
        self.moved += moved;
        moved
    }

    fn write(&mut self, buf: &[u8], last: bool) -> usize {
        let moved = self.twi.write(buf, last);
        self.moved += moved;
        moved
    }
}

/// Read-only channel over a frame already in memory.
pub struct SliceChannel<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceChannel<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

impl ByteChannel for SliceChannel<'_> {
    fn get(&mut self, _last: bool) -> Result<u8, Error> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(Error::IncompleteTransfer {
                moved: self.pos,
                expected: self.pos + 1,
            })?;
        self.pos += 1;
        Ok(byte)
    }

    fn put(&mut self, _byte: u8, _last: bool) -> Result<(), Error> {
        Err(Error::IncompleteTransfer {
            moved: 0,
            expected: 1,
        })
    }

    fn len(&self) -> usize {
        self.pos
    }
}
