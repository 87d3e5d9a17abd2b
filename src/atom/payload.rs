//! Bounded reader over a single leaf atom's payload.
//!
//! The payload is buffered in memory, so reads can never
//! go past the atom's declared size. Table readers check the
//! declared entry count against the remaining bytes before
//! allocating or looping.

use std::io::{Cursor, Read};

use binrw::{BinRead, BinReaderExt};

use crate::{stream::ByteStream, QtError};

use super::AtomHeader;

#[derive(Debug)]
pub struct AtomPayload {
    header: AtomHeader,
    cursor: Cursor<Vec<u8>>,
}

impl AtomPayload {
    /// Reads the payload for `header` from `stream`.
    /// Fails with `AtomTooLarge` if the payload exceeds `max` bytes.
    pub(crate) fn read<S: ByteStream>(
        stream: &mut S,
        header: &AtomHeader,
        max: u64,
    ) -> Result<Self, QtError> {
        let size = header.data_size();
        if size > max {
            return Err(QtError::AtomTooLarge {
                name: header.name.to_string(),
                size,
                max,
            })
        }
        stream.seek_to(header.data_offset())?;
        let mut buf = vec![0_u8; size as usize];
        stream.read_exact(&mut buf)?;

        Ok(Self::new(header.to_owned(), buf))
    }

    pub(crate) fn new(header: AtomHeader, data: Vec<u8>) -> Self {
        Self {
            header,
            cursor: Cursor::new(data),
        }
    }

    pub fn header(&self) -> &AtomHeader {
        &self.header
    }

    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pos(&self) -> u64 {
        self.cursor.position()
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.pos())
    }

    /// Read single Big Endian value.
    pub fn read_be<T>(&mut self) -> Result<T, QtError>
    where
        T: BinRead,
        <T as BinRead>::Args<'static>: Sized + Clone + Default,
    {
        Ok(self.cursor.read_be::<T>()?)
    }

    /// Read single Big Endian value that takes import arguments.
    pub fn read_args<T>(&mut self, args: <T as BinRead>::Args<'static>) -> Result<T, QtError>
    where
        T: BinRead,
    {
        Ok(self.cursor.read_be_args::<T>(args)?)
    }

    /// Reads the `version` byte and 24-bit `flags` that prefix
    /// most leaf atoms.
    pub fn version_flags(&mut self) -> Result<(u8, u32), QtError> {
        let vf = self.read_be::<u32>()?;
        Ok(((vf >> 24) as u8, vf & 0x00ff_ffff))
    }

    /// Reads `entries` fixed-width records.
    ///
    /// Fails with `TruncatedTable` before reading anything
    /// if fewer than `entries * width` bytes remain.
    pub fn read_table<T>(&mut self, entries: u32, width: u64) -> Result<Vec<T>, QtError>
    where
        T: BinRead,
        <T as BinRead>::Args<'static>: Sized + Clone + Default,
    {
        self.check_table(entries, width)?;
        (0..entries)
            .map(|_| self.read_be::<T>())
            .collect()
    }

    /// Checks that `entries * width` bytes remain.
    pub fn check_table(&self, entries: u32, width: u64) -> Result<(), QtError> {
        let needed = entries as u64 * width;
        let available = self.remaining();
        if needed > available {
            return Err(QtError::TruncatedTable {
                name: self.header.name.to_string(),
                entries: entries as u64,
                width,
                available,
            })
        }
        Ok(())
    }

    /// Read `len` bytes.
    pub fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>, QtError> {
        if len > self.remaining() {
            return Err(self.header.malformed())
        }
        let mut buf = vec![0_u8; len as usize];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: u64) -> Result<(), QtError> {
        if len > self.remaining() {
            return Err(self.header.malformed())
        }
        self.cursor.set_position(self.pos() + len);
        Ok(())
    }

    /// Remaining bytes as a slice, without consuming them.
    pub fn rest(&self) -> &[u8] {
        let pos = (self.pos() as usize).min(self.cursor.get_ref().len());
        &self.cursor.get_ref()[pos..]
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}
