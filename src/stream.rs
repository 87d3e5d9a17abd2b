//! Byte stream the demuxer reads through.
//!
//! Any `Read + Seek` type is a `ByteStream`. `SubStream` exposes
//! a sub-range of a larger stream (e.g. a movie stored inside a resource archive)
//! as its own zero-based stream, so that chunk offsets
//! relative to the embedded movie resolve without correction.

use std::io::{Read, Seek, SeekFrom};

/// Seekable byte stream with `read`/`seek`/`tell`/`len`.
pub trait ByteStream: Read + Seek {
    /// Current position.
    fn tell(&mut self) -> std::io::Result<u64> {
        self.stream_position()
    }

    /// Total size in bytes. Restores the current position.
    fn byte_len(&mut self) -> std::io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if pos != len {
            self.seek(SeekFrom::Start(pos))?;
        }
        Ok(len)
    }

    /// Seek to absolute position `pos`.
    fn seek_to(&mut self, pos: u64) -> std::io::Result<()> {
        self.seek(SeekFrom::Start(pos)).map(|_| ())
    }
}

impl<T: Read + Seek + ?Sized> ByteStream for T {}

/// Read-only view of `[start, start + len)` within an outer stream.
#[derive(Debug)]
pub struct SubStream<S> {
    inner: S,
    start: u64,
    len: u64,
    /// Position relative to `start`.
    pos: u64,
}

impl<S: Read + Seek> SubStream<S> {
    pub fn new(mut inner: S, start: u64, len: u64) -> std::io::Result<Self> {
        inner.seek(SeekFrom::Start(start))?;
        Ok(Self { inner, start, len, pos: 0 })
    }

    /// Absolute offset of the view in the outer stream.
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read + Seek> Read for SubStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let rem = self.len.saturating_sub(self.pos);
        if rem == 0 {
            return Ok(0)
        }
        let max = (buf.len() as u64).min(rem) as usize;
        self.inner.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.inner.read(&mut buf[..max])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<S: Read + Seek> Seek for SubStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(rel) => self.len.checked_add_signed(rel),
            SeekFrom::Current(rel) => self.pos.checked_add_signed(rel),
        };
        match new_pos {
            Some(p) => {
                self.pos = p;
                Ok(p)
            },
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "invalid seek to a negative position",
            )),
        }
    }
}
