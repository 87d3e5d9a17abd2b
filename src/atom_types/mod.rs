//! Leaf atom structures.
//!
//! Each type reads itself from an `AtomPayload`,
//! so table sizes are always checked against the atom bounds.

mod cmov;
mod co64;
mod elst;
mod esds;
mod hdlr;
mod mdhd;
mod mvhd;
mod stco;
mod stsc;
mod stsd;
mod stss;
mod stsz;
mod stts;
mod tkhd;

use binrw::{BinRead, BinResult};

use crate::{consts::FIXED_ONE, Rational};

pub use cmov::Cmov;
pub use co64::Co64;
pub use elst::{Elst, EditListEntry};
pub use esds::Esds;
pub use hdlr::Hdlr;
pub use mdhd::Mdhd;
pub use mvhd::Mvhd;
pub use stco::Stco;
pub use stsc::{Stsc, SampleToChunk};
pub use stsd::{Stsd, StsdEntry};
pub use stss::Stss;
pub use stsz::{Stsz, SampleSize};
pub use stts::{Stts, TimeToSample};
pub use tkhd::Tkhd;

/// Reads a `u32` for version 0 atoms, `u64` for version 1.
#[binrw::parser(reader, endian)]
pub(crate) fn versioned_u64(version: u8) -> BinResult<u64> {
    match version {
        1 => u64::read_options(reader, endian, ()),
        _ => u32::read_options(reader, endian, ()).map(u64::from),
    }
}

/// Reads an `i32` for version 0 atoms, `i64` for version 1.
#[binrw::parser(reader, endian)]
pub(crate) fn versioned_i64(version: u8) -> BinResult<i64> {
    match version {
        1 => i64::read_options(reader, endian, ()),
        _ => i32::read_options(reader, endian, ()).map(i64::from),
    }
}

/// 3x3 transformation matrix in `mvhd` and `tkhd`.
///
/// ```ignore
/// | a b u |
/// | c d v |
/// | x y w |
/// ```
///
/// `u`, `v` and `w` are 2.30 fixed point, the rest 16.16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(big)]
pub struct Matrix {
    pub a: i32,
    pub b: i32,
    pub u: i32,
    pub c: i32,
    pub d: i32,
    pub v: i32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: FIXED_ONE,
            b: 0,
            u: 0,
            c: 0,
            d: FIXED_ONE,
            v: 0,
            x: 0,
            y: 0,
            w: 1 << 30,
        }
    }
}

impl Matrix {
    /// Horizontal display scale, i.e. the inverse of `a`.
    /// Identity if `a` is zero.
    pub fn x_scale(&self) -> Rational {
        match self.a {
            0 => Rational::ONE,
            a => Rational::new(FIXED_ONE as i64, a as i64),
        }
    }

    /// Vertical display scale, i.e. the inverse of `d`.
    /// Identity if `d` is zero.
    pub fn y_scale(&self) -> Rational {
        match self.d {
            0 => Rational::ONE,
            d => Rational::new(FIXED_ONE as i64, d as i64),
        }
    }
}
