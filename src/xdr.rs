/* Copyright (C) 2024-2025 Open Information Security Foundation
 *
 * You can copy, redistribute or modify this Program under the terms of
 * the GNU General Public License version 2 as published by the Free
 * Software Foundation.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * version 2 along with this program; if not, write to the Free Software
 * Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA
 * 02110-1301, USA.
 */

//! XDR primitive decoding (RFC 4506).
//!
//! [`XdrCursor`] narrows a borrowed byte slice as fields are consumed.
//! Every operation is all or nothing: on failure the cursor position
//! is unchanged, so a caller can abandon a message and fall back to
//! its own heuristics on the untouched input.

use nom7::bytes::complete::take;
use nom7::number::complete::{be_u16, be_u32, be_u64, be_u8};

use crate::error::DecodeError;

type NomError<'a> = nom7::error::Error<&'a [u8]>;

/// How to obtain the length of a string, or the element count of an
/// array, or the continuation flag of a list.
#[derive(Clone, Copy)]
pub enum LengthSpec {
    /// The length is known up front and nothing is read for it.
    Fixed(u32),
    /// The length is decoded from the wire.
    Decoder(LengthDecoder),
}

pub type LengthDecoder = fn(&mut XdrCursor<'_>) -> Result<u32, DecodeError>;

impl Default for LengthSpec {
    fn default() -> Self {
        LengthSpec::Decoder(len_u32)
    }
}

impl LengthSpec {
    fn resolve(&self, cur: &mut XdrCursor<'_>) -> Result<u32, DecodeError> {
        match *self {
            LengthSpec::Fixed(n) => Ok(n),
            LengthSpec::Decoder(f) => f(cur),
        }
    }
}

/// Length decoder reading a big-endian uint32, the XDR default.
pub fn len_u32(cur: &mut XdrCursor<'_>) -> Result<u32, DecodeError> {
    cur.uint32()
}

/// Length decoder reading a big-endian uint16.
pub fn len_u16(cur: &mut XdrCursor<'_>) -> Result<u32, DecodeError> {
    cur.uint16().map(u32::from)
}

/// Length decoder reading a single byte.
pub fn len_u8(cur: &mut XdrCursor<'_>) -> Result<u32, DecodeError> {
    cur.uint8().map(u32::from)
}

pub struct XdrCursor<'a> {
    data: &'a [u8],
}

impl<'a> XdrCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        XdrCursor { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// The undecoded tail of the input.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    fn atomic<T, F>(&mut self, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Self) -> Result<T, DecodeError>,
    {
        let save = self.data;
        match f(self) {
            Ok(v) => Ok(v),
            Err(e) => {
                self.data = save;
                Err(e)
            }
        }
    }

    /// Take the next `size` bytes. With `pad > 0` the consumed length
    /// is rounded up to the next multiple of `pad` and the fill bytes
    /// are discarded; a fill tail cut off by the end of the capture is
    /// tolerated.
    pub fn raw(&mut self, size: usize, pad: usize) -> Result<&'a [u8], DecodeError> {
        let (rest, buf) =
            take::<_, _, NomError<'a>>(size)(self.data).map_err(|_| DecodeError::Truncated)?;
        let mut fill = 0;
        if pad > 0 {
            fill = (pad - size % pad) % pad;
            if fill > rest.len() {
                fill = rest.len();
            }
        }
        self.data = &rest[fill..];
        Ok(buf)
    }

    pub fn uint8(&mut self) -> Result<u8, DecodeError> {
        let (rest, v) =
            be_u8::<_, NomError<'a>>(self.data).map_err(|_| DecodeError::Truncated)?;
        self.data = rest;
        Ok(v)
    }

    pub fn uint16(&mut self) -> Result<u16, DecodeError> {
        let (rest, v) =
            be_u16::<_, NomError<'a>>(self.data).map_err(|_| DecodeError::Truncated)?;
        self.data = rest;
        Ok(v)
    }

    pub fn uint32(&mut self) -> Result<u32, DecodeError> {
        let (rest, v) =
            be_u32::<_, NomError<'a>>(self.data).map_err(|_| DecodeError::Truncated)?;
        self.data = rest;
        Ok(v)
    }

    pub fn uint64(&mut self) -> Result<u64, DecodeError> {
        let (rest, v) =
            be_u64::<_, NomError<'a>>(self.data).map_err(|_| DecodeError::Truncated)?;
        self.data = rest;
        Ok(v)
    }

    /// Read the next uint32 without consuming it.
    pub fn peek_uint32(&self) -> Result<u32, DecodeError> {
        let (_, v) =
            be_u32::<_, NomError<'a>>(self.data).map_err(|_| DecodeError::Truncated)?;
        Ok(v)
    }

    /// Variable length opaque: uint32 length prefix, body padded to 4.
    /// `max > 0` bounds the declared length.
    pub fn opaque(&mut self, max: u32) -> Result<&'a [u8], DecodeError> {
        self.atomic(|c| {
            let size = c.uint32()?;
            if max > 0 && size > max {
                return Err(DecodeError::LimitExceeded);
            }
            c.raw(size as usize, 4)
        })
    }

    /// Fixed length opaque: no length prefix, body padded to 4.
    pub fn fixed_opaque(&mut self, size: usize) -> Result<&'a [u8], DecodeError> {
        self.raw(size, 4)
    }

    /// String with a caller-chosen length field width and padding.
    pub fn string(
        &mut self, ltype: LengthSpec, pad: usize, max: u32,
    ) -> Result<&'a [u8], DecodeError> {
        self.atomic(|c| {
            let slen = ltype.resolve(c)?;
            if max > 0 && slen > max {
                return Err(DecodeError::LimitExceeded);
            }
            c.raw(slen as usize, pad)
        })
    }

    /// Counted array: decode the element count via `ltype`, then that
    /// many items in wire order. The count check runs before any item
    /// is read.
    pub fn array<T, F>(
        &mut self, mut item: F, ltype: LengthSpec, max: u32,
    ) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut XdrCursor<'a>) -> Result<T, DecodeError>,
    {
        self.atomic(|c| {
            let count = ltype.resolve(c)?;
            if max > 0 && count > max {
                return Err(DecodeError::LimitExceeded);
            }
            // the count is attacker controlled, cap the preallocation
            let mut items = Vec::with_capacity(std::cmp::min(count as usize, 64));
            for _ in 0..count {
                items.push(item(c)?);
            }
            Ok(items)
        })
    }

    /// Open-ended list: a continuation flag decoded via `ltype` before
    /// each element, zero terminates. This is the sender driven linked
    /// list idiom, as opposed to [`XdrCursor::array`]'s counted one.
    pub fn list<T, F>(&mut self, mut item: F, ltype: LengthSpec) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut XdrCursor<'a>) -> Result<T, DecodeError>,
    {
        self.atomic(|c| {
            let mut items = Vec::new();
            loop {
                if ltype.resolve(c)? == 0 {
                    break;
                }
                items.push(item(c)?);
            }
            Ok(items)
        })
    }
}
