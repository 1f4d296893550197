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

//! Boundary to the NFSv4 COMPOUND codec.
//!
//! The RPC layer establishes where the payload starts and which of the
//! four COMPOUND shapes it must be; the codec itself lives outside
//! this crate.

use crate::error::DecodeError;

/// NFSv4 COMPOUND argument/result codec.
///
/// `position` must report how many payload bytes the most recent
/// decode consumed, so the dispatcher can advance past them before the
/// trailing security checksum is handled.
pub trait NfsCodec {
    /// Decoded COMPOUND arguments or results tree.
    type Compound;

    /// Strict opcode checking. When off, forward-incompatible opcodes
    /// must not fail the decode.
    fn set_check_enum(&mut self, check: bool);

    /// Cursor position after the last decode, in bytes.
    fn position(&self) -> usize;

    fn compound4_args(&mut self, data: &[u8]) -> Result<Self::Compound, DecodeError>;

    fn cb_compound4_args(&mut self, data: &[u8]) -> Result<Self::Compound, DecodeError>;

    fn compound4_res(&mut self, data: &[u8]) -> Result<Self::Compound, DecodeError>;

    fn cb_compound4_res(&mut self, data: &[u8]) -> Result<Self::Compound, DecodeError>;
}
