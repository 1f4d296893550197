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

use thiserror::Error;

/// Decode failure classes.
///
/// Any of these raised while the RPC header itself is being decoded
/// collapses the whole record to "not RPC": the caller gets the error
/// and keeps its untouched input. Failures past the header, in the
/// payload stage, are isolated and never invalidate the header decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes remain than a field declares.
    #[error("input shorter than declared field")]
    Truncated,
    /// A wire length field exceeds a caller-imposed maximum.
    #[error("length exceeds configured maximum")]
    LimitExceeded,
    /// An enumerated wire value outside its known set.
    #[error("unrecognized wire discriminant")]
    UnrecognizedDiscriminant,
    /// Transport or program number not subject to RPC decoding.
    #[error("not applicable to RPC decoding")]
    NotApplicable,
    /// The external NFS codec failed on the payload bytes.
    #[error("payload not decodable")]
    PayloadDecodeFailed,
}
