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

//! Boundary to the RPCSEC_GSS token layer.
//!
//! The RPC decoder invokes both hooks on every record, whatever the
//! security flavor; an implementation inspects the message's
//! credential context to decide whether there is a wrapper to strip.
//! Token decode, verification and checksum math all live outside this
//! crate.

use bytes::Bytes;

use crate::rpc::record::RpcMessage;

pub trait SecurityLayer {
    /// Runs before payload dispatch. May strip a GSS data wrapper from
    /// the payload, returning the transformed buffer.
    fn decode_security_payload(&mut self, _msg: &RpcMessage, data: Bytes) -> Bytes {
        data
    }

    /// Runs after the NFS codec consumed its bytes. May verify and
    /// strip a trailing integrity checksum.
    fn decode_security_checksum(&mut self, _msg: &RpcMessage, data: Bytes) -> Bytes {
        data
    }
}

/// Pass-through security layer for captures without RPCSEC_GSS, or
/// when token handling is not wanted.
pub struct NullSecurity;

impl SecurityLayer for NullSecurity {}
