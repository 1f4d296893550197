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

//! ONC RPC capture decoder.
//!
//! Decodes RPCv2 messages (RFC 1831/5531) out of per-record capture
//! payloads: TCP record-mark reassembly, header and credential
//! parsing, xid keyed call/reply correlation, and dispatch of NFSv4
//! COMPOUND payloads to an external codec.

#![allow(clippy::needless_return)]
#![allow(clippy::redundant_field_names)]
#![allow(clippy::manual_range_contains)]

pub mod config;
pub mod error;
pub mod gss;
pub mod nfs;
pub mod rpc;
pub mod xdr;

pub use config::DecoderConfig;
pub use error::DecodeError;
pub use gss::{NullSecurity, SecurityLayer};
pub use nfs::NfsCodec;
pub use rpc::creds::{AuthData, Credential};
pub use rpc::decoder::{RpcDecoder, RpcRecord, XidEntry};
pub use rpc::dispatch::classify_program;
pub use rpc::record::{
    FragmentHeader, ReplyBody, RpcBody, RpcCall, RpcMessage, RpcReply,
};
