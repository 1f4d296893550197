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

//! RPC record reassembly and message decoding.
//!
//! The message grammar is a discriminated union: CALL carries program
//! identity plus credential and verifier, REPLY branches over
//! accepted/denied and their sub-statuses. The whole header decodes
//! validly or the record is abandoned; no partial message escapes.

use std::borrow::Cow;
use std::fmt;

use tracing::trace;

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::rpc::creds::{decode_credential, Credential};
use crate::rpc::types::*;
use crate::xdr::XdrCursor;

/// TCP record marking header, 1 bit last-fragment flag and a 31 bit
/// length. `size` carries the running tally of reassembled bytes, not
/// just the final fragment's own length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FragmentHeader {
    pub last_fragment: bool,
    pub size: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RpcMessage {
    /// Present on TCP records only.
    pub fragment: Option<FragmentHeader>,
    pub xid: u32,
    pub body: RpcBody,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RpcBody {
    Call(RpcCall),
    Reply(RpcReply),
}

#[derive(Debug, PartialEq, Eq)]
pub struct RpcCall {
    pub rpc_version: u32,
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub credential: Credential,
    pub verifier: Credential,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RpcReply {
    pub reply_status: u32,
    pub body: ReplyBody,
    /// Program identity recovered from the matching call, if that call
    /// was seen earlier in the same pass.
    pub prog: Option<ReplyProg>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReplyProg {
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub call_index: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ReplyBody {
    Accepted(AcceptedReply),
    Denied(RejectedReply),
}

#[derive(Debug, PartialEq, Eq)]
pub struct AcceptedReply {
    pub verifier: Credential,
    pub accepted_status: u32,
    pub prog_mismatch: Option<MismatchInfo>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RejectedReply {
    RpcMismatch(MismatchInfo),
    AuthError(u32),
}

/// Version range a server reported alongside a mismatch status.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MismatchInfo {
    pub low: u32,
    pub high: u32,
}

impl RpcMessage {
    pub fn is_call(&self) -> bool {
        matches!(self.body, RpcBody::Call(_))
    }

    /// Program identity of this message: direct for calls, correlated
    /// for replies.
    pub fn prog_info(&self) -> Option<(u32, u32, u32)> {
        match &self.body {
            RpcBody::Call(call) => Some((call.program, call.version, call.procedure)),
            RpcBody::Reply(reply) => reply
                .prog
                .map(|p| (p.program, p.version, p.procedure)),
        }
    }
}

impl fmt::Display for RpcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mtype = match self.body {
            RpcBody::Call(_) => RPC_MSG_CALL,
            RpcBody::Reply(_) => RPC_MSG_REPLY,
        };
        match self.prog_info() {
            Some((program, version, procedure)) => write!(
                f,
                "RPC {:<5} program: {}, version: {}, procedure: {}, xid: 0x{:08x}",
                msg_type_string(mtype).to_lowercase(),
                program,
                version,
                procedure,
                self.xid
            ),
            None => write!(
                f,
                "RPC {:<5} xid: 0x{:08x}",
                msg_type_string(mtype).to_lowercase(),
                self.xid
            ),
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum Reassembly<'a> {
    Message(FragmentHeader, Cow<'a, [u8]>),
    /// A zero sized record mark: an idle read, not an error.
    Empty,
}

/// Strip TCP record marking, concatenating fragments into one logical
/// message buffer. A non-final fragment whose declared span runs past
/// the capture is treated as the tail of the message.
pub(crate) fn reassemble_tcp(data: &[u8]) -> Result<Reassembly<'_>, DecodeError> {
    let mut cur = XdrCursor::new(data);
    let mut acc: Vec<u8> = Vec::new();
    loop {
        let marker = cur.uint32()?;
        let last_fragment = marker >> 31 == 1;
        let frag_len = (marker & 0x7fff_ffff) as usize;
        let size = frag_len + acc.len();
        if size == 0 {
            return Ok(Reassembly::Empty);
        }
        let rest = cur.as_slice();
        if !last_fragment && frag_len < rest.len() {
            trace!("saving fragment of {} bytes", frag_len);
            acc.extend_from_slice(&rest[..frag_len]);
            cur = XdrCursor::new(&rest[frag_len..]);
            continue;
        }
        let hdr = FragmentHeader {
            last_fragment,
            size: size as u32,
        };
        let buf = if acc.is_empty() {
            Cow::Borrowed(rest)
        } else {
            acc.extend_from_slice(rest);
            Cow::Owned(acc)
        };
        return Ok(Reassembly::Message(hdr, buf));
    }
}

/// Decode one RPC message at the cursor. On any error the record is
/// not RPC; the caller still owns the untouched input bytes.
pub(crate) fn decode_message(
    cur: &mut XdrCursor<'_>, config: &DecoderConfig, fragment: Option<FragmentHeader>,
) -> Result<RpcMessage, DecodeError> {
    let xid = cur.uint32()?;
    let mtype = cur.uint32()?;
    let body = match mtype {
        RPC_MSG_CALL => RpcBody::Call(decode_call(cur, config)?),
        RPC_MSG_REPLY => RpcBody::Reply(decode_reply(cur, config)?),
        _ => {
            trace!("message type {} is not CALL or REPLY", mtype);
            return Err(DecodeError::UnrecognizedDiscriminant);
        }
    };
    Ok(RpcMessage {
        fragment,
        xid,
        body,
    })
}

fn decode_call(cur: &mut XdrCursor<'_>, config: &DecoderConfig) -> Result<RpcCall, DecodeError> {
    let rpc_version = cur.uint32()?;
    let program = cur.uint32()?;
    let version = cur.uint32()?;
    let procedure = cur.uint32()?;
    let credential = decode_credential(cur, config, false)?;
    let verifier = decode_credential(cur, config, true)?;
    // byte aligned garbage on port 2049 can look like a call this far
    if rpc_version != RPC_VERSION {
        trace!("rpc version {} rejected", rpc_version);
        return Err(DecodeError::UnrecognizedDiscriminant);
    }
    Ok(RpcCall {
        rpc_version,
        program,
        version,
        procedure,
        credential,
        verifier,
    })
}

fn decode_reply(cur: &mut XdrCursor<'_>, config: &DecoderConfig) -> Result<RpcReply, DecodeError> {
    let reply_status = cur.uint32()?;
    let body = match reply_status {
        MSG_ACCEPTED => {
            let verifier = decode_credential(cur, config, true)?;
            let accepted_status = cur.uint32()?;
            let prog_mismatch = if accepted_status == ACCEPT_PROG_MISMATCH {
                Some(MismatchInfo {
                    low: cur.uint32()?,
                    high: cur.uint32()?,
                })
            } else if !accept_stat_known(accepted_status) {
                trace!("accept_stat {} unknown", accept_stat_string(accepted_status));
                return Err(DecodeError::UnrecognizedDiscriminant);
            } else {
                None
            };
            ReplyBody::Accepted(AcceptedReply {
                verifier,
                accepted_status,
                prog_mismatch,
            })
        }
        MSG_DENIED => {
            let rejected_status = cur.uint32()?;
            match rejected_status {
                REJECT_RPC_MISMATCH => ReplyBody::Denied(RejectedReply::RpcMismatch(
                    MismatchInfo {
                        low: cur.uint32()?,
                        high: cur.uint32()?,
                    },
                )),
                REJECT_AUTH_ERROR => {
                    let auth_status = cur.uint32()?;
                    if !auth_stat_known(auth_status) {
                        trace!("auth_stat {} unknown", auth_stat_string(auth_status));
                        return Err(DecodeError::UnrecognizedDiscriminant);
                    }
                    ReplyBody::Denied(RejectedReply::AuthError(auth_status))
                }
                _ => return Err(DecodeError::UnrecognizedDiscriminant),
            }
        }
        _ => return Err(DecodeError::UnrecognizedDiscriminant),
    };
    Ok(RpcReply {
        reply_status,
        body,
        prog: None,
    })
}
