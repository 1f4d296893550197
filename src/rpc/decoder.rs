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

//! Per-session RPC decoding and call/reply correlation.
//!
//! Replies carry no program identity on the wire, so the decoder keeps
//! a map from xid to the call's program, version and procedure and
//! copies that information onto each matching reply. Records must be
//! fed in capture order; a reply can only resolve against a call seen
//! earlier in the same pass.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::rpc::creds::AuthData;
use crate::rpc::record::{
    decode_message, reassemble_tcp, Reassembly, ReplyBody, ReplyProg, RpcBody, RpcMessage,
};
use crate::rpc::types::*;
use crate::xdr::XdrCursor;

/// Call side facts remembered per xid until the reply shows up.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct XidEntry {
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub call_index: u32,
    pub flavor: u32,
    pub gss_proc: Option<u32>,
    pub gss_service: Option<u32>,
    pub gss_version: Option<u32>,
    pub reply_index: Option<u32>,
}

/// One successfully decoded RPC record.
#[derive(Debug)]
pub struct RpcRecord {
    /// Capture record number this message came from.
    pub index: u32,
    pub msg: RpcMessage,
    /// Undecoded bytes past the RPC header, normally the program data.
    pub payload: Bytes,
}

/// Decoding session for one capture pass. Owns the correlation table;
/// independent packet streams need independent decoders.
#[derive(Debug, Default)]
pub struct RpcDecoder {
    pub(crate) config: DecoderConfig,
    xid_map: HashMap<u32, XidEntry>,
}

impl RpcDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        RpcDecoder {
            config,
            xid_map: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Correlation state for an xid, if a call with it was decoded.
    pub fn xid_entry(&self, xid: u32) -> Option<&XidEntry> {
        self.xid_map.get(&xid)
    }

    pub fn xid_table_len(&self) -> usize {
        self.xid_map.len()
    }

    /// Decode one capture record. `ip_proto` selects the transport: 6
    /// gets record-mark reassembly, 17 is taken as one complete
    /// datagram, anything else is not RPC. `Ok(None)` is a zero sized
    /// TCP record mark, an idle read.
    ///
    /// On error the input was not consumed and the caller can run its
    /// own heuristics on it.
    pub fn decode_record(
        &mut self, index: u32, ip_proto: u8, data: &[u8],
    ) -> Result<Option<RpcRecord>, DecodeError> {
        let (fragment, buf) = match ip_proto {
            IPPROTO_TCP => match reassemble_tcp(data)? {
                Reassembly::Empty => {
                    trace!("record {}: empty record mark", index);
                    return Ok(None);
                }
                Reassembly::Message(hdr, buf) => (Some(hdr), buf),
            },
            IPPROTO_UDP => (None, Cow::Borrowed(data)),
            _ => return Err(DecodeError::NotApplicable),
        };

        let mut cur = XdrCursor::new(&buf);
        let mut msg = decode_message(&mut cur, &self.config, fragment)?;
        let payload = Bytes::copy_from_slice(cur.as_slice());
        self.correlate(index, &mut msg);
        debug!("record {}: {}", index, msg);
        Ok(Some(RpcRecord {
            index,
            msg,
            payload,
        }))
    }

    fn correlate(&mut self, index: u32, msg: &mut RpcMessage) {
        let xid = msg.xid;
        match &mut msg.body {
            RpcBody::Call(call) => {
                let mut entry = XidEntry {
                    program: call.program,
                    version: call.version,
                    procedure: call.procedure,
                    call_index: index,
                    flavor: call.credential.flavor,
                    gss_proc: None,
                    gss_service: None,
                    gss_version: None,
                    reply_index: None,
                };
                if let AuthData::GssCred(ref gss) = call.credential.auth {
                    entry.gss_proc = Some(gss.gss_proc);
                    entry.gss_service = Some(gss.gss_service);
                    entry.gss_version = Some(gss.gss_version);
                }
                self.insert_entry(xid, entry);
            }
            RpcBody::Reply(reply) => {
                let entry = match self.xid_map.get_mut(&xid) {
                    Some(entry) => entry,
                    None => {
                        // capture may have started mid stream
                        trace!("reply xid 0x{:08x} has no recorded call", xid);
                        return;
                    }
                };
                reply.prog = Some(ReplyProg {
                    program: entry.program,
                    version: entry.version,
                    procedure: entry.procedure,
                    call_index: entry.call_index,
                });
                if entry.flavor == RPCSEC_GSS {
                    if let ReplyBody::Accepted(ref mut acc) = reply.body {
                        acc.verifier.gss_proc = entry.gss_proc;
                        acc.verifier.gss_service = entry.gss_service;
                        acc.verifier.gss_version = entry.gss_version;
                    }
                }
                entry.reply_index = Some(index);
            }
        }
    }

    /// Insert a call entry, evicting if the configured cap is hit.
    /// Eviction takes a completed exchange first, then the oldest call.
    fn insert_entry(&mut self, xid: u32, entry: XidEntry) {
        let cap = self.config.xid_table_cap;
        if cap > 0 && self.xid_map.len() >= cap && !self.xid_map.contains_key(&xid) {
            let victim = self
                .xid_map
                .iter()
                .find(|(_, e)| e.reply_index.is_some())
                .map(|(k, _)| *k)
                .or_else(|| {
                    self.xid_map
                        .iter()
                        .min_by_key(|(_, e)| e.call_index)
                        .map(|(k, _)| *k)
                });
            if let Some(victim) = victim {
                trace!("xid table full, evicting 0x{:08x}", victim);
                self.xid_map.remove(&victim);
            }
        }
        self.xid_map.insert(xid, entry);
    }
}
