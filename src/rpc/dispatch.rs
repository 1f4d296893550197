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

//! NFS payload dispatch.
//!
//! A call names its program in the header; a reply is only known to be
//! NFS through its correlated call. Callbacks are recognized by the
//! transient program range: NFS proper is always program 100003, and
//! anything the server registered transiently is taken for a callback.
//! That is a crude heuristic, kept on purpose.

use bytes::Buf;
use tracing::debug;

use crate::error::DecodeError;
use crate::gss::SecurityLayer;
use crate::nfs::NfsCodec;
use crate::rpc::decoder::{RpcDecoder, RpcRecord};
use crate::rpc::types::*;

/// `Some(false)` for the main NFS program, `Some(true)` for a
/// transient range callback, `None` when the program is not NFS.
pub fn classify_program(program: u32) -> Option<bool> {
    if program == NFS_PROGRAM {
        Some(false)
    } else if program >= TRANSIENT_PROGRAM_BEGIN && program < TRANSIENT_PROGRAM_END {
        Some(true)
    } else {
        None
    }
}

impl RpcDecoder {
    /// Hand a decoded record's payload to the NFS codec. Returns the
    /// codec's COMPOUND tree, or `None` when there is nothing NFS to
    /// decode or the payload would not decode. A payload failure never
    /// invalidates the header decode that already succeeded.
    pub fn decode_nfs<C, S>(
        &self, rec: &mut RpcRecord, codec: &mut C, sec: &mut S,
    ) -> Option<C::Compound>
    where
        C: NfsCodec,
        S: SecurityLayer,
    {
        match self.decode_nfs_inner(rec, codec, sec) {
            Ok(ret) => ret,
            Err(err) => {
                debug!("record {}: {}", rec.index, err);
                None
            }
        }
    }

    pub(crate) fn decode_nfs_inner<C, S>(
        &self, rec: &mut RpcRecord, codec: &mut C, sec: &mut S,
    ) -> Result<Option<C::Compound>, DecodeError>
    where
        C: NfsCodec,
        S: SecurityLayer,
    {
        let data = std::mem::take(&mut rec.payload);
        rec.payload = sec.decode_security_payload(&rec.msg, data);

        // a reply with no matching call stays unknown, that is not an
        // error
        let (program, version, procedure) = match rec.msg.prog_info() {
            Some(info) => info,
            None => return Ok(None),
        };
        if rec.payload.is_empty() || procedure == 0 || version == 0 {
            return Ok(None);
        }
        let cb_flag = match classify_program(program) {
            Some(cb_flag) => cb_flag,
            None => return Ok(None),
        };
        if procedure != NFS4_PROC_COMPOUND {
            return Ok(None);
        }
        if !((!cb_flag && version == NFS4_VERSION) || (cb_flag && version == NFS4_CB_VERSION)) {
            return Ok(None);
        }

        codec.set_check_enum(self.config.check_enum);
        let res = match (rec.msg.is_call(), cb_flag) {
            (true, false) => codec.compound4_args(&rec.payload),
            (true, true) => codec.cb_compound4_args(&rec.payload),
            (false, false) => codec.compound4_res(&rec.payload),
            (false, true) => codec.cb_compound4_res(&rec.payload),
        };
        match res {
            Ok(compound) => {
                let used = std::cmp::min(codec.position(), rec.payload.len());
                rec.payload.advance(used);
                let data = std::mem::take(&mut rec.payload);
                rec.payload = sec.decode_security_checksum(&rec.msg, data);
                Ok(Some(compound))
            }
            Err(err) => {
                debug!("record {}: NFS codec failed: {}", rec.index, err);
                Err(DecodeError::PayloadDecodeFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gss::NullSecurity;
    use crate::rpc::record::tests::{accepted_reply_bytes, call_bytes};
    use crate::rpc::record::RpcMessage;
    use bytes::Bytes;

    const CB_PROGRAM: u32 = 0x5000_0001;

    #[derive(Default)]
    struct FakeCodec {
        consume: usize,
        fail: bool,
        check_enum: Option<bool>,
        entry: Option<&'static str>,
    }

    impl NfsCodec for FakeCodec {
        type Compound = &'static str;

        fn set_check_enum(&mut self, check: bool) {
            self.check_enum = Some(check);
        }

        fn position(&self) -> usize {
            self.consume
        }

        fn compound4_args(&mut self, _data: &[u8]) -> Result<&'static str, DecodeError> {
            self.entry = Some("compound4_args");
            if self.fail {
                return Err(DecodeError::PayloadDecodeFailed);
            }
            Ok("compound4_args")
        }

        fn cb_compound4_args(&mut self, _data: &[u8]) -> Result<&'static str, DecodeError> {
            self.entry = Some("cb_compound4_args");
            Ok("cb_compound4_args")
        }

        fn compound4_res(&mut self, _data: &[u8]) -> Result<&'static str, DecodeError> {
            self.entry = Some("compound4_res");
            Ok("compound4_res")
        }

        fn cb_compound4_res(&mut self, _data: &[u8]) -> Result<&'static str, DecodeError> {
            self.entry = Some("cb_compound4_res");
            Ok("cb_compound4_res")
        }
    }

    #[derive(Default)]
    struct RecordingSec {
        payload_calls: u32,
        checksum_calls: u32,
    }

    impl SecurityLayer for RecordingSec {
        fn decode_security_payload(&mut self, _msg: &RpcMessage, data: Bytes) -> Bytes {
            self.payload_calls += 1;
            data
        }

        fn decode_security_checksum(&mut self, _msg: &RpcMessage, data: Bytes) -> Bytes {
            self.checksum_calls += 1;
            data
        }
    }

    fn decode_with_payload(
        dec: &mut RpcDecoder, index: u32, mut msg: Vec<u8>, payload: &[u8],
    ) -> RpcRecord {
        msg.extend_from_slice(payload);
        dec.decode_record(index, IPPROTO_UDP, &msg).unwrap().unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_program(NFS_PROGRAM), Some(false));
        assert_eq!(classify_program(CB_PROGRAM), Some(true));
        assert_eq!(classify_program(0x3fff_ffff), None);
        assert_eq!(classify_program(0x6000_0000), None);
        assert_eq!(classify_program(100005), None);
    }

    #[test]
    fn test_call_dispatches_to_args() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x1, NFS_PROGRAM, 4, 1), b"opaque..");
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };
        let ret = dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(ret, Some("compound4_args"));
        assert_eq!(codec.check_enum, Some(false));
        // the codec consumed everything, nothing trails
        assert!(rec.payload.is_empty());
    }

    #[test]
    fn test_callback_call_dispatches_to_cb_args() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x2, CB_PROGRAM, 1, 1), b"cbdata..");
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };
        let ret = dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(ret, Some("cb_compound4_args"));
    }

    #[test]
    fn test_correlated_reply_dispatches_to_res() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x3, NFS_PROGRAM, 4, 1), b"argdata!");
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };
        dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);

        let mut rec = decode_with_payload(
            &mut dec,
            1,
            accepted_reply_bytes(0x3, ACCEPT_SUCCESS),
            b"resdata!",
        );
        let ret = dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(ret, Some("compound4_res"));
    }

    #[test]
    fn test_callback_reply_dispatches_to_cb_res() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x4, CB_PROGRAM, 1, 1), b"cbarg...");
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };
        dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);

        let mut rec = decode_with_payload(
            &mut dec,
            1,
            accepted_reply_bytes(0x4, ACCEPT_SUCCESS),
            b"cbres...",
        );
        let ret = dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(ret, Some("cb_compound4_res"));
    }

    #[test]
    fn test_uncorrelated_reply_has_no_payload() {
        let mut dec = RpcDecoder::new();
        let mut rec = decode_with_payload(
            &mut dec,
            0,
            accepted_reply_bytes(0x99, ACCEPT_SUCCESS),
            b"whatever",
        );
        let mut codec = FakeCodec::default();
        let ret = dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(ret, None);
        assert_eq!(codec.entry, None);
    }

    #[test]
    fn test_foreign_program_is_skipped() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x5, 100000, 2, 1), b"portmap!");
        let mut codec = FakeCodec::default();
        assert_eq!(dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity), None);
        assert_eq!(codec.entry, None);
        // untouched for the caller
        assert_eq!(&rec.payload[..], b"portmap!");
    }

    #[test]
    fn test_null_procedure_is_skipped() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x6, NFS_PROGRAM, 4, 0), b"nulldat!");
        let mut codec = FakeCodec::default();
        assert_eq!(dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity), None);
    }

    #[test]
    fn test_version_gate() {
        let mut dec = RpcDecoder::new();
        // v3 over the main program is not COMPOUND material
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x7, NFS_PROGRAM, 3, 1), b"v3data..");
        let mut codec = FakeCodec::default();
        assert_eq!(dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity), None);
        assert_eq!(codec.entry, None);
    }

    #[test]
    fn test_codec_failure_is_isolated() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0x8, NFS_PROGRAM, 4, 1), b"badbytes");
        let mut codec = FakeCodec {
            fail: true,
            ..Default::default()
        };
        assert_eq!(dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity), None);

        // internally the failure keeps its own class
        let mut rec =
            decode_with_payload(&mut dec, 1, call_bytes(0x9, NFS_PROGRAM, 4, 1), b"badbytes");
        assert_eq!(
            dec.decode_nfs_inner(&mut rec, &mut codec, &mut NullSecurity),
            Err(DecodeError::PayloadDecodeFailed)
        );
    }

    #[test]
    fn test_payload_advanced_past_codec_bytes() {
        let mut dec = RpcDecoder::new();
        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0xa, NFS_PROGRAM, 4, 1), b"compound+mic");
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };
        dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity);
        assert_eq!(&rec.payload[..], b"+mic");
    }

    #[test]
    fn test_security_hooks_invoked_in_order() {
        let mut dec = RpcDecoder::new();
        let mut sec = RecordingSec::default();
        let mut codec = FakeCodec {
            consume: 8,
            ..Default::default()
        };

        let mut rec =
            decode_with_payload(&mut dec, 0, call_bytes(0xb, NFS_PROGRAM, 4, 1), b"gssdata!");
        dec.decode_nfs(&mut rec, &mut codec, &mut sec);
        assert_eq!(sec.payload_calls, 1);
        assert_eq!(sec.checksum_calls, 1);

        // non NFS record: the payload hook still runs, checksum never
        let mut rec =
            decode_with_payload(&mut dec, 1, call_bytes(0xc, 100000, 2, 1), b"portmap!");
        dec.decode_nfs(&mut rec, &mut codec, &mut sec);
        assert_eq!(sec.payload_calls, 2);
        assert_eq!(sec.checksum_calls, 1);
    }

    #[test]
    fn test_empty_payload_is_skipped() {
        let mut dec = RpcDecoder::new();
        let mut rec = decode_with_payload(&mut dec, 0, call_bytes(0xd, NFS_PROGRAM, 4, 1), b"");
        let mut codec = FakeCodec::default();
        assert_eq!(dec.decode_nfs(&mut rec, &mut codec, &mut NullSecurity), None);
        assert_eq!(codec.entry, None);
    }
}
