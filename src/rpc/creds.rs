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

//! RPC credential and verifier decoding.

use tracing::trace;

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::rpc::types::*;
use crate::xdr::{LengthSpec, XdrCursor};

/// Flavor specific body of a credential or verifier.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AuthData {
    Sys(AuthSys),
    GssCred(GssCred),
    GssVerf(GssVerf),
    /// Unknown flavor, body kept as raw bytes.
    Opaque(Vec<u8>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AuthSys {
    pub stamp: u32,
    pub machine: Vec<u8>,
    pub uid: u32,
    pub gid: u32,
    pub gids: Vec<u32>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GssCred {
    pub gss_version: u32,
    pub gss_proc: u32,
    pub gss_seq_num: u32,
    pub gss_service: u32,
    pub gss_context: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GssVerf {
    pub gss_token: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Credential {
    pub flavor: u32,
    /// Wire declared byte length of the flavor specific body.
    pub size: u32,
    pub auth: AuthData,
    /// GSS context of the originating call, filled in on an accepted
    /// reply's verifier during correlation.
    pub gss_proc: Option<u32>,
    pub gss_service: Option<u32>,
    pub gss_version: Option<u32>,
}

impl Credential {
    fn new(flavor: u32, size: u32, auth: AuthData) -> Self {
        Credential {
            flavor,
            size,
            auth,
            gss_proc: None,
            gss_service: None,
            gss_version: None,
        }
    }
}

/// Decode a credential (`verifier == false`) or verifier at the
/// current cursor position. The declared body size is validated
/// against the remaining buffer before any flavor body is consumed, so
/// a corrupt size field cannot silently truncate later fields.
pub(crate) fn decode_credential(
    cur: &mut XdrCursor<'_>, config: &DecoderConfig, verifier: bool,
) -> Result<Credential, DecodeError> {
    if cur.remaining() < 8 {
        return Err(DecodeError::Truncated);
    }
    let flavor = cur.uint32()?;
    let declared = cur.peek_uint32()?;
    if declared as usize > cur.remaining() {
        trace!(
            "credential body {} larger than remaining {}",
            declared,
            cur.remaining()
        );
        return Err(DecodeError::Truncated);
    }
    if config.max_creds_size > 0 && declared > config.max_creds_size {
        return Err(DecodeError::LimitExceeded);
    }

    match flavor {
        AUTH_SYS => {
            let size = cur.uint32()?;
            let stamp = cur.uint32()?;
            let machine = cur.opaque(config.max_machine_name)?.to_vec();
            let uid = cur.uint32()?;
            let gid = cur.uint32()?;
            let gids = cur.array(
                |c| c.uint32(),
                LengthSpec::default(),
                config.max_aux_gids,
            )?;
            Ok(Credential::new(
                flavor,
                size,
                AuthData::Sys(AuthSys {
                    stamp,
                    machine,
                    uid,
                    gid,
                    gids,
                }),
            ))
        }
        RPCSEC_GSS if !verifier => {
            let size = cur.uint32()?;
            let gss_version = cur.uint32()?;
            let gss_proc = cur.uint32()?;
            let gss_seq_num = cur.uint32()?;
            let gss_service = cur.uint32()?;
            let gss_context = cur.opaque(0)?.to_vec();
            Ok(Credential::new(
                flavor,
                size,
                AuthData::GssCred(GssCred {
                    gss_version,
                    gss_proc,
                    gss_seq_num,
                    gss_service,
                    gss_context,
                }),
            ))
        }
        RPCSEC_GSS => {
            // verifier position: the declared size is the token's own
            // length prefix
            let gss_token = cur.opaque(0)?.to_vec();
            Ok(Credential::new(
                flavor,
                declared,
                AuthData::GssVerf(GssVerf { gss_token }),
            ))
        }
        _ => {
            let size = cur.uint32()?;
            let data = cur.raw(size as usize, 0)?.to_vec();
            trace!("flavor {} kept opaque", auth_flavor_string(flavor));
            Ok(Credential::new(flavor, size, AuthData::Opaque(data)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be32(v: u32) -> [u8; 4] {
        v.to_be_bytes()
    }

    fn decode(buf: &[u8], verifier: bool) -> Result<Credential, DecodeError> {
        let mut cur = XdrCursor::new(buf);
        decode_credential(&mut cur, &DecoderConfig::default(), verifier)
    }

    fn auth_sys_body() -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&be32(0xcafe)); // stamp
        v.extend_from_slice(&be32(4)); // machine name
        v.extend_from_slice(b"host");
        v.extend_from_slice(&be32(1000)); // uid
        v.extend_from_slice(&be32(100)); // gid
        v.extend_from_slice(&be32(2)); // gid count
        v.extend_from_slice(&be32(10));
        v.extend_from_slice(&be32(20));
        v
    }

    #[test]
    fn test_auth_sys() {
        let body = auth_sys_body();
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_SYS));
        buf.extend_from_slice(&be32(body.len() as u32));
        buf.extend_from_slice(&body);

        let cred = decode(&buf, false).unwrap();
        assert_eq!(cred.flavor, AUTH_SYS);
        assert_eq!(cred.size, body.len() as u32);
        match cred.auth {
            AuthData::Sys(ref sys) => {
                assert_eq!(sys.stamp, 0xcafe);
                assert_eq!(sys.machine, b"host");
                assert_eq!(sys.uid, 1000);
                assert_eq!(sys.gid, 100);
                assert_eq!(sys.gids, vec![10, 20]);
            }
            _ => panic!("wrong flavor body"),
        }
    }

    #[test]
    fn test_auth_none() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_NONE));
        buf.extend_from_slice(&be32(0));

        let cred = decode(&buf, false).unwrap();
        assert_eq!(cred.flavor, AUTH_NONE);
        assert_eq!(cred.size, 0);
        assert_eq!(cred.auth, AuthData::Opaque(Vec::new()));
    }

    #[test]
    fn test_gss_credential() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(RPCSEC_GSS));
        buf.extend_from_slice(&be32(24)); // body size
        buf.extend_from_slice(&be32(1)); // gss version
        buf.extend_from_slice(&be32(RPCSEC_GSS_DATA));
        buf.extend_from_slice(&be32(42)); // seq num
        buf.extend_from_slice(&be32(RPC_GSS_SVC_INTEGRITY));
        buf.extend_from_slice(&be32(4)); // context handle
        buf.extend_from_slice(b"ctx1");

        let cred = decode(&buf, false).unwrap();
        assert_eq!(cred.flavor, RPCSEC_GSS);
        match cred.auth {
            AuthData::GssCred(ref gss) => {
                assert_eq!(gss.gss_version, 1);
                assert_eq!(gss.gss_proc, RPCSEC_GSS_DATA);
                assert_eq!(gss.gss_seq_num, 42);
                assert_eq!(gss.gss_service, RPC_GSS_SVC_INTEGRITY);
                assert_eq!(gss.gss_context, b"ctx1");
            }
            _ => panic!("wrong flavor body"),
        }
    }

    #[test]
    fn test_gss_verifier() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(RPCSEC_GSS));
        buf.extend_from_slice(&be32(8)); // token length, doubles as size
        buf.extend_from_slice(b"tokentok");

        let cred = decode(&buf, true).unwrap();
        assert_eq!(cred.flavor, RPCSEC_GSS);
        assert_eq!(cred.size, 8);
        assert_eq!(
            cred.auth,
            AuthData::GssVerf(GssVerf {
                gss_token: b"tokentok".to_vec()
            })
        );
    }

    #[test]
    fn test_unknown_flavor_raw_body() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_DH));
        buf.extend_from_slice(&be32(3));
        buf.extend_from_slice(b"abc");

        let cred = decode(&buf, false).unwrap();
        assert_eq!(cred.flavor, AUTH_DH);
        assert_eq!(cred.size, 3);
        assert_eq!(cred.auth, AuthData::Opaque(b"abc".to_vec()));
    }

    #[test]
    fn test_declared_size_past_buffer() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_SYS));
        buf.extend_from_slice(&be32(400));
        buf.extend_from_slice(&[0u8; 16]);
        assert_eq!(decode(&buf, false), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_too_short_for_header() {
        assert_eq!(decode(&[0; 7], false), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_machine_name_limit() {
        let mut body = Vec::new();
        body.extend_from_slice(&be32(1)); // stamp
        body.extend_from_slice(&be32(300)); // machine name too long
        body.extend_from_slice(&[0u8; 300]);
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_SYS));
        buf.extend_from_slice(&be32(body.len() as u32));
        buf.extend_from_slice(&body);
        assert_eq!(decode(&buf, false), Err(DecodeError::LimitExceeded));
    }

    #[test]
    fn test_gid_list_limit() {
        let mut body = Vec::new();
        body.extend_from_slice(&be32(1)); // stamp
        body.extend_from_slice(&be32(0)); // empty machine name
        body.extend_from_slice(&be32(0)); // uid
        body.extend_from_slice(&be32(0)); // gid
        body.extend_from_slice(&be32(17)); // one over the bound
        body.extend_from_slice(&[0u8; 17 * 4]);
        let mut buf = Vec::new();
        buf.extend_from_slice(&be32(AUTH_SYS));
        buf.extend_from_slice(&be32(body.len() as u32));
        buf.extend_from_slice(&body);
        assert_eq!(decode(&buf, false), Err(DecodeError::LimitExceeded));
    }
}
