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

/* RFC 5531, section 9 'The RPC Message Protocol' */

pub const RPC_VERSION: u32 = 2;

pub const RPC_MSG_CALL: u32 = 0;
pub const RPC_MSG_REPLY: u32 = 1;

pub const MSG_ACCEPTED: u32 = 0;
pub const MSG_DENIED: u32 = 1;

pub const ACCEPT_SUCCESS: u32 = 0;
pub const ACCEPT_PROG_UNAVAIL: u32 = 1;
pub const ACCEPT_PROG_MISMATCH: u32 = 2;
pub const ACCEPT_PROC_UNAVAIL: u32 = 3;
pub const ACCEPT_GARBAGE_ARGS: u32 = 4;
pub const ACCEPT_SYSTEM_ERR: u32 = 5;

pub const REJECT_RPC_MISMATCH: u32 = 0;
pub const REJECT_AUTH_ERROR: u32 = 1;

pub const AUTH_OK: u32 = 0;
pub const AUTH_BADCRED: u32 = 1;
pub const AUTH_REJECTEDCRED: u32 = 2;
pub const AUTH_BADVERF: u32 = 3;
pub const AUTH_REJECTEDVERF: u32 = 4;
pub const AUTH_TOOWEAK: u32 = 5;
pub const AUTH_INVALIDRESP: u32 = 6;
pub const AUTH_FAILED: u32 = 7;
pub const AUTH_KERB_GENERIC: u32 = 8;
pub const AUTH_TIMEEXPIRE: u32 = 9;
pub const AUTH_TKT_FILE: u32 = 10;
pub const AUTH_DECODE: u32 = 11;
pub const AUTH_NET_ADDR: u32 = 12;
pub const RPCSEC_GSS_CREDPROBLEM: u32 = 13;
pub const RPCSEC_GSS_CTXPROBLEM: u32 = 14;

/* RFC 5531, section 8.2 'Authentication Flavors' */
pub const AUTH_NONE: u32 = 0;
pub const AUTH_SYS: u32 = 1;
pub const AUTH_SHORT: u32 = 2;
pub const AUTH_DH: u32 = 3;
pub const RPCSEC_GSS: u32 = 6;

/* RFC 2203, RPCSEC_GSS control procedures and service levels */
pub const RPCSEC_GSS_DATA: u32 = 0;
pub const RPCSEC_GSS_INIT: u32 = 1;
pub const RPCSEC_GSS_CONTINUE_INIT: u32 = 2;
pub const RPCSEC_GSS_DESTROY: u32 = 3;

pub const RPC_GSS_SVC_NONE: u32 = 1;
pub const RPC_GSS_SVC_INTEGRITY: u32 = 2;
pub const RPC_GSS_SVC_PRIVACY: u32 = 3;

pub const NFS_PROGRAM: u32 = 100003;
/// Dynamically assigned callback programs live in this interval.
pub const TRANSIENT_PROGRAM_BEGIN: u32 = 0x4000_0000;
pub const TRANSIENT_PROGRAM_END: u32 = 0x6000_0000;

/// NFSv4 bundles everything into the single COMPOUND procedure.
pub const NFS4_PROC_COMPOUND: u32 = 1;
pub const NFS4_VERSION: u32 = 4;
pub const NFS4_CB_VERSION: u32 = 1;

pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

pub fn msg_type_string(mtype: u32) -> String {
    match mtype {
        RPC_MSG_CALL => "CALL",
        RPC_MSG_REPLY => "REPLY",
        _ => {
            return (mtype).to_string();
        }
    }
    .to_string()
}

pub fn auth_flavor_string(flavor: u32) -> String {
    match flavor {
        AUTH_NONE => "AUTH_NONE",
        AUTH_SYS => "AUTH_SYS",
        AUTH_SHORT => "AUTH_SHORT",
        AUTH_DH => "AUTH_DH",
        RPCSEC_GSS => "RPCSEC_GSS",
        _ => {
            return (flavor).to_string();
        }
    }
    .to_string()
}

pub fn accept_stat_known(stat: u32) -> bool {
    matches!(
        stat,
        ACCEPT_SUCCESS
            | ACCEPT_PROG_UNAVAIL
            | ACCEPT_PROG_MISMATCH
            | ACCEPT_PROC_UNAVAIL
            | ACCEPT_GARBAGE_ARGS
            | ACCEPT_SYSTEM_ERR
    )
}

pub fn accept_stat_string(stat: u32) -> String {
    match stat {
        ACCEPT_SUCCESS => "SUCCESS",
        ACCEPT_PROG_UNAVAIL => "PROG_UNAVAIL",
        ACCEPT_PROG_MISMATCH => "PROG_MISMATCH",
        ACCEPT_PROC_UNAVAIL => "PROC_UNAVAIL",
        ACCEPT_GARBAGE_ARGS => "GARBAGE_ARGS",
        ACCEPT_SYSTEM_ERR => "SYSTEM_ERR",
        _ => {
            return (stat).to_string();
        }
    }
    .to_string()
}

pub fn auth_stat_known(stat: u32) -> bool {
    stat <= RPCSEC_GSS_CTXPROBLEM
}

pub fn auth_stat_string(stat: u32) -> String {
    match stat {
        AUTH_OK => "AUTH_OK",
        AUTH_BADCRED => "AUTH_BADCRED",
        AUTH_REJECTEDCRED => "AUTH_REJECTEDCRED",
        AUTH_BADVERF => "AUTH_BADVERF",
        AUTH_REJECTEDVERF => "AUTH_REJECTEDVERF",
        AUTH_TOOWEAK => "AUTH_TOOWEAK",
        AUTH_INVALIDRESP => "AUTH_INVALIDRESP",
        AUTH_FAILED => "AUTH_FAILED",
        AUTH_KERB_GENERIC => "AUTH_KERB_GENERIC",
        AUTH_TIMEEXPIRE => "AUTH_TIMEEXPIRE",
        AUTH_TKT_FILE => "AUTH_TKT_FILE",
        AUTH_DECODE => "AUTH_DECODE",
        AUTH_NET_ADDR => "AUTH_NET_ADDR",
        RPCSEC_GSS_CREDPROBLEM => "RPCSEC_GSS_CREDPROBLEM",
        RPCSEC_GSS_CTXPROBLEM => "RPCSEC_GSS_CTXPROBLEM",
        _ => {
            return (stat).to_string();
        }
    }
    .to_string()
}
