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

use serde::Deserialize;

/// Decode limits for one [`RpcDecoder`](crate::RpcDecoder) session.
///
/// A limit of 0 disables the corresponding bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Maximum AUTH_SYS machine name length. Linux kernel defines 64.
    pub max_machine_name: u32,
    /// Maximum number of AUTH_SYS auxiliary gids. RFC 5531 defines 16.
    pub max_aux_gids: u32,
    /// Maximum declared credential/verifier body size.
    pub max_creds_size: u32,
    /// Correlation table capacity. 0 grows without bound, matching the
    /// lifetime of a single capture pass.
    pub xid_table_cap: usize,
    /// Forward the strict-opcode toggle to the NFS codec. Off by
    /// default so forward-incompatible opcodes do not fail a capture.
    pub check_enum: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_machine_name: 255,
            max_aux_gids: 16,
            max_creds_size: 0,
            xid_table_cap: 0,
            check_enum: false,
        }
    }
}
