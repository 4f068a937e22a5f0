// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::{log_enabled, trace, Level};

/// Emit `bytes` as rows of 8 bytes, hex followed by the printable characters, at trace level
pub(crate) fn trace_bytes(label: &str, bytes: &[u8]) {
    if !log_enabled!(Level::Trace) {
        return;
    }

    trace!("{label} ({} bytes):", bytes.len());
    for row in bytes.chunks(8) {
        let shown = row
            .iter()
            .map(|&byte| if byte.is_ascii_graphic() { byte as char } else { '.' })
            .collect::<String>();
        trace!("  {:<16} {shown}", hex::encode(row));
    }
}
