// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Parsing of the textual values accepted by `--get`, `--set` and `--data`

use fru::MAC_LEN;

/// What a malformed `--data` value was expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    #[strum(serialize = "MAC address")]
    Mac,
    Number,
}

/// Hex record type code, with or without a `0x` prefix
pub fn parse_type(s: &str) -> Option<u8> {
    let digits = strip_hex_prefix(s.trim()).unwrap_or(s.trim());
    u8::from_str_radix(digits, 16).ok()
}

/// Six colon separated hex octets, e.g. `4c:a5:15:00:00:01`
pub fn parse_mac(s: &str) -> Option<[u8; MAC_LEN]> {
    let mut mac = [0u8; MAC_LEN];
    let mut octets = s.trim().split(':');

    for byte in mac.iter_mut() {
        let octet = octets.next()?;
        if octet.is_empty() || octet.len() > 2 {
            return None;
        }
        *byte = u8::from_str_radix(octet, 16).ok()?;
    }

    octets.next().is_none().then_some(mac)
}

/// Integer in C literal notation: `0x` hex, leading `0` octal, decimal otherwise
pub fn parse_number(s: &str) -> Option<u8> {
    let s = s.trim();

    if let Some(hex) = strip_hex_prefix(s) {
        u8::from_str_radix(hex, 16).ok()
    } else if s.len() > 1 && s.starts_with('0') {
        u8::from_str_radix(&s[1..], 8).ok()
    } else {
        s.parse().ok()
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}
