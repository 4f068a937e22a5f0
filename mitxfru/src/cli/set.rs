// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use fru::{Document, PowerPolicy, RecordType};
use log::info;

use super::{
    value::{self, ValueKind},
    Error,
};

/// Parse `data` for the record of `kind` and upsert it into `document`
pub fn handle(document: &mut Document, kind: RecordType, data: &str) -> Result<(), Error> {
    let malformed = |kind| Error::MalformedInputValue {
        kind,
        value: data.to_owned(),
    };
    let number = || value::parse_number(data).ok_or_else(|| malformed(ValueKind::Number));

    let previous = match kind {
        RecordType::Mac0 | RecordType::Mac1 | RecordType::Mac2 => {
            let mac = value::parse_mac(data).ok_or_else(|| malformed(ValueKind::Mac))?;
            let interface = kind.mac_interface().ok_or(Error::ReadOnly(kind))?;
            document.set_mac(interface, mac)?
        }
        RecordType::BootDevice => document.set_boot_device(data),
        RecordType::PasswdLine => document.set_passwd_line(data),
        RecordType::TestOk => document.set_test_ok(number()?),
        RecordType::PowerPolicy => document.set_power_policy(PowerPolicy::from(number()?)),
        RecordType::PowerState => document.set_power_state(number()?),
        RecordType::UBoot => return Err(Error::ReadOnly(kind)),
    };

    match previous {
        Some(_) => info!("Replacing {kind} record"),
        None => info!("Adding {kind} record"),
    }

    Ok(())
}
