// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use fru::{Document, RecordType};
use log::debug;

use super::Error;

/// Print the value held by the record of `kind`
pub fn handle(document: &Document, kind: RecordType) -> Result<(), Error> {
    println!("{}", render(document, kind)?);
    Ok(())
}

/// Text form of a record value as printed by `--get`
pub fn render(document: &Document, kind: RecordType) -> Result<String, Error> {
    let missing = || Error::RecordNotFound(kind);

    let value = match kind {
        RecordType::Mac0 | RecordType::Mac1 | RecordType::Mac2 => {
            let interface = kind.mac_interface().ok_or_else(missing)?;
            format_mac(&document.mac(interface).ok_or_else(missing)?)
        }
        RecordType::BootDevice => String::from_utf8_lossy(document.boot_device().ok_or_else(missing)?).into_owned(),
        RecordType::PasswdLine => String::from_utf8_lossy(document.passwd_line().ok_or_else(missing)?).into_owned(),
        RecordType::TestOk => document.test_ok().ok_or_else(missing)?.to_string(),
        RecordType::PowerPolicy => {
            let policy = document.power_policy().ok_or_else(missing)?;
            debug!("Power policy is {policy}");
            u8::from(policy).to_string()
        }
        RecordType::PowerState => document.power_state().ok_or_else(missing)?.to_string(),
        RecordType::UBoot => {
            let record = document.record(kind.code()).ok_or_else(missing)?;
            format_hex(&record.payload)
        }
    };

    Ok(value)
}

pub fn format_mac(mac: &[u8]) -> String {
    mac.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(":")
}

pub fn format_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    const FIXTURE: &[u8] = include_bytes!("../../../test/mitx-fru.bin");

    #[test]
    fn fixture_values() {
        let document = Document::decode(FIXTURE).unwrap();

        assert_eq!(render(&document, RecordType::Mac0).unwrap(), "4c:a5:15:00:00:01");
        assert_eq!(render(&document, RecordType::BootDevice).unwrap(), "sata0");
        assert_eq!(render(&document, RecordType::TestOk).unwrap(), "1");
    }

    #[test]
    fn missing_record() {
        let document = Document::decode(FIXTURE).unwrap();

        assert!(matches!(
            render(&document, RecordType::Mac1),
            Err(Error::RecordNotFound(RecordType::Mac1))
        ));
        assert!(matches!(
            render(&document, RecordType::PowerPolicy),
            Err(Error::RecordNotFound(RecordType::PowerPolicy))
        ));
    }

    #[test]
    fn opaque_records_print_as_hex() {
        let mut document = Document::decode(FIXTURE).unwrap();
        document.upsert(RecordType::UBoot.code(), vec![0xde, 0xad, 0x01]);

        assert_eq!(render(&document, RecordType::UBoot).unwrap(), "dead01");
    }
}
