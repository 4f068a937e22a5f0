// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use fru::{Document, FruString, RecordType};

use super::get::{format_hex, format_mac};

pub fn print(document: &Document) {
    for line in lines(document) {
        println!("{line}");
    }
}

/// One `name: value` line per decoded field
fn lines(document: &Document) -> Vec<String> {
    let field = |name: &str, value: &FruString| format!("{name}: {value}");

    let board = &document.board;
    let product = &document.product;
    let [d0, d1, d2] = board.mfg_date;

    let mut lines = vec![
        format!("board_mfg_date: {d0:02x} {d1:02x} {d2:02x}"),
        field("board_manufacturer", &board.manufacturer),
        field("board_product_name", &board.product_name),
        field("board_serial_number", &board.serial_number),
        field("board_part_number", &board.part_number),
        field("board_fru_id", &board.fru_id),
        format!("product_language: {}", product.language),
        field("product_manufacturer", &product.manufacturer),
        field("product_name", &product.product_name),
        field("product_part_model_number", &product.part_model_number),
        field("product_version", &product.version),
        field("product_serial_number", &product.serial_number),
        field("product_fru_id", &product.fru_id),
    ];

    for record in &document.records {
        let code = record.record_type;
        let value = match record.kind() {
            Some(kind) if kind.mac_interface().is_some() => format_mac(&record.payload),
            Some(RecordType::BootDevice | RecordType::PasswdLine) => {
                String::from_utf8_lossy(&record.payload).trim_end_matches('\0').to_owned()
            }
            Some(RecordType::PowerPolicy) => {
                let policy = document.power_policy().map(|p| p.to_string()).unwrap_or_default();
                format!("{} ({policy})", format_hex(&record.payload))
            }
            _ => format_hex(&record.payload),
        };
        let name = record.kind().map(|kind| kind.to_string()).unwrap_or_else(|| "unknown".into());

        lines.push(format!("mrec {code:#04x} {name}: {value}"));
    }

    lines
}

#[cfg(test)]
mod test {
    use super::*;

    const FIXTURE: &[u8] = include_bytes!("../../../test/mitx-fru.bin");

    #[test]
    fn fixture_report() {
        let document = Document::decode(FIXTURE).unwrap();
        let lines = lines(&document);

        assert_eq!(lines.len(), 13 + 3);
        assert_eq!(lines[0], "board_mfg_date: 10 20 12");
        assert_eq!(lines[1], "board_manufacturer: Baikal Electronics");
        assert_eq!(lines[8], "product_name: TF307");
        assert_eq!(lines[13], "mrec 0xc0 mac0: 4c:a5:15:00:00:01");
        assert_eq!(lines[14], "mrec 0xc2 boot-device: sata0");
        assert_eq!(lines[15], "mrec 0xc4 test-ok: 01");
    }
}
