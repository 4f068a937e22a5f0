// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::debug;

use crate::{ext::ReadExt, AreaKind, DecodeError, EncodeError, FruString};

pub const BOARD_AREA_VERSION: u8 = 1;

const DATE_OFFSET: usize = 3;
/// Offset of the first string field within the board area
const FIELDS_OFFSET: usize = 5;

/// Board identity
///
/// The manufacturing date occupies bytes 3 to 5, while the first string
/// field starts at byte 5. The last date byte therefore always reads back
/// as the manufacturer length prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardArea {
    pub mfg_date: [u8; 3],
    pub manufacturer: FruString,
    pub product_name: FruString,
    pub serial_number: FruString,
    pub part_number: FruString,
    pub fru_id: FruString,
}

impl BoardArea {
    /// Decode the board area from `buf`, which runs to the end of the image
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let area = super::validate(AreaKind::Board, BOARD_AREA_VERSION, buf)?;

        let mfg_date = area.get(DATE_OFFSET..).unwrap_or_default().read_array()?;

        let mut reader = area.get(FIELDS_OFFSET..).unwrap_or_default();
        let board = Self {
            mfg_date,
            manufacturer: FruString::decode(&mut reader)?,
            product_name: FruString::decode(&mut reader)?,
            serial_number: FruString::decode(&mut reader)?,
            part_number: FruString::decode(&mut reader)?,
            fru_id: FruString::decode(&mut reader)?,
        };

        debug!(
            "Board area: {} {} serial {} part {} fru id {}",
            board.manufacturer, board.product_name, board.serial_number, board.part_number, board.fru_id
        );

        Ok(board)
    }

    /// Encode a sealed board area, English language code
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut body = vec![BOARD_AREA_VERSION, 0, 0, self.mfg_date[0], self.mfg_date[1]];

        for field in self.fields() {
            field.encode(&mut body)?;
        }

        super::seal(AreaKind::Board, body)
    }

    fn fields(&self) -> [&FruString; 5] {
        [
            &self.manufacturer,
            &self.product_name,
            &self.serial_number,
            &self.part_number,
            &self.fru_id,
        ]
    }
}
