// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::debug;

use crate::{AreaKind, DecodeError, EncodeError, FruString};

pub const PRODUCT_AREA_VERSION: u8 = 1;

/// Version, length units and language code precede the strings
const FIELDS_OFFSET: usize = 3;

/// Product identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductArea {
    pub language: u8,
    pub manufacturer: FruString,
    pub product_name: FruString,
    pub part_model_number: FruString,
    pub version: FruString,
    pub serial_number: FruString,
    pub fru_id: FruString,
}

impl ProductArea {
    /// Decode the product area from `buf`, which runs to the end of the image
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let area = super::validate(AreaKind::Product, PRODUCT_AREA_VERSION, buf)?;

        let language = area.get(2).copied().ok_or(DecodeError::BufferTooShort)?;

        let mut reader = area.get(FIELDS_OFFSET..).unwrap_or_default();
        let product = Self {
            language,
            manufacturer: FruString::decode(&mut reader)?,
            product_name: FruString::decode(&mut reader)?,
            part_model_number: FruString::decode(&mut reader)?,
            version: FruString::decode(&mut reader)?,
            serial_number: FruString::decode(&mut reader)?,
            fru_id: FruString::decode(&mut reader)?,
        };

        debug!(
            "Product area: {} {} model {} version {} serial {}",
            product.manufacturer, product.product_name, product.part_model_number, product.version, product.serial_number
        );

        Ok(product)
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut body = vec![PRODUCT_AREA_VERSION, 0, self.language];

        for field in [
            &self.manufacturer,
            &self.product_name,
            &self.part_model_number,
            &self.version,
            &self.serial_number,
            &self.fru_id,
        ] {
            field.encode(&mut body)?;
        }

        super::seal(AreaKind::Product, body)
    }
}
