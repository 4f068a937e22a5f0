// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Codec for the FRU inventory image stored in the board EEPROM
//!
//! An image holds a common header, a board area, a product area and a
//! list of vendor multirecords. [`Document::decode`] validates every
//! checksum on the way in, the `set_*` mutators upsert records by type and
//! [`update`] splices the re-encoded multirecords back behind the
//! untouched areas of the original image.

pub(crate) mod ext;

pub mod checksum;
mod area;
mod document;
mod dump;
mod error;
mod field;
mod header;
mod image;
mod multirecord;

pub use self::area::{BoardArea, ProductArea, BOARD_AREA_VERSION, PRODUCT_AREA_VERSION};
pub use self::document::{Document, FRU_PWD_MAX, MAC_LEN};
pub use self::error::{AreaKind, ChecksumRegion, DecodeError, EncodeError, MutateError};
pub use self::field::{FruString, FRU_STR_MAX};
pub use self::header::{Header, ERASED, FRU_VERSION};
pub use self::image::{compose, update, FRU_SIZE};
pub use self::multirecord::{
    decode_records, encode_records, DecodeOptions, LengthUnit, Multirecord, PowerPolicy, RecordType, MAX_RECORDS,
    RECORD_FORMAT, RECORD_HEADER_SIZE,
};
