// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::warn;

use crate::{checksum, AreaKind, ChecksumRegion, DecodeError, EncodeError};

/// Format version in the first byte of the common header
pub const FRU_VERSION: u8 = 1;

/// Value of every byte of an erased EEPROM
pub const ERASED: u8 = 0xff;

/// Offsets are stored in units of this many bytes
pub const OFFSET_UNIT: usize = 8;

/// Common header at the start of the image
///
/// Layout: `[version][internal][chassis][board][product][multirecord][pad][checksum]`,
/// with each area offset stored in 8 byte units. Internal use and chassis areas
/// are not modelled and always encode as absent. A zero multirecord offset
/// means the image carries no multirecord area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub board_area_offset: usize,
    pub product_area_offset: usize,
    pub multirecord_area_offset: usize,
}

impl Header {
    /// Size of the encoded header in bytes
    pub const SIZE: usize = 8;

    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let Some(bytes) = buf.get(..Self::SIZE) else {
            warn!("FRU buffer is too short");
            return Err(DecodeError::BufferTooShort);
        };

        if bytes[0] == ERASED {
            warn!("Empty EEPROM detected");
            return Err(DecodeError::EmptyDevice);
        }
        if bytes[0] != FRU_VERSION {
            warn!("Header version is not valid");
            return Err(DecodeError::VersionMismatch {
                area: AreaKind::Header,
                expected: FRU_VERSION,
                found: bytes[0],
            });
        }
        if !checksum::is_valid(bytes) {
            warn!("Bad header checksum: {}", checksum::checksum(bytes));
            return Err(DecodeError::ChecksumInvalid(ChecksumRegion::Header));
        }

        Ok(Self {
            board_area_offset: bytes[3] as usize * OFFSET_UNIT,
            product_area_offset: bytes[4] as usize * OFFSET_UNIT,
            multirecord_area_offset: bytes[5] as usize * OFFSET_UNIT,
        })
    }

    pub fn encode(&self) -> Result<[u8; Self::SIZE], EncodeError> {
        let mut data = [0u8; Self::SIZE];

        data[0] = FRU_VERSION;
        data[3] = offset_units(AreaKind::Board, self.board_area_offset)?;
        data[4] = offset_units(AreaKind::Product, self.product_area_offset)?;
        data[5] = match self.multirecord_area_offset {
            0 => 0,
            offset => offset_units(AreaKind::Multirecord, offset)?,
        };
        data[7] = checksum::complement(&data[..7]);

        Ok(data)
    }
}

fn offset_units(area: AreaKind, offset: usize) -> Result<u8, EncodeError> {
    if offset % OFFSET_UNIT != 0 || offset < Header::SIZE {
        return Err(EncodeError::BadOffset { area, offset });
    }
    u8::try_from(offset / OFFSET_UNIT).map_err(|_| EncodeError::BadOffset { area, offset })
}

#[cfg(test)]
mod test {
    use super::*;

    /// Header of the `mitx-fru.bin` fixture
    const FIXTURE_HEADER: [u8; 8] = [0x01, 0x00, 0x00, 0x01, 0x0a, 0x11, 0x00, 0xe3];

    #[test]
    fn decode_offsets() {
        let header = Header::decode(&FIXTURE_HEADER).unwrap();
        assert_eq!(header.board_area_offset, 8);
        assert_eq!(header.product_area_offset, 80);
        assert_eq!(header.multirecord_area_offset, 136);
    }

    #[test]
    fn encode_matches_fixture() {
        let header = Header {
            board_area_offset: 8,
            product_area_offset: 80,
            multirecord_area_offset: 136,
        };
        assert_eq!(header.encode().unwrap(), FIXTURE_HEADER);
    }

    #[test]
    fn erased_is_distinct_from_bad_version() {
        assert_eq!(Header::decode(&[0xff; 8]), Err(DecodeError::EmptyDevice));

        let mut header = FIXTURE_HEADER;
        header[0] = 2;
        assert!(matches!(
            Header::decode(&header),
            Err(DecodeError::VersionMismatch { found: 2, .. })
        ));
    }

    #[test]
    fn bad_checksum() {
        let mut header = FIXTURE_HEADER;
        header[6] = 1;
        assert_eq!(
            Header::decode(&header),
            Err(DecodeError::ChecksumInvalid(ChecksumRegion::Header))
        );
    }

    #[test]
    fn short_buffer() {
        assert_eq!(Header::decode(&FIXTURE_HEADER[..5]), Err(DecodeError::BufferTooShort));
    }

    #[test]
    fn unaligned_offset_is_rejected() {
        let header = Header {
            board_area_offset: 12,
            product_area_offset: 80,
            multirecord_area_offset: 136,
        };
        assert!(matches!(header.encode(), Err(EncodeError::BadOffset { offset: 12, .. })));
    }
}
