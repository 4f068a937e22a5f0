// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::debug;

use crate::{header::OFFSET_UNIT, multirecord, AreaKind, Document, EncodeError, Header, LengthUnit};

/// Size of the EEPROM holding the image
pub const FRU_SIZE: usize = 4096;

/// Rebuild `original` with the document's multirecords
///
/// Everything before the multirecord area is copied byte for byte, the
/// board and product fields of `document` are not re-encoded. Bytes after
/// the last record are zeroed. If the original image has no multirecord
/// area one is placed after the board and product areas and the header
/// is rewritten to point at it. Without records such an image is kept up
/// to the end of its areas.
pub fn update(original: &[u8], document: &Document, unit: LengthUnit) -> Result<Vec<u8>, EncodeError> {
    let mut image = vec![0u8; FRU_SIZE];
    let mut offset = document.header.multirecord_area_offset;

    if offset == 0 {
        offset = placement(original, &document.header)?;
        copy_prefix(original, &mut image, offset)?;

        if document.records.is_empty() {
            debug!("No multirecords to place");
            return Ok(image);
        }
        debug!("Creating multirecord area at {offset}");

        let header = Header {
            multirecord_area_offset: offset,
            ..document.header
        };
        image[..Header::SIZE].copy_from_slice(&header.encode()?);
    } else {
        copy_prefix(original, &mut image, offset)?;
    }

    if !document.records.is_empty() {
        debug!("Put multirecord area at {offset}");
        let used = multirecord::encode_records(&document.records, &mut image[offset..], unit)?;
        debug!("Packed {} multirecords into {used} bytes", document.records.len());
    }

    Ok(image)
}

/// Lay out a complete image from scratch
///
/// Header, board area, product area and multirecord area follow each other
/// in that order.
pub fn compose(document: &Document, unit: LengthUnit) -> Result<Vec<u8>, EncodeError> {
    let board = document.board.encode()?;
    let product = document.product.encode()?;

    let board_area_offset = Header::SIZE;
    let product_area_offset = board_area_offset + board.len();
    let end = product_area_offset + product.len();

    let header = Header {
        board_area_offset,
        product_area_offset,
        multirecord_area_offset: if document.records.is_empty() { 0 } else { end },
    };

    if end > FRU_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: end,
            available: FRU_SIZE,
        });
    }

    let mut image = vec![0u8; FRU_SIZE];
    image[..Header::SIZE].copy_from_slice(&header.encode()?);
    image[board_area_offset..product_area_offset].copy_from_slice(&board);
    image[product_area_offset..end].copy_from_slice(&product);

    multirecord::encode_records(&document.records, &mut image[end..], unit)?;

    Ok(image)
}

fn copy_prefix(original: &[u8], image: &mut [u8], offset: usize) -> Result<(), EncodeError> {
    let prefix = original
        .get(..offset)
        .filter(|_| offset <= image.len())
        .ok_or(EncodeError::BadOffset {
            area: AreaKind::Multirecord,
            offset,
        })?;
    image[..offset].copy_from_slice(prefix);
    Ok(())
}

/// First 8 byte aligned offset past both the board and product areas
fn placement(original: &[u8], header: &Header) -> Result<usize, EncodeError> {
    let area_end = |kind: AreaKind, offset: usize| {
        original
            .get(offset + 1)
            .map(|&units| offset + units as usize * OFFSET_UNIT)
            .ok_or(EncodeError::BadOffset { area: kind, offset })
    };

    let end = area_end(AreaKind::Board, header.board_area_offset)?
        .max(area_end(AreaKind::Product, header.product_area_offset)?)
        .max(Header::SIZE);

    Ok(end.next_multiple_of(OFFSET_UNIT))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{checksum, BoardArea, ChecksumRegion, DecodeError, PowerPolicy, ProductArea, MAX_RECORDS};

    const FIXTURE: &[u8] = include_bytes!("../../../test/mitx-fru.bin");

    #[test]
    fn unchanged_document_reproduces_records() {
        let document = Document::decode(FIXTURE).unwrap();
        let image = update(FIXTURE, &document, LengthUnit::Bytes).unwrap();

        assert_eq!(image.len(), FRU_SIZE);
        assert_eq!(&image[..163], &FIXTURE[..163]);
        assert!(image[163..].iter().all(|&b| b == 0));
    }

    #[test]
    fn update_roundtrip() {
        let mut document = Document::decode(FIXTURE).unwrap();
        document.set_mac(2, [0x4c, 0xa5, 0x15, 0x00, 0x00, 0x03]).unwrap();
        document.set_passwd_line("root:$6$salt$hash:0:0:root:/root:/bin/sh");
        document.set_test_ok(0);

        let image = update(FIXTURE, &document, LengthUnit::Bytes).unwrap();
        let decoded = Document::decode(&image).unwrap();

        assert_eq!(decoded.records, document.records);
        assert_eq!(decoded.board, document.board);
        assert_eq!(decoded.test_ok(), Some(0));
        assert_eq!(decoded.mac(2), Some([0x4c, 0xa5, 0x15, 0x00, 0x00, 0x03]));
    }

    #[test]
    fn update_does_not_reencode_areas() {
        let mut document = Document::decode(FIXTURE).unwrap();
        document.board.serial_number = "changed".into();

        let image = update(FIXTURE, &document, LengthUnit::Bytes).unwrap();
        let decoded = Document::decode(&image).unwrap();

        assert_eq!(decoded.board.serial_number.to_string(), "BM1000-0001");
    }

    #[test]
    fn compose_roundtrip() {
        let board = BoardArea {
            mfg_date: [0x01, 0x02, 0x03],
            manufacturer: "Baikal Electronics".into(),
            product_name: "MITX".into(),
            ..Default::default()
        };
        let product = ProductArea {
            product_name: "TF307".into(),
            ..Default::default()
        };

        for count in 0..=MAX_RECORDS {
            let mut document = Document::new(board.clone(), product.clone());
            for i in 0..count {
                document.upsert(0xd0 + i as u8, vec![i as u8; i * 3]);
            }

            let image = compose(&document, LengthUnit::Bytes).unwrap();
            let decoded = Document::decode(&image).unwrap();

            assert_eq!(decoded.product, product);
            assert_eq!(decoded.records, document.records, "with {count} records");
        }
    }

    #[test]
    fn composed_regions_checksum_to_zero() {
        let mut document = Document::new(BoardArea::default(), ProductArea::default());
        document.set_power_policy(PowerPolicy::On);

        let image = compose(&document, LengthUnit::Bytes).unwrap();
        let decoded = Document::decode(&image).unwrap();
        let header = decoded.header;

        assert!(checksum::is_valid(&image[..Header::SIZE]));
        assert!(checksum::is_valid(
            &image[header.board_area_offset..header.product_area_offset]
        ));
        assert!(checksum::is_valid(
            &image[header.product_area_offset..header.multirecord_area_offset]
        ));
        assert!(checksum::is_valid(
            &image[header.multirecord_area_offset..header.multirecord_area_offset + 5]
        ));
    }

    #[test]
    fn image_without_multirecords_gains_an_area() {
        let document = Document::new(BoardArea::default(), ProductArea::default());
        let blank = compose(&document, LengthUnit::Bytes).unwrap();

        let mut document = Document::decode(&blank).unwrap();
        assert!(document.records.is_empty());
        document.set_test_ok(1);

        let image = update(&blank, &document, LengthUnit::Bytes).unwrap();
        let decoded = Document::decode(&image).unwrap();

        assert_eq!(decoded.header.multirecord_area_offset, 40);
        assert_eq!(decoded.test_ok(), Some(1));
    }

    #[test]
    fn image_without_multirecords_stays_intact() {
        let board = BoardArea {
            manufacturer: "Baikal Electronics".into(),
            ..Default::default()
        };
        let blank = compose(&Document::new(board, ProductArea::default()), LengthUnit::Bytes).unwrap();
        let document = Document::decode(&blank).unwrap();

        let image = update(&blank, &document, LengthUnit::Bytes).unwrap();

        assert_eq!(image, blank);
        assert_eq!(Document::decode(&image).unwrap(), document);
    }

    #[test]
    fn records_overflowing_image() {
        let mut document = Document::decode(FIXTURE).unwrap();
        document.upsert(0xc1, vec![0xaa; 200]);
        document.header.multirecord_area_offset = FRU_SIZE - 64;

        let mut original = FIXTURE.to_vec();
        original.resize(FRU_SIZE, 0);

        assert!(matches!(
            update(&original, &document, LengthUnit::Bytes),
            Err(EncodeError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn too_many_records_do_not_encode() {
        let mut document = Document::decode(FIXTURE).unwrap();
        for i in 0..MAX_RECORDS {
            document.upsert(0xd0 + i as u8, vec![]);
        }

        assert_eq!(
            update(FIXTURE, &document, LengthUnit::Bytes),
            Err(EncodeError::TooManyRecords(MAX_RECORDS + 3))
        );
    }

    #[test]
    fn bad_data_checksum_in_updated_image() {
        let document = Document::decode(FIXTURE).unwrap();
        let mut image = update(FIXTURE, &document, LengthUnit::Bytes).unwrap();
        image[136 + 16] ^= 0x20;

        assert_eq!(
            Document::decode(&image),
            Err(DecodeError::ChecksumInvalid(ChecksumRegion::RecordData))
        );
    }
}
