// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::warn;

use crate::{checksum, dump, header::OFFSET_UNIT, AreaKind, ChecksumRegion, DecodeError, EncodeError};

pub use self::board::{BoardArea, BOARD_AREA_VERSION};
pub use self::product::{ProductArea, PRODUCT_AREA_VERSION};

mod board;
mod product;

/// Check version, declared length and checksum of an area
///
/// `buf` runs from the start of the area to the end of the image. Only the
/// declared `buf[1] * 8` bytes are checksummed, but all of `buf` is handed
/// back since string fields may declare lengths reaching past the area.
pub(crate) fn validate(kind: AreaKind, version: u8, buf: &[u8]) -> Result<&[u8], DecodeError> {
    let [found, units, ..] = *buf else {
        warn!("No space left for the {kind} area");
        return Err(DecodeError::BufferTooShort);
    };

    if found != version {
        warn!("{kind} area version is not valid");
        return Err(DecodeError::VersionMismatch {
            area: kind,
            expected: version,
            found,
        });
    }

    let declared = units as usize * OFFSET_UNIT;
    if declared > buf.len() {
        warn!("{kind} area size mismatch");
        return Err(DecodeError::SizeMismatch {
            area: kind,
            declared,
            available: buf.len(),
        });
    }

    let area = &buf[..declared];
    dump::trace_bytes(&format!("{kind} area"), area);

    if !checksum::is_valid(area) {
        warn!(
            "Bad {kind} area checksum [0-{declared}]: {}",
            checksum::checksum(area)
        );
        return Err(DecodeError::ChecksumInvalid(region(kind)));
    }

    Ok(buf)
}

/// Pad an encoded area body to the 8 byte grid, store its length and append the checksum
pub(crate) fn seal(kind: AreaKind, mut body: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
    let total = (body.len() + 1).next_multiple_of(OFFSET_UNIT);
    body.resize(total - 1, 0);

    body[1] = u8::try_from(total / OFFSET_UNIT).map_err(|_| EncodeError::AreaTooLong(kind))?;
    body.push(checksum::complement(&body));

    Ok(body)
}

fn region(kind: AreaKind) -> ChecksumRegion {
    match kind {
        AreaKind::Board => ChecksumRegion::Board,
        AreaKind::Product => ChecksumRegion::Product,
        AreaKind::Header | AreaKind::Multirecord => ChecksumRegion::Header,
    }
}
