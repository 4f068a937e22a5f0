// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::Write;

use log::{trace, warn};

use crate::{
    checksum, dump,
    ext::WriteExt,
    ChecksumRegion, DecodeError, EncodeError,
};

pub use self::kind::{PowerPolicy, RecordType};

mod kind;

/// Size of a record header: type, format, length, data checksum, header checksum
pub const RECORD_HEADER_SIZE: usize = 5;

/// The only record format accepted, stored in the low 3 bits of byte 1
pub const RECORD_FORMAT: u8 = 0x02;

/// Upper bound on records decoded from one image
pub const MAX_RECORDS: usize = 8;

const FORMAT_MASK: u8 = 0x07;
const END_OF_LIST: u8 = 0x80;
const BLOCK_SIZE: usize = 8;

/// Meaning of the record length byte
///
/// Both flavours exist on deployed boards and they cannot decode each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LengthUnit {
    /// Length is the payload size in bytes
    #[default]
    Bytes,
    /// Payload is zero padded to 8 bytes and the length counts 8 byte blocks
    Blocks,
}

impl LengthUnit {
    fn payload_size(self, field: u8) -> usize {
        match self {
            LengthUnit::Bytes => field as usize,
            LengthUnit::Blocks => field as usize * BLOCK_SIZE,
        }
    }

    fn padded_size(self, len: usize) -> usize {
        match self {
            LengthUnit::Bytes => len,
            LengthUnit::Blocks => len.next_multiple_of(BLOCK_SIZE),
        }
    }

    fn length_field(self, padded: usize) -> Option<u8> {
        match self {
            LengthUnit::Bytes => u8::try_from(padded).ok(),
            LengthUnit::Blocks => u8::try_from(padded / BLOCK_SIZE).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub length_unit: LengthUnit,
    /// Keep records whose header checksum is bad, flagged through
    /// [`Multirecord::header_checksum_ok`], instead of failing the decode
    pub retain_unreliable: bool,
}

/// A typed vendor record of the multirecord area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multirecord {
    pub record_type: u8,
    pub format: u8,
    /// Set on the last record of the area
    pub terminal: bool,
    pub header_checksum_ok: bool,
    pub payload: Vec<u8>,
}

impl Multirecord {
    pub fn new(record_type: u8, payload: Vec<u8>, terminal: bool) -> Self {
        Self {
            record_type,
            format: RECORD_FORMAT,
            terminal,
            header_checksum_ok: true,
            payload,
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Catalog entry for this record, if known
    pub fn kind(&self) -> Option<RecordType> {
        RecordType::try_from(self.record_type).ok()
    }

    /// Decode one record from the start of `buf`
    ///
    /// Returns the record and the number of bytes it occupies.
    pub fn decode(buf: &[u8], options: DecodeOptions) -> Result<(Self, usize), DecodeError> {
        let Some(header) = buf.get(..RECORD_HEADER_SIZE) else {
            warn!("No space in multirecord buffer, failed to parse header");
            return Err(DecodeError::BufferTooShort);
        };
        dump::trace_bytes("multirecord header", header);

        let header_checksum_ok = checksum::is_valid(header);
        if !header_checksum_ok {
            warn!("Multirecord header checksum is invalid");
            if !options.retain_unreliable {
                return Err(DecodeError::ChecksumInvalid(ChecksumRegion::RecordHeader));
            }
        }

        let format = header[1] & FORMAT_MASK;
        if format != RECORD_FORMAT {
            warn!("Multirecord format is unknown [{format}]");
            return Err(DecodeError::UnknownFormat(format));
        }

        let terminal = header[1] & END_OF_LIST != 0;
        let length = options.length_unit.payload_size(header[2]);

        let Some(payload) = buf.get(RECORD_HEADER_SIZE..RECORD_HEADER_SIZE + length) else {
            warn!("No space in multirecord buffer, failed to check data");
            return Err(DecodeError::BufferTooShort);
        };
        dump::trace_bytes("multirecord data", payload);

        let data_checksum = checksum::checksum(payload).wrapping_add(header[3]);
        if data_checksum != 0 {
            warn!("Multirecord data checksum is invalid [{data_checksum:#04x}]");
            return Err(DecodeError::ChecksumInvalid(ChecksumRegion::RecordData));
        }

        if terminal {
            trace!("Last multirecord");
        }

        let record = Self {
            record_type: header[0],
            format,
            terminal,
            header_checksum_ok,
            payload: payload.to_vec(),
        };

        Ok((record, RECORD_HEADER_SIZE + length))
    }

    /// Bytes this record occupies once encoded
    pub fn encoded_size(&self, unit: LengthUnit) -> usize {
        RECORD_HEADER_SIZE + unit.padded_size(self.payload.len())
    }

    /// Encode into the start of `buf` with the given terminal flag
    ///
    /// The stored [`Multirecord::terminal`] is ignored, callers decide
    /// which record ends the list.
    pub fn encode(&self, buf: &mut [u8], terminal: bool, unit: LengthUnit) -> Result<usize, EncodeError> {
        let padded = unit.padded_size(self.payload.len());
        let length = unit
            .length_field(padded)
            .ok_or(EncodeError::PayloadTooLong(self.payload.len()))?;

        let needed = RECORD_HEADER_SIZE + padded;
        if needed > buf.len() {
            warn!("Failed to pack multirecord {:#04x}", self.record_type);
            return Err(EncodeError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }

        let mut payload = self.payload.clone();
        payload.resize(padded, 0);

        let flags = if terminal { END_OF_LIST } else { 0 };
        let mut header = [self.record_type, flags | RECORD_FORMAT, length, checksum::complement(&payload), 0];
        header[4] = checksum::complement(&header[..4]);

        let mut writer = &mut buf[..needed];
        writer.write_array(header)?;
        writer.write_all(&payload)?;

        Ok(needed)
    }
}

/// Decode the record list starting at the beginning of `buf`
///
/// Stops after the terminal record, or after [`MAX_RECORDS`] records if the
/// list is never terminated. Any failing record fails the whole list.
pub fn decode_records(buf: &[u8], options: DecodeOptions) -> Result<Vec<Multirecord>, DecodeError> {
    let mut records = Vec::with_capacity(MAX_RECORDS);
    let mut offset = 0;

    while records.len() < MAX_RECORDS {
        trace!("Parsing multirecord {}", records.len());

        let (record, consumed) = Multirecord::decode(&buf[offset..], options).inspect_err(|_| {
            warn!("Failed to parse multirecord {}", records.len());
        })?;

        let terminal = record.terminal;
        records.push(record);

        if terminal {
            return Ok(records);
        }
        offset += consumed;
    }

    warn!("Multirecord list is not terminated within {MAX_RECORDS} records");
    Ok(records)
}

/// Encode `records` back to back into `buf`, returning the bytes used
///
/// Only the last record is flagged terminal.
pub fn encode_records(records: &[Multirecord], buf: &mut [u8], unit: LengthUnit) -> Result<usize, EncodeError> {
    if records.len() > MAX_RECORDS {
        return Err(EncodeError::TooManyRecords(records.len()));
    }

    let mut offset = 0;
    for (i, record) in records.iter().enumerate() {
        let terminal = i + 1 == records.len();
        offset += record.encode(&mut buf[offset..], terminal, unit)?;
    }

    Ok(offset)
}
