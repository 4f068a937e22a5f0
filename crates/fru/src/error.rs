// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io;

use thiserror::Error;

/// Regions protected by their own zero checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChecksumRegion {
    Header,
    Board,
    Product,
    RecordHeader,
    RecordData,
}

/// Regions of the image located through the common header
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AreaKind {
    Header,
    Board,
    Product,
    Multirecord,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer too short")]
    BufferTooShort,
    #[error("empty EEPROM detected")]
    EmptyDevice,
    #[error("{area} version is not valid: expected {expected}, found {found}")]
    VersionMismatch { area: AreaKind, expected: u8, found: u8 },
    #[error("{area} area size mismatch: declares {declared} bytes, {available} available")]
    SizeMismatch {
        area: AreaKind,
        declared: usize,
        available: usize,
    },
    #[error("bad {0} checksum")]
    ChecksumInvalid(ChecksumRegion),
    #[error("multirecord format is unknown: {0}")]
    UnknownFormat(u8),
    #[error("{area} offset {offset} lies outside the image")]
    BadOffset { area: AreaKind, offset: usize },
    #[error("io: {0}")]
    Io(io::ErrorKind),
}

impl From<io::Error> for DecodeError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::BufferTooShort,
            kind => DecodeError::Io(kind),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("payload of {0} bytes does not fit a record")]
    PayloadTooLong(usize),
    #[error("{0} area exceeds 255 units")]
    AreaTooLong(AreaKind),
    #[error("too many multirecords: {0}")]
    TooManyRecords(usize),
    #[error("{area} offset {offset} is not usable")]
    BadOffset { area: AreaKind, offset: usize },
    #[error("io: {0}")]
    Io(io::ErrorKind),
}

impl From<io::Error> for EncodeError {
    fn from(error: io::Error) -> Self {
        EncodeError::Io(error.kind())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutateError {
    #[error("no MAC slot for interface {0}")]
    InterfaceOutOfRange(usize),
}
