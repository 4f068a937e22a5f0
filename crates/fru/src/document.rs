// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use log::{debug, trace};

use crate::{
    multirecord, AreaKind, BoardArea, DecodeError, DecodeOptions, Header, MutateError, Multirecord, PowerPolicy,
    ProductArea, RecordType, FRU_STR_MAX,
};

/// Capacity of the passwd line record
pub const FRU_PWD_MAX: usize = 128;

/// Length of a MAC address record payload
pub const MAC_LEN: usize = 6;

/// A decoded FRU image
///
/// The document owns every record payload. It is not synchronised, callers
/// sharing one between threads must serialise mutation and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub header: Header,
    pub board: BoardArea,
    pub product: ProductArea,
    /// In on-disk order, the last one carries the terminal flag
    pub records: Vec<Multirecord>,
}

impl Document {
    /// A document with no multirecords, to be laid out by [`crate::compose`]
    pub fn new(board: BoardArea, product: ProductArea) -> Self {
        Self {
            header: Header {
                board_area_offset: 0,
                product_area_offset: 0,
                multirecord_area_offset: 0,
            },
            board,
            product,
            records: vec![],
        }
    }

    pub fn decode(image: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(image, DecodeOptions::default())
    }

    /// Decode a whole image, failing on the first invalid region
    pub fn decode_with(image: &[u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        debug!(
            "Checking header [{:02x?}]",
            image.get(..Header::SIZE).unwrap_or(image)
        );
        let header = Header::decode(image)?;

        let board = BoardArea::decode(area(image, AreaKind::Board, header.board_area_offset)?)?;
        let product = ProductArea::decode(area(image, AreaKind::Product, header.product_area_offset)?)?;

        let records = if header.multirecord_area_offset == 0 {
            debug!("No multirecord area");
            vec![]
        } else {
            multirecord::decode_records(
                area(image, AreaKind::Multirecord, header.multirecord_area_offset)?,
                options,
            )?
        };
        debug!("Decoded {} multirecords", records.len());

        Ok(Self {
            header,
            board,
            product,
            records,
        })
    }

    /// First record with the given type code
    pub fn record(&self, record_type: u8) -> Option<&Multirecord> {
        self.records.iter().find(|r| r.record_type == record_type)
    }

    /// Update or append a terminal record, see [`Document::upsert_by_type`]
    pub fn upsert(&mut self, record_type: u8, payload: Vec<u8>) -> Option<Vec<u8>> {
        self.upsert_by_type(record_type, payload, true)
    }

    /// Replace the payload of the first record of `record_type`, or add one
    ///
    /// An existing record keeps its position and terminal flag. A new record
    /// is appended as the terminal one, demoting the previous terminal record,
    /// unless `make_terminal` is false and records exist, in which case it is
    /// inserted just ahead of the last record.
    ///
    /// Records are never removed or reordered. Returns the replaced payload.
    pub fn upsert_by_type(&mut self, record_type: u8, payload: Vec<u8>, make_terminal: bool) -> Option<Vec<u8>> {
        if let Some(record) = self.records.iter_mut().find(|r| r.record_type == record_type) {
            debug!("Found multirecord {record_type:#04x}, updating");
            return Some(std::mem::replace(&mut record.payload, payload));
        }

        debug!(
            "Multirecord {record_type:#04x} not found, creating record {}",
            self.records.len()
        );

        if make_terminal || self.records.is_empty() {
            for record in self.records.iter_mut().filter(|r| r.terminal) {
                trace!("Demoting terminal multirecord {:#04x}", record.record_type);
                record.terminal = false;
            }
            self.records.push(Multirecord::new(record_type, payload, true));
        } else {
            let last = self.records.len() - 1;
            self.records
                .insert(last, Multirecord::new(record_type, payload, false));
        }

        None
    }

    fn upsert_kind(&mut self, kind: RecordType, payload: Vec<u8>) -> Option<Vec<u8>> {
        self.upsert(kind.code(), payload)
    }

    pub fn set_mac(&mut self, interface: usize, mac: [u8; MAC_LEN]) -> Result<Option<Vec<u8>>, MutateError> {
        let kind = RecordType::mac(interface).ok_or(MutateError::InterfaceOutOfRange(interface))?;
        Ok(self.upsert_kind(kind, mac.to_vec()))
    }

    /// Store the boot device name, truncated to [`FRU_STR_MAX`] bytes
    pub fn set_boot_device(&mut self, device: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        self.upsert_kind(RecordType::BootDevice, truncated(device.as_ref(), FRU_STR_MAX))
    }

    /// Store the passwd line, truncated to [`FRU_PWD_MAX`] bytes
    pub fn set_passwd_line(&mut self, line: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        self.upsert_kind(RecordType::PasswdLine, truncated(line.as_ref(), FRU_PWD_MAX))
    }

    pub fn set_test_ok(&mut self, test_ok: u8) -> Option<Vec<u8>> {
        self.upsert_kind(RecordType::TestOk, vec![test_ok])
    }

    pub fn set_power_policy(&mut self, policy: PowerPolicy) -> Option<Vec<u8>> {
        self.upsert_kind(RecordType::PowerPolicy, vec![policy.into()])
    }

    pub fn set_power_state(&mut self, state: u8) -> Option<Vec<u8>> {
        self.upsert_kind(RecordType::PowerState, vec![state])
    }

    fn payload(&self, kind: RecordType) -> Option<&[u8]> {
        self.record(kind.code()).map(|r| r.payload.as_slice())
    }

    pub fn mac(&self, interface: usize) -> Option<[u8; MAC_LEN]> {
        let payload = self.payload(RecordType::mac(interface)?)?;
        payload.get(..MAC_LEN)?.try_into().ok()
    }

    /// Boot device name without trailing padding
    pub fn boot_device(&self) -> Option<&[u8]> {
        self.payload(RecordType::BootDevice)
            .map(|p| trim_nul(&p[..p.len().min(FRU_STR_MAX)]))
    }

    /// Passwd line without trailing padding
    pub fn passwd_line(&self) -> Option<&[u8]> {
        self.payload(RecordType::PasswdLine)
            .map(|p| trim_nul(&p[..p.len().min(FRU_PWD_MAX)]))
    }

    pub fn test_ok(&self) -> Option<u8> {
        self.payload(RecordType::TestOk)?.first().copied()
    }

    pub fn power_policy(&self) -> Option<PowerPolicy> {
        self.payload(RecordType::PowerPolicy)?
            .first()
            .map(|&b| PowerPolicy::from(b))
    }

    pub fn power_state(&self) -> Option<u8> {
        self.payload(RecordType::PowerState)?.first().copied()
    }
}

/// Slice of the image starting at an area offset
fn area(image: &[u8], kind: AreaKind, offset: usize) -> Result<&[u8], DecodeError> {
    image.get(offset..).ok_or(DecodeError::BadOffset { area: kind, offset })
}

fn truncated(bytes: &[u8], capacity: usize) -> Vec<u8> {
    bytes[..bytes.len().min(capacity)].to_vec()
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ChecksumRegion, LengthUnit};

    const FIXTURE: &[u8] = include_bytes!("../../../test/mitx-fru.bin");

    fn terminal_flags(document: &Document) -> Vec<bool> {
        document.records.iter().map(|r| r.terminal).collect()
    }

    #[test]
    fn decode_fixture() {
        let document = Document::decode(FIXTURE).unwrap();

        assert_eq!(document.header.multirecord_area_offset, 136);
        assert_eq!(document.board.product_name.to_string(), "MITX-BE-M1000");
        assert_eq!(document.product.serial_number.to_string(), "SN000123");
        assert_eq!(document.records.len(), 3);
        assert_eq!(document.mac(0), Some([0x4c, 0xa5, 0x15, 0x00, 0x00, 0x01]));
        assert_eq!(document.boot_device(), Some(&b"sata0"[..]));
        assert_eq!(document.test_ok(), Some(1));
        assert_eq!(document.mac(1), None);
        assert_eq!(document.power_policy(), None);
    }

    #[test]
    fn erased_device() {
        assert_eq!(Document::decode(&[0xff; 4096]), Err(DecodeError::EmptyDevice));
    }

    #[test]
    fn corrupt_record_aborts_decode() {
        let mut image = FIXTURE.to_vec();
        image[136 + 5] ^= 0x01;

        assert_eq!(
            Document::decode(&image),
            Err(DecodeError::ChecksumInvalid(ChecksumRegion::RecordData))
        );
    }

    #[test]
    fn offset_past_image() {
        let mut image = FIXTURE[..1024].to_vec();
        image[5] = 0xff;
        image[7] = image[7].wrapping_sub(0xff - 0x11);

        assert_eq!(
            Document::decode(&image),
            Err(DecodeError::BadOffset {
                area: AreaKind::Multirecord,
                offset: 2040
            })
        );
    }

    #[test]
    fn truncated_image() {
        assert_eq!(Document::decode(&FIXTURE[..136]), Err(DecodeError::BufferTooShort));
    }

    #[test]
    fn update_keeps_position_and_flag() {
        let mut document = Document::decode(FIXTURE).unwrap();

        let previous = document.set_boot_device("nvme0n1");

        assert_eq!(previous, Some(b"sata0".to_vec()));
        assert_eq!(document.records[1].record_type, RecordType::BootDevice.code());
        assert_eq!(document.boot_device(), Some(&b"nvme0n1"[..]));
        assert_eq!(terminal_flags(&document), [false, false, true]);
    }

    #[test]
    fn mac_on_second_interface_is_appended() {
        let mut document = Document::decode(FIXTURE).unwrap();

        let previous = document.set_mac(1, [2, 0, 0, 0, 0, 1]).unwrap();

        assert_eq!(previous, None);
        assert_eq!(document.records.len(), 4);
        assert_eq!(document.records[3].record_type, 0xc7);
        assert_eq!(terminal_flags(&document), [false, false, false, true]);
        assert_eq!(document.mac(1), Some([2, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn mac_interface_out_of_range() {
        let mut document = Document::decode(FIXTURE).unwrap();
        assert_eq!(
            document.set_mac(3, [0; MAC_LEN]),
            Err(MutateError::InterfaceOutOfRange(3))
        );
        assert_eq!(document.records.len(), 3);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut document = Document::decode(FIXTURE).unwrap();

        document.set_power_policy(PowerPolicy::LastState);
        let once = document.clone();
        document.set_power_policy(PowerPolicy::LastState);

        assert_eq!(document, once);
        assert_eq!(document.power_policy(), Some(PowerPolicy::LastState));
    }

    #[test]
    fn terminal_invariant_after_upserts() {
        let mut document = Document::new(BoardArea::default(), ProductArea::default());

        document.set_test_ok(0);
        document.set_power_state(1);
        document.set_mac(2, [1; MAC_LEN]).unwrap();
        document.set_test_ok(1);
        document.upsert_by_type(0xd0, vec![9], false);

        assert_eq!(document.records.len(), 4);
        assert_eq!(document.records.iter().filter(|r| r.terminal).count(), 1);
        assert!(document.records.last().unwrap().terminal);
        assert_eq!(document.records[2].record_type, 0xd0);
        assert_eq!(document.test_ok(), Some(1));
    }

    #[test]
    fn long_strings_are_truncated() {
        let mut document = Document::new(BoardArea::default(), ProductArea::default());

        document.set_boot_device("x".repeat(FRU_STR_MAX + 10));
        document.set_passwd_line("p".repeat(FRU_PWD_MAX * 2));

        assert_eq!(document.boot_device().unwrap().len(), FRU_STR_MAX);
        assert_eq!(document.passwd_line().unwrap().len(), FRU_PWD_MAX);
    }

    #[test]
    fn padded_payloads_read_back_trimmed() {
        let document = Document::decode(FIXTURE).unwrap();
        let image = crate::update(FIXTURE, &document, LengthUnit::Blocks).unwrap();

        let options = DecodeOptions {
            length_unit: LengthUnit::Blocks,
            ..Default::default()
        };
        let document = Document::decode_with(&image, options).unwrap();

        assert_eq!(document.records[1].payload, b"sata0\0\0\0");
        assert_eq!(document.boot_device(), Some(&b"sata0"[..]));
    }
}
