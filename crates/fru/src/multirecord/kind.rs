// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

/// Vendor multirecord types understood by the tooling
///
/// Records of any other type code are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum RecordType {
    /// MAC address of the first network interface
    Mac0 = 0xc0,
    /// Opaque bootloader data
    UBoot = 0xc1,
    /// Name of the device to boot from
    BootDevice = 0xc2,
    /// A `passwd(5)` line provisioned at first boot
    PasswdLine = 0xc3,
    /// Factory test result
    TestOk = 0xc4,
    /// What to do when power is restored, see [`PowerPolicy`]
    PowerPolicy = 0xc5,
    /// Power state saved for [`PowerPolicy::LastState`]
    PowerState = 0xc6,
    /// MAC address of the second network interface
    Mac1 = 0xc7,
    /// MAC address of the third network interface
    Mac2 = 0xc8,
}

impl RecordType {
    /// Number of network interfaces with a MAC slot
    pub const MAC_SLOTS: usize = 3;

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Type holding the MAC address of `interface`
    pub fn mac(interface: usize) -> Option<Self> {
        match interface {
            0 => Some(Self::Mac0),
            1 => Some(Self::Mac1),
            2 => Some(Self::Mac2),
            _ => None,
        }
    }

    /// Interface index of a MAC record type
    pub fn mac_interface(self) -> Option<usize> {
        match self {
            Self::Mac0 => Some(0),
            Self::Mac1 => Some(1),
            Self::Mac2 => Some(2),
            _ => None,
        }
    }
}

impl TryFrom<u8> for RecordType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0xc0 => Self::Mac0,
            0xc1 => Self::UBoot,
            0xc2 => Self::BootDevice,
            0xc3 => Self::PasswdLine,
            0xc4 => Self::TestOk,
            0xc5 => Self::PowerPolicy,
            0xc6 => Self::PowerState,
            0xc7 => Self::Mac1,
            0xc8 => Self::Mac2,
            c => return Err(c),
        })
    }
}

/// Behaviour when power is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PowerPolicy {
    Off,
    On,
    LastState,
    Other(u8),
}

impl From<u8> for PowerPolicy {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Off,
            1 => Self::On,
            2 => Self::LastState,
            v => Self::Other(v),
        }
    }
}

impl From<PowerPolicy> for u8 {
    fn from(policy: PowerPolicy) -> Self {
        match policy {
            PowerPolicy::Off => 0,
            PowerPolicy::On => 1,
            PowerPolicy::LastState => 2,
            PowerPolicy::Other(v) => v,
        }
    }
}
