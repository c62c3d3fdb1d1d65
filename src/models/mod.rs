// Data models for disk records and the fixed code tables used to describe them

use std::fmt;

/// Health code reported when the disk cannot tell.
pub const HEALTH_UNKNOWN: i32 = -1;
/// Health code for a disk that reports imminent or actual failure.
pub const HEALTH_FAIL: i32 = 0;
/// Health code for a disk that reports a warning condition.
pub const HEALTH_WARN: i32 = 1;
/// Health code for a disk that passed its self assessment.
pub const HEALTH_GOOD: i32 = 2;

/// Health code to display text. Codes not listed render as an empty string.
pub const HEALTH_TEXT: &[(i32, &str)] = &[
    (HEALTH_UNKNOWN, "Unknown"),
    (HEALTH_FAIL, "Fail"),
    (HEALTH_WARN, "Warn"),
    (HEALTH_GOOD, "Good"),
];

pub const LINK_NO_SUPPORT: i32 = -2;
pub const LINK_UNKNOWN: i32 = -1;
pub const LINK_FC: i32 = 0;
pub const LINK_SSA: i32 = 2;
pub const LINK_SBP: i32 = 3;
pub const LINK_SRP: i32 = 4;
pub const LINK_ISCSI: i32 = 5;
pub const LINK_SAS: i32 = 6;
pub const LINK_ADT: i32 = 7;
pub const LINK_ATA: i32 = 8;
pub const LINK_USB: i32 = 9;
pub const LINK_SOP: i32 = 10;
pub const LINK_PCIE: i32 = 11;

/// Link type code to display text. Codes not listed render as an empty string.
pub const LINK_TEXT: &[(i32, &str)] = &[
    (LINK_NO_SUPPORT, "Not supported by LSM"),
    (LINK_UNKNOWN, "Unknown"),
    (LINK_FC, "FibreChannel"),
    (LINK_SSA, "SSA"),
    (LINK_SBP, "Serial Bus Protocol"),
    (LINK_SRP, "SCSI RDMA"),
    (LINK_ISCSI, "iSCSI"),
    (LINK_SAS, "SAS"),
    (LINK_ADT, "Automated Drive(Tape)"),
    (LINK_ATA, "IDE/SATA"),
    (LINK_USB, "USB"),
    (LINK_SOP, "SCSI over PCIe"),
    (LINK_PCIE, "PCIe"),
];

/// Raw LED bit-field value meaning the disk has no LED support at all.
pub const LED_STATUS_UNSUPPORTED: u32 = 1;
pub const LED_IDENT_ON: u32 = 0x02;
pub const LED_IDENT_OFF: u32 = 0x04;
pub const LED_IDENT_UNKNOWN: u32 = 0x08;
pub const LED_FAULT_ON: u32 = 0x10;
pub const LED_FAULT_OFF: u32 = 0x20;
pub const LED_FAULT_UNKNOWN: u32 = 0x40;

/// Bit offset of the ident LED sub-field.
pub const LED_IDENT_OFFSET: u32 = 1;
/// Bit offset of the fail LED sub-field.
pub const LED_FAULT_OFFSET: u32 = 4;

fn lookup(table: &[(i32, &'static str)], code: i32) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| *text)
        .unwrap_or("")
}

/// Display text for a health code.
pub fn health_text(code: i32) -> &'static str {
    lookup(HEALTH_TEXT, code)
}

/// Display text for a link type code.
pub fn link_text(code: i32) -> &'static str {
    lookup(LINK_TEXT, code)
}

/// Broad device class, inferred from rotational speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    /// Non-rotational media (rotational speed of zero)
    Flash,
    /// Spinning media
    Hdd,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            DeviceClass::Flash => "Flash",
            DeviceClass::Hdd => "HDD",
        })
    }
}

/// Relationship between logical and physical block size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectorFormat {
    /// 512 byte logical and physical sectors
    Native512,
    /// Equal logical and physical sectors of some other size (4K native)
    FourKn,
    /// Logical and physical sizes differ (512 emulation)
    Emulated512,
}

impl fmt::Display for SectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SectorFormat::Native512 => "512",
            SectorFormat::FourKn => "4KN",
            SectorFormat::Emulated512 => "512e",
        })
    }
}

/// Decoded state of one indicator LED.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    On,
    Off,
    Unknown,
    /// The disk reports no LED support
    Unavailable,
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            LedState::On => "ON",
            LedState::Off => "OFF",
            LedState::Unknown => "UNKNOWN",
            LedState::Unavailable => "Unavailable",
        })
    }
}

/// Everything known about one local disk, merged from the native
/// storage-management layer and sysfs attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct DiskRecord {
    /// Device path (e.g., /dev/sda)
    pub dev_path: String,
    /// Flash or HDD
    pub device_class: DeviceClass,
    /// Serial number from VPD page 0x80
    pub serial_number: String,
    /// Identifier from VPD page 0x83
    pub vpd83: String,
    /// Raw sector count from sysfs
    pub size_sectors: u64,
    /// Capacity in bytes
    pub size_bytes: u64,
    /// Sector format classification
    pub sector_format: SectorFormat,
    /// Link type display text
    pub transport: String,
    /// Negotiated link speed as reported by the native layer
    pub link_speed: u32,
    /// Rotational speed, 0 for non-rotational media
    pub rpm: i32,
    /// Identify LED state
    pub led_ident: LedState,
    /// Fault LED state
    pub led_fail: LedState,
    /// Health display text
    pub health: String,
    pub vendor: String,
    pub model: String,
    pub revision: String,
    pub wwid: String,
}

impl DiskRecord {
    /// Creates a record holding only the device path.
    /// Every other field carries its empty, zero or unknown value.
    pub fn empty(dev: impl Into<String>) -> Self {
        Self {
            dev_path: dev.into(),
            device_class: DeviceClass::Flash,
            serial_number: String::new(),
            vpd83: String::new(),
            size_sectors: 0,
            size_bytes: 0,
            sector_format: SectorFormat::Native512,
            transport: link_text(LINK_UNKNOWN).to_string(),
            link_speed: 0,
            rpm: 0,
            led_ident: LedState::Unknown,
            led_fail: LedState::Unknown,
            health: health_text(HEALTH_UNKNOWN).to_string(),
            vendor: String::new(),
            model: String::new(),
            revision: String::new(),
            wwid: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_codes_map_to_text() {
        assert_eq!(health_text(HEALTH_GOOD), "Good");
        assert_eq!(health_text(HEALTH_FAIL), "Fail");
        assert_eq!(health_text(HEALTH_UNKNOWN), "Unknown");
        assert_eq!(health_text(42), "");
    }

    #[test]
    fn link_codes_map_to_text() {
        assert_eq!(link_text(LINK_ATA), "IDE/SATA");
        assert_eq!(link_text(LINK_PCIE), "PCIe");
        assert_eq!(link_text(LINK_NO_SUPPORT), "Not supported by LSM");
        // 1 is a gap in the table
        assert_eq!(link_text(1), "");
    }

    #[test]
    fn display_honours_width() {
        assert_eq!(format!("{:>6}", DeviceClass::Hdd), "   HDD");
        assert_eq!(format!("{:<5}|", SectorFormat::FourKn), "4KN  |");
        assert_eq!(LedState::Unavailable.to_string(), "Unavailable");
    }
}
