// Builds disk records by merging native storage-management facts with sysfs attributes

use crate::error::{DiskError, Result};
use crate::models::{
    DeviceClass, DiskRecord, HEALTH_UNKNOWN, LED_FAULT_OFFSET, LED_IDENT_OFFSET,
    LED_STATUS_UNSUPPORTED, LINK_UNKNOWN, LedState, SectorFormat, health_text, link_text,
};
use crate::sources::{AttributeSource, NativeSource, extract_dev};
use std::str::FromStr;
use tracing::{debug, warn};

/// Sector size assumed for every format except 4K native.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Classify the sector format from the logical and physical block size text.
pub fn sector_format(logical: &str, physical: &str) -> SectorFormat {
    if logical == physical {
        if logical == "512" {
            SectorFormat::Native512
        } else {
            SectorFormat::FourKn
        }
    } else {
        SectorFormat::Emulated512
    }
}

/// Capacity in bytes. Only 4K native disks count in logical blocks,
/// everything else counts in 512 byte sectors.
pub fn size_bytes(sectors: u64, format: SectorFormat, logical: &str) -> u64 {
    let sector_size = match format {
        SectorFormat::FourKn => logical.parse().unwrap_or(0),
        _ => DEFAULT_SECTOR_SIZE,
    };
    sectors.saturating_mul(sector_size)
}

pub fn device_class(rpm: i32) -> DeviceClass {
    match rpm {
        0 => DeviceClass::Flash,
        _ => DeviceClass::Hdd,
    }
}

/// Decode the 3-bit LED sub-field starting at `offset`.
pub fn led_state(bit_field: u32, offset: u32) -> LedState {
    match (bit_field >> offset) & 0b111 {
        1 => LedState::On,
        2 => LedState::Off,
        _ => LedState::Unknown,
    }
}

/// Ident and fail LED states from the raw bit-field.
pub fn led_states(bit_field: u32) -> (LedState, LedState) {
    if bit_field == LED_STATUS_UNSUPPORTED {
        return (LedState::Unavailable, LedState::Unavailable);
    }
    (
        led_state(bit_field, LED_IDENT_OFFSET),
        led_state(bit_field, LED_FAULT_OFFSET),
    )
}

fn parse_or_zero<T: FromStr + Default>(attr: &str, text: Option<&str>) -> T {
    match text {
        Some(s) => s.parse().unwrap_or_else(|_| {
            debug!(attr, value = s, "malformed numeric attribute");
            T::default()
        }),
        None => T::default(),
    }
}

/// Build the record for one device path.
/// Only a missing device path is an error, every unreadable attribute takes its default.
pub fn build_record(
    native: &dyn NativeSource,
    attrs: &dyn AttributeSource,
    dev_path: &str,
) -> Result<DiskRecord> {
    if !native.exists(dev_path) {
        return Err(DiskError::NotFound(dev_path.to_string()));
    }

    let dev_name = extract_dev(dev_path).unwrap_or_else(|e| {
        warn!("{e}");
        ""
    });

    let serial_number = native.serial_number(dev_path).unwrap_or_default();
    let vpd83 = native.vpd83(dev_path).unwrap_or_default();
    let rpm = native.rpm(dev_path).unwrap_or_default();
    let link_type = native.link_type(dev_path).unwrap_or(LINK_UNKNOWN);
    let link_speed = native.link_speed(dev_path).unwrap_or_default();
    let led_bits = native.led_status(dev_path).unwrap_or_default();
    let health = native.health(dev_path).unwrap_or(HEALTH_UNKNOWN);

    let size_sectors: u64 = parse_or_zero("size", attrs.block_attr(dev_name, "size").as_deref());
    let model = attrs.device_attr(dev_name, "model").unwrap_or_default();
    let vendor = attrs.device_attr(dev_name, "vendor").unwrap_or_default();
    let wwid = attrs.device_attr(dev_name, "wwid").unwrap_or_default();
    let revision = attrs.device_attr(dev_name, "rev").unwrap_or_default();
    let logical = attrs
        .block_attr(dev_name, "queue/logical_block_size")
        .unwrap_or_default();
    let physical = attrs
        .block_attr(dev_name, "queue/physical_block_size")
        .unwrap_or_default();

    let format = sector_format(&logical, &physical);
    let (led_ident, led_fail) = led_states(led_bits);

    Ok(DiskRecord {
        dev_path: dev_path.to_string(),
        device_class: device_class(rpm),
        serial_number,
        vpd83,
        size_sectors,
        size_bytes: size_bytes(size_sectors, format, &logical),
        sector_format: format,
        transport: link_text(link_type).to_string(),
        link_speed,
        rpm,
        led_ident,
        led_fail,
        health: health_text(health).to_string(),
        vendor,
        model,
        revision,
        wwid,
    })
}

/// One record per enumerated disk, in enumeration order.
/// A disk that disappears mid-scan still gets a row holding just its path.
pub fn scan_disks(native: &dyn NativeSource, attrs: &dyn AttributeSource) -> Vec<DiskRecord> {
    native
        .list()
        .into_iter()
        .map(|dev_path| {
            build_record(native, attrs, &dev_path).unwrap_or_else(|e| {
                warn!("{e}");
                DiskRecord::empty(dev_path)
            })
        })
        .collect()
}
