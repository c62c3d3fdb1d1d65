// Plain text renderings of disk records: the inventory table and the single-disk report

use crate::models::DiskRecord;
use std::io::{self, Write};

const UNIT: u64 = 1024;

/// Convert a byte count to the largest binary unit it reaches.
pub fn bytes_to_human(b: u64) -> String {
    if b < UNIT {
        return format!("{b} B");
    }
    let (mut div, mut exp) = (UNIT, 0);
    let mut n = b / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = b"KMGTPE"[exp] as char;
    format!("{:.1} {}iB", b as f64 / div as f64, prefix)
}

/// Column headers of the inventory table, in row order.
const HEADERS: [&str; 17] = [
    "Device Path",
    "Type",
    "Serial Number",
    "VPD83",
    "Sectors",
    "Size",
    "Sector",
    "Transport",
    "RPM",
    "Bus Speed",
    "IDENT",
    "FAIL",
    "Health",
    "Vendor",
    "Model",
    "Revision",
    "wwid",
];

fn row(cells: &[String; 17]) -> String {
    format!(
        "{:<16} {:>6} {:<15} {:<34} {:>12} {:>15} {:>6} {:>10} {:>5} {:>9} {:>11} {:>11} {:>7} {:>16} {:>16} {:>8} {:>20}",
        cells[0],
        cells[1],
        cells[2],
        cells[3],
        cells[4],
        cells[5],
        cells[6],
        cells[7],
        cells[8],
        cells[9],
        cells[10],
        cells[11],
        cells[12],
        cells[13],
        cells[14],
        cells[15],
        cells[16],
    )
}

fn cells(d: &DiskRecord) -> [String; 17] {
    [
        d.dev_path.clone(),
        d.device_class.to_string(),
        d.serial_number.clone(),
        d.vpd83.clone(),
        d.size_sectors.to_string(),
        bytes_to_human(d.size_bytes),
        d.sector_format.to_string(),
        d.transport.clone(),
        d.rpm.to_string(),
        d.link_speed.to_string(),
        d.led_ident.to_string(),
        d.led_fail.to_string(),
        d.health.clone(),
        d.vendor.clone(),
        d.model.clone(),
        d.revision.clone(),
        d.wwid.clone(),
    ]
}

/// Header row followed by one row per disk, in the order given.
pub fn write_table(out: &mut dyn Write, disks: &[DiskRecord]) -> io::Result<()> {
    writeln!(out, "{}", row(&HEADERS.map(String::from)))?;
    for d in disks {
        writeln!(out, "{}", row(&cells(d)))?;
    }
    Ok(())
}

/// One `Label : value` line per field.
pub fn write_detail(out: &mut dyn Write, d: &DiskRecord) -> io::Result<()> {
    let lines: [(&str, String); 17] = [
        ("Device Path", d.dev_path.clone()),
        ("Type", d.device_class.to_string()),
        ("Serial Number", d.serial_number.clone()),
        ("VPD83", d.vpd83.clone()),
        ("Sectors", d.size_sectors.to_string()),
        ("Size", bytes_to_human(d.size_bytes)),
        ("Sector Format", d.sector_format.to_string()),
        ("Transport", d.transport.clone()),
        ("RPM", d.rpm.to_string()),
        ("Bus Speed", d.link_speed.to_string()),
        ("IDENT LED", d.led_ident.to_string()),
        ("FAIL LED", d.led_fail.to_string()),
        ("Health", d.health.clone()),
        ("Vendor", d.vendor.clone()),
        ("Model", d.model.clone()),
        ("Revision", d.revision.clone()),
        ("wwid", d.wwid.clone()),
    ];
    for (label, value) in lines {
        writeln!(out, "{label:<15}: {value}")?;
    }
    Ok(())
}
