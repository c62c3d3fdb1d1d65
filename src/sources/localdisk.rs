// Native storage-management queries for local disks on Linux.
// Identity comes from SCSI VPD pages exported by sysfs, health from smartctl,
// LEDs from the SES enclosure component attached to the disk.

use super::sysfs::read_trimmed;
use super::{NativeSource, absorb, extract_dev};
use crate::error::{DiskError, Result};
use crate::models::{
    HEALTH_FAIL, HEALTH_GOOD, HEALTH_WARN, LED_FAULT_OFF, LED_FAULT_ON, LED_FAULT_UNKNOWN,
    LED_IDENT_OFF, LED_IDENT_ON, LED_IDENT_UNKNOWN, LED_STATUS_UNSUPPORTED, LINK_ATA, LINK_FC,
    LINK_ISCSI, LINK_PCIE, LINK_SAS, LINK_UNKNOWN, LINK_USB,
};
use anyhow::{Context, anyhow, bail};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Linux implementation of the native storage-management layer.
pub struct LocalDisk {
    sysfs_root: PathBuf,
    smartctl: String,
}

impl LocalDisk {
    pub fn new(sysfs_root: impl Into<PathBuf>, smartctl: impl Into<String>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            smartctl: smartctl.into(),
        }
    }

    fn block_dir(&self, dev_path: &str) -> anyhow::Result<PathBuf> {
        let name = extract_dev(dev_path)?;
        Ok(self.sysfs_root.join("class/block").join(name))
    }

    fn read_vpd(&self, dev_path: &str, page: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.block_dir(dev_path)?.join("device").join(page);
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }

    /// Canonical sysfs path of the block device, which encodes the bus it hangs off.
    fn device_topology(&self, dev_path: &str) -> anyhow::Result<String> {
        let dir = self.block_dir(dev_path)?;
        let real = fs::canonicalize(&dir).with_context(|| format!("failed to resolve {}", dir.display()))?;
        Ok(real.to_string_lossy().into_owned())
    }

    fn enclosure_dir(&self, dev_path: &str) -> anyhow::Result<Option<PathBuf>> {
        let dev_dir = self.block_dir(dev_path)?.join("device");
        let entries = fs::read_dir(&dev_dir).with_context(|| format!("failed to read {}", dev_dir.display()))?;
        Ok(entries
            .filter_map(|e| e.ok())
            .find(|e| e.file_name().to_string_lossy().starts_with("enclosure_device:"))
            .map(|e| e.path()))
    }

    fn try_serial(&self, dev_path: &str) -> anyhow::Result<String> {
        match self.read_vpd(dev_path, "vpd_pg80").and_then(|buf| parse_vpd80(&buf)) {
            Ok(serial) => Ok(serial),
            // NVMe namespaces carry no VPD pages, the controller exports the serial directly
            Err(e) => {
                debug!(device = dev_path, "vpd_pg80 unusable, trying serial attribute: {e:#}");
                read_trimmed(&self.block_dir(dev_path)?.join("device/serial"))
            }
        }
    }

    fn try_rpm(&self, dev_path: &str) -> anyhow::Result<i32> {
        if let Ok(rpm) = self.read_vpd(dev_path, "vpd_pgb1").and_then(|buf| parse_vpdb1_rpm(&buf)) {
            return Ok(rpm);
        }
        let rotational = read_trimmed(&self.block_dir(dev_path)?.join("queue/rotational"))?;
        match rotational.as_str() {
            "0" => Ok(0),
            // rotating, speed not reported
            "1" => Ok(1),
            other => bail!("unexpected rotational flag {other:?}"),
        }
    }

    fn try_link_speed(&self, dev_path: &str) -> anyhow::Result<u32> {
        let topology = self.device_topology(dev_path)?;
        let rate = match link_type_from_topology(&topology) {
            LINK_ATA => {
                let port = Regex::new(r"/ata(\d+)/")?
                    .captures(&topology)
                    .ok_or_else(|| anyhow!("no ata port in {topology}"))?;
                read_trimmed(&self.sysfs_root.join(format!("class/ata_link/link{}/sata_spd", &port[1])))?
            }
            LINK_SAS => {
                let port = Regex::new(r"^(.*/port-\d+:\d+)/")?
                    .captures(&topology)
                    .ok_or_else(|| anyhow!("no sas port in {topology}"))?;
                let port_dir = PathBuf::from(&port[1]);
                let phy = fs::read_dir(&port_dir)?
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .find(|n| n.starts_with("phy-"))
                    .ok_or_else(|| anyhow!("no phy under {}", port_dir.display()))?;
                read_trimmed(&port_dir.join(&phy).join("sas_phy").join(&phy).join("negotiated_linkrate"))?
            }
            LINK_PCIE => read_trimmed(&self.block_dir(dev_path)?.join("device/device/current_link_speed"))?,
            other => bail!("link speed not available for link type {other}"),
        };
        parse_rate_mbps(&rate)
    }

    fn try_health(&self, dev_path: &str) -> anyhow::Result<i32> {
        let output = Command::new(&self.smartctl)
            .args(["-H", dev_path])
            .output()
            .with_context(|| format!("failed to run {} on {}", self.smartctl, dev_path))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_smart_health(&stdout).ok_or_else(|| anyhow!("no health verdict from {}", self.smartctl))
    }

    fn try_led_status(&self, dev_path: &str) -> anyhow::Result<u32> {
        let Some(enclosure) = self.enclosure_dir(dev_path)? else {
            return Ok(LED_STATUS_UNSUPPORTED);
        };
        let ident = match read_trimmed(&enclosure.join("locate")).as_deref() {
            Ok("0") => LED_IDENT_OFF,
            Ok(v) if !v.is_empty() => LED_IDENT_ON,
            _ => LED_IDENT_UNKNOWN,
        };
        let fault = match read_trimmed(&enclosure.join("fault")).as_deref() {
            Ok("0") => LED_FAULT_OFF,
            Ok(v) if !v.is_empty() => LED_FAULT_ON,
            _ => LED_FAULT_UNKNOWN,
        };
        Ok(ident | fault)
    }

    fn set_fault_led(&self, dev_path: &str, on: bool) -> Result<()> {
        let name = extract_dev(dev_path)?;
        let enclosure = self
            .enclosure_dir(dev_path)
            .ok()
            .flatten()
            .ok_or_else(|| DiskError::LedUnsupported(dev_path.to_string()))?;
        let path = enclosure.join("fault");
        fs::write(&path, if on { "1" } else { "0" }).map_err(|source| DiskError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(device = name, on, "fault LED updated");
        Ok(())
    }
}

impl NativeSource for LocalDisk {
    fn list(&self) -> Vec<String> {
        let block = self.sysfs_root.join("block");
        let names = absorb("list", &block.display().to_string(), list_disk_names(&block));
        names
            .unwrap_or_default()
            .into_iter()
            .map(|n| format!("/dev/{n}"))
            .collect()
    }

    fn exists(&self, dev_path: &str) -> bool {
        match nix::sys::stat::stat(dev_path) {
            Ok(_) => true,
            Err(e) => {
                debug!(device = dev_path, "stat failed: {e}");
                false
            }
        }
    }

    fn serial_number(&self, dev_path: &str) -> Option<String> {
        absorb("serial", dev_path, self.try_serial(dev_path))
    }

    fn vpd83(&self, dev_path: &str) -> Option<String> {
        let res = self.read_vpd(dev_path, "vpd_pg83").and_then(|buf| parse_vpd83(&buf));
        absorb("vpd83", dev_path, res)
    }

    fn health(&self, dev_path: &str) -> Option<i32> {
        absorb("health", dev_path, self.try_health(dev_path))
    }

    fn rpm(&self, dev_path: &str) -> Option<i32> {
        absorb("rpm", dev_path, self.try_rpm(dev_path))
    }

    fn link_type(&self, dev_path: &str) -> Option<i32> {
        let res = self.device_topology(dev_path).map(|t| link_type_from_topology(&t));
        absorb("link_type", dev_path, res)
    }

    fn link_speed(&self, dev_path: &str) -> Option<u32> {
        absorb("link_speed", dev_path, self.try_link_speed(dev_path))
    }

    fn led_status(&self, dev_path: &str) -> Option<u32> {
        absorb("led_status", dev_path, self.try_led_status(dev_path))
    }

    fn fault_led_on(&self, dev_path: &str) -> Result<()> {
        self.set_fault_led(dev_path, true)
    }

    fn fault_led_off(&self, dev_path: &str) -> Result<()> {
        self.set_fault_led(dev_path, false)
    }
}

/// Whole-disk names (SCSI/SATA and NVMe namespaces) below a sysfs `block` directory.
fn list_disk_names(block: &Path) -> anyhow::Result<Vec<String>> {
    let disk_re = Regex::new(r"^(sd[a-z]+|nvme\d+n\d+)$")?;
    let mut names: Vec<String> = fs::read_dir(block)
        .with_context(|| format!("failed to read {}", block.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| disk_re.is_match(n))
        .collect();
    names.sort();
    Ok(names)
}

/// Unit serial number page (0x80).
fn parse_vpd80(buf: &[u8]) -> anyhow::Result<String> {
    if buf.len() < 4 || buf[1] != 0x80 {
        bail!("not a unit serial number page");
    }
    let len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    let end = (4 + len).min(buf.len());
    let serial = String::from_utf8_lossy(&buf[4..end])
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string();
    if serial.is_empty() {
        bail!("empty serial number");
    }
    Ok(serial)
}

/// Device identification page (0x83): first NAA designator of the logical unit, as hex.
fn parse_vpd83(buf: &[u8]) -> anyhow::Result<String> {
    if buf.len() < 4 || buf[1] != 0x83 {
        bail!("not a device identification page");
    }
    let end = (4 + u16::from_be_bytes([buf[2], buf[3]]) as usize).min(buf.len());
    let mut off = 4;
    while off + 4 <= end {
        let association = (buf[off + 1] >> 4) & 0x03;
        let designator_type = buf[off + 1] & 0x0f;
        let len = buf[off + 3] as usize;
        let id_end = off + 4 + len;
        if id_end > end {
            break;
        }
        if association == 0 && designator_type == 3 {
            return Ok(buf[off + 4..id_end].iter().map(|b| format!("{b:02x}")).collect());
        }
        off = id_end;
    }
    bail!("no NAA designator for the logical unit")
}

/// Block device characteristics page (0xB1): medium rotation rate.
fn parse_vpdb1_rpm(buf: &[u8]) -> anyhow::Result<i32> {
    if buf.len() < 6 || buf[1] != 0xb1 {
        bail!("not a block device characteristics page");
    }
    match u16::from_be_bytes([buf[4], buf[5]]) {
        1 => Ok(0),
        rate @ 0x0401..=0xfffe => Ok(rate as i32),
        rate => bail!("rotation rate not reported ({rate:#06x})"),
    }
}

fn link_type_from_topology(path: &str) -> i32 {
    let rules: [(&str, i32); 6] = [
        (r"/nvme\d*/", LINK_PCIE),
        (r"/usb\d+/", LINK_USB),
        (r"/ata\d+/", LINK_ATA),
        (r"/session\d+/", LINK_ISCSI),
        (r"/rport-\d+:\d+-\d+/", LINK_FC),
        (r"/(end_device|port)-\d+:\d+", LINK_SAS),
    ];
    rules
        .iter()
        .find(|(pat, _)| Regex::new(pat).map(|re| re.is_match(path)).unwrap_or(false))
        .map(|(_, code)| *code)
        .unwrap_or(LINK_UNKNOWN)
}

/// Convert a negotiated rate such as `6.0 Gbps`, `12.0 Gbit` or `8.0 GT/s PCIe` to Mbps.
fn parse_rate_mbps(text: &str) -> anyhow::Result<u32> {
    let re = Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(Gbps|Gbit|GT/s|Mbps|Mbit)")?;
    let cap = re.captures(text).ok_or_else(|| anyhow!("unrecognised link rate {text:?}"))?;
    let value: f64 = cap[1].parse()?;
    let mbps = match &cap[2] {
        "Mbps" | "Mbit" => value,
        _ => value * 1000.0,
    };
    Ok(mbps.round() as u32)
}

fn parse_smart_health(stdout: &str) -> Option<i32> {
    let re = Regex::new(r"(?m)(?:self-assessment test result|SMART Health Status):\s*(.+)$").ok()?;
    let verdict = re.captures(stdout)?[1].trim().to_string();
    Some(match verdict.as_str() {
        "PASSED" | "OK" => HEALTH_GOOD,
        v if v.starts_with("FAILED") => HEALTH_FAIL,
        _ => HEALTH_WARN,
    })
}
