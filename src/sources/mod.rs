// Attribute sources: the native storage-management layer and sysfs

// Linux native storage-management adapter
pub mod localdisk;
// Device-attribute filesystem adapter
pub mod sysfs;
// In-memory doubles for both sources
#[cfg(test)]
pub mod memory;

use crate::error::{DiskError, Result};
use tracing::debug;

pub use localdisk::LocalDisk;
pub use sysfs::SysfsAttributes;

/// Per-disk facts and LED control from the storage-management layer.
///
/// Every query is best effort: a failure is reported as `None` and the
/// caller picks the default. Only the LED setters report errors.
pub trait NativeSource {
    /// Device paths of all local disks, in the order the layer reports them.
    fn list(&self) -> Vec<String>;
    fn exists(&self, dev_path: &str) -> bool;
    fn serial_number(&self, dev_path: &str) -> Option<String>;
    fn vpd83(&self, dev_path: &str) -> Option<String>;
    fn health(&self, dev_path: &str) -> Option<i32>;
    fn rpm(&self, dev_path: &str) -> Option<i32>;
    fn link_type(&self, dev_path: &str) -> Option<i32>;
    fn link_speed(&self, dev_path: &str) -> Option<u32>;
    fn led_status(&self, dev_path: &str) -> Option<u32>;
    fn fault_led_on(&self, dev_path: &str) -> Result<()>;
    fn fault_led_off(&self, dev_path: &str) -> Result<()>;
}

/// Text attributes from the device-attribute filesystem, keyed by device name.
pub trait AttributeSource {
    /// Attribute of the underlying device, e.g. `model` or `rev`.
    fn device_attr(&self, dev_name: &str, attr: &str) -> Option<String>;
    /// Attribute of the block device itself, e.g. `size` or `queue/logical_block_size`.
    fn block_attr(&self, dev_name: &str, attr: &str) -> Option<String>;
}

/// Extract the device name (last path segment) from a device path.
pub fn extract_dev(dev_path: &str) -> Result<&str> {
    let components: Vec<&str> = dev_path.split('/').collect();
    if components.len() < 2 {
        return Err(DiskError::InvalidPath(dev_path.to_string()));
    }
    Ok(components[components.len() - 1])
}

/// Collapse a failed lookup to `None`, keeping the reason in the debug log.
pub(crate) fn absorb<T>(what: &str, target: &str, res: anyhow::Result<T>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(attr = what, device = target, "lookup failed: {e:#}");
            None
        }
    }
}
