use super::{AttributeSource, NativeSource};
use crate::error::{DiskError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Canned native facts for one disk.
#[derive(Clone, Debug, Default)]
pub struct NativeDisk {
    pub serial: Option<String>,
    pub vpd83: Option<String>,
    pub health: Option<i32>,
    pub rpm: Option<i32>,
    pub link_type: Option<i32>,
    pub link_speed: Option<u32>,
    pub led_status: Option<u32>,
}

/// Native source serving canned facts and recording LED writes.
#[derive(Default)]
pub struct MemoryNative {
    order: Vec<String>,
    disks: HashMap<String, NativeDisk>,
    led_failures: HashSet<String>,
    pub led_calls: RefCell<Vec<(String, bool)>>,
}

impl MemoryNative {
    pub fn with_disk(mut self, dev_path: &str, disk: NativeDisk) -> Self {
        self.order.push(dev_path.to_string());
        self.disks.insert(dev_path.to_string(), disk);
        self
    }

    /// Listed by enumeration but gone by the time it is queried.
    pub fn with_listed_only(mut self, dev_path: &str) -> Self {
        self.order.push(dev_path.to_string());
        self
    }

    /// LED writes to this device report failure.
    pub fn with_led_failure(mut self, dev_path: &str) -> Self {
        self.led_failures.insert(dev_path.to_string());
        self
    }

    fn disk(&self, dev_path: &str) -> Option<&NativeDisk> {
        self.disks.get(dev_path)
    }

    fn set_led(&self, dev_path: &str, on: bool) -> Result<()> {
        self.led_calls.borrow_mut().push((dev_path.to_string(), on));
        if self.led_failures.contains(dev_path) {
            return Err(DiskError::LedUnsupported(dev_path.to_string()));
        }
        Ok(())
    }
}

impl NativeSource for MemoryNative {
    fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    fn exists(&self, dev_path: &str) -> bool {
        self.disks.contains_key(dev_path)
    }

    fn serial_number(&self, dev_path: &str) -> Option<String> {
        self.disk(dev_path)?.serial.clone()
    }

    fn vpd83(&self, dev_path: &str) -> Option<String> {
        self.disk(dev_path)?.vpd83.clone()
    }

    fn health(&self, dev_path: &str) -> Option<i32> {
        self.disk(dev_path)?.health
    }

    fn rpm(&self, dev_path: &str) -> Option<i32> {
        self.disk(dev_path)?.rpm
    }

    fn link_type(&self, dev_path: &str) -> Option<i32> {
        self.disk(dev_path)?.link_type
    }

    fn link_speed(&self, dev_path: &str) -> Option<u32> {
        self.disk(dev_path)?.link_speed
    }

    fn led_status(&self, dev_path: &str) -> Option<u32> {
        self.disk(dev_path)?.led_status
    }

    fn fault_led_on(&self, dev_path: &str) -> Result<()> {
        self.set_led(dev_path, true)
    }

    fn fault_led_off(&self, dev_path: &str) -> Result<()> {
        self.set_led(dev_path, false)
    }
}

/// Attribute source backed by two maps keyed on (device name, attribute).
#[derive(Default)]
pub struct MemoryAttributes {
    device: HashMap<(String, String), String>,
    block: HashMap<(String, String), String>,
}

impl MemoryAttributes {
    pub fn with_device(mut self, dev_name: &str, attr: &str, value: &str) -> Self {
        self.device
            .insert((dev_name.to_string(), attr.to_string()), value.to_string());
        self
    }

    pub fn with_block(mut self, dev_name: &str, attr: &str, value: &str) -> Self {
        self.block
            .insert((dev_name.to_string(), attr.to_string()), value.to_string());
        self
    }
}

impl AttributeSource for MemoryAttributes {
    fn device_attr(&self, dev_name: &str, attr: &str) -> Option<String> {
        self.device
            .get(&(dev_name.to_string(), attr.to_string()))
            .cloned()
    }

    fn block_attr(&self, dev_name: &str, attr: &str) -> Option<String> {
        self.block
            .get(&(dev_name.to_string(), attr.to_string()))
            .cloned()
    }
}
