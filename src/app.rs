// The four operations behind the command line: list, show, fail LED on and off

use crate::cli::Action;
use crate::error::{DiskError, Result};
use crate::render::{write_detail, write_table};
use crate::scanner::{build_record, scan_disks};
use crate::sources::{AttributeSource, NativeSource};
use std::io::{self, Write};
use tracing::{debug, warn};

/// Advisory printed when the native layer refuses an LED change.
pub const LED_FAILURE_LINE: &str = "Unable to set the disks fault LED beacon";

/// Print the table of every local disk.
pub fn list_disks(
    native: &dyn NativeSource,
    attrs: &dyn AttributeSource,
    out: &mut dyn Write,
) -> io::Result<()> {
    let disks = scan_disks(native, attrs);
    debug!(count = disks.len(), "disks enumerated");
    write_table(out, &disks)
}

/// Print the report for one disk. Returns the process exit status.
pub fn show_disk(
    native: &dyn NativeSource,
    attrs: &dyn AttributeSource,
    dev_path: &str,
    out: &mut dyn Write,
) -> io::Result<u8> {
    match build_record(native, attrs, dev_path) {
        Ok(disk) => {
            write_detail(out, &disk)?;
            Ok(0)
        }
        Err(e) => {
            warn!("{e}");
            writeln!(out, "Unable to list device {dev_path}")?;
            Ok(1)
        }
    }
}

/// Switch the fault LED `on` or `off`; any other state leaves it alone.
pub fn set_fail_led(native: &dyn NativeSource, dev_path: &str, state: &str) -> Result<()> {
    match state {
        "on" => native.fault_led_on(dev_path),
        "off" => native.fault_led_off(dev_path),
        _ => Ok(()),
    }
}

fn apply_fail_leds(
    native: &dyn NativeSource,
    on: Option<&str>,
    off: Option<&str>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let requests = [(on, "on"), (off, "off")];
    let failures: Vec<DiskError> = requests
        .into_iter()
        .filter_map(|(dev, state)| dev.map(|d| set_fail_led(native, d, state)))
        .filter_map(|res| res.err())
        .collect();
    for e in &failures {
        warn!("{e}");
    }
    if !failures.is_empty() {
        writeln!(out, "{LED_FAILURE_LINE}")?;
    }
    Ok(())
}

/// Run one action, writing everything user-facing to `out`. Returns the exit status.
pub fn run(
    action: &Action,
    native: &dyn NativeSource,
    attrs: &dyn AttributeSource,
    out: &mut dyn Write,
) -> io::Result<u8> {
    match action {
        Action::List => list_disks(native, attrs, out).map(|_| 0),
        Action::Show(dev_path) => show_disk(native, attrs, dev_path, out),
        Action::FailLed { on, off } => {
            apply_fail_leds(native, on.as_deref(), off.as_deref(), out).map(|_| 0)
        }
        Action::Nothing => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LINK_PCIE;
    use crate::sources::memory::{MemoryAttributes, MemoryNative, NativeDisk};

    fn run_capture(action: Action, native: &MemoryNative, attrs: &MemoryAttributes) -> (u8, String) {
        let mut out = Vec::new();
        let code = run(&action, native, attrs, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    fn one_flash_disk() -> (MemoryNative, MemoryAttributes) {
        let native = MemoryNative::default().with_disk(
            "/dev/sda",
            NativeDisk {
                rpm: Some(0),
                ..Default::default()
            },
        );
        let attrs = MemoryAttributes::default()
            .with_block("sda", "size", "1000000")
            .with_block("sda", "queue/logical_block_size", "4096")
            .with_block("sda", "queue/physical_block_size", "4096");
        (native, attrs)
    }

    #[test]
    fn show_reports_derived_fields() {
        let (native, attrs) = one_flash_disk();
        let (code, text) = run_capture(Action::Show("/dev/sda".into()), &native, &attrs);
        assert_eq!(code, 0);
        assert!(text.contains("Type           : Flash\n"));
        assert!(text.contains("Sector Format  : 4KN\n"));
        assert!(text.contains("Sectors        : 1000000\n"));
        assert!(text.contains("Size           : 3.8 GiB\n"));
    }

    #[test]
    fn show_missing_device_fails() {
        let (native, attrs) = one_flash_disk();
        let (code, text) = run_capture(Action::Show("/dev/sdx".into()), &native, &attrs);
        assert_ne!(code, 0);
        assert_eq!(text, "Unable to list device /dev/sdx\n");
    }

    #[test]
    fn list_prints_a_row_per_disk() {
        let native = MemoryNative::default()
            .with_disk(
                "/dev/nvme0n1",
                NativeDisk {
                    link_type: Some(LINK_PCIE),
                    ..Default::default()
                },
            )
            .with_disk(
                "/dev/sda",
                NativeDisk {
                    rpm: Some(7200),
                    ..Default::default()
                },
            )
            .with_listed_only("/dev/sdb");
        let (code, text) = run_capture(Action::List, &native, &MemoryAttributes::default());
        assert_eq!(code, 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Device Path"));
        assert!(lines[1].starts_with("/dev/nvme0n1"));
        assert!(lines[1].contains("PCIe"));
        assert!(lines[2].starts_with("/dev/sda"));
        assert!(lines[2].contains(" HDD "));
        assert!(lines[3].starts_with("/dev/sdb"));
    }

    #[test]
    fn led_on_success_is_silent() {
        let (native, attrs) = one_flash_disk();
        let action = Action::FailLed {
            on: Some("/dev/sda".into()),
            off: None,
        };
        let (code, text) = run_capture(action, &native, &attrs);
        assert_eq!(code, 0);
        assert_eq!(text, "");
        assert_eq!(*native.led_calls.borrow(), vec![("/dev/sda".to_string(), true)]);
    }

    #[test]
    fn led_failure_prints_one_line() {
        let (native, attrs) = one_flash_disk();
        let native = native.with_led_failure("/dev/sda");
        let action = Action::FailLed {
            on: Some("/dev/sda".into()),
            off: Some("/dev/sda".into()),
        };
        let (code, text) = run_capture(action, &native, &attrs);
        assert_eq!(code, 0);
        assert_eq!(text, format!("{LED_FAILURE_LINE}\n"));
        assert_eq!(
            *native.led_calls.borrow(),
            vec![("/dev/sda".to_string(), true), ("/dev/sda".to_string(), false)]
        );
    }

    #[test]
    fn unknown_led_state_is_a_no_op() {
        let (native, _) = one_flash_disk();
        assert!(set_fail_led(&native, "/dev/sda", "blink").is_ok());
        assert!(native.led_calls.borrow().is_empty());
    }

    #[test]
    fn nothing_prints_nothing() {
        let (native, attrs) = one_flash_disk();
        assert_eq!(run_capture(Action::Nothing, &native, &attrs), (0, String::new()));
    }
}
