use super::{AttributeSource, absorb};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads block device attributes below `<root>/class/block`.
pub struct SysfsAttributes {
    root: PathBuf,
}

impl SysfsAttributes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn block_dir(&self, dev_name: &str) -> PathBuf {
        self.root.join("class/block").join(dev_name)
    }
}

/// Read a sysfs text file with surrounding whitespace removed.
pub(crate) fn read_trimmed(path: &Path) -> anyhow::Result<String> {
    let dat = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(dat.trim().to_string())
}

impl AttributeSource for SysfsAttributes {
    fn device_attr(&self, dev_name: &str, attr: &str) -> Option<String> {
        let path = self.block_dir(dev_name).join("device").join(attr);
        absorb(attr, dev_name, read_trimmed(&path))
    }

    fn block_attr(&self, dev_name: &str, attr: &str) -> Option<String> {
        let path = self.block_dir(dev_name).join(attr);
        absorb(attr, dev_name, read_trimmed(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_sysfs() -> TempDir {
        let dir = TempDir::new().unwrap();
        let sda = dir.path().join("class/block/sda");
        fs::create_dir_all(sda.join("device")).unwrap();
        fs::create_dir_all(sda.join("queue")).unwrap();
        fs::write(sda.join("device/model"), "Samsung SSD 870  \n").unwrap();
        fs::write(sda.join("device/vendor"), "ATA     \n").unwrap();
        fs::write(sda.join("size"), "1953525168\n").unwrap();
        fs::write(sda.join("queue/logical_block_size"), "512\n").unwrap();
        dir
    }

    #[test]
    fn reads_trimmed_attributes() {
        let dir = fake_sysfs();
        let attrs = SysfsAttributes::new(dir.path());
        assert_eq!(attrs.device_attr("sda", "model").as_deref(), Some("Samsung SSD 870"));
        assert_eq!(attrs.device_attr("sda", "vendor").as_deref(), Some("ATA"));
        assert_eq!(attrs.block_attr("sda", "size").as_deref(), Some("1953525168"));
        assert_eq!(
            attrs.block_attr("sda", "queue/logical_block_size").as_deref(),
            Some("512")
        );
    }

    #[test]
    fn missing_attributes_are_absent() {
        let dir = fake_sysfs();
        let attrs = SysfsAttributes::new(dir.path());
        assert_eq!(attrs.device_attr("sda", "wwid"), None);
        assert_eq!(attrs.block_attr("sdz", "size"), None);
    }
}
