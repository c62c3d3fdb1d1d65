// Runtime configuration, read from the environment

use std::path::PathBuf;

pub const SYSFS_ROOT_VAR: &str = "LOCALDISK_SYSFS_ROOT";
pub const SMARTCTL_VAR: &str = "LOCALDISK_SMARTCTL";

/// Where the collaborators look for their data.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Mount point of sysfs
    pub sysfs_root: PathBuf,
    /// Executable used for health queries
    pub smartctl: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            smartctl: String::from("smartctl"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, unset or empty keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(root) = lookup(SYSFS_ROOT_VAR).filter(|v| !v.is_empty()) {
            config.sysfs_root = PathBuf::from(root);
        }
        if let Some(smartctl) = lookup(SMARTCTL_VAR).filter(|v| !v.is_empty()) {
            config.smartctl = smartctl;
        }
        config
    }
}
