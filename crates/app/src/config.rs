use std::path::PathBuf;

pub const BANK_DIR_ENV: &str = "QUIZ_BANK_DIR";
pub const REPORT_PATH_ENV: &str = "QUIZ_REPORT_PATH";

/// Locations the binary reads banks from and writes reports to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bank_dir: PathBuf,
    pub report_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_dir: PathBuf::from("questions"),
            report_path: PathBuf::from("audit_report.json"),
        }
    }
}

impl Config {
    /// Defaults overridden by `QUIZ_BANK_DIR` and `QUIZ_REPORT_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Self {
            bank_dir: non_empty(BANK_DIR_ENV).map_or(default.bank_dir, PathBuf::from),
            report_path: non_empty(REPORT_PATH_ENV).map_or(default.report_path, PathBuf::from),
        }
    }
}
