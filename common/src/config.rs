use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound of concurrently running probes.
///
/// Kept lower in debug builds so worker output stays readable when tracing.
#[cfg(debug_assertions)]
pub const MAX_WORKERS: usize = 10;
#[cfg(not(debug_assertions))]
pub const MAX_WORKERS: usize = 20;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

pub const DEFAULT_API_URL: &str = "https://www.macvendorlookup.com/api/v2";

/// How hosts are discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProbeMethod {
    /// Raw sockets when running as root, the OS neighbour table otherwise.
    #[default]
    Auto,
    /// Let the kernel resolve and read its neighbour table.
    Table,
    /// Send ARP requests on a link-layer channel.
    Raw,
}

impl FromStr for ProbeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ProbeMethod::Auto),
            "table" => Ok(ProbeMethod::Table),
            "raw" => Ok(ProbeMethod::Raw),
            _ => Err(format!("unknown probe method: {s}")),
        }
    }
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeMethod::Auto => "auto",
            ProbeMethod::Table => "table",
            ProbeMethod::Raw => "raw",
        })
    }
}

/// How far vendor resolution may go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VendorMode {
    /// Cache first, then the lookup API.
    #[default]
    Online,
    CacheOnly,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub max_workers: usize,
    /// Time bound of a single probe.
    pub probe_timeout: Duration,
    pub probe_method: ProbeMethod,
    pub vendor_mode: VendorMode,
    /// Vendor cache file. `None` picks the platform default.
    pub cache_path: Option<PathBuf>,
    /// Base URL of the vendor lookup API, the MAC and `/json` are appended.
    pub api_url: String,
    /// Print the `[c]`/`[a]` origin next to vendor names.
    pub show_source: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            probe_method: ProbeMethod::default(),
            vendor_mode: VendorMode::default(),
            cache_path: None,
            api_url: DEFAULT_API_URL.to_string(),
            show_source: true,
        }
    }
}
