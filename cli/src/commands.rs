pub mod discover;
pub mod listen;

use std::path::PathBuf;
use std::time::Duration;

use arpscout_common::config::{Config, DEFAULT_API_URL, MAX_WORKERS, ProbeMethod, VendorMode};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arpscout")]
#[command(version, about = "Finds the hosts on your local network with ARP.")]
#[command(args_conflicts_with_subcommands = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub scan: ScanArgs,

    /// More log output, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print results, warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print decoded frames seen on an interface (needs root)
    #[command(alias = "l")]
    Listen {
        /// Interface to capture on, the first usable one by default
        #[arg(short, long)]
        interface: Option<String>,

        /// Stop after this many frames
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// ADDR, ADDR/MASK, ADDR-END or ADDR-END/MASK, e.g. 192.168.1.0 or 10.0.0.1-50/24
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Number of probes running at the same time
    #[arg(short = 'j', long = "jobs", default_value_t = MAX_WORKERS)]
    pub jobs: usize,

    /// Time to wait for an answer, in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = 2000)]
    pub timeout: u64,

    /// auto, table or raw
    #[arg(short, long, default_value_t = ProbeMethod::Auto)]
    pub method: ProbeMethod,

    /// Resolve vendors from the cache only
    #[arg(long, conflicts_with = "no_vendor")]
    pub offline: bool,

    /// Don't resolve vendors at all
    #[arg(long)]
    pub no_vendor: bool,

    /// Vendor cache file
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Base URL of the vendor lookup API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Don't print where a vendor name came from
    #[arg(long)]
    pub no_source: bool,
}

impl ScanArgs {
    pub fn to_config(&self) -> Config {
        let vendor_mode = if self.no_vendor {
            VendorMode::Disabled
        } else if self.offline {
            VendorMode::CacheOnly
        } else {
            VendorMode::Online
        };

        Config {
            max_workers: self.jobs.max(1),
            probe_timeout: Duration::from_millis(self.timeout),
            probe_method: self.method,
            vendor_mode,
            cache_path: self.cache.clone(),
            api_url: self.api_url.clone(),
            show_source: !self.no_source,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
