//! # Vendor Cache
//!
//! Three tiers of vendor records, one per IEEE address block, persisted as one JSON file:
//!
//! ```json
//! { "Version": "1.0.0",
//!   "MA-L": [ { "OUI": "B827EB000000", "Name": "Raspberry Pi Foundation", "Colour": "#c51a4a" } ],
//!   "MA-M": [],
//!   "MA-S": [] }
//! ```
//!
//! The file is read once at startup and written once at the end of the run. In between
//! workers read and append concurrently under a reader/writer lock.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use arpscout_common::network::mac::{AddrBlock, HardwareAddr};
use arpscout_common::vendors::{Rgb, Vendor, VendorSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const FILE_NAME: &str = "vendors.json";
pub const FORMAT_VERSION: &str = "1.0.0";

const APP_DIR: &str = "arpscout";
const VERSION_KEY: &str = "Version";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("cache file has no version")]
    MissingVersion,

    #[error("can't parse cache file v{0}")]
    UnsupportedVersion(String),

    #[error("can't add {0} to cache")]
    NotCacheable(AddrBlock),
}

/// One vendor assignment. `oui` is already masked to its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub oui: HardwareAddr,
    pub name: String,
    pub colour: Option<Rgb>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecordV1 {
    #[serde(rename = "OUI")]
    oui: String,
    name: String,
    colour: String,
}

impl RecordV1 {
    fn from_record(record: &Record) -> Self {
        Self {
            oui: record.oui.to_string_with(None),
            name: record.name.clone(),
            colour: Rgb::to_css(record.colour),
        }
    }

    /// `None` for records that can't be used. Short OUIs are padded with trailing zeros.
    fn into_record(self) -> Option<Record> {
        if self.name.is_empty() || self.oui.len() > 2 * HardwareAddr::BYTE_COUNT {
            return None;
        }
        let padded = format!("{:0<12}", self.oui);
        let oui = u64::from_str_radix(&padded, 16).ok()?;
        let colour = Rgb::from_css(&self.colour).ok()?;
        Some(Record { oui: HardwareAddr::from_u64(oui), name: self.name, colour })
    }
}

#[derive(Serialize)]
struct CacheFileV1<'a> {
    #[serde(rename = "Version")]
    version: &'a str,
    #[serde(rename = "MA-L")]
    ma_l: Vec<RecordV1>,
    #[serde(rename = "MA-M")]
    ma_m: Vec<RecordV1>,
    #[serde(rename = "MA-S")]
    ma_s: Vec<RecordV1>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tiers {
    ma_l: Vec<Record>,
    ma_m: Vec<Record>,
    ma_s: Vec<Record>,
}

impl Tiers {
    fn tier(&self, block: AddrBlock) -> &[Record] {
        match block {
            AddrBlock::Oui36 => &self.ma_s,
            AddrBlock::Oui28 => &self.ma_m,
            AddrBlock::Oui | AddrBlock::Cid => &self.ma_l,
        }
    }

    fn tier_mut(&mut self, block: AddrBlock) -> Option<&mut Vec<Record>> {
        match block {
            AddrBlock::Oui36 => Some(&mut self.ma_s),
            AddrBlock::Oui28 => Some(&mut self.ma_m),
            AddrBlock::Oui => Some(&mut self.ma_l),
            AddrBlock::Cid => None,
        }
    }

    fn parse(text: &str) -> Result<Self, CacheError> {
        let doc: Value = serde_json::from_str(text)?;
        let version = doc
            .get(VERSION_KEY)
            .and_then(Value::as_str)
            .ok_or(CacheError::MissingVersion)?;
        let major = version.split('.').next().and_then(|m| m.trim().parse::<u32>().ok());
        if major != Some(1) {
            return Err(CacheError::UnsupportedVersion(version.to_string()));
        }

        let mut tiers = Tiers::default();
        for block in AddrBlock::CACHEABLE {
            let key = block.to_string();
            let Some(items) = doc.get(&key).and_then(Value::as_array) else {
                warn!("cache failed to parse {key}");
                continue;
            };
            let records = items
                .iter()
                .filter_map(|item| RecordV1::deserialize(item).ok())
                .filter_map(RecordV1::into_record);
            if let Some(tier) = tiers.tier_mut(block) {
                tier.extend(records);
            }
        }
        Ok(tiers)
    }

    fn serialise(&self) -> Result<String, CacheError> {
        let v1 = |records: &[Record]| records.iter().map(RecordV1::from_record).collect();
        let file = CacheFileV1 {
            version: FORMAT_VERSION,
            ma_l: v1(&self.ma_l),
            ma_m: v1(&self.ma_m),
            ma_s: v1(&self.ma_s),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

pub struct VendorCache {
    tiers: RwLock<Tiers>,
    dirty: AtomicBool,
    path: Option<PathBuf>,
}

impl VendorCache {
    /// An empty cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::with_tiers(Tiers::default(), None)
    }

    fn with_tiers(tiers: Tiers, path: Option<PathBuf>) -> Self {
        Self { tiers: RwLock::new(tiers), dirty: AtomicBool::new(false), path }
    }

    /// Reads the cache file at `path`.
    ///
    /// A missing, unreadable or corrupt file is not an error: the run starts with an
    /// empty cache that is still saved to `path` at the end.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tiers = match fs::read_to_string(&path) {
            Ok(text) => Tiers::parse(&text).unwrap_or_else(|e| {
                warn!("failed to read cache file \"{}\": {e}", path.display());
                Tiers::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file yet");
                Tiers::default()
            }
            Err(e) => {
                warn!("failed to read cache file \"{}\": {e}", path.display());
                Tiers::default()
            }
        };
        Self::with_tiers(tiers, Some(path))
    }

    pub fn from_json(text: &str) -> Result<Self, CacheError> {
        Ok(Self::with_tiers(Tiers::parse(text)?, None))
    }

    pub fn to_json(&self) -> Result<String, CacheError> {
        self.read().serialise()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True once a record was added since loading or the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let tiers = self.read();
        tiers.ma_l.len() + tiers.ma_m.len() + tiers.ma_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self, block: AddrBlock) -> Vec<Record> {
        self.read().tier(block).to_vec()
    }

    /// Most specific record for `mac`, or an empty vendor.
    ///
    /// Records without a name never match, the lookup falls through to broader tiers.
    pub fn get(&self, mac: HardwareAddr) -> Vendor {
        let tiers = self.read();
        AddrBlock::CACHEABLE
            .iter()
            .find_map(|&block| {
                let key = mac & block.mask();
                tiers
                    .tier(block)
                    .iter()
                    .find(|r| r.oui == key && !r.name.is_empty())
            })
            .map(|r| Vendor::new(r.name.clone(), r.colour, VendorSource::Cache))
            .unwrap_or_default()
    }

    /// Appends a record for the `block` containing `mac`. Existing records are kept.
    pub fn add(&self, block: AddrBlock, mac: HardwareAddr, vendor: &Vendor) -> Result<(), CacheError> {
        let record = Record {
            oui: mac & block.mask(),
            name: vendor.name.clone(),
            colour: vendor.colour,
        };
        let mut tiers = self.tiers.write().unwrap_or_else(PoisonError::into_inner);
        tiers
            .tier_mut(block)
            .ok_or(CacheError::NotCacheable(block))?
            .push(record);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }

    /// Writes the cache back to its file if anything was added. Returns whether it wrote.
    ///
    /// Must only be called once no worker uses the cache anymore.
    pub fn save(&self) -> Result<bool, CacheError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        if !self.is_dirty() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()? + "\n")?;
        self.dirty.store(false, Ordering::Release);
        debug!(path = %path.display(), records = self.len(), "cache saved");
        Ok(true)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tiers> {
        self.tiers.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache file location.
///
/// Candidates in order: the platform cache directory, a dot directory in the home
/// directory, the temp directory. The first one that already holds a cache file wins,
/// otherwise the first one whose directory exists or can be created.
pub fn default_path() -> PathBuf {
    choose_path(&candidate_paths()).unwrap_or_else(|| env::temp_dir().join(APP_DIR).join(FILE_NAME))
}

fn choose_path(candidates: &[PathBuf]) -> Option<PathBuf> {
    if let Some(existing) = candidates.iter().find(|p| p.is_file()) {
        return Some(existing.clone());
    }
    candidates.iter().find(|p| is_usable(p)).cloned()
}

/// The parent directory is there or could be made, and the path itself is not a directory.
fn is_usable(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    match fs::create_dir_all(parent) {
        Ok(()) => parent.is_dir() && !path.is_dir(),
        Err(e) => {
            debug!(path = %parent.display(), error = %e, "cache location unusable");
            false
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(dir) = dirs::cache_dir() {
        paths.push(dir.join(APP_DIR).join(FILE_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{APP_DIR}")).join(FILE_NAME));
    }
    paths.push(env::temp_dir().join(APP_DIR).join(FILE_NAME));
    paths
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
