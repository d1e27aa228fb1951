//! Browser executable discovery.
//!
//! Resolution is a pure function of the discovery configuration and a
//! filesystem probe, so every branch can be exercised without a browser.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)*$").unwrap())
}

/// Read-only filesystem capability used during discovery
pub trait FileSystemProbe: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;

    /// Names of the direct children of `path`; empty when it is not a readable directory.
    fn read_dir_names(&self, path: &Path) -> Vec<String>;
}

/// Probe backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystemProbe for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_dir_names(&self, path: &Path) -> Vec<String> {
        match std::fs::read_dir(path) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacX64,
    MacArm64,
    Windows,
}

impl Platform {
    /// Platform of the running process, if it is one browsers ship for
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
            Some(Platform::MacArm64)
        } else if cfg!(target_os = "macos") {
            Some(Platform::MacX64)
        } else if cfg!(target_os = "windows") {
            Some(Platform::Windows)
        } else {
            None
        }
    }

    /// Tag used in managed cache directory names
    pub fn cache_tag(&self) -> &'static str {
        match self {
            Platform::Linux => "linux64",
            Platform::MacX64 => "mac-x64",
            Platform::MacArm64 => "mac-arm64",
            Platform::Windows => "win64",
        }
    }

    /// Executable path inside one versioned cache install
    fn cached_binary(&self) -> PathBuf {
        let archive_root = format!("chrome-{}", self.cache_tag());
        match self {
            Platform::Linux => [archive_root.as_str(), "chrome"].iter().collect(),
            Platform::MacX64 | Platform::MacArm64 => [
                archive_root.as_str(),
                "Google Chrome for Testing.app",
                "Contents",
                "MacOS",
                "Google Chrome for Testing",
            ]
            .iter()
            .collect(),
            Platform::Windows => [archive_root.as_str(), "chrome.exe"].iter().collect(),
        }
    }

    /// Conventional system install locations, most preferred first
    pub fn known_locations(&self) -> Vec<PathBuf> {
        let paths: &[&str] = match self {
            Platform::Linux => &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium",
                "/usr/bin/chromium-browser",
                "/snap/bin/chromium",
            ],
            Platform::MacX64 | Platform::MacArm64 => &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ],
            Platform::Windows => &[
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ],
        };
        paths.iter().map(PathBuf::from).collect()
    }
}

/// Inputs to explicit executable resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Operator-configured browser, used only if it exists
    pub configured_path: Option<PathBuf>,
    /// Root of the managed-browser cache
    pub cache_dir: Option<PathBuf>,
    pub platform: Option<Platform>,
}

impl DiscoveryConfig {
    pub fn new(configured_path: Option<PathBuf>, cache_dir: Option<PathBuf>) -> Self {
        Self {
            configured_path,
            cache_dir,
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }
}

fn parse_version(raw: &str) -> Option<Vec<u64>> {
    if !version_regex().is_match(raw) {
        return None;
    }
    raw.split('.').map(|part| part.parse::<u64>().ok()).collect()
}

/// Newest versioned install in the managed cache for `platform`.
pub fn newest_cached_install(cache_dir: &Path, platform: Platform, fs: &dyn FileSystemProbe) -> Option<PathBuf> {
    let chrome_root = cache_dir.join("chrome");
    let prefix = format!("{}-", platform.cache_tag());

    let mut installs: Vec<(Vec<u64>, String)> = fs
        .read_dir_names(&chrome_root)
        .into_iter()
        .filter_map(|name| {
            let version = parse_version(name.strip_prefix(&prefix)?)?;
            Some((version, name))
        })
        .collect();

    // Highest numeric version first; a half-extracted install is skipped
    installs.sort_by(|a, b| b.0.cmp(&a.0));
    installs
        .into_iter()
        .map(|(_, name)| chrome_root.join(name).join(platform.cached_binary()))
        .find(|binary| fs.is_file(binary))
}

/// Resolve an explicit executable path: configured path, then known
/// locations, then the managed cache.
pub fn resolve_executable(config: &DiscoveryConfig, fs: &dyn FileSystemProbe) -> Option<PathBuf> {
    if let Some(configured) = &config.configured_path {
        if fs.is_file(configured) {
            log::debug!("Using configured browser executable {}", configured.display());
            return Some(configured.clone());
        }
        log::warn!("Configured browser executable {} does not exist", configured.display());
    }

    let platform = config.platform?;

    if let Some(known) = platform.known_locations().into_iter().find(|p| fs.is_file(p)) {
        log::debug!("Using system browser at {}", known.display());
        return Some(known);
    }

    let cached = config
        .cache_dir
        .as_deref()
        .and_then(|dir| newest_cached_install(dir, platform, fs));
    if let Some(path) = &cached {
        log::debug!("Using cached browser at {}", path.display());
    }
    cached
}
