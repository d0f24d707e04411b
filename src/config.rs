use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::poi::PoiConfig;
use crate::watcher::DEFAULT_SETTLE;

const APP_NAME: &str = "sidelegend";
const LOCAL_RC: &str = ".sidelegendrc";

/// Flags that can be saved as defaults and read back from a flag file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub watch_settle: Option<u64>,
    pub peak: Option<f64>,
    pub delay: Option<u64>,
    pub class: Option<String>,
    pub max_level: Option<u8>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Combine two flag sets; values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            watch_settle: other.watch_settle.or(self.watch_settle),
            peak: other.peak.or(self.peak),
            delay: other.delay.or(self.delay),
            class: other.class.clone().or_else(|| self.class.clone()),
            max_level: other.max_level.or(self.max_level),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    /// Quiet time the file watcher waits before reloading.
    pub fn watch_settle(&self) -> Duration {
        self.watch_settle
            .map_or(DEFAULT_SETTLE, Duration::from_millis)
    }

    /// Registry defaults with these flags applied.
    pub fn poi_config(&self) -> PoiConfig {
        let mut config = PoiConfig::default();
        if let Some(peak) = self.peak {
            config.peak_pixels = peak;
        }
        if let Some(delay) = self.delay {
            config.delay_millis = delay;
        }
        if let Some(class) = &self.class {
            config.css_class.clone_from(class);
        }
        if let Some(level) = self.max_level {
            config.max_level = level;
        }
        config
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_NAME).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_NAME)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_NAME).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_NAME).join("config");
        }
    }

    PathBuf::from(LOCAL_RC)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_RC)
}

/// Read a flag file. A missing file yields default flags.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec![format!("# {APP_NAME} defaults (saved with --save)")];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if let Some(settle) = flags.watch_settle {
        lines.push(format!("--watch-settle {settle}"));
    }
    if let Some(peak) = flags.peak {
        lines.push(format!("--peak {peak}"));
    }
    if let Some(delay) = flags.delay {
        lines.push(format!("--delay {delay}"));
    }
    if let Some(class) = &flags.class {
        lines.push(format!("--class {class}"));
    }
    if let Some(level) = flags.max_level {
        lines.push(format!("--max-level {level}"));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of a token list. Unknown tokens and bad values are ignored.
///
/// Both `--flag value` and `--flag=value` are accepted.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--watch" || token == "-w" {
            flags.watch = true;
            i += 1;
            continue;
        }
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if !matches!(
            name,
            "--watch-settle" | "--peak" | "--delay" | "--class" | "--max-level" | "--log-file"
        ) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            apply_value(&mut flags, name, value);
        }
        i += 1;
    }
    flags
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--peak" => {
            if let Ok(peak) = value.parse::<f64>()
                && peak.is_finite()
                && peak >= 0.0
            {
                flags.peak = Some(peak);
            }
        }
        "--watch-settle" => flags.watch_settle = value.parse().ok().or(flags.watch_settle),
        "--delay" => flags.delay = value.parse().ok().or(flags.delay),
        "--class" => flags.class = Some(value.to_string()),
        "--max-level" => {
            if let Ok(level) = value.parse::<u8>()
                && (1..=6).contains(&level)
            {
                flags.max_level = Some(level);
            }
        }
        "--log-file" => flags.log_file = Some(PathBuf::from(value)),
        _ => {}
    }
}
