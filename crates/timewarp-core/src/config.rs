use anyhow::{Context, Result, bail};
use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-local config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".timewarp.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimewarpConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
}

/// Autoplay cadence and manual step size, in scrub-position units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_increment")]
    pub increment: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            increment: default_increment(),
            step: default_step(),
        }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineConfig {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            priority: default_priority(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Offset used for calendar dates, e.g. `+02:00`. Local offset if unset.
    #[serde(default)]
    pub utc_offset: Option<String>,
}

impl TimelineConfig {
    /// Resolve the zone calendar dates are computed in.
    ///
    /// # Errors
    ///
    /// Returns an error if `utc_offset` is set but not a valid offset.
    pub fn zone(&self) -> Result<FixedOffset> {
        match self.utc_offset.as_deref() {
            Some(raw) => parse_utc_offset(raw),
            None => Ok(local_zone()),
        }
    }
}

/// The machine's current local offset.
#[must_use]
pub fn local_zone() -> FixedOffset {
    Local::now().offset().fix()
}

/// Parse `Z`, `UTC`, `+HH`, `+HHMM` or `+HH:MM` (and `-` variants).
///
/// # Errors
///
/// Returns an error for any other form or an offset beyond ±23:59.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).context("zero offset");
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => bail!("invalid UTC offset '{raw}': expected +HH:MM or -HH:MM"),
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) || !matches!(digits.len(), 2 | 4) {
        bail!("invalid UTC offset '{raw}': expected +HH:MM or -HH:MM");
    }

    let hours: i32 = digits[..2].parse().context("offset hours")?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().context("offset minutes")?
    } else {
        0
    };
    if hours > 23 || minutes > 59 {
        bail!("invalid UTC offset '{raw}': out of range");
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("invalid UTC offset '{raw}'"))
}

/// Load a config file. Missing file is an error here; use
/// [`resolve_config`] for the lookup chain.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<TimewarpConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TimewarpConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// User-level config path (`<config_dir>/timewarp/config.toml`).
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("timewarp/config.toml"))
}

/// Resolve the effective config.
///
/// Precedence: `explicit` path, then `<project_root>/.timewarp.toml`, then the
/// user config file, then built-in defaults.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed,
/// or if an explicit path does not exist.
pub fn resolve_config(explicit: Option<&Path>, project_root: &Path) -> Result<TimewarpConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let project = project_root.join(PROJECT_CONFIG_FILE);
    if project.exists() {
        tracing::debug!(path = %project.display(), "using project config");
        return load_config_file(&project);
    }

    if let Some(user) = user_config_path().filter(|p| p.exists()) {
        tracing::debug!(path = %user.display(), "using user config");
        return load_config_file(&user);
    }

    Ok(TimewarpConfig::default())
}

const fn default_interval_ms() -> u64 {
    150
}

const fn default_increment() -> f64 {
    2.0
}

const fn default_step() -> f64 {
    5.0
}

fn default_status() -> String {
    "todo".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}
