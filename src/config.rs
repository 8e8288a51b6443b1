//! File-based defaults for the export CLI.
//!
//! The config file is a flat list of `key = value` lines with `#` comments,
//! read from `$XDG_CONFIG_HOME/library-export/config.toml` or
//! `$HOME/.config/library-export/config.toml`. Every key is optional;
//! explicit command-line values take precedence.

use std::env;
use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

/// Directory name used under the user's config home.
pub const CONFIG_DIR_NAME: &str = "library-export";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Parsed config file values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Service root URL.
    pub base_url: Option<String>,
    /// Directory the dated export roots are created in.
    pub output_dir: Option<PathBuf>,
    /// Account used for HTTP Basic authentication.
    pub admin_user: Option<String>,
    /// Skip TLS certificate validation.
    pub accept_invalid_certs: Option<bool>,
    /// Redirect hop limit per request.
    pub max_redirects: Option<usize>,
    /// Listing page size.
    pub items: Option<usize>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates values against the same ranges the CLI enforces.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range key.
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url
            && url::Url::parse(base_url).is_err()
        {
            bail!("Invalid config value for `base_url`: {base_url}. Expected an absolute URL");
        }
        if let Some(max_redirects) = self.max_redirects
            && max_redirects > 100
        {
            bail!(
                "Invalid config value for `max_redirects`: {max_redirects}. Expected range: 0..=100"
            );
        }
        if let Some(items) = self.items
            && !(1..=100_000).contains(&items)
        {
            bail!("Invalid config value for `items`: {items}. Expected range: 1..=100000");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Log filter directive for this setting.
    #[must_use]
    pub fn filter_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/library-export/config.toml`
/// 2. `$HOME/.config/library-export/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config file at the default path, if one exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

/// Loads and validates a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains invalid syntax,
/// unknown keys, or out-of-range values.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Parses config file contents.
///
/// # Errors
///
/// Returns an error for invalid syntax, unknown keys, or out-of-range values.
pub fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => cfg.base_url = Some(parse_string_literal(value).with_context(invalid)?),
            "output_dir" => {
                cfg.output_dir =
                    Some(PathBuf::from(parse_string_literal(value).with_context(invalid)?));
            }
            "admin_user" => {
                cfg.admin_user = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "accept_invalid_certs" => {
                cfg.accept_invalid_certs = Some(parse_boolean(value).with_context(invalid)?);
            }
            "max_redirects" => {
                cfg.max_redirects = Some(parse_count(value).with_context(invalid)?);
            }
            "items" => cfg.items = Some(parse_count(value).with_context(invalid)?),
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_count(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_count(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// `#` starts a comment unless it sits inside a quoted value.
fn strip_inline_comment(line: &str) -> &str {
    let mut quoted = false;
    let comment_start = line.char_indices().find_map(|(index, ch)| match ch {
        '"' => {
            quoted = !quoted;
            None
        }
        '#' if !quoted => Some(index),
        _ => None,
    });
    comment_start.map_or(line, |index| &line[..index])
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("Expected double-quoted string"))
}

/// Parses counts and durations (`items`, `max_redirects`, timeouts).
fn parse_count<T>(raw_value: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    let token = raw_value.trim();
    if token.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    token
        .parse::<T>()
        .with_context(|| format!("Expected non-negative integer, found '{token}'"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    raw_value
        .trim()
        .parse::<bool>()
        .map_err(|_| anyhow!("Expected 'true' or 'false'"))
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "https://library.example.edu"
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.base_url.as_deref(), Some("https://library.example.edu"));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
base_url = "https://library.example.edu"
output_dir = "/srv/exports"
admin_user = "root"
accept_invalid_certs = true
max_redirects = 5
items = 1000
connect_timeout_secs = 10
read_timeout_secs = 60
verbosity = "quiet"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/srv/exports")));
        assert_eq!(cfg.admin_user.as_deref(), Some("root"));
        assert_eq!(cfg.accept_invalid_certs, Some(true));
        assert_eq!(cfg.max_redirects, Some(5));
        assert_eq!(cfg.items, Some(1000));
        assert_eq!(cfg.connect_timeout_secs, Some(10));
        assert_eq!(cfg.read_timeout_secs, Some(60));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
items = 200 # page size
base_url = "https://a.example.edu/#frag" # hash inside string is kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.items, Some(200));
        assert_eq!(cfg.base_url.as_deref(), Some("https://a.example.edu/#frag"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_key() {
        let err = parse_config_str("concurrency = 4").expect_err("unknown key expected");
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_parse_config_rejects_relative_base_url() {
        let err = parse_config_str(r#"base_url = "library.example.edu""#)
            .expect_err("invalid base_url expected");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_parse_config_rejects_zero_timeout() {
        let err =
            parse_config_str("read_timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("admin_user = root").expect_err("quoted string expected");
        assert!(format!("{err:#}").contains("admin_user"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("items 5").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_verbosity_filter_levels() {
        assert_eq!(VerbositySetting::Default.filter_level(), "info");
        assert_eq!(VerbositySetting::Quiet.filter_level(), "error");
        assert_eq!(VerbositySetting::Verbose.filter_level(), "debug");
        assert_eq!(VerbositySetting::Debug.filter_level(), "trace");
    }

    #[test]
    fn test_parse_config_rejects_negative_and_non_numeric_counts() {
        let err = parse_config_str("items = -5\n").unwrap_err();
        assert!(format!("{err:#}").contains("non-negative"));
        let err = parse_config_str("read_timeout_secs = soon\n").unwrap_err();
        assert!(format!("{err:#}").contains("read_timeout_secs"));
    }

    #[test]
    fn test_inline_comment_inside_quotes_is_kept() {
        let cfg = parse_config_str("base_url = \"https://example.edu/#frag\" # trailing\n").unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://example.edu/#frag"));
        assert_eq!(strip_inline_comment("items = 5 # five"), "items = 5 ");
    }
}
