//! Site configuration management for `tolk.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                          |
//! |-----------------|--------------------------------------------------|
//! | `[site]`        | Base URL, supported locales, default locale      |
//! | `[collections]` | Per-locale listing-root slug overrides           |
//! | `[store]`       | Content-store endpoint, token, timeout, retries  |
//! | `[build]`       | Sitemap output directory                         |
//! | `[serve]`       | HTTP surface (interface, port, cache headers)    |

mod error;
mod section;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use section::{BuildSection, CollectionsSection, ServeSection, SiteSection, StoreSection};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands};
use crate::core::CollectionKind;
use crate::log;
use crate::registry::SlugRegistry;

/// Root configuration structure representing tolk.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site identity (base URL, locales)
    pub site: SiteSection,

    /// Collection slug overrides
    pub collections: CollectionsSection,

    /// Content-store connection
    pub store: StoreSection,

    /// Batch sitemap emission
    pub build: BuildSection,

    /// HTTP surface
    pub serve: ServeSection,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(
                "config file '{}' not found in this directory or any parent",
                cli.config.display()
            );
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|err| ConfigError::Io(config_path.clone(), err))?;
        let (mut config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &config_path);
        }

        config.root = config_path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.config_path = config_path;
        config.build.output = config.root.join(&config.build.output);
        config.apply_command_options(cli);
        config.validate(cli)?;

        Ok(config)
    }

    /// Parse configuration from TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { output, verbose } => {
                crate::logger::set_verbose(*verbose);
                if let Some(output) = output {
                    self.build.output = output.clone();
                }
            }
            Commands::Serve {
                interface,
                port,
                verbose,
            } => {
                crate::logger::set_verbose(*verbose);
                if let Some(interface) = interface {
                    self.serve.interface = *interface;
                }
                if let Some(port) = port {
                    self.serve.port = *port;
                }
            }
            Commands::Query { .. } => {}
        }
    }

    /// Validate configuration for the current command.
    ///
    /// Collects all validation errors and returns them at once.
    fn validate(&self, cli: &Cli) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.collections.validate(&self.site.locale_set(), &mut diag);
        self.store.validate(&mut diag);

        // Sitemap surfaces need absolute URLs.
        let needs_url = matches!(cli.command, Commands::Build { .. } | Commands::Serve { .. });
        if needs_url && self.site.url.is_none() {
            diag.error_with_hint(
                "site.url",
                "sitemap generation requires the site URL",
                "set site.url, e.g.: \"https://example.com\"",
            );
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Build the validated slug registry from `[site]` and `[collections]`.
    pub fn slug_registry(&self) -> Result<SlugRegistry> {
        let locales = self.site.locale_set();
        let mut registry = SlugRegistry::new(locales.clone());
        for kind in CollectionKind::ALL {
            for (locale, slug) in self.collections.overrides(kind) {
                if let Some(locale) = locales.get(locale) {
                    registry.set_slug(kind, locale.clone(), slug.clone());
                }
            }
        }

        let mut diag = ConfigDiagnostics::new();
        registry.validate(&mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e))?;
        Ok(registry)
    }

    /// Base site URL, trimmed of its trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        self.site.url.as_deref().map(|u| u.trim_end_matches('/'))
    }

    /// Build the content-store client from `[store]`.
    pub fn http_store(&self) -> Result<crate::store::HttpStore> {
        crate::store::HttpStore::new(
            &self.store.endpoint,
            self.store.token.clone(),
            self.store.timeout(),
            self.store.retry_policy(),
        )
    }
}

/// Find config file by searching upward from current directory.
///
/// Starts from cwd and walks up parent directories until finding
/// `config_name`. Returns the absolute path to the config file if found.
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() && config_name.exists() {
        return Some(config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Locale;

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<SiteConfig, _> = toml::from_str("[site\nurl = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\nurl = \"https://x.io\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.site.url.as_deref(), Some("https://x.io"));
        assert!(!ignored.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[site]\nurl = \"https://x.io\"";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_slug_registry_from_config() {
        let config = test_parse_config(
            "[site]\nlocales = [\"en\", \"nb\"]\n[collections.articles]\nnb = \"artikler\"",
        );
        let registry = config.slug_registry().unwrap();
        assert_eq!(
            registry.slug_for(crate::core::CollectionKind::Articles, &Locale::new("nb")),
            "artikler"
        );
    }

    #[test]
    fn test_slug_registry_rejects_collisions() {
        let config = test_parse_config(
            "[site]\nlocales = [\"en\", \"nb\"]\n[collections.articles]\nnb = \"docs\"\n[collections.docs]\nnb = \"docs\"",
        );
        assert!(config.slug_registry().is_err());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = test_parse_config("[site]\nurl = \"https://x.io/\"");
        assert_eq!(config.base_url(), Some("https://x.io"));
    }
}
