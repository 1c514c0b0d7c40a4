//! Configuration file support for octoview.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `OCTOVIEW_`, e.g., `OCTOVIEW_GITHUB_TOKEN`)
//! 2. Local config file (./octoview.toml)
//! 3. XDG config file (~/.config/octoview/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use OCTOVIEW_GITHUB_TOKEN env var
//! api_url = "https://api.github.com"  # optional, for Enterprise hosts
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token for authenticated requests (higher rate limits).
    /// Can also be set via OCTOVIEW_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise hosts.
    /// Can also be set via OCTOVIEW_GITHUB_API_URL environment variable.
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "octoview") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("octoview.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./octoview.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // OCTOVIEW_GITHUB_TOKEN -> github.token
        builder = builder.add_source(
            Environment::with_prefix("OCTOVIEW")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }

    pub fn github_api_url(&self) -> Option<String> {
        self.github.api_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_token() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.github.api_url.is_none());
    }

    #[test]
    fn config_parses_from_toml() {
        let toml_content = r#"
            [github]
            token = "ghp_test123"
            api_url = "https://github.example.com/api/v3"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.github_token(), Some("ghp_test123".to_string()));
        assert_eq!(
            config.github_api_url(),
            Some("https://github.example.com/api/v3".to_string())
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let toml_content = r#"
            [github]
            token = "ghp_test123"
            shiny = true
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.github_token(), Some("ghp_test123".to_string()));
    }

    #[test]
    fn later_sources_override_earlier_ones() {
        let base = r#"
            [github]
            token = "from-file"
        "#;
        let overlay = r#"
            [github]
            token = "from-env"
        "#;

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(base, FileFormat::Toml))
            .add_source(config::File::from_str(overlay, FileFormat::Toml))
            .build()
            .unwrap();

        let config: Config = settings.try_deserialize().unwrap();
        assert_eq!(config.github_token(), Some("from-env".to_string()));
    }
}
