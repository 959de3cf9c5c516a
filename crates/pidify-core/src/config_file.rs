use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub registries: Option<RegistriesConfig>,
    pub http: Option<HttpConfig>,
    pub matching: Option<MatchingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub openalex_key: Option<String>,
    pub crossref_mailto: Option<String>,
}

/// Base URLs, for pointing at mirrors or staging instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistriesConfig {
    pub orcid_url: Option<String>,
    pub ror_url: Option<String>,
    pub crossref_url: Option<String>,
    pub openalex_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub funder_threshold: Option<f64>,
}

/// Platform config directory path: `<config_dir>/pidify/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pidify").join("config.toml"))
}

/// Load config by cascading CWD `.pidify.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pidify.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// `overlay`'s value for a key if set, else `base`'s.
fn pick<S, T>(overlay: Option<&S>, base: Option<&S>, get: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&get).or_else(|| base.and_then(&get))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (base_keys, keys) = (base.api_keys.as_ref(), overlay.api_keys.as_ref());
    let (base_urls, urls) = (base.registries.as_ref(), overlay.registries.as_ref());
    let (base_http, http) = (base.http.as_ref(), overlay.http.as_ref());
    let (base_matching, matching) = (base.matching.as_ref(), overlay.matching.as_ref());

    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            openalex_key: pick(keys, base_keys, |a| a.openalex_key.clone()),
            crossref_mailto: pick(keys, base_keys, |a| a.crossref_mailto.clone()),
        }),
        registries: Some(RegistriesConfig {
            orcid_url: pick(urls, base_urls, |r| r.orcid_url.clone()),
            ror_url: pick(urls, base_urls, |r| r.ror_url.clone()),
            crossref_url: pick(urls, base_urls, |r| r.crossref_url.clone()),
            openalex_url: pick(urls, base_urls, |r| r.openalex_url.clone()),
        }),
        http: Some(HttpConfig {
            timeout_secs: pick(http, base_http, |h| h.timeout_secs),
            user_agent: pick(http, base_http, |h| h.user_agent.clone()),
        }),
        matching: Some(MatchingConfig {
            funder_threshold: pick(matching, base_matching, |m| m.funder_threshold),
        }),
    }
}

impl ConfigFile {
    /// Overwrite `config` with every value this file sets.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref keys) = self.api_keys {
            if let Some(ref key) = keys.openalex_key {
                config.openalex_key = Some(key.clone());
            }
            if let Some(ref mailto) = keys.crossref_mailto {
                config.crossref_mailto = Some(mailto.clone());
            }
        }
        if let Some(ref registries) = self.registries {
            if let Some(ref url) = registries.orcid_url {
                config.orcid_url = url.clone();
            }
            if let Some(ref url) = registries.ror_url {
                config.ror_url = url.clone();
            }
            // Paths are appended to these two.
            if let Some(ref url) = registries.crossref_url {
                config.crossref_url = url.trim_end_matches('/').to_string();
            }
            if let Some(ref url) = registries.openalex_url {
                config.openalex_url = url.trim_end_matches('/').to_string();
            }
        }
        if let Some(ref http) = self.http {
            if let Some(secs) = http.timeout_secs {
                config.http_timeout_secs = secs;
            }
            if let Some(ref agent) = http.user_agent {
                config.user_agent = agent.clone();
            }
        }
        if let Some(threshold) = self.matching.as_ref().and_then(|m| m.funder_threshold) {
            config.funder_match_threshold = threshold;
        }
    }
}
