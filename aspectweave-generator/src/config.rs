use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Declared bounds for one named configuration argument of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBound {
    /// Attribute type path, e.g. `aspectweave::extensions::Retry`
    pub attribute: String,
    pub argument: String,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl ConfigBound {
    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Generator configuration
///
/// Every field has a default, so a partial JSON document or an empty
/// environment yields a working setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaverConfig {
    /// Type every aspect attribute derives from
    pub marker_base: String,
    /// Types accepted as the dependency-resolution provider
    pub provider_types: Vec<String>,
    /// Preferred member names, in priority order
    pub provider_names: Vec<String>,
    pub default_order_constant: String,
    /// Named attribute argument that overrides the Order at the usage site
    pub order_argument: String,
    pub runtime_path: String,
    pub intercepts_attribute: String,
    pub module_name: String,
    pub file_name: String,
    pub bounds: Vec<ConfigBound>,
    pub analysis_threads: usize,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            marker_base: "aspectweave::Aspect".to_string(),
            provider_types: vec![
                "aspectweave::ServiceProvider".to_string(),
                "aspectweave::Container".to_string(),
            ],
            provider_names: vec![
                "service_provider".to_string(),
                "_service_provider".to_string(),
                "services".to_string(),
            ],
            default_order_constant: "DEFAULT_ORDER".to_string(),
            order_argument: "order".to_string(),
            runtime_path: "::aspectweave".to_string(),
            intercepts_attribute: "::aspectweave::intercepts".to_string(),
            module_name: "aspectweave_interceptors".to_string(),
            file_name: "aspectweave_interceptors.rs".to_string(),
            bounds: vec![ConfigBound {
                attribute: "aspectweave::extensions::Retry".to_string(),
                argument: "max_attempts".to_string(),
                min: Some(1),
                max: None,
            }],
            analysis_threads: num_cpus::get(),
        }
    }
}

impl WeaverConfig {
    /// Defaults overlaid with `ASPECTWEAVE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("ASPECTWEAVE_MARKER_BASE") {
            config.marker_base = value;
        }
        if let Ok(value) = env::var("ASPECTWEAVE_PROVIDER_TYPES") {
            config.provider_types = split_list(&value);
        }
        if let Ok(value) = env::var("ASPECTWEAVE_PROVIDER_NAMES") {
            config.provider_names = split_list(&value);
        }
        if let Ok(value) = env::var("ASPECTWEAVE_DEFAULT_ORDER_CONSTANT") {
            config.default_order_constant = value;
        }
        if let Ok(value) = env::var("ASPECTWEAVE_RUNTIME_PATH") {
            config.runtime_path = value;
        }
        if let Ok(value) = env::var("ASPECTWEAVE_INTERCEPTS_ATTRIBUTE") {
            config.intercepts_attribute = value;
        }
        if let Ok(value) = env::var("ASPECTWEAVE_MODULE_NAME") {
            config.module_name = value;
        }
        if let Ok(value) = env::var("ASPECTWEAVE_ANALYSIS_THREADS") {
            config.analysis_threads = match value.trim().parse::<usize>() {
                Ok(threads) if threads > 0 => threads,
                _ => {
                    return Err(GeneratorError::Config {
                        key: "ASPECTWEAVE_ANALYSIS_THREADS".to_string(),
                        value,
                    });
                }
            };
        }

        tracing::debug!(?config, "loaded weaver configuration");
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `path` names one of the accepted provider types
    pub fn is_provider_type(&self, path: &str) -> bool {
        let path = peel_provider_type(path);
        self.provider_types.iter().any(|candidate| candidate.trim_start_matches("::") == path)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Strip reference and smart-pointer wrappers down to the provider path
fn peel_provider_type(mut path: &str) -> &str {
    loop {
        let trimmed = path.trim().trim_start_matches("::");
        let next = if let Some(rest) = trimmed.strip_prefix('&') {
            strip_lifetime(rest.trim_start()).trim_start_matches("mut ")
        } else if let Some(rest) = trimmed.strip_prefix("dyn ") {
            rest
        } else if let Some(inner) = strip_wrapper(trimmed, &["Arc", "std::sync::Arc", "Box", "std::boxed::Box"]) {
            inner
        } else {
            return trimmed;
        };
        path = next;
    }
}

fn strip_lifetime(path: &str) -> &str {
    match path.strip_prefix('\'') {
        Some(rest) => rest.split_once(' ').map_or("", |(_, tail)| tail.trim_start()),
        None => path,
    }
}

fn strip_wrapper<'a>(path: &'a str, wrappers: &[&str]) -> Option<&'a str> {
    wrappers.iter().find_map(|wrapper| {
        path.strip_prefix(wrapper)
            .and_then(|rest| rest.strip_prefix('<'))
            .and_then(|rest| rest.strip_suffix('>'))
    })
}
