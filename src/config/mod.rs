use crate::context::DEFAULT_BODY_LIMIT;
use crate::error::{Error, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;

pub const DISCOVER_PATHS_KEY: &str = "WIREMOUNT_DISCOVER_PATHS";
pub const BODY_LIMIT_KEY: &str = "WIREMOUNT_BODY_LIMIT";
pub const HOST_KEY: &str = "HOST";
pub const PORT_KEY: &str = "PORT";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Configuration seeded from the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let service = Self::default();
        for (key, value) in pairs {
            service.set(key, value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Comma separated value, blank entries dropped
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Parse the value at `key`
    ///
    /// # Errors
    /// [`Error::Configuration`] when the value is present but does not parse.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|value| {
                value.trim().parse::<T>().map_err(|e| {
                    Error::configuration(format!("invalid value '{}' for {}: {}", value, key, e))
                })
            })
            .transpose()
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("entries", &self.config.len())
            .finish()
    }
}

/// Options of the controller plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Locations searched for controller modules
    pub discover_paths: Vec<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            discover_paths: vec!["./controller".to_string()],
        }
    }
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discover_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.discover_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &ConfigService) -> Self {
        match config.get_list(DISCOVER_PATHS_KEY) {
            Some(paths) => Self {
                discover_paths: paths,
            },
            None => Self::default(),
        }
    }
}

/// Listener and request settings of the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body buffered for a context, in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: config.get(HOST_KEY).unwrap_or(defaults.host),
            port: config.get_parsed(PORT_KEY)?.unwrap_or(defaults.port),
            body_limit: config.get_parsed(BODY_LIMIT_KEY)?.unwrap_or(defaults.body_limit),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
