use crate::utils::error::{EtlError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Optional settings file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub source: Option<SourceConfig>,
    pub extract: Option<ExtractConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    pub concurrent_requests: Option<usize>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.source.as_ref()?.endpoint.as_deref()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.source.as_ref()?.user_agent.as_deref()
    }

    pub fn concurrent_requests(&self) -> Option<usize> {
        self.extract.as_ref()?.concurrent_requests
    }
}
