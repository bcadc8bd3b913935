pub mod cli;
pub mod toml_config;

use crate::core::dispatcher::DEFAULT_MAX_IN_FLIGHT;
use crate::core::geocoder::{DEFAULT_ENDPOINT, DEFAULT_USER_AGENT};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use toml_config::TomlConfig;

pub const MAX_CONCURRENT_REQUESTS: usize = 100;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeConfig {
    pub input_path: String,
    pub output_path: String,
    pub api_endpoint: String,
    pub user_agent: String,
    pub concurrent_requests: usize,
}

impl GeocodeConfig {
    pub fn new(input_path: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrent_requests: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_concurrent_requests(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests;
        self
    }

    /// Applies the values present in a settings file.
    pub fn merge_toml(mut self, file: &TomlConfig) -> Self {
        if let Some(endpoint) = file.endpoint() {
            self.api_endpoint = endpoint.to_string();
        }
        if let Some(user_agent) = file.user_agent() {
            self.user_agent = user_agent.to_string();
        }
        if let Some(concurrent) = file.concurrent_requests() {
            self.concurrent_requests = concurrent;
        }
        self
    }
}

impl ConfigProvider for GeocodeConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

impl Validate for GeocodeConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_path", &self.input_path)?;
        validate_path("output_path", &self.output_path)?;
        validate_url("endpoint", &self.api_endpoint)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        validate_range(
            "concurrent_requests",
            self.concurrent_requests,
            1,
            MAX_CONCURRENT_REQUESTS,
        )?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::{GeocodeConfig, TomlConfig};
    use crate::utils::error::Result;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "geocode-etl", version)]
    #[command(about = "Geocode an ID,Address CSV file into ID,Address,Latitude,Longitude")]
    #[command(after_help = "Input CSV format: ID,Address\nOutput CSV format: ID,Address,Latitude,Longitude")]
    pub struct CliConfig {
        /// CSV file with one `ID,Address` pair per line
        pub input_path: String,

        /// Destination CSV file (overwritten)
        pub output_path: String,

        /// Nominatim-compatible search endpoint
        #[arg(long)]
        pub endpoint: Option<String>,

        /// Maximum number of simultaneous geocode requests
        #[arg(long)]
        pub concurrent_requests: Option<usize>,

        /// User-Agent header sent with each request
        #[arg(long)]
        pub user_agent: Option<String>,

        /// TOML settings file; command-line flags take precedence
        #[arg(long)]
        pub config: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit log lines as JSON")]
        pub log_json: bool,
    }

    impl CliConfig {
        /// Defaults, then the settings file, then command-line flags.
        pub fn resolve(&self) -> Result<GeocodeConfig> {
            let mut config = GeocodeConfig::new(self.input_path.clone(), self.output_path.clone());

            if let Some(path) = &self.config {
                let file = TomlConfig::from_file(path)?;
                config = config.merge_toml(&file);
            }
            if let Some(endpoint) = &self.endpoint {
                config = config.with_endpoint(endpoint.clone());
            }
            if let Some(user_agent) = &self.user_agent {
                config = config.with_user_agent(user_agent.clone());
            }
            if let Some(concurrent) = self.concurrent_requests {
                config = config.with_concurrent_requests(concurrent);
            }

            Ok(config)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;

        #[test]
        fn test_defaults() {
            let cli = CliConfig::try_parse_from(["geocode-etl", "in.csv", "out.csv"]).unwrap();
            let config = cli.resolve().unwrap();

            assert_eq!(config, GeocodeConfig::new("in.csv", "out.csv"));
            assert_eq!(config.concurrent_requests, 5);
        }

        #[test]
        fn test_wrong_argument_count() {
            assert!(CliConfig::try_parse_from(["geocode-etl"]).is_err());
            assert!(CliConfig::try_parse_from(["geocode-etl", "in.csv"]).is_err());
            assert!(CliConfig::try_parse_from(["geocode-etl", "a", "b", "c"]).is_err());
        }

        #[test]
        fn test_flags_override_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(
                b"[source]\nendpoint = \"https://file.example/search\"\nuser_agent = \"from-file\"\n[extract]\nconcurrent_requests = 2\n",
            )
            .unwrap();

            let cli = CliConfig::try_parse_from([
                "geocode-etl",
                "in.csv",
                "out.csv",
                "--config",
                file.path().to_str().unwrap(),
                "--concurrent-requests",
                "8",
            ])
            .unwrap();
            let config = cli.resolve().unwrap();

            assert_eq!(config.api_endpoint, "https://file.example/search");
            assert_eq!(config.user_agent, "from-file");
            assert_eq!(config.concurrent_requests, 8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeocodeConfig::new("in.csv", "out.csv").validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = GeocodeConfig::new("in.csv", "out.csv");

        assert!(base.clone().with_concurrent_requests(0).validate().is_err());
        assert!(base.clone().with_concurrent_requests(101).validate().is_err());
        assert!(base.clone().with_endpoint("nominatim").validate().is_err());
        assert!(base.clone().with_user_agent(" ").validate().is_err());
        assert!(GeocodeConfig::new("", "out.csv").validate().is_err());
    }
}
