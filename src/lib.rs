pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, GeocodeConfig};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    dispatcher::BoundedDispatcher, etl::EtlEngine, geocoder::NominatimGeocoder,
    parser::parse_rows, pipeline::GeocodePipeline,
};
pub use domain::model::{GeocodeResult, InputRow, OutputRow, RunSummary};
pub use domain::ports::Geocoder;
pub use utils::error::{EtlError, GeocodeError, Result};
