pub mod collector;
pub mod dispatcher;
pub mod etl;
pub mod geocoder;
pub mod parser;
pub mod pipeline;

pub use crate::domain::model::{GeocodeReport, GeocodeResult, InputRow, OutputRow, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Geocoder, Pipeline, Storage};
pub use crate::utils::error::Result;
