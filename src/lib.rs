pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpSkipSource;
pub use config::{toml_config::TomlConfig, ApiConfig};
pub use crate::core::{
    query::LocationQueryService,
    selection::SizeSelection,
    session::{LocationSession, QueryStatus},
    slider::{RenderState, SkipCard, SliderView},
};
pub use domain::model::{QueryKey, SkipOption};
pub use utils::error::{Result, SkipError};
