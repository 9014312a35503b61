pub mod query;
pub mod selection;
pub mod session;
pub mod slider;

pub use crate::domain::model::{QueryKey, SkipOption};
pub use crate::domain::ports::{Clock, ConfigProvider, SkipSource};
pub use crate::utils::error::Result;
