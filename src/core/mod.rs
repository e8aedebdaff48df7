pub mod alias;
pub mod catalog;
pub mod engine;
pub mod etl;
pub mod geo;
pub mod matcher;
pub mod neighbors;
pub mod normalizer;
pub mod phrase;
pub mod pipeline;
pub mod slug;
pub mod trust;

pub use crate::domain::model::Record;
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
