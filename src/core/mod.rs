pub mod destination;
pub mod etl;
pub mod pipeline;
pub mod request;
pub mod source;
pub mod transform;

pub use crate::domain::model::{ConversionRow, ConversionRows, ImportRequest, OutputRow};
pub use crate::domain::ports::{Pipeline, QueryEngine, SheetWriter, TokenProvider};
pub use crate::utils::error::Result;
