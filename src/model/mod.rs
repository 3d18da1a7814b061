pub mod encoder;
pub mod pipeline;
pub mod regression;

pub use encoder::{FieldVocabulary, OneHotEncoder};
pub use pipeline::FittedPipeline;
pub use regression::LinearRegression;
