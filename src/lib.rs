pub mod error;
pub mod global_variables;
pub mod model;
pub mod predictor;
pub mod server;
pub mod shared_data;
pub mod trainer;
