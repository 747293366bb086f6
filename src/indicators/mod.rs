pub mod error;
pub mod parser;
pub mod registry;
pub mod series;

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use error::IndicatorError;
pub use parser::*;
pub use registry::*;
pub use series::*;
