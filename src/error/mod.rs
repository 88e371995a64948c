//! Error taxonomy and classification for Mercado Bitcoin API operations.

mod common;
mod traits;

pub use common::{ApiError, ApiResult};
pub use traits::{retry_with_backoff, ErrorCategory, ErrorClassification};
