pub mod response;

pub use response::{ApiError, ApiResponder, ApiResponse};
