pub mod claims;
pub mod error;
pub mod module;
pub mod types;

pub use claims::{bearer_token, Claims};
pub use error::ServiceError;
pub use module::Module;
pub use types::{new_id, now_rfc3339};
