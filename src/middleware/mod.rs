pub mod auth;
pub mod extract;
pub mod response;
pub mod role;

pub use auth::{jwt_auth_middleware, AuthUser, OptionalAuthUser};
pub use extract::{lenient_f64, lenient_i64, ApiJson, ApiPath, ApiQuery};
pub use response::{ApiResponse, ApiResult};
pub use role::{require_admin, require_instructor, require_student};
