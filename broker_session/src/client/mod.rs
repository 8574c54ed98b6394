mod errors;
mod main;
mod transport;
mod types;

pub use errors::ApiError;
pub use main::ApiClient;
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{HttpRequest, HttpResponse, RequestOptions};
