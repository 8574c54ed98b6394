mod refresh;
mod request;

pub use request::ApiClient;
