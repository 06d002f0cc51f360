pub mod client_ip;
mod error;
mod log;
pub mod midware;
pub mod rate_limit;
pub mod routes;
pub mod serve;
pub mod types;

pub use error::{ClientError, Error, WebResult};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
