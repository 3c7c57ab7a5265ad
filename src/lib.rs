pub mod algorithms;
pub mod cleanup;
pub mod clock;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod handlers;
pub mod health;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod rate_limiter;
pub mod response;
pub mod server;

pub use algorithms::Decision;
pub use config::Config;
pub use error::{ThrottlerError, ThrottlerResult};
pub use rate_limiter::{LimiterKind, RateLimiter};
pub use response::{RateLimitResponse, Rejection};
pub use server::create_app;
