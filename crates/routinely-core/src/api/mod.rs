//! External service access: request schemas and the HTTP client.

mod client;
pub mod protocol;

pub use client::ApiClient;
pub use protocol::{AuthRequest, ResetTicket};
