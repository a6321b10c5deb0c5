mod client;
mod error;
mod models;
pub mod parsers;
mod session;
mod transport;

// Public API.
pub use client::StudentVueClient;
pub use error::{Result, StudentVueError};
pub use models::*;
pub use parsers::form::FormFields;
pub use session::{PortalSession, normalize_domain};
pub use transport::{HttpTransport, PortalResponse, Transport};
