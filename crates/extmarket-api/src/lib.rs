// extmarket-api: Async Rust client for the extension marketplace catalog

pub mod error;
pub mod query;
pub mod rest;
pub mod transport;
pub mod types;

pub use error::Error;
pub use query::{Bound, Column, Direction, Filter, OrderBy, RemoteQuery};
pub use rest::RestClient;
pub use transport::{TlsMode, TransportConfig};
pub use types::{ExtensionDetailRow, ExtensionRow, Page};
