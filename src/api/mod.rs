/// REST access to the ERP back end
///
/// - `client.rs` - request building, status handling, JSON decoding
/// - `image.rs` - record image download and preview decoding

pub mod client;
pub mod image;

pub use client::{ApiClient, Credentials, LoginResponse};
