pub mod payloads;
pub mod user;

// Re-export the wire types so callers can do "use crate::models::*;"
pub use payloads::*;
pub use user::User;
