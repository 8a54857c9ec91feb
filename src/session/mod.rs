pub mod guard;
pub mod store;

pub use guard::{guard, RouteAccess, RouteDecision};
pub use store::{Session, SessionStore};
