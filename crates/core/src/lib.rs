//! Domain primitives shared by every Authors Haven crate.
//!
//! Nothing in here performs I/O: the database layer, the notification
//! pipeline and the HTTP server all build on these types.

pub mod channels;
pub mod error;
pub mod hashing;
pub mod notify;
pub mod pagination;
pub mod roles;
pub mod slug;
pub mod types;
pub mod voting;
