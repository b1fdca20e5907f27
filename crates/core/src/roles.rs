//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in
//! `20261018000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
