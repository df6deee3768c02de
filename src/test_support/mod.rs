//! Helpers shared by in-crate unit tests.

#[path = "../../tests/support/socket_guard.rs"]
pub(crate) mod socket_guard;
