//! Test support for service-level integration tests.

mod db;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
