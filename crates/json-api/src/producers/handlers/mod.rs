//! Producer Handlers

pub(crate) mod get;
