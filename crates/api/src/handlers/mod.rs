//! HTTP handlers, one submodule per resource.

pub mod auth;
