// src/web/mod.rs

//! HTTP surface: routes, extractors, and request handlers.

pub mod extractors;
pub mod handlers;
pub mod routes;
