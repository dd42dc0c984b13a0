//! backoffice-hex: hexagonal backoffice API library (core + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use backoffice_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
