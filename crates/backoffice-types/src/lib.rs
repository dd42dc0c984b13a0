//! backoffice-types: domain records, request shapes and storage ports.

pub mod domain;
pub mod ports;
