//! # Oracle
//!
//! Boundary to the external reasoning service.
//!
//! Every call goes through [`OracleGateway::decide`], which bounds the call
//! with a timeout, checks the answer against the role's typed contract and
//! substitutes the role's fallback on any failure. Callers always get a value.
//!
//! Backends:
//! - [`StubOracle`]: deterministic offline answers derived from the context
//! - `HttpOracle` (feature `http-oracle`): POSTs to a remote agent gateway

mod backend;
mod gateway;
#[cfg(feature = "http-oracle")]
mod http;
mod roles;
mod stub;

pub use backend::OracleBackend;
pub use gateway::{Decision, OracleGateway};
#[cfg(feature = "http-oracle")]
pub use http::HttpOracle;
pub use roles::RoleTable;
pub use stub::StubOracle;
