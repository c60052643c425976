//! Database driver implementations.
//!
//! Each driver implements the capability traits from [`crate::core::traits`]
//! for one engine: a [`Connector`](crate::core::traits::Connector) plus a
//! connection type that is both a catalog reader and a statement executor.

pub mod firebird;

pub use firebird::{firebird_classifier, FirebirdConnection, FirebirdConnector};
