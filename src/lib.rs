//! District-wise waste management dashboards for Madhya Pradesh.
//!
//! The sheet and boundary file are loaded once into a [`DataContext`]; each
//! selection is turned into a [`Payloads`] set by the pure functions in
//! [`binder`]. The terminal map (`waste-map`) and the web dropdown
//! (`waste-web`) are thin shells over that.

pub mod binder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod web;

pub use binder::{bind, Payloads, Selection, Variant};
pub use config::Config;
pub use dataset::DataContext;
pub use error::{BindError, LoadError};
