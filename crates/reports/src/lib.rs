//! Read-only reports over cart lines and products.
//!
//! This crate provides the query side of the service:
//! - [`ReportService`] for cart listings, status lookups and totals
//! - [`CartLineView`] joining a line with its product and owner summary
//! - [`TopSeller`] for the most frequently purchased product
//!
//! Reports never mutate the store.

pub mod error;
pub mod service;
pub mod views;

pub use error::{ReportError, Result};
pub use service::ReportService;
pub use views::{CartLineView, TopSeller};
