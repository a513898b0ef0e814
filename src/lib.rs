//! fieldsales - terminal administration for the field-sales backend
//!
//! This library lets an administrator browse and change the records held by
//! the field-sales REST backend (visits, machines, documents, service
//! requests, call logs, weekly reports, quotations), add records in bulk,
//! and produce spreadsheet and PDF exports of them.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings, paths and the encrypted token store
//! - `error`: Custom error types
//! - `models`: Typed records, data types and column specs
//! - `api`: HTTP client, response decoding and the list cache
//! - `export`: Field resolution, grouping and workbook rendering
//! - `reports`: Page layout and PDF rendering of printable reports
//! - `services`: Export, bulk and report workflows
//! - `audit`: Local log of mutations
//! - `display`: Terminal output
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use fieldsales::api::ApiClient;
//! use fieldsales::config::{FieldSalesPaths, Settings};
//! use fieldsales::services::ExportService;
//!
//! let paths = FieldSalesPaths::new()?;
//! let settings = Settings::load_with_env(&paths)?;
//! let client = ApiClient::from_settings(&settings, settings.env_token.clone())?;
//! let outcome = ExportService::new(&client, Default::default()).build(&request).await?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;

pub use error::{FieldSalesError, FieldSalesResult};
