//! Argo BGC+ profile ingest service.
//!
//! Reads float profile exports, cleans each profile position, classifies it
//! into an ocean basin, and upserts the resulting documents into PostgreSQL.
//!
//! - `geolocation`: raw position cleaning (`CoordinateNormalizer`).
//! - `basin`      : basin grid and nearest-valid-basin resolution.
//! - `geodesic`   : great-circle distance used to rank neighbor cells.
//! - `ingest`     : float file parsing and document assembly.
//! - `db`         : PostgreSQL upserts and summary queries.
//! - `summaries`  : data-key and rate-limiter summary documents.

pub mod basin;
pub mod config;
pub mod db;
pub mod geodesic;
pub mod geolocation;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod summaries;
