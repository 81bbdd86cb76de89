//! # AIDE Client
//!
//! Client for the AIDE documentation search backend: pick a project, upload
//! documents, ask questions, inspect ranked sources, and download the
//! original document behind a source.
//!
//! ## Architecture
//!
//! ```text
//!  user action ──▶ SessionState ──▶ workflow ──▶ Backend ──▶ HTTP
//!        ▲                                         │
//!        └────────── render ◀── SessionState ◀─────┘
//! ```
//!
//! The base URL is resolved once when the [`session::Session`] is created.
//! Each workflow fences its own requests so a slow, superseded response
//! never overwrites a newer one.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and `AIDE_API_URL` override |
//! | [`endpoint`] | Base URL resolution and URL joining |
//! | [`client`] | `reqwest` implementation of the backend contract |
//! | [`error`] | Normalized request failures |
//! | [`models`] | Wire types and upload file handle |
//! | [`traits`] | `Backend` and `DownloadSink` seams |
//! | [`state`] | View state, notices, request tickets |
//! | [`session`] | Session construction and shared state |
//! | [`query`] | Ask and search-only workflows |
//! | [`upload`] | Upload workflow |
//! | [`retrieve`] | Document retrieval workflow |
//! | [`download`] | Content-disposition parsing and directory sink |
//! | [`render`] | Plain-text presentation |
//! | [`shell`] | Interactive shell |

pub mod client;
pub mod config;
pub mod download;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod query;
pub mod render;
pub mod retrieve;
pub mod session;
pub mod shell;
pub mod state;
pub mod traits;
pub mod upload;
