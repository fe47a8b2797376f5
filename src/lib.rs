//! # Khwater
//!
//! Backend for the Khwater reader: loads chapters of block-structured
//! Arabic content, resolves each item into its reading order, and serves
//! weighted full-text search over the corpus through a CLI and a JSON
//! HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │  JSON data  │──▶│   FsSource   │──▶│ Library snapshot │
//! │ file or dir │   │   (loader)   │   │ corpus + index   │
//! └─────────────┘   └──────────────┘   └────────┬─────────┘
//!                                               │
//!                            ┌──────────────────┤
//!                            ▼                  ▼
//!                       ┌──────────┐       ┌──────────┐
//!                       │   CLI    │       │   HTTP   │
//!                       │(khwater) │       │  (axum)  │
//!                       └──────────┘       └──────────┘
//! ```
//!
//! The content model, resolver, index, ranking, and grouping live in
//! [`khwater_core`]; this crate adds files, configuration, caching, and
//! transport.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`loader`] | Filesystem corpus source |
//! | [`library`] | Build-once corpus and index cache with rebuild |
//! | [`chapters`] | Chapter listing and rendering commands |
//! | [`search`] | Search command |
//! | [`check`] | Corpus ordering audit command |
//! | [`server`] | HTTP server |

pub mod chapters;
pub mod check;
pub mod config;
pub mod library;
pub mod loader;
pub mod search;
pub mod server;
