//! # Khwater Core
//!
//! Pure logic for the Khwater reader: the content model, block-order
//! resolution, the search index, query ranking, and result grouping.
//!
//! This crate performs no filesystem I/O and no logging. Data arrives
//! through the [`source::CorpusSource`] trait; the application crate owns
//! files, configuration, caching, and transport.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Items, content types, order tags |
//! | [`render`] | Resolve an item into ordered display blocks |
//! | [`corpus`] | Chapter collection, lookups, on-disk document shapes |
//! | [`index`] | Flatten items into search index entries |
//! | [`search`] | Tokenize queries and rank index entries |
//! | [`aggregate`] | Group ranked hits by chapter |
//! | [`highlight`] | Mark query terms in display text |
//! | [`audit`] | Ordering diagnostics and migration coverage |
//! | [`source`] | Corpus source trait and in-memory implementation |

pub mod aggregate;
pub mod audit;
pub mod corpus;
pub mod highlight;
pub mod index;
pub mod models;
pub mod render;
pub mod search;
pub mod source;
