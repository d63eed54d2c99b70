//! skill-suggest: suggest skills for a job role.
//!
//! A curated role -> skills table is consulted first; nearest-neighbor search
//! over skill-name embeddings fills whatever the table leaves open. The
//! embedding index is an immutable snapshot replaced atomically on refresh,
//! so searches never block on a rebuild.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod mapping;
pub mod search;
pub mod test_utils;

pub use error::{Result, SuggestError};
