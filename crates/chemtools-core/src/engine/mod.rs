//! # Engine Module
//!
//! The stateful layer that turns a catalogue of tools into a navigable application.
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]) - Ordered category → tool descriptors with init closures
//! - **Content Region** ([`container`]) - Holds one mounted panel, tracks load generations and
//!   discards stale completions
//! - **Panels** ([`panel`]) - The trait tools implement plus the inspectable view model
//! - **Navigation** ([`navigator`]) - Tab strip, tool row and the selection state machine
//! - **Deep Links** ([`deeplink`]) - `category`/`tool` from query strings or hash fragments
//! - **External Loads** ([`embed`]) - Script fetching, de-duplication and settling of requests
//! - **Configuration** ([`config`]) - Embed URLs, viewer defaults and the species table
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod container;
pub mod deeplink;
pub mod embed;
pub mod error;
pub mod navigator;
pub mod panel;
pub mod registry;
