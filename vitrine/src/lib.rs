// SPDX-License-Identifier: AGPL-3.0-or-later

//! # vitrine
//!
//! Data and RPC backend for a content-and-commerce web application: articles, a service catalog,
//! client requests, user profiles, portfolio entries and changelogs.
//!
//! Every collection is listed through the same cursor-based pagination protocol. Clients send
//! `{ limit, cursor, sort, sortDir, ...filters }` and receive `{ items, nextCur }`, where
//! `nextCur` is passed back as `cursor` to continue with the next page.
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

pub mod collections;
mod config;
mod context;
pub mod db;
pub mod http;
pub mod listing;
mod manager;
pub mod mutation;
mod node;

#[cfg(test)]
mod test_utils;

pub use crate::config::Configuration;
pub use node::Node;
