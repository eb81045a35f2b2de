// SPDX-License-Identifier: AGPL-3.0-or-later

//! Implementations of all list and write queries on top of `SqlStore`.
mod query;
mod write;

pub use query::Query;
