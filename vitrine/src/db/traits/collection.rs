// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::FromRow;

use crate::db::query::{Column, Filter, Value};

/// Rows which can be identified by their primary key.
pub trait Identifiable {
    /// Returns the primary key of this row.
    fn id(&self) -> i64;
}

/// Typed, collection-specific filter settings sent by clients.
pub trait IntoFilter {
    /// Converts the typed settings into a generic filter over the collection's columns.
    fn into_filter(self) -> Filter;
}

/// Typed field values used to create or update a row.
pub trait WriteFields {
    /// Checks the values before anything gets written, returns a human-readable reason if they
    /// are not acceptable.
    fn validate(&self) -> Result<(), String>;

    /// Returns the columns and values to write.
    ///
    /// The primary key and the owner column are never part of this list, they are managed by the
    /// store.
    fn values(&self) -> Vec<(&'static str, Value)>;
}

/// A table of rows which can be listed with cursor-based pagination and mutated row by row.
///
/// Implementations are pure descriptions: the generic query and mutation code in
/// [`SqlStore`](crate::db::SqlStore) takes care of everything else.
pub trait Collection: Send + Sync + 'static {
    /// Name used to address this collection in RPC routes.
    const NAME: &'static str;

    /// Name of the database table.
    const TABLE: &'static str;

    /// All columns of the table, including the primary key.
    ///
    /// Columns flagged as sortable form the allow-list for ordering.
    const COLUMNS: &'static [Column];

    /// Column to order by when the client did not choose one.
    const DEFAULT_SORT: &'static str;

    /// Column holding the id of the user owning a row, if rows of this collection have owners.
    const OWNER_COLUMN: Option<&'static str> = None;

    /// Columns only admins can write. Values for them sent by anybody else are dropped.
    const ADMIN_COLUMNS: &'static [&'static str] = &[];

    /// Rows of restricted collections can only be listed by admins.
    const RESTRICTED: bool = false;

    /// Row returned by list and write operations.
    type Row: for<'r> FromRow<'r, AnyRow>
        + Identifiable
        + Serialize
        + Clone
        + Send
        + Sync
        + Unpin
        + 'static;

    /// Typed filter settings clients can send with list requests.
    type Filter: IntoFilter + DeserializeOwned + Default + Send + 'static;

    /// Typed values clients can send to create or update rows.
    type Fields: WriteFields + DeserializeOwned + Send + Sync + 'static;
}
