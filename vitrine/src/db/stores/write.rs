// SPDX-License-Identifier: AGPL-3.0-or-later

//! Single-row writes. Every method touches exactly one row and the last write wins.
use log::debug;
use sqlx::query_as;

use crate::db::errors::StorageError;
use crate::db::query::errors::QueryError;
use crate::db::query::{find_column, Value, PRIMARY_KEY};
use crate::db::stores::query::{bind_to_query, select_sql};
use crate::db::traits::Collection;
use crate::db::SqlStore;

/// Make sure we only ever write identifiers into SQL which are known columns of the collection.
fn validate_columns<C: Collection>(values: &[(&str, Value)]) -> Result<(), QueryError> {
    for (name, _) in values {
        if *name == PRIMARY_KEY || find_column(C::COLUMNS, name).is_none() {
            return Err(QueryError::FilterFieldUnknown(name.to_string()));
        }
    }

    Ok(())
}

impl SqlStore {
    /// Returns the row with the given primary key.
    pub async fn get<C: Collection>(&self, id: i64) -> Result<Option<C::Row>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {PRIMARY_KEY} = $1",
            select_sql::<C>(),
            C::TABLE
        );

        let row = query_as::<_, C::Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Inserts a new row and returns it as stored, including its generated primary key and all
    /// database defaults.
    pub async fn insert<C: Collection>(
        &self,
        values: &[(&str, Value)],
    ) -> Result<C::Row, StorageError> {
        validate_columns::<C>(values)?;

        let sql = if values.is_empty() {
            format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {PRIMARY_KEY}",
                C::TABLE
            )
        } else {
            let columns = values
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<&str>>()
                .join(", ");

            let markers = (1..=values.len())
                .map(|index| format!("${index}"))
                .collect::<Vec<String>>()
                .join(", ");

            format!(
                "INSERT INTO {} ({columns}) VALUES ({markers}) RETURNING {PRIMARY_KEY}",
                C::TABLE
            )
        };

        let args: Vec<Value> = values.iter().map(|(_, value)| value.clone()).collect();
        let (id,) = bind_to_query(query_as::<_, (i64,)>(&sql), &args)
            .fetch_one(&self.pool)
            .await?;

        debug!("Inserted row {id} into {}", C::NAME);

        // Values returned by `RETURNING` carry the storage class of the value instead of the
        // declared column type, whole numbers in REAL columns would come back as integers
        self.get::<C>(id)
            .await?
            .ok_or_else(|| StorageError::FatalStorageError(format!("Inserted row {id} is gone")))
    }

    /// Overwrites the given columns of an existing row.
    ///
    /// Returns `None` if no row with this primary key exists.
    pub async fn update<C: Collection>(
        &self,
        id: i64,
        values: &[(&str, Value)],
    ) -> Result<Option<C::Row>, StorageError> {
        validate_columns::<C>(values)?;

        if values.is_empty() {
            return self.get::<C>(id).await;
        }

        let mut args: Vec<Value> = Vec::new();
        let assignments = values
            .iter()
            .map(|(name, value)| {
                args.push(value.clone());
                format!("{name} = ${}", args.len())
            })
            .collect::<Vec<String>>()
            .join(", ");

        args.push(Value::Integer(id));
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {PRIMARY_KEY} = ${} RETURNING {PRIMARY_KEY}",
            C::TABLE,
            args.len(),
        );

        let updated = bind_to_query(query_as::<_, (i64,)>(&sql), &args)
            .fetch_optional(&self.pool)
            .await?;

        debug!("Updated row {id} in {}: {}", C::NAME, updated.is_some());

        match updated {
            Some(_) => self.get::<C>(id).await,
            None => Ok(None),
        }
    }

    /// Removes one row by its primary key.
    ///
    /// Returns `false` if no row with this primary key existed.
    pub async fn delete<C: Collection>(&self, id: i64) -> Result<bool, StorageError> {
        let sql = format!(
            "DELETE FROM {} WHERE {PRIMARY_KEY} = $1 RETURNING {PRIMARY_KEY}",
            C::TABLE
        );

        let deleted = query_as::<_, (i64,)>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        debug!("Deleted row {id} from {}: {}", C::NAME, deleted.is_some());

        Ok(deleted.is_some())
    }

    /// Returns the owner of a row in collections with an owner column.
    ///
    /// The outer `Option` is `None` when the row does not exist, the inner one when the row or the
    /// collection has no owner.
    pub async fn owner_of<C: Collection>(
        &self,
        id: i64,
    ) -> Result<Option<Option<i64>>, StorageError> {
        let owner_column = match C::OWNER_COLUMN {
            Some(column) => column,
            None => {
                let exists = self.get::<C>(id).await?.is_some();
                return Ok(exists.then_some(None));
            }
        };

        let sql = format!(
            "SELECT {owner_column} FROM {} WHERE {PRIMARY_KEY} = $1",
            C::TABLE
        );

        let owner = query_as::<_, (Option<i64>,)>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner.map(|(owner,)| owner))
    }
}
