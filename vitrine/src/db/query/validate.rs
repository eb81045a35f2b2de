// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::db::query::errors::QueryError;
use crate::db::query::{
    find_column, Column, ColumnType, Filter, FilterBy, LowerBound, Order, UpperBound, Value,
};

fn validate_type(
    field_name: &str,
    value: &Value,
    column_type: ColumnType,
) -> Result<(), QueryError> {
    if !value.matches(column_type) {
        return Err(QueryError::FilterInvalidType(
            value
                .column_type()
                .map_or("null".to_string(), |column_type| column_type.to_string()),
            field_name.to_string(),
            column_type.to_string(),
        ));
    }

    Ok(())
}

/// Checks the sort field against the allow-list of the given columns.
pub fn validate_order(order: &Order, columns: &[Column]) -> Result<(), QueryError> {
    match find_column(columns, &order.field) {
        None => Err(QueryError::OrderFieldUnknown(order.field.clone())),
        Some(column) if !column.sortable => {
            Err(QueryError::OrderFieldNotSortable(order.field.clone()))
        }
        Some(_) => Ok(()),
    }
}

/// Checks that every filtered field exists and that the filter values match the column types.
pub fn validate_filter(filter: &Filter, columns: &[Column]) -> Result<(), QueryError> {
    for setting in filter.iter() {
        let field_name = setting.field.as_str();
        let column_type = find_column(columns, field_name)
            .ok_or_else(|| QueryError::FilterFieldUnknown(field_name.to_string()))?
            .column_type;

        match (&setting.by, column_type) {
            (FilterBy::Element(element), _) => {
                validate_type(field_name, element, column_type)?;
            }

            // Filtering over multiple boolean values is never useful
            (FilterBy::Set(_), ColumnType::Boolean) => {
                return Err(QueryError::FilterInvalidSet(field_name.to_string()));
            }
            (FilterBy::Set(elements), _) => {
                for element in elements {
                    validate_type(field_name, element, column_type)?;
                }
            }

            (FilterBy::Interval(_, _), ColumnType::Boolean) => {
                return Err(QueryError::FilterInvalidInterval(field_name.to_string()));
            }
            (FilterBy::Interval(lower, upper), _) => {
                if let LowerBound::Greater(value) | LowerBound::GreaterEqual(value) = lower {
                    validate_type(field_name, value, column_type)?;
                }

                if let UpperBound::Lower(value) | UpperBound::LowerEqual(value) = upper {
                    validate_type(field_name, value, column_type)?;
                }
            }

            (FilterBy::Contains(value), ColumnType::String) => {
                validate_type(field_name, value, column_type)?;
            }
            (FilterBy::Contains(_), _) => {
                return Err(QueryError::FilterInvalidSearch(field_name.to_string()));
            }
        }
    }

    Ok(())
}

/// Validates ordering and filters of a query against the columns of a collection.
pub fn validate_query(
    filter: &Filter,
    order: &Order,
    columns: &[Column],
) -> Result<(), QueryError> {
    validate_order(order, columns)?;
    validate_filter(filter, columns)?;
    Ok(())
}
