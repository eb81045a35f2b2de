// SPDX-License-Identifier: AGPL-3.0-or-later

//! Abstract list queries: which rows to select (filters), how to order them and where to resume
//! (pagination).
pub mod errors;
mod field;
mod filter;
mod order;
mod pagination;
mod validate;

pub use field::{find_column, Column, ColumnType, Value, PRIMARY_KEY};
pub use filter::{Filter, FilterBy, FilterSetting, LowerBound, UpperBound};
pub use order::{Direction, Order};
pub use pagination::{Page, Pagination, RowCursor, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use validate::{validate_filter, validate_order, validate_query};
