// SPDX-License-Identifier: AGPL-3.0-or-later

//! This module offers a query API to find many rows of a collection, filtered and sorted by
//! custom parameters. The results are batched via cursor-based pagination.
use log::debug;
use sqlx::any::AnyArguments;
use sqlx::query::QueryAs;
use sqlx::{query_as, Any, Decode, Type};

use crate::db::errors::StorageError;
use crate::db::query::errors::QueryError;
use crate::db::query::{
    find_column, validate_filter, validate_query, ColumnType, Filter, FilterBy, FilterSetting,
    LowerBound, Order, Page, Pagination, RowCursor, UpperBound, Value, PRIMARY_KEY,
};
use crate::db::traits::{Collection, Identifiable};
use crate::db::{Pool, SqlStore};

/// Query configuration to determine pagination cursor, filters and order of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub pagination: Pagination,
    pub filter: Filter,
    pub order: Order,
}

impl Query {
    pub fn new(pagination: &Pagination, filter: &Filter, order: &Order) -> Self {
        Self {
            pagination: pagination.clone(),
            filter: filter.clone(),
            order: order.clone(),
        }
    }
}

/// Helper method to bind untrusted arguments to a sqlx `QueryAs` instance.
pub(crate) fn bind_to_query<'q, O>(
    mut query: QueryAs<'q, Any, O, AnyArguments<'q>>,
    args: &[Value],
) -> QueryAs<'q, Any, O, AnyArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<String>),
            Value::Boolean(value) => query.bind(*value),
            Value::Integer(value) => query.bind(*value),
            Value::Float(value) => query.bind(*value),
            Value::String(value) => query.bind(value.clone()),
        };
    }

    query
}

/// Escapes wildcard characters of `LIKE` patterns, searches always match literally.
fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len());

    for character in search.chars() {
        if matches!(character, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

/// Helper method to convert filter settings into SQL comparison operations.
///
/// Returns the SQL comparison string and adds binding arguments to the mutable array we pass into
/// this function.
fn cmp_sql(sql_field: &str, filter_setting: &FilterSetting, args: &mut Vec<Value>) -> String {
    match &filter_setting.by {
        FilterBy::Element(value) => {
            args.push(value.to_owned());

            if !filter_setting.exclusive {
                format!("{sql_field} = ${}", args.len())
            } else {
                format!("{sql_field} != ${}", args.len())
            }
        }
        FilterBy::Set(values_vec) => {
            // An empty set matches nothing, its negation everything
            if values_vec.is_empty() {
                return if !filter_setting.exclusive {
                    "1 = 0".to_string()
                } else {
                    "1 = 1".to_string()
                };
            }

            let args_sql = values_vec
                .iter()
                .map(|value| {
                    args.push(value.to_owned());
                    format!("${}", args.len())
                })
                .collect::<Vec<String>>()
                .join(",");

            if !filter_setting.exclusive {
                format!("{sql_field} IN ({})", args_sql)
            } else {
                format!("{sql_field} NOT IN ({})", args_sql)
            }
        }
        FilterBy::Interval(lower_value, upper_value) => {
            let mut values: Vec<String> = Vec::new();

            match lower_value {
                LowerBound::Unbounded => (),
                LowerBound::Greater(value) => {
                    args.push(value.to_owned());
                    values.push(format!("{sql_field} > ${}", args.len()));
                }
                LowerBound::GreaterEqual(value) => {
                    args.push(value.to_owned());
                    values.push(format!("{sql_field} >= ${}", args.len()));
                }
            }

            match upper_value {
                UpperBound::Unbounded => (),
                UpperBound::Lower(value) => {
                    args.push(value.to_owned());
                    values.push(format!("{sql_field} < ${}", args.len()));
                }
                UpperBound::LowerEqual(value) => {
                    args.push(value.to_owned());
                    values.push(format!("{sql_field} <= ${}", args.len()));
                }
            }

            if values.is_empty() {
                "1 = 1".to_string()
            } else {
                values.join(" AND ")
            }
        }
        FilterBy::Contains(value) => {
            let search = match value {
                Value::String(value) => escape_like(value),
                // Validation made sure that only strings are searched for
                _ => String::new(),
            };
            args.push(Value::String(format!("%{search}%")));

            format!("{sql_field} LIKE ${} ESCAPE '\\'", args.len())
        }
    }
}

/// Returns SQL to filter rows.
///
/// Since filters are the only place which can contain untrusted user values we are building the
/// SQL query with positional arguments and bind the values to them. This helps sanitization of all
/// values and prevents potential SQL injection attacks. Field names were validated against the
/// static column list of the collection before.
fn where_filter_sql<'a>(
    settings: impl Iterator<Item = &'a FilterSetting>,
    args: &mut Vec<Value>,
) -> String {
    settings
        .map(|setting| format!("AND {}", cmp_sql(&setting.field, setting, args)))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Select one value from the database, decoded as the given type.
async fn fetch_scalar<T>(pool: &Pool, sql: &str, args: &[Value]) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
{
    let query = bind_to_query(query_as::<_, (T,)>(sql), args);
    let row = query.fetch_optional(pool).await?;
    Ok(row.map(|(value,)| value))
}

/// Generate SQL for cursor-based pagination.
///
/// Read more about cursor-based pagination here:
/// https://brunoscheufler.com/blog/2022-01-01-paginating-large-ordered-datasets-with-cursor-based-pagination
///
/// ## Cursors
///
/// The cursor holds the primary key of the first row of the next page, this is the row which got
/// cut off from the previous page as we always query one row more than requested. The next page
/// starts _at_ this row.
///
/// ## Ordering
///
/// Rows are ordered by the chosen field and then by their primary key, ascending. The primary key
/// acts as a tie-breaker for rows sharing the same value in the ordered field, without it rows
/// could be skipped or repeated across pages:
///
/// ```text
/// ---------------------
/// id | purchases
/// ---------------------
/// 4  | 12
/// 2  | 9
/// 7  | 9    <--- Cursor
/// 9  | 9
/// 1  | 3
/// ---------------------
/// ```
///
/// -> Select "purchases" value of the row the cursor points at (9)
/// -> Show rows with purchases < 9, or purchases = 9 and id >= 7
///
/// ## Pre-Queries
///
/// This method is async as it does a smaller "pre" SQL query before the "main" query to look up the
/// ordered value of the row the cursor points at. The pre-query applies the same filters as the
/// main query, a cursor pointing at a row outside of the queried scope is rejected.
async fn where_pagination_sql<C: Collection>(
    pool: &Pool,
    bind_args: &mut Vec<Value>,
    pagination: &Pagination,
    settings: &[&FilterSetting],
    order: &Order,
) -> Result<String, StorageError> {
    // No pagination cursor was given
    let cursor = match pagination.after {
        Some(cursor) => cursor,
        None => return Ok("".to_string()),
    };

    let cmp_value = cursor_value::<C>(pool, cursor, settings, order).await?;

    let field = &order.field;
    let cmp_direction = order.direction.cmp_sql();

    // The returned value is added to the bindable arguments array since this is untrusted user
    // content
    bind_args.push(cmp_value);
    let value_marker = format!("${}", bind_args.len());
    bind_args.push(Value::Integer(cursor.row_id()));
    let cursor_marker = format!("${}", bind_args.len());

    Ok(format!(
        r#"
        AND (
            {field} {cmp_direction} {value_marker}
            OR
            (
                {field} = {value_marker}
                AND
                    {PRIMARY_KEY} >= {cursor_marker}
            )
        )
        "#
    ))
}

/// Look up the value of the ordered field of the row the cursor points at.
async fn cursor_value<C: Collection>(
    pool: &Pool,
    cursor: RowCursor,
    settings: &[&FilterSetting],
    order: &Order,
) -> Result<Value, StorageError> {
    let column_type = find_column(C::COLUMNS, &order.field)
        .map(|column| column.column_type)
        .ok_or_else(|| QueryError::OrderFieldUnknown(order.field.clone()))?;

    let mut args = Vec::new();
    let and_filters = where_filter_sql(settings.iter().copied(), &mut args);
    args.push(Value::Integer(cursor.row_id()));

    let cmp_value_pre = format!(
        r#"
        SELECT
            {field}
        FROM
            {table}
        WHERE
            {PRIMARY_KEY} = ${cursor_marker}
            {and_filters}
        LIMIT 1
        "#,
        field = order.field,
        table = C::TABLE,
        cursor_marker = args.len(),
    );

    let value = match column_type {
        ColumnType::Integer => fetch_scalar::<i64>(pool, &cmp_value_pre, &args)
            .await?
            .map(Value::Integer),
        ColumnType::Float => fetch_scalar::<f64>(pool, &cmp_value_pre, &args)
            .await?
            .map(Value::Float),
        ColumnType::String => fetch_scalar::<String>(pool, &cmp_value_pre, &args)
            .await?
            .map(Value::String),
        ColumnType::Boolean => fetch_scalar::<bool>(pool, &cmp_value_pre, &args)
            .await?
            .map(Value::Boolean),
    };

    value.ok_or_else(|| QueryError::CursorStale(cursor.row_id()).into())
}

fn order_sql(order: &Order) -> String {
    let custom = format!("{} {}", order.field, order.direction.as_sql());

    // On top we sort always by the unique primary key in case the previous order value is equal
    // between two rows
    if order.field == PRIMARY_KEY {
        format!("ORDER BY {custom}")
    } else {
        format!("ORDER BY {custom}, {PRIMARY_KEY} ASC")
    }
}

fn limit_sql(pagination: &Pagination) -> (u64, String) {
    let page_size = pagination.first.get();

    // ... and add + 1 for the "has next page" flag
    (page_size, format!("LIMIT {page_size} + 1"))
}

pub(crate) fn select_sql<C: Collection>() -> String {
    C::COLUMNS
        .iter()
        .map(|column| column.name)
        .collect::<Vec<&str>>()
        .join(", ")
}

impl SqlStore {
    /// Returns one page of rows from a collection, filtered and ordered by custom parameters.
    ///
    /// The optional `scope` is a filter set by the caller (not the client), for example to
    /// restrict results to rows owned by a certain user. It is applied in addition to the client's
    /// filter and never merged with it.
    ///
    /// The query is validated before the database is touched. Unknown or non-sortable ordering
    /// fields as well as invalid filters are rejected with a validation error.
    pub async fn query<C: Collection>(
        &self,
        args: &Query,
        scope: Option<&Filter>,
    ) -> Result<Page<C::Row>, StorageError> {
        validate_query(&args.filter, &args.order, C::COLUMNS)?;
        if let Some(scope) = scope {
            validate_filter(scope, C::COLUMNS)?;
        }

        let settings: Vec<&FilterSetting> = args
            .filter
            .iter()
            .chain(scope.into_iter().flat_map(|scope| scope.iter()))
            .collect();

        let select = select_sql::<C>();
        let table = C::TABLE;

        let mut bind_args: Vec<Value> = Vec::new();
        let and_filters = where_filter_sql(settings.iter().copied(), &mut bind_args);
        let and_pagination = where_pagination_sql::<C>(
            &self.pool,
            &mut bind_args,
            &args.pagination,
            &settings,
            &args.order,
        )
        .await?;

        let order = order_sql(&args.order);
        let (page_size, limit) = limit_sql(&args.pagination);

        let sql = format!(
            r#"
            SELECT
                {select}

            FROM
                {table}

            WHERE
                1 = 1

                -- Filter the data by custom parameters and the caller's scope
                {and_filters}

                -- Lastly we batch all results into smaller chunks via cursor pagination
                {and_pagination}

            -- User-defined ordering with the primary key as tie-breaker
            {order}

            -- Connected to cursor pagination we limit the number of rows
            {limit}
            "#
        );

        let query = bind_to_query(query_as::<_, C::Row>(&sql), &bind_args);
        let mut rows: Vec<C::Row> = query.fetch_all(&self.pool).await?;

        // We always query one more row than needed to find out if there's more data. The removed
        // row is the first one of the next page
        let next_cursor = if rows.len() as u64 > page_size {
            rows.pop().map(|row| RowCursor::new(row.id()))
        } else {
            None
        };

        debug!(
            "Queried {} {} ordered by {} {}, next cursor {:?}",
            rows.len(),
            C::NAME,
            args.order.field,
            args.order.direction.as_sql(),
            next_cursor
        );

        Ok(Page {
            items: rows,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use rstest::rstest;

    use crate::collections::{
        Article, ArticleRow, Request, RequestFilter, RequestRow, RequestStatus, Service,
        ServiceFields, ServiceRow,
    };
    use crate::db::errors::StorageError;
    use crate::db::query::errors::QueryError;
    use crate::db::query::{Direction, Filter, Order, Page, Pagination, RowCursor, Value};
    use crate::db::traits::{Collection, IntoFilter, WriteFields};
    use crate::db::SqlStore;
    use crate::test_utils::{
        add_articles, add_requests, add_services, add_user, test_runner, TestNode,
    };

    use super::{order_sql, Query};

    fn query(limit: u64, cursor: Option<i64>, field: &str, direction: Direction) -> Query {
        Query::new(
            &Pagination::new(
                NonZeroU64::new(limit).unwrap(),
                cursor.map(RowCursor::new).as_ref(),
            ),
            &Filter::new(),
            &Order::new(field, &direction),
        )
    }

    /// Fetch every page by following the cursors until the end is reached.
    async fn fetch_all_pages<C: Collection>(
        store: &SqlStore,
        args: &Query,
        scope: Option<&Filter>,
    ) -> Vec<Page<C::Row>> {
        let mut pages = Vec::new();
        let mut args = args.clone();

        loop {
            let page = store.query::<C>(&args, scope).await.unwrap();
            let next_cursor = page.next_cursor;
            pages.push(page);

            match next_cursor {
                Some(cursor) => args.pagination.after = Some(cursor),
                None => break,
            }

            assert!(pages.len() < 100, "Pagination did not terminate");
        }

        pages
    }

    fn ids<T, F: Fn(&T) -> i64>(rows: &[T], id: F) -> Vec<i64> {
        rows.iter().map(id).collect()
    }

    #[test]
    fn order_by_primary_key_only_once() {
        assert_eq!(
            order_sql(&Order::new("id", &Direction::Descending)),
            "ORDER BY id DESC"
        );
        assert_eq!(
            order_sql(&Order::new("purchases", &Direction::Ascending)),
            "ORDER BY purchases ASC, id ASC"
        );
    }

    #[rstest]
    #[case::unique_field_desc("id", Direction::Descending)]
    #[case::unique_field_asc("id", Direction::Ascending)]
    #[case::tied_field_desc("purchases", Direction::Descending)]
    #[case::tied_field_asc("purchases", Direction::Ascending)]
    #[case::tied_float_asc("price", Direction::Ascending)]
    #[case::string_field_asc("name", Direction::Ascending)]
    fn pages_have_no_gaps_and_no_duplicates(
        #[case] field: &'static str,
        #[case] direction: Direction,
    ) {
        test_runner(move |node: TestNode| async move {
            // Many services share the same number of purchases and the same price
            add_services(&node, 23).await;

            let everything = node
                .store
                .query::<Service>(&query(100, None, field, direction), None)
                .await
                .unwrap();
            assert_eq!(everything.items.len(), 23);
            assert!(everything.next_cursor.is_none());

            for limit in [1, 2, 3, 5, 10, 22, 23] {
                let first_page = query(limit, None, field, direction);
                let pages = fetch_all_pages::<Service>(&node.store, &first_page, None).await;

                let concatenated: Vec<ServiceRow> = pages
                    .into_iter()
                    .flat_map(|page| page.items.into_iter())
                    .collect();

                assert_eq!(
                    ids(&concatenated, |row| row.id),
                    ids(&everything.items, |row| row.id),
                    "Pages with limit {limit} differ from the full listing"
                );
            }
        });
    }

    #[rstest]
    fn limit_exactly_matches_remaining_rows() {
        test_runner(|node: TestNode| async move {
            add_articles(&node, 10).await;

            let page = node
                .store
                .query::<Article>(&query(10, None, "id", Direction::Ascending), None)
                .await
                .unwrap();

            assert_eq!(page.items.len(), 10);
            assert_eq!(page.next_cursor, None);
        });
    }

    #[rstest]
    fn one_more_row_than_limit() {
        test_runner(|node: TestNode| async move {
            let article_ids = add_articles(&node, 11).await;

            let first = node
                .store
                .query::<Article>(&query(10, None, "id", Direction::Ascending), None)
                .await
                .unwrap();

            assert_eq!(first.items.len(), 10);
            assert_eq!(first.next_cursor, Some(RowCursor::new(article_ids[10])));

            let second = node
                .store
                .query::<Article>(
                    &query(10, Some(article_ids[10]), "id", Direction::Ascending),
                    None,
                )
                .await
                .unwrap();

            assert_eq!(
                ids(&second.items, |row: &ArticleRow| row.id),
                vec![article_ids[10]]
            );
            assert_eq!(second.next_cursor, None);
        });
    }

    #[rstest]
    fn empty_collection() {
        test_runner(|node: TestNode| async move {
            let page = node
                .store
                .query::<Article>(&query(10, None, "created_at", Direction::Descending), None)
                .await
                .unwrap();

            assert_eq!(page, Page::empty());
        });
    }

    #[rstest]
    fn filters_restrict_results() {
        test_runner(|node: TestNode| async move {
            add_services(&node, 12).await;

            let mut filter = Filter::new();
            filter.add_in("category_id", &[1.into(), 2.into()]);
            filter.add_gte("price", &20.0.into());
            let args = Query::new(
                &Pagination::default(),
                &filter,
                &Order::new("price", &Direction::Ascending),
            );

            let rows: Vec<ServiceRow> = fetch_all_pages::<Service>(&node.store, &args, None)
                .await
                .into_iter()
                .flat_map(|page| page.items.into_iter())
                .collect();

            assert!(!rows.is_empty());
            for row in rows.iter() {
                assert!(row.category_id == 1 || row.category_id == 2);
                assert!(row.price >= 20.0);
            }
        });
    }

    #[rstest]
    fn search_matches_wildcards_literally() {
        test_runner(|node: TestNode| async move {
            add_services(&node, 4).await;

            let fields = ServiceFields {
                name: "50% off".into(),
                description: String::new(),
                category_id: 1,
                price: 10.0,
                purchases: 0,
            };
            let discounted = node
                .store
                .insert::<Service>(&fields.values())
                .await
                .unwrap();

            for (search, expected) in vec![("%", vec![discounted.id]), ("_", vec![])] {
                let mut filter = Filter::new();
                filter.add_contains("name", search);
                let page = node
                    .store
                    .query::<Service>(
                        &Query::new(
                            &Pagination::default(),
                            &filter,
                            &Order::new("id", &Direction::Ascending),
                        ),
                        None,
                    )
                    .await
                    .unwrap();

                assert_eq!(ids(&page.items, |row: &ServiceRow| row.id), expected);
            }
        });
    }

    #[rstest]
    fn exclude_request_states() {
        test_runner(|node: TestNode| async move {
            let panda = add_user(&node, "panda").await;
            let request_ids = add_requests(&node, panda, 4).await;
            let done = [("status", Value::from(RequestStatus::Done.as_str()))];
            node.store
                .update::<Request>(request_ids[1], &done)
                .await
                .unwrap();

            let filter = RequestFilter {
                exclude_statuses: vec![RequestStatus::Done],
                ..RequestFilter::default()
            };
            let page = node
                .store
                .query::<Request>(
                    &Query::new(
                        &Pagination::default(),
                        &filter.into_filter(),
                        &Order::new("id", &Direction::Ascending),
                    ),
                    None,
                )
                .await
                .unwrap();

            assert_eq!(
                ids(&page.items, |row: &RequestRow| row.id),
                vec![request_ids[0], request_ids[2], request_ids[3]]
            );
        });
    }

    #[rstest]
    fn scopes_isolate_owners() {
        test_runner(|node: TestNode| async move {
            let penguin = add_user(&node, "penguin").await;
            let panda = add_user(&node, "panda").await;
            let penguin_requests = add_requests(&node, penguin, 7).await;
            let panda_requests = add_requests(&node, panda, 5).await;

            let mut penguin_scope = Filter::new();
            penguin_scope.add("user_id", &penguin.into());

            let pages = fetch_all_pages::<Request>(
                &node.store,
                &query(2, None, "created_at", Direction::Descending),
                Some(&penguin_scope),
            )
            .await;

            let mut seen: Vec<i64> = pages
                .iter()
                .flat_map(|page| page.items.iter().map(|row: &RequestRow| row.id))
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, penguin_requests);

            // A client can't even resume with a cursor pointing into another scope
            for foreign_id in panda_requests {
                let result = node
                    .store
                    .query::<Request>(
                        &query(2, Some(foreign_id), "created_at", Direction::Descending),
                        Some(&penguin_scope),
                    )
                    .await;

                assert!(matches!(
                    result,
                    Err(StorageError::Validation(QueryError::CursorStale(id))) if id == foreign_id
                ));
            }

            // Filters by the client can't widen the scope
            let mut filter = Filter::new();
            filter.add("user_id", &panda.into());
            let page = node
                .store
                .query::<Request>(
                    &Query::new(
                        &Pagination::default(),
                        &filter,
                        &Order::new("id", &Direction::Ascending),
                    ),
                    Some(&penguin_scope),
                )
                .await
                .unwrap();
            assert!(page.items.is_empty());
        });
    }

    #[rstest]
    fn reject_unknown_sort_field_before_querying() {
        test_runner(|node: TestNode| async move {
            // Close the pool, any query reaching the database would fail with a storage error
            node.store.pool.close().await;

            let result = node
                .store
                .query::<Service>(
                    &query(10, None, "purchases; DROP TABLE services", Direction::Ascending),
                    None,
                )
                .await;

            assert!(matches!(
                result,
                Err(StorageError::Validation(QueryError::OrderFieldUnknown(_)))
            ));

            let result = node
                .store
                .query::<Service>(&query(10, None, "description", Direction::Ascending), None)
                .await;

            assert!(matches!(
                result,
                Err(StorageError::Validation(QueryError::OrderFieldNotSortable(_)))
            ));

            // Valid queries do reach the closed pool
            let result = node
                .store
                .query::<Service>(&query(10, None, "id", Direction::Ascending), None)
                .await;

            assert!(matches!(result, Err(StorageError::FatalStorageError(_))));
        });
    }
}
