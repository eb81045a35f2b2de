// SPDX-License-Identifier: AGPL-3.0-or-later

//! Writes performed on behalf of an actor.
//!
//! Every operation checks the capabilities of the actor before the store is touched and reports
//! failures with one of a fixed set of [`ErrorKind`]s.
mod actor;
mod errors;

pub use actor::{ActorContext, Role};
pub use errors::{ErrorKind, MutationError};

use log::debug;

use crate::db::query::Value;
use crate::db::traits::{Collection, WriteFields};
use crate::db::SqlStore;

/// Create a new row or update an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<F> {
    Create(F),
    Update(i64, F),
}

impl<F> Upsert<F> {
    /// Returns an update when an id is given, a create otherwise.
    pub fn from_request(id: Option<i64>, fields: F) -> Self {
        match id {
            Some(id) => Upsert::Update(id, fields),
            None => Upsert::Create(fields),
        }
    }

    pub fn fields(&self) -> &F {
        match self {
            Upsert::Create(fields) | Upsert::Update(_, fields) => fields,
        }
    }
}

/// Returns the values of the fields this actor is allowed to write.
fn writable_values<C: Collection>(
    actor: &ActorContext,
    fields: &C::Fields,
) -> Vec<(&'static str, Value)> {
    let mut values = fields.values();

    if !actor.is_admin() {
        values.retain(|(name, _)| !C::ADMIN_COLUMNS.contains(name));
    }

    values
}

/// Make sure the actor may modify the given existing row.
async fn authorize_row<C: Collection>(
    store: &SqlStore,
    actor: &ActorContext,
    user_id: i64,
    id: i64,
) -> Result<(), MutationError> {
    if C::OWNER_COLUMN.is_none() {
        return if actor.is_admin() {
            Ok(())
        } else {
            Err(MutationError::Forbidden(C::NAME.to_string()))
        };
    }

    match store.owner_of::<C>(id).await? {
        None => Err(MutationError::NotFound(C::NAME, id)),
        Some(owner) if owner == Some(user_id) || actor.is_admin() => Ok(()),
        Some(_) => Err(MutationError::Forbidden(format!("{} row {id}", C::NAME))),
    }
}

/// Creates or updates a single row and returns it as stored.
///
/// Rows of collections without an owner can only be written by admins. In owned collections any
/// authenticated user can create rows, which are always owned by them. Existing rows can only be
/// updated by their owner or an admin. Columns reserved for admins keep their stored or default
/// value when anybody else writes.
pub async fn upsert<C: Collection>(
    store: &SqlStore,
    actor: &ActorContext,
    upsert: Upsert<C::Fields>,
) -> Result<C::Row, MutationError> {
    let user_id = actor.require_user()?;

    upsert
        .fields()
        .validate()
        .map_err(MutationError::InvalidFields)?;

    match upsert {
        Upsert::Create(fields) => {
            let mut values = writable_values::<C>(actor, &fields);

            match C::OWNER_COLUMN {
                Some(owner_column) => values.push((owner_column, Value::Integer(user_id))),
                None if !actor.is_admin() => {
                    return Err(MutationError::Forbidden(C::NAME.to_string()))
                }
                None => (),
            }

            let row = store.insert::<C>(&values).await?;
            debug!("User {user_id} created row in {}", C::NAME);
            Ok(row)
        }
        Upsert::Update(id, fields) => {
            authorize_row::<C>(store, actor, user_id, id).await?;

            let row = store
                .update::<C>(id, &writable_values::<C>(actor, &fields))
                .await?
                .ok_or(MutationError::NotFound(C::NAME, id))?;
            debug!("User {user_id} updated row {id} in {}", C::NAME);
            Ok(row)
        }
    }
}

/// Removes a single row, following the same rules as updates.
pub async fn delete<C: Collection>(
    store: &SqlStore,
    actor: &ActorContext,
    id: i64,
) -> Result<i64, MutationError> {
    let user_id = actor.require_user()?;

    authorize_row::<C>(store, actor, user_id, id).await?;

    if !store.delete::<C>(id).await? {
        return Err(MutationError::NotFound(C::NAME, id));
    }

    debug!("User {user_id} deleted row {id} from {}", C::NAME);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::collections::{
        Article, ArticleFields, Request, RequestFields, RequestStatus, Skill, SkillFields,
    };
    use crate::test_utils::{test_runner, TestNode};

    use super::{delete, upsert, ActorContext, ErrorKind, Role, Upsert};

    const OWNER: i64 = 1;
    const OTHER: i64 = 2;
    const ADMIN: i64 = 3;

    fn actor(name: &str) -> ActorContext {
        match name {
            "owner" => ActorContext::new(OWNER, &[Role::Client]),
            "other" => ActorContext::new(OTHER, &[Role::Client]),
            "admin" => ActorContext::new(ADMIN, &[Role::Admin]),
            _ => ActorContext::anonymous(),
        }
    }

    fn article() -> ArticleFields {
        ArticleFields {
            title: "Bamboo".into(),
            body: "All about it".into(),
            category_id: 1,
            author_id: None,
            published: false,
            views: 0,
        }
    }

    fn skill(level: i64) -> SkillFields {
        SkillFields {
            name: "Climbing".into(),
            level,
        }
    }

    #[test]
    fn upsert_from_request() {
        assert_eq!(Upsert::from_request(None, 1), Upsert::Create(1));
        assert_eq!(Upsert::from_request(Some(5), 1), Upsert::Update(5, 1));
    }

    #[rstest]
    #[case::admin("admin", None)]
    #[case::client("owner", Some(ErrorKind::Forbidden))]
    #[case::anonymous("anonymous", Some(ErrorKind::Unauthorized))]
    fn create_unowned(#[case] name: &'static str, #[case] expected: Option<ErrorKind>) {
        test_runner(move |node: TestNode| async move {
            let result =
                upsert::<Article>(&node.store, &actor(name), Upsert::Create(article())).await;
            assert_eq!(result.err().map(|err| err.kind()), expected);
        });
    }

    #[rstest]
    fn create_owned_rows_for_actor() {
        test_runner(|node: TestNode| async move {
            let row = upsert::<Skill>(&node.store, &actor("other"), Upsert::Create(skill(2)))
                .await
                .unwrap();
            assert_eq!(row.user_id, OTHER);

            let row = upsert::<Skill>(&node.store, &actor("admin"), Upsert::Create(skill(2)))
                .await
                .unwrap();
            assert_eq!(row.user_id, ADMIN);
        });
    }

    #[rstest]
    #[case::owner("owner", None)]
    #[case::admin("admin", None)]
    #[case::other("other", Some(ErrorKind::Forbidden))]
    #[case::anonymous("anonymous", Some(ErrorKind::Unauthorized))]
    fn update_and_delete_owned(#[case] name: &'static str, #[case] expected: Option<ErrorKind>) {
        test_runner(move |node: TestNode| async move {
            let created = upsert::<Skill>(&node.store, &actor("owner"), Upsert::Create(skill(2)))
                .await
                .unwrap();

            let result = upsert::<Skill>(
                &node.store,
                &actor(name),
                Upsert::Update(created.id, skill(4)),
            )
            .await;

            match &result {
                Ok(row) => {
                    assert_eq!(row.id, created.id);
                    assert_eq!(row.level, 4);
                    assert_eq!(row.user_id, OWNER);
                }
                Err(err) => assert_eq!(Some(err.kind()), expected),
            }
            assert_eq!(result.err().map(|err| err.kind()), expected);

            let result = delete::<Skill>(&node.store, &actor(name), created.id).await;
            assert_eq!(result.as_ref().err().map(|err| err.kind()), expected);

            let exists = node.store.get::<Skill>(created.id).await.unwrap().is_some();
            assert_eq!(exists, expected.is_some());
        });
    }

    #[rstest]
    fn missing_rows() {
        test_runner(|node: TestNode| async move {
            let update = Upsert::Update(42, skill(1));
            let result = upsert::<Skill>(&node.store, &actor("owner"), update).await;
            assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);

            let update = Upsert::Update(42, article());
            let result = upsert::<Article>(&node.store, &actor("admin"), update).await;
            assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);

            let result = delete::<Article>(&node.store, &actor("admin"), 42).await;
            assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        });
    }

    #[rstest]
    fn update_keeps_row_identity() {
        test_runner(|node: TestNode| async move {
            let created = upsert::<Article>(&node.store, &actor("admin"), Upsert::Create(article()))
                .await
                .unwrap();

            let mut fields = article();
            fields.title = "Bamboo, revisited".into();
            fields.published = true;

            let update = Upsert::Update(created.id, fields);
            let updated = upsert::<Article>(&node.store, &actor("admin"), update)
                .await
                .unwrap();

            assert_eq!(updated.id, created.id);
            assert_eq!(updated.title, "Bamboo, revisited");
            assert!(updated.published);
        });
    }

    #[rstest]
    fn only_admins_change_request_states() {
        test_runner(|node: TestNode| async move {
            let fields = |status| RequestFields {
                service_id: 1,
                status,
                message: "Please trim the hedge".into(),
            };

            let created = upsert::<Request>(
                &node.store,
                &actor("owner"),
                Upsert::Create(fields(RequestStatus::Done)),
            )
            .await
            .unwrap();
            assert_eq!(created.status, "new");

            let update = Upsert::Update(created.id, fields(RequestStatus::InProgress));
            let row = upsert::<Request>(&node.store, &actor("admin"), update)
                .await
                .unwrap();
            assert_eq!(row.status, "in_progress");

            // The owner can still change the message, but not the state
            let mut owner_fields = fields(RequestStatus::New);
            owner_fields.message = "Please trim the hedge and the lawn".into();
            let update = Upsert::Update(created.id, owner_fields);
            let row = upsert::<Request>(&node.store, &actor("owner"), update)
                .await
                .unwrap();
            assert_eq!(row.status, "in_progress");
            assert_eq!(row.message, "Please trim the hedge and the lawn");
        });
    }

    #[rstest]
    fn reject_invalid_fields_before_writing() {
        test_runner(|node: TestNode| async move {
            let result =
                upsert::<Skill>(&node.store, &actor("owner"), Upsert::Create(skill(0))).await;
            assert_eq!(result.unwrap_err().kind(), ErrorKind::BadRequest);

            let mut fields = article();
            fields.title = "  ".into();
            let result =
                upsert::<Article>(&node.store, &actor("admin"), Upsert::Create(fields)).await;
            assert_eq!(result.unwrap_err().kind(), ErrorKind::BadRequest);
        });
    }
}
