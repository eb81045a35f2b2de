// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::collections::{
    Article, ArticleFields, Request, RequestFields, RequestStatus, Service, ServiceFields, User,
    UserFields,
};
use crate::context::Context;
use crate::db::traits::WriteFields;
use crate::db::SqlStore;
use crate::mutation::Role;

/// Test node which contains a context with an [`SqlStore`].
pub struct TestNode {
    pub context: Context,
    pub store: SqlStore,
}

/// Insert a client with the given name and returns its id.
pub async fn add_user(node: &TestNode, name: &str) -> i64 {
    let fields = UserFields {
        name: name.to_string(),
        email: format!("{name}@example.org"),
        role: Role::Client,
    };

    node.store
        .insert::<User>(&fields.values())
        .await
        .expect("Insert user")
        .id
}

/// Insert articles in three categories and returns their ids in insertion order.
pub async fn add_articles(node: &TestNode, count: i64) -> Vec<i64> {
    let mut ids = Vec::new();

    for index in 0..count {
        let fields = ArticleFields {
            title: format!("Article {}", index % 4),
            body: "Lorem ipsum dolor sit amet".into(),
            category_id: index % 3 + 1,
            author_id: None,
            published: index % 2 == 0,
            views: index % 5,
        };

        let row = node
            .store
            .insert::<Article>(&fields.values())
            .await
            .expect("Insert article");
        ids.push(row.id);
    }

    ids
}

/// Insert services and returns their ids in insertion order.
///
/// Many services share the same name, price and number of purchases.
pub async fn add_services(node: &TestNode, count: i64) -> Vec<i64> {
    let mut ids = Vec::new();

    for index in 0..count {
        let fields = ServiceFields {
            name: format!("Service {}", index % 5),
            description: "Gardening, cleaning and more".into(),
            category_id: index % 3 + 1,
            price: (index % 4) as f64 * 10.0 + 5.0,
            purchases: index % 3,
        };

        let row = node
            .store
            .insert::<Service>(&fields.values())
            .await
            .expect("Insert service");
        ids.push(row.id);
    }

    ids
}

/// Insert requests owned by the given user and returns their ids in insertion order.
pub async fn add_requests(node: &TestNode, user_id: i64, count: i64) -> Vec<i64> {
    let mut ids = Vec::new();

    for index in 0..count {
        let fields = RequestFields {
            service_id: index % 2 + 1,
            status: RequestStatus::New,
            message: format!("Request number {index}"),
        };

        let mut values = fields.values();
        values.push(("user_id", user_id.into()));

        let row = node
            .store
            .insert::<Request>(&values)
            .await
            .expect("Insert request");
        ids.push(row.id);
    }

    ids
}
