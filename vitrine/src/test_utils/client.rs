// SPDX-License-Identifier: AGPL-3.0-or-later

use std::convert::TryFrom;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use axum::Router;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use hyper::Server;

use crate::http::{build_server, HttpServiceContext, ACTOR_ID_HEADER, ACTOR_ROLES_HEADER};
use crate::mutation::ActorContext;
use crate::test_utils::TestNode;

/// HTTP client for testing request and responses.
pub struct TestClient {
    client: reqwest::Client,
    addr: SocketAddr,
}

impl TestClient {
    pub(crate) fn new(router: Router) -> Self {
        // Setting the port to zero asks the operating system to find one for us
        let listener = TcpListener::bind("127.0.0.1:0").expect("Could not bind ephemeral socket");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let server = Server::from_tcp(listener)
                .unwrap()
                .serve(router.into_make_service());
            server.await.expect("server error");
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        TestClient { client, addr }
    }

    pub(crate) fn get(&self, url: &str) -> RequestBuilder {
        RequestBuilder {
            builder: self.client.get(format!("http://{}{}", self.addr, url)),
        }
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        RequestBuilder {
            builder: self.client.post(format!("http://{}{}", self.addr, url)),
        }
    }
}

/// Configures a test client that can be used for HTTP API testing.
pub fn http_test_client(node: &TestNode) -> TestClient {
    let http_context = HttpServiceContext::new(
        node.context.store.clone(),
        node.context.config.max_page_size,
    );

    TestClient::new(build_server(http_context))
}

pub(crate) struct RequestBuilder {
    builder: reqwest::RequestBuilder,
}

impl RequestBuilder {
    pub(crate) async fn send(self) -> TestResponse {
        TestResponse {
            response: self.builder.send().await.unwrap(),
        }
    }

    pub(crate) fn body(mut self, body: impl Into<reqwest::Body>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    pub(crate) fn json<T>(mut self, json: &T) -> Self
    where
        T: serde::Serialize,
    {
        self.builder = self.builder.json(json);
        self
    }

    pub(crate) fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Sets the headers an authentication layer would set for this actor.
    pub(crate) fn actor(mut self, actor: &ActorContext) -> Self {
        if let Some(user_id) = actor.user_id {
            self = self.header(ACTOR_ID_HEADER, user_id.to_string());
        }

        let roles = actor
            .roles
            .iter()
            .map(|role| role.as_str())
            .collect::<Vec<&str>>()
            .join(",");
        self.header(ACTOR_ROLES_HEADER, roles)
    }
}

pub(crate) struct TestResponse {
    response: reqwest::Response,
}

impl TestResponse {
    pub(crate) async fn text(self) -> String {
        self.response.text().await.unwrap()
    }

    pub(crate) async fn json<T>(self) -> T
    where
        T: serde::de::DeserializeOwned,
    {
        self.response.json().await.unwrap()
    }

    pub(crate) fn status(&self) -> StatusCode {
        self.response.status()
    }
}
