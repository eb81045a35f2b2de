// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Result;
use axum::extract::Extension;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use http::header::{HeaderName, CONTENT_TYPE};
use log::{debug, info, warn};
use tower_http::cors::{Any, CorsLayer};

use crate::collections::{
    Article, Experience, GitLog, Project, Request, Service, Skill, UpdateLog, User,
};
use crate::context::Context;
use crate::db::traits::Collection;
use crate::http::actor::{ACTOR_ID_HEADER, ACTOR_ROLES_HEADER};
use crate::http::api::{
    handle_delete, handle_health, handle_list, handle_not_found, handle_upsert,
};
use crate::http::context::HttpServiceContext;
use crate::manager::{ServiceReadySender, Shutdown};

/// Route answering health checks.
const HEALTH_ROUTE: &str = "/health";

/// Add list, upsert and delete routes of a collection.
fn collection_routes<C: Collection>(router: Router) -> Router {
    router
        .route(&format!("/rpc/{}.list", C::NAME), post(handle_list::<C>))
        .route(&format!("/rpc/{}.upsert", C::NAME), post(handle_upsert::<C>))
        .route(&format!("/rpc/{}.delete", C::NAME), post(handle_delete::<C>))
}

/// Build HTTP server with RPC API.
pub fn build_server(http_context: HttpServiceContext) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(ACTOR_ID_HEADER),
            HeaderName::from_static(ACTOR_ROLES_HEADER),
        ])
        .allow_credentials(false)
        .allow_origin(Any);

    let mut router = Router::new().route(HEALTH_ROUTE, get(handle_health));

    // Add RPC routes of all collections
    router = collection_routes::<User>(router);
    router = collection_routes::<Article>(router);
    router = collection_routes::<Service>(router);
    router = collection_routes::<Request>(router);
    router = collection_routes::<Experience>(router);
    router = collection_routes::<Skill>(router);
    router = collection_routes::<Project>(router);
    router = collection_routes::<GitLog>(router);
    router = collection_routes::<UpdateLog>(router);

    router
        .fallback(handle_not_found)
        // Add middlewares
        .layer(cors)
        // Add shared context
        .layer(Extension(http_context))
}

/// Start HTTP server.
pub async fn http_service(
    context: Context,
    signal: Shutdown,
    tx_ready: ServiceReadySender,
) -> Result<()> {
    let http_port = context.config.http_port;
    let http_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), http_port);

    // Introduce a new context for all HTTP routes
    let http_context = HttpServiceContext::new(context.store.clone(), context.config.max_page_size);

    let server = axum::Server::try_bind(&http_address)?;
    info!("Serving RPC API on {}", http_address);

    server
        .serve(build_server(http_context).into_make_service())
        .with_graceful_shutdown(async {
            debug!("HTTP service is ready");
            if tx_ready.send(()).is_err() {
                warn!("No subscriber informed about HTTP service being ready");
            };

            signal.await.ok();
        })
        .await?;

    Ok(())
}
