use std::{convert::Infallible, net::SocketAddr, path::Path};

use async_graphql::http::GraphiQLSource;
use async_graphql_warp::{GraphQLBadRequest, GraphQLResponse};
use tracing::warn;
use warp::{
    http::{Response as HttpResponse, StatusCode},
    Filter, Rejection,
};

use crate::api::Schema;

const GRAPHQL_PATH: &str = "/graphql";

/// Serves the GraphQL API at `/graphql` and GraphiQL at `/`. TLS is used
/// when both a certificate and a key are given.
pub(crate) async fn serve(schema: Schema, addr: SocketAddr, tls: Option<(&Path, &Path)>) {
    let graphql_post = warp::path!("graphql")
        .and(async_graphql_warp::graphql(schema))
        .and_then(
            |(schema, request): (Schema, async_graphql::Request)| async move {
                Ok::<_, Infallible>(GraphQLResponse::from(schema.execute(request).await))
            },
        );

    let graphiql = warp::path::end().and(warp::get()).map(|| {
        HttpResponse::builder()
            .header("content-type", "text/html")
            .body(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
    });

    let routes = graphiql
        .or(graphql_post)
        .recover(|err: Rejection| async move {
            if let Some(GraphQLBadRequest(err)) = err.find() {
                return Ok::<_, Infallible>(warp::reply::with_status(
                    err.to_string(),
                    StatusCode::BAD_REQUEST,
                ));
            }
            if err.is_not_found() {
                return Ok(warp::reply::with_status(
                    "NOT_FOUND".to_string(),
                    StatusCode::NOT_FOUND,
                ));
            }
            warn!(?err, "Unhandled rejection");
            Ok(warp::reply::with_status(
                "INTERNAL_SERVER_ERROR".to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        });

    match tls {
        Some((cert, key)) => {
            warp::serve(routes)
                .tls()
                .cert_path(cert)
                .key_path(key)
                .run(addr)
                .await;
        }
        None => warp::serve(routes).run(addr).await,
    }
}
