// HTTP request handlers
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use votes_ledger_engine::{
    CastVoteParams, VoteError, VoteErrorKind, VoteFailure, VoteReceipt, VoteTargetParams,
};
use votes_ledger_repository::VotesRepository;

use crate::server::state::AppState;

/// Header carrying the voter id, set by the upstream auth layer.
pub const VOTER_HEADER: &str = "x-voter-id";

/// Response envelope: `success` plus either `data` or `error`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<VoteFailure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteData {
    #[serde(flatten)]
    pub receipt: VoteReceipt,
    pub message: String,
}

fn success<T: Serialize>(data: T) -> Response {
    let body = ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn failure(error: &VoteError) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(error.failure()),
    };
    (status_for(error.kind()), Json(body)).into_response()
}

pub fn status_for(kind: VoteErrorKind) -> StatusCode {
    match kind {
        VoteErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        VoteErrorKind::Validation => StatusCode::BAD_REQUEST,
        VoteErrorKind::NotFound => StatusCode::NOT_FOUND,
        VoteErrorKind::Conflict => StatusCode::CONFLICT,
        VoteErrorKind::Transaction => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn voter(headers: &HeaderMap) -> Option<&str> {
    headers.get(VOTER_HEADER).and_then(|value| value.to_str().ok())
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Votes ledger is running")
}

/// `POST /votes` - cast, switch or withdraw the caller's vote.
pub async fn cast_vote<R: VotesRepository + 'static>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    payload: Result<Json<CastVoteParams>, JsonRejection>,
) -> Response {
    let params = match payload {
        Ok(Json(params)) => params,
        Err(rejection) => return failure(&VoteError::validation("body", rejection.body_text())),
    };

    match state.coordinator.cast_vote(voter(&headers), &params).await {
        Ok(receipt) => success(CastVoteData {
            message: receipt.summary(),
            receipt,
        }),
        Err(e) => failure(&e),
    }
}

/// `GET /votes/state` - has the caller upvoted or downvoted the target.
pub async fn vote_state<R: VotesRepository + 'static>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    params: Result<Query<VoteTargetParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return failure(&VoteError::validation("query", rejection.body_text())),
    };

    match state.query.get_vote_state(voter(&headers), &params).await {
        Ok(status) => success(status),
        Err(e) => failure(&e),
    }
}

/// `GET /votes/count` - the target's upvote and downvote counters.
pub async fn votes_count<R: VotesRepository + 'static>(
    State(state): State<AppState<R>>,
    params: Result<Query<VoteTargetParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return failure(&VoteError::validation("query", rejection.body_text())),
    };

    match state.query.get_votes_count(&params).await {
        Ok(count) => success(count),
        Err(e) => failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use votes_ledger_engine::{BroadcastInvalidator, CountsCache};
    use votes_ledger_repository::InMemoryVotesRepository;
    use votes_ledger_shared::types::Target;

    use super::*;
    use crate::server::create_app;

    const QUESTION_ID: &str = "65f1c0ffee0000000000q001";

    async fn app() -> (Router, InMemoryVotesRepository) {
        let repository = InMemoryVotesRepository::new();
        repository.register_target(&Target::question(QUESTION_ID)).await;
        let state = AppState::new(
            Arc::new(repository.clone()),
            Arc::new(BroadcastInvalidator::new(16)),
            Arc::new(CountsCache::new()),
        );
        let app = create_app(state, &["http://localhost:3000".to_string()]).unwrap();
        (app, repository)
    }

    fn post_vote(voter: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post("/votes").header("content-type", "application/json");
        if let Some(voter) = voter {
            builder = builder.header(VOTER_HEADER, voter);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, voter: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(voter) = voter {
            builder = builder.header(VOTER_HEADER, voter);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn upvote() -> Value {
        json!({ "targetId": QUESTION_ID, "targetType": "question", "voteType": "upvote" })
    }

    #[tokio::test]
    async fn test_cast_vote_then_read_state_and_count() {
        let (app, _) = app().await;

        let (status, body) = send(&app, post_vote(Some("alice"), upvote())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["current"], "upvoted");
        assert_eq!(body["data"]["message"], "Upvote added");
        assert!(body.get("error").is_none());

        let uri = format!("/votes/state?targetId={QUESTION_ID}&targetType=question");
        let (status, body) = send(&app, get(&uri, Some("alice"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "hasUpvoted": true, "hasDownvoted": false }));

        let uri = format!("/votes/count?targetId={QUESTION_ID}&targetType=question");
        let (_, body) = send(&app, get(&uri, None)).await;
        assert_eq!(body["data"]["upvotes"], 1);
        assert_eq!(body["data"]["downvotes"], 0);
    }

    #[tokio::test]
    async fn test_count_cached_before_vote_is_refreshed() {
        let (app, _) = app().await;
        let uri = format!("/votes/count?targetId={QUESTION_ID}&targetType=question");

        let (_, body) = send(&app, get(&uri, None)).await;
        assert_eq!(body["data"]["upvotes"], 0);

        send(&app, post_vote(Some("alice"), upvote())).await;
        let (_, body) = send(&app, get(&uri, None)).await;
        assert_eq!(body["data"]["upvotes"], 1);
        assert_eq!(body["data"]["downvotes"], 0);

        let downvote = json!({ "targetId": QUESTION_ID, "targetType": "question", "voteType": "downvote" });
        let (_, body) = send(&app, post_vote(Some("alice"), downvote)).await;
        assert_eq!(body["data"]["current"], "downvoted");
        let (_, body) = send(&app, get(&uri, None)).await;
        assert_eq!(body["data"]["upvotes"], 0);
        assert_eq!(body["data"]["downvotes"], 1);
    }

    #[tokio::test]
    async fn test_repeat_vote_is_withdrawn() {
        let (app, repository) = app().await;
        send(&app, post_vote(Some("alice"), upvote())).await;

        let (status, body) = send(&app, post_vote(Some("alice"), upvote())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["current"], "noVote");
        assert_eq!(body["data"]["message"], "Upvote removed");
        assert!(repository.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_voter_is_unauthorized() {
        let (app, repository) = app().await;

        let (status, body) = send(&app, post_vote(None, upvote())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["kind"], "Unauthorized");
        assert_eq!(body["error"]["message"], "Only logged-in users can vote");
        assert!(repository.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let (app, _) = app().await;

        let body = json!({ "targetId": QUESTION_ID, "targetType": "question", "voteType": "meh" });
        let (status, body) = send(&app, post_vote(Some("alice"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "Validation");

        let (status, body) = send(&app, post_vote(Some("alice"), json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["kind"], "Validation");

        let request = Request::post("/votes")
            .header("content-type", "application/json")
            .header(VOTER_HEADER, "alice")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let (app, _) = app().await;
        let body = json!({ "targetId": "gone", "targetType": "answer", "voteType": "downvote" });

        let (status, body) = send(&app, post_vote(Some("alice"), body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "NotFound");

        let (status, _) = send(&app, get("/votes/count?targetId=gone&targetType=answer", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_anonymous_state_is_not_voted() {
        let (app, _) = app().await;
        let uri = format!("/votes/state?targetId={QUESTION_ID}&targetType=question");

        let (status, body) = send(&app, get(&uri, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!({ "hasUpvoted": false, "hasDownvoted": false }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = app().await;
        let response = app.oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_status_for_every_kind() {
        assert_eq!(status_for(VoteErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(VoteErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(VoteErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(VoteErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(VoteErrorKind::Transaction), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
