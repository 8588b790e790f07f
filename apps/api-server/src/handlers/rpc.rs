//! RPC endpoints. Queries are `GET /api/rpc/{procedure}?input=<json>`,
//! mutations are `POST /api/rpc/{procedure}` with a JSON body.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;

use quill_shared::ApiResponse;

use crate::middleware::error::{AppError, AppResult, ProcedureError};
use crate::observability::RequestId;
use crate::rpc::{Procedure, ProcedureKind, dispatch};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub input: Option<String>,
}

/// GET /api/rpc/{procedure}
pub async fn query(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<QueryParams>,
    request_id: RequestId,
) -> Result<HttpResponse, ProcedureError> {
    let path = path.into_inner();
    let raw = params.into_inner().input;

    respond(
        handle(&state, &path, ProcedureKind::Query, raw.as_deref().map(str::as_bytes)).await,
        path,
        request_id,
    )
}

/// POST /api/rpc/{procedure}
pub async fn mutation(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
    request_id: RequestId,
) -> Result<HttpResponse, ProcedureError> {
    let path = path.into_inner();
    let raw = (!body.is_empty()).then_some(body.as_ref());

    respond(
        handle(&state, &path, ProcedureKind::Mutation, raw).await,
        path,
        request_id,
    )
}

async fn handle(
    state: &AppState,
    path: &str,
    method_kind: ProcedureKind,
    raw_input: Option<&[u8]>,
) -> AppResult<Value> {
    let procedure = path
        .parse::<Procedure>()
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    if procedure.kind() != method_kind {
        let expected = match procedure.kind() {
            ProcedureKind::Query => "GET",
            ProcedureKind::Mutation => "POST",
        };
        return Err(AppError::MethodNotAllowed(format!(
            "`{path}` is a {}; use {expected}",
            procedure.kind()
        )));
    }

    let input = match raw_input {
        Some(bytes) => serde_json::from_slice(bytes)
            .map_err(|e| AppError::BadRequest(format!("Input is not valid JSON: {e}")))?,
        None => Value::Object(Default::default()),
    };

    dispatch::call(state, procedure, input).await
}

fn respond(
    result: AppResult<Value>,
    procedure: String,
    request_id: RequestId,
) -> Result<HttpResponse, ProcedureError> {
    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::ok(data))),
        Err(error) => Err(ProcedureError {
            error,
            procedure,
            request_id: request_id.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::handlers::configure_routes;
    use crate::observability::RequestIdMiddleware;
    use crate::state::AppState;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(RequestIdMiddleware)
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn get_uri(procedure: &str, input: &Value) -> String {
        let encoded: String = input
            .to_string()
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{b:02X}"),
            })
            .collect();
        format!("/api/rpc/{procedure}?input={encoded}")
    }

    #[actix_web::test]
    async fn mutation_then_query_round_trip() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::post()
            .uri("/api/rpc/category.create")
            .set_json(json!({ "name": "Systems", "description": "Low level" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created["success"], true);
        assert_eq!(created["data"]["slug"], "systems");
        let category_id = created["data"]["id"].clone();

        let req = test::TestRequest::post()
            .uri("/api/rpc/post.create")
            .set_json(json!({ "title": "Writing Parsers", "categoryIds": [category_id] }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&get_uri("post.getAll", &json!({ "categoryId": category_id, "searchTerm": "PARSER" })))
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        let posts = listed["data"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["title"], "Writing Parsers");
        assert_eq!(posts[0]["categories"][0]["name"], "Systems");
    }

    #[actix_web::test]
    async fn query_without_input_uses_empty_object() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::get()
            .uri("/api/rpc/category.getAll")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn validation_failure_is_bad_request_problem() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::post()
            .uri("/api/rpc/post.create")
            .insert_header(("x-request-id", "trace-me"))
            .set_json(json!({ "title": "Hi" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let problem: Value = test::read_body_json(res).await;
        assert_eq!(problem["status"], 400);
        assert_eq!(problem["instance"], "post.create");
        assert_eq!(problem["requestId"], "trace-me");
    }

    #[actix_web::test]
    async fn duplicate_slug_is_conflict() {
        let app = app!(AppState::in_memory());

        for expected in [StatusCode::OK, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/rpc/post.create")
                .set_json(json!({ "title": "Same Title" }))
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn missing_slug_is_not_found() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::get()
            .uri(&get_uri("post.getBySlug", &json!({ "slug": "ghost" })))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn wrong_method_and_unknown_procedure() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::get()
            .uri("/api/rpc/post.delete")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );

        let req = test::TestRequest::post()
            .uri("/api/rpc/post.getAll")
            .set_json(json!({}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );

        let req = test::TestRequest::post()
            .uri("/api/rpc/post.archive")
            .set_json(json!({ "id": 1 }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn malformed_json_is_bad_request() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::post()
            .uri("/api/rpc/post.delete")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn health_reports_memory_storage() {
        let app = app!(AppState::in_memory());

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }
}
