
use std::sync::Arc;

use async_trait::async_trait;
use portfolio_experience::{
    entities::{
        experience::{Experience, ExperienceInsert, Selection},
        listing::{ListingQuery, Page},
    },
    errors::AppError,
    repositories::experience::ExperienceRepository,
};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use test_utils::{test_config, TestApp};
use uuid::Uuid;

async fn envelope(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json().await.expect("Failed to parse envelope");
    (status, body)
}

async fn paginate(app: &TestApp, query: &[(&str, &str)]) -> (StatusCode, Value) {
    let response = app
        .client
        .get(app.url("/experiences/paginate"))
        .query(query)
        .send()
        .await
        .expect("Failed to execute request");
    envelope(response).await
}

async fn seed(app: &TestApp) -> Vec<Value> {
    let mut created = Vec::new();
    for (company, period) in [("Acme Corp", "2019 - 2020"), ("Globex", "2020 - 2022"), ("Initech", "2022 - now")] {
        created.push(
            app.create_experience(json!({ "company": company, "period": period, "position": "Engineer" }))
                .await,
        );
    }
    created
}

#[actix_rt::test]
async fn home_returns_welcome_document() {
    let app = TestApp::spawn().await;

    let response = app.client.get(format!("{}/", app.address)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_rt::test]
async fn health_reports_store_status() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.get("/admin/health").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "OK");
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn store_creates_a_record_with_normalized_fields() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(
        app.store(&json!({ "company": "  Acme Corp ", "period": "", "position": "Engineer" }))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Data is successfully saved");
    assert_eq!(body["payload"]["company"], "Acme Corp");
    assert_eq!(body["payload"]["period"], Value::Null);
    assert_eq!(body["payload"]["position"], "Engineer");
    assert!(Uuid::parse_str(body["payload"]["id"].as_str().unwrap()).is_ok());
}

#[actix_rt::test]
async fn store_without_company_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.store(&json!({ "period": "2020" })).await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "message": "Validation Error",
            "payload": [{ "field": "company", "message": "The company field is required." }],
            "status": 400
        })
    );
    assert!(app.state.experience_handler.get_all_fields(Selection::all()).await.data().unwrap().is_empty());
}

#[actix_rt::test]
async fn store_with_existing_id_replaces_editable_fields() {
    let app = TestApp::spawn().await;
    let created = app
        .create_experience(json!({ "company": "Acme", "period": "2019", "details": "Built things" }))
        .await;

    let (status, body) = envelope(
        app.store(&json!({ "id": created["id"], "company": "Acme Corp", "position": "Lead" }))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data is successfully updated");
    assert_eq!(body["payload"]["id"], created["id"]);
    assert_eq!(body["payload"]["company"], "Acme Corp");
    assert_eq!(body["payload"]["position"], "Lead");
    assert_eq!(body["payload"]["period"], Value::Null);
    assert_eq!(body["payload"]["details"], Value::Null);
    assert_eq!(body["payload"]["created_at"], created["created_at"]);
}

#[actix_rt::test]
async fn store_with_unknown_id_reports_not_found_and_creates_nothing() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(
        app.store(&json!({ "id": Uuid::new_v4(), "company": "Ghost Inc" }))
            .await,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "No result is found", "payload": null, "status": 404 }));

    let (_, all) = envelope(app.get("/experiences").await).await;
    assert_eq!(all["payload"], json!([]));
}

#[actix_rt::test]
async fn malformed_body_is_reported_as_validation_error() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/experiences"))
        .header("Content-Type", "application/json")
        .body(r#"{ "company": 42 }"#)
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation Error");
    assert_eq!(body["payload"][0]["field"], "body");
}

#[actix_rt::test]
async fn get_by_id_returns_the_record() {
    let app = TestApp::spawn().await;
    let created = seed(&app).await;
    let id = created[1]["id"].as_str().unwrap();

    let (status, body) = envelope(app.get(&format!("/experiences/{}", id)).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data is fetched successfully");
    assert_eq!(body["payload"], created[1]);
}

#[actix_rt::test]
async fn get_by_id_projects_requested_fields() {
    let app = TestApp::spawn().await;
    let created = seed(&app).await;
    let id = created[0]["id"].as_str().unwrap();

    let (_, body) = envelope(app.get(&format!("/experiences/{}?fields=company,details", id)).await).await;

    assert_eq!(body["payload"], json!({ "company": "Acme Corp", "details": null }));
}

#[actix_rt::test]
async fn get_by_unknown_id_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.get(&format!("/experiences/{}", Uuid::new_v4())).await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No result is found");
    assert_eq!(body["payload"], Value::Null);
}

#[actix_rt::test]
async fn get_by_malformed_id_is_bad_request() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.get("/experiences/42").await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[actix_rt::test]
async fn get_all_lists_records_in_creation_order() {
    let app = TestApp::spawn().await;
    let created = seed(&app).await;

    let (status, body) = envelope(app.get("/experiences").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data is fetched successfully");
    assert_eq!(body["payload"], Value::Array(created));
}

#[actix_rt::test]
async fn get_all_on_empty_store_is_an_empty_success() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.get("/experiences/").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Data is fetched successfully", "payload": [], "status": 200 }));
}

#[actix_rt::test]
async fn get_all_rejects_unknown_fields() {
    let app = TestApp::spawn().await;

    let (status, body) = envelope(app.get("/experiences?fields=company,salary").await).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["payload"][0]["field"], "fields");
}

#[actix_rt::test]
async fn paginate_defaults_to_newest_first() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (status, body) = paginate(&app, &[]).await;

    assert_eq!(status, StatusCode::OK);
    let page = &body["payload"];
    assert_eq!(page["total"], 3);
    assert_eq!(page["per_page"], 10);
    assert_eq!(page["current_page"], 1);
    let companies: Vec<&str> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["company"].as_str().unwrap())
        .collect();
    assert_eq!(companies, vec!["Initech", "Globex", "Acme Corp"]);
}

#[actix_rt::test]
async fn paginate_honours_page_size_sorter_and_page() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (_, body) = paginate(
        &app,
        &[
            ("params", r#"{"pageSize":"2"}"#),
            ("sorter", r#"{"company":"ascend"}"#),
            ("page", "2"),
            ("fields", "company"),
        ],
    )
    .await;

    let page = &body["payload"];
    assert_eq!(page["data"], json!([{ "company": "Initech" }]));
    assert_eq!(page["total"], 3);
    assert_eq!(page["last_page"], 2);
    assert_eq!(page["from"], 3);
}

#[actix_rt::test]
async fn paginate_searches_flagged_columns_only() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (_, body) = paginate(
        &app,
        &[
            ("params", r#"{"keyword":"2020"}"#),
            ("columns[]", r#"{"dataIndex":"period","search":true}"#),
            ("columns[]", r#"{"dataIndex":"company","search":false}"#),
            ("sorter", r#"{"created_at":"ascend"}"#),
        ],
    )
    .await;

    let companies: Vec<&str> = body["payload"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["company"].as_str().unwrap())
        .collect();
    assert_eq!(companies, vec!["Acme Corp", "Globex"]);
    assert_eq!(body["payload"]["total"], 2);
}

#[actix_rt::test]
async fn paginate_without_searchable_columns_ignores_keyword() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (_, body) = paginate(&app, &[("params", r#"{"keyword":"nothing matches this"}"#)]).await;

    assert_eq!(body["payload"]["total"], 3);
}

#[actix_rt::test]
async fn paginate_rejects_malformed_params() {
    let app = TestApp::spawn().await;

    let (status, body) = paginate(&app, &[("params", "{not json"), ("sorter", r#"{"salary":"ascend"}"#)]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation Error");
    let fields: Vec<&str> = body["payload"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["params", "sorter"]);
}

#[actix_rt::test]
async fn delete_removes_listed_records_then_reports_nothing_to_delete() {
    let app = TestApp::spawn().await;
    let created = seed(&app).await;
    let ids = json!({ "ids": [created[0]["id"], created[2]["id"], Uuid::new_v4()] });

    let (status, body) = envelope(app.delete(&ids).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Data is deleted successfully", "payload": 2, "status": 200 }));

    let (status, _) = envelope(app.get(&format!("/experiences/{}", created[0]["id"].as_str().unwrap())).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = envelope(app.delete(&ids).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Nothing to Delete", "payload": null, "status": 500 }));
}

#[actix_rt::test]
async fn delete_with_empty_list_deletes_nothing() {
    let app = TestApp::spawn().await;
    seed(&app).await;

    let (status, body) = envelope(app.delete(&json!({ "ids": [] })).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Nothing to Delete");

    let (_, all) = envelope(app.get("/experiences").await).await;
    assert_eq!(all["payload"].as_array().unwrap().len(), 3);
}

struct UnavailableRepo;

#[async_trait]
impl ExperienceRepository for UnavailableRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn get_all_experiences(&self, _selection: Selection) -> Result<Vec<Experience>, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn get_experience_by_id(&self, _id: &Uuid, _selection: Selection) -> Result<Option<Experience>, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn create_experience(&self, _experience: &ExperienceInsert) -> Result<Experience, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn update_experience(&self, _id: &Uuid, _experience: &ExperienceInsert) -> Result<Option<Experience>, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn paginate_experiences(&self, _query: &ListingQuery, _selection: Selection) -> Result<Page<Experience>, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }

    async fn delete_experiences(&self, _ids: &[Uuid]) -> Result<u64, AppError> {
        Err(AppError::InternalError("connection refused".into()))
    }
}

#[actix_rt::test]
async fn store_faults_are_contained_in_an_error_envelope() {
    let app = TestApp::spawn_with_repo(Arc::new(UnavailableRepo), test_config()).await;

    let (status, body) = envelope(app.get("/experiences").await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Something went wrong");
    assert_eq!(body["payload"], "Internal server error: connection refused");

    let (status, body) = envelope(app.get("/admin/health").await).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "Unavailable");
}

#[actix_rt::test]
async fn fault_details_can_be_hidden() {
    let mut config = test_config();
    config.expose_fault_details = false;
    let app = TestApp::spawn_with_repo(Arc::new(UnavailableRepo), config).await;

    let (status, body) = envelope(app.store(&json!({ "company": "Acme" })).await).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Something went wrong", "payload": "An internal error occurred", "status": 500 }));
}
