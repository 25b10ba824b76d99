use axum::{http::StatusCode, routing::get, Router};
use axum_test::TestServer;
use stacktrack::api::create_router;
use stacktrack::client::{ClientError, StackClient};
use stacktrack::db::Database;
use stacktrack::models::*;

/// A real server on a local port plus a client pointed at its API.
fn setup() -> (TestServer, Database, StackClient) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let server = TestServer::builder()
        .http_transport()
        .build(create_router(db.clone()))
        .expect("Failed to create test server");
    let address = server.server_address().expect("Server has no address");
    let client = StackClient::new(format!("{}/api/v1", address.as_str().trim_end_matches('/')));
    (server, db, client)
}

fn seed_stack(db: &Database) -> (Project, Feature, Vec<Branch>) {
    let project = db
        .create_project(CreateProjectInput {
            name: "Web".to_string(),
            description: None,
            master_branch: None,
            repo_url: None,
        })
        .expect("Failed to create project");
    let feature = db
        .create_feature(
            project.id,
            CreateFeatureInput {
                identifier: "11627".to_string(),
                name: "DB infrastructure".to_string(),
                description: None,
                color: None,
            },
        )
        .expect("Failed to create feature");
    let branches = ["alice-db", "alice-api"]
        .iter()
        .map(|name| {
            db.create_branch(feature.id, CreateBranchInput::named(*name))
                .expect("Failed to create branch")
        })
        .collect();
    (project, feature, branches)
}

#[tokio::test]
async fn unwraps_successful_envelopes() {
    let (_server, db, client) = setup();
    let (project, feature, _) = seed_stack(&db);

    let projects = client.list_projects().await.expect("Request failed");
    assert_eq!(projects.len(), 1);

    let verification = client
        .verify_stack(project.id, feature.id)
        .await
        .expect("Request failed");
    assert_eq!(verification.branch_count, 2);
}

#[tokio::test]
async fn maps_404_to_not_found_with_envelope_message() {
    let (_server, db, client) = setup();
    let (project, _, _) = seed_stack(&db);

    let err = client.get_feature(project.id, 999).await.unwrap_err();
    match err {
        ClientError::NotFound(message) => assert_eq!(message, "Feature not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn maps_400_to_bad_request() {
    let (_server, db, client) = setup();
    let (project, feature, branches) = seed_stack(&db);

    let err = client
        .reorder_branches(project.id, feature.id, vec![branches[0].id, branches[0].id])
        .await
        .unwrap_err();
    match err {
        ClientError::BadRequest(message) => assert!(message.contains("duplicate")),
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn falls_back_to_raw_body_for_other_errors() {
    let app = Router::new().route(
        "/projects",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
    );
    let server = TestServer::builder()
        .http_transport()
        .build(app)
        .expect("Failed to create test server");
    let address = server.server_address().expect("Server has no address");
    let client = StackClient::new(address.as_str());

    let err = client.list_projects().await.unwrap_err();
    match err {
        ClientError::Server(message) => {
            assert!(message.starts_with("502"));
            assert!(message.ends_with("upstream unavailable"));
        }
        other => panic!("expected Server, got {:?}", other),
    }
}
