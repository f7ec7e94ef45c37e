//! Integration tests for the onboarding pipeline against a mock backend:
//! connection, index fetch, embedding jobs, and collection refresh.

mod common;

use common::*;
use httpmock::Method::{GET, POST};
use serde_json::json;

use ragline::config::ConnectionConfig;
use ragline::connection::ConnectError;
use ragline::embedding::{EmbedError, UploadFile};
use ragline::index::{CategoryFilter, IndexError};

#[tokio::test]
async fn connect_installs_the_config_and_reports_the_backend_message() {
    let server = mock_backend().await;
    let connect = server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({
                "status": "success",
                "message": "Confluence 연결 성공! (총 4개 페이지)",
                "page_count": 4
            }));
        })
        .await;

    let (mut pipeline, notices) = pipeline_for(&server);
    let message = pipeline.connect(test_config()).await.expect("connect");

    connect.assert_async().await;
    assert!(message.contains("연결 성공"));
    assert!(pipeline.connection().is_connected());
    let drained = drain_notices(&notices);
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].0, "success");
}

#[tokio::test]
async fn connect_validates_locally_before_any_request() {
    let server = mock_backend().await;
    let connect = server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "unreachable assertion" }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let config = ConnectionConfig {
        api_token: String::new(),
        ..test_config()
    };

    let error = pipeline.connect(config).await.unwrap_err();
    assert!(matches!(
        error,
        ConnectError::Validation { field: "api_token" }
    ));
    assert_eq!(connect.hits_async().await, 0);
    assert!(!pipeline.connection().is_connected());
}

#[tokio::test]
async fn failed_connect_leaves_the_previous_config_active() {
    let server = mock_backend().await;
    let connect = server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200)
                .json_body(json!({ "message": "Confluence 연결 성공!" }));
        })
        .await;

    let (mut pipeline, notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("first connect");
    connect.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(400)
                .json_body(json!({ "detail": "Confluence 연결 실패: 401 Unauthorized" }));
        })
        .await;

    let second = ConnectionConfig {
        space_key: "ENG".to_owned(),
        ..test_config()
    };
    let error = pipeline.connect(second).await.unwrap_err();

    match error {
        ConnectError::Connection { detail } => {
            assert!(detail.contains("401 Unauthorized"));
        }
        other => panic!("expected Connection error, got {other:?}"),
    }
    // The first, successful config is still the active one.
    let active = pipeline.connection().active().expect("active config");
    assert_eq!(active.space_key, "HR");
    let drained = drain_notices(&notices);
    assert_eq!(drained.last().expect("error notice").0, "error");
}

#[tokio::test]
async fn fetch_replaces_the_index_and_prunes_the_selection() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    let categories = server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(index_payload());
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");
    let count = pipeline.fetch_index().await.expect("fetch");
    assert_eq!(count, 4);
    assert_eq!(pipeline.index().level1_labels(), ["HR", "IT"]);

    pipeline.index_mut().toggle("3");
    pipeline.index_mut().toggle("4");
    categories.delete_async().await;

    // The refetched listing no longer contains page 4.
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(json!({
                "pages": [
                    { "id": "1", "title": "Leave policy", "path": ["HR", "Attendance"] },
                    { "id": "3", "title": "VPN guide",    "path": ["IT", "Security"] }
                ],
                "category_tree": { "HR": { "Attendance": 1 }, "IT": { "Security": 1 } },
                "total_pages": 2
            }));
        })
        .await;

    pipeline.fetch_index().await.expect("refetch");
    assert_eq!(pipeline.index().pages().len(), 2);
    assert!(pipeline.index().is_selected("3"));
    // Stale pages are dropped, and the selection stays a subset.
    assert!(!pipeline.index().is_selected("4"));
}

#[tokio::test]
async fn fetch_failure_reverts_to_no_index_loaded() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    let categories = server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(index_payload());
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");
    pipeline.fetch_index().await.expect("fetch");
    pipeline.index_mut().set_level1(CategoryFilter::label("HR"));
    pipeline.index_mut().select_all_filtered();
    categories.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(400)
                .json_body(json!({ "detail": "카테고리 조회 실패" }));
        })
        .await;

    let error = pipeline.fetch_index().await.unwrap_err();
    assert!(matches!(error, IndexError::Fetch { .. }));
    assert!(!pipeline.index().is_loaded());
    assert!(pipeline.index().selection().is_empty());
    assert!(pipeline.index().level1().is_all());
}

#[tokio::test]
async fn filter_remote_sends_only_non_all_levels() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(index_payload());
        })
        .await;
    let filter = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/confluence/filter-pages")
                .query_param("level_1", "HR");
            then.status(200)
                .json_body(json!({ "page_ids": ["1", "2", "4"], "count": 3 }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");
    pipeline.fetch_index().await.expect("fetch");
    pipeline.index_mut().set_level1(CategoryFilter::label("HR"));

    let ids = pipeline.filter_remote().await.expect("filter");
    filter.assert_async().await;
    assert_eq!(ids, ["1", "2", "4"]);
}

#[tokio::test]
async fn initialize_twice_never_decreases_the_point_count() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/initialize");
            then.status(200).json_body(json!({
                "message": "임베딩 매니저 및 챗봇 초기화 완료",
                "collection_info": { "points_count": 42 }
            }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let first = pipeline.initialize_collection().await.expect("first init");
    let second = pipeline.initialize_collection().await.expect("second init");

    assert!(first.initialized);
    assert!(second.initialized);
    assert!(second.point_count >= first.point_count);
    assert_eq!(second.point_count, 42);
}

#[tokio::test]
async fn empty_selection_embeds_nothing_and_touches_no_network() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    let embed = server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/embed-pages");
            then.status(200).json_body(json!({ "message": "unreachable assertion" }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");

    let before = pipeline.embedding().collection();
    let error = pipeline.embed_selection().await.unwrap_err();
    assert!(matches!(error, EmbedError::EmptySelection));
    assert_eq!(embed.hits_async().await, 0);
    assert_eq!(pipeline.embedding().collection(), before);
}

#[tokio::test]
async fn successful_embed_refreshes_the_collection_and_signals_ready() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(index_payload());
        })
        .await;
    let embed = server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/embed-pages");
            then.status(200).json_body(json!({
                "message": "작업 완료: 신규 3개 학습, 1개 건너뜀",
                "embedded_pages": 3,
                "skipped_pages": 1
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(200)
                .json_body(json!({ "collection_info": { "points_count": 17 } }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");
    pipeline.fetch_index().await.expect("fetch");
    pipeline.index_mut().select_all_filtered();

    let report = pipeline.embed_selection().await.expect("embed");
    embed.assert_async().await;
    assert_eq!(report.embedded, 3);
    assert_eq!(report.skipped, 1);
    assert!(pipeline.embedding().is_ready());
    assert_eq!(pipeline.embedding().collection().point_count, 17);
}

#[tokio::test]
async fn failed_embed_leaves_the_collection_unchanged() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({ "message": "ok" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(index_payload());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/embed-pages");
            then.status(500).json_body(json!({ "detail": "Qdrant unavailable" }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    pipeline.connect(test_config()).await.expect("connect");
    pipeline.fetch_index().await.expect("fetch");
    pipeline.index_mut().toggle("1");

    let before = pipeline.embedding().collection();
    let error = pipeline.embed_selection().await.unwrap_err();
    match error {
        EmbedError::Embed { detail } => assert!(detail.contains("Qdrant unavailable")),
        other => panic!("expected Embed error, got {other:?}"),
    }
    assert_eq!(pipeline.embedding().collection(), before);
    assert!(!pipeline.embedding().is_busy());
}

#[tokio::test]
async fn upload_filters_extensions_and_reports_the_accepted_count() {
    let server = mock_backend().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/upload");
            then.status(200)
                .json_body(json!({ "message": "파일 2개 학습 완료", "embedded_files": 2 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(200)
                .json_body(json!({ "collection_info": { "points_count": 9 } }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let files = vec![
        UploadFile::new("a.pdf", b"pdf bytes".to_vec()),
        UploadFile::new("b.exe", b"binary".to_vec()),
        UploadFile::new("c.md", b"# notes".to_vec()),
    ];

    let accepted = pipeline.embed_uploads(files).await.expect("upload");
    assert_eq!(accepted, 2);
    upload.assert_async().await;
    assert!(pipeline.embedding().is_ready());
}

#[tokio::test]
async fn all_rejected_upload_batch_touches_no_network() {
    let server = mock_backend().await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/upload");
            then.status(200).json_body(json!({}));
        })
        .await;

    let (mut pipeline, notices) = pipeline_for(&server);
    let accepted = pipeline
        .embed_uploads(vec![UploadFile::new("b.exe", b"binary".to_vec())])
        .await
        .expect("no-op upload");

    assert_eq!(accepted, 0);
    assert_eq!(upload.hits_async().await, 0);
    assert!(!pipeline.embedding().is_ready());
    let drained = drain_notices(&notices);
    assert_eq!(drained.last().expect("warning notice").0, "warning");
}

#[tokio::test]
async fn refresh_maps_not_created_to_an_uninitialized_collection() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(400)
                .json_body(json!({ "detail": "임베딩 매니저가 초기화되지 않았습니다." }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let state = pipeline.refresh_collection().await.expect("400 is not fatal");
    assert!(!state.initialized);
    assert_eq!(state.point_count, 0);
}

#[tokio::test]
async fn refresh_propagates_other_backend_failures() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(500)
                .json_body(json!({ "detail": "컬렉션 정보 조회 실패" }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let error = pipeline.refresh_collection().await.unwrap_err();
    assert!(matches!(error, EmbedError::Info { .. }));
}

#[tokio::test]
async fn refresh_with_points_marks_the_collection_ready() {
    let server = mock_backend().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(200)
                .json_body(json!({ "collection_info": { "points_count": 7 } }));
        })
        .await;

    let (mut pipeline, _notices) = pipeline_for(&server);
    let state = pipeline.refresh_collection().await.expect("refresh");
    assert!(state.initialized);
    assert_eq!(state.point_count, 7);
}
