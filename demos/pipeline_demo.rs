//! End-to-end pipeline walk against a mock onboarding backend.
//!
//! This demo stands up an in-process mock of the backend, then drives the
//! whole onboarding journey: connect, fetch the page index, filter and
//! select pages, initialize and run an embedding job, and finally chat over
//! the embedded corpus. It closes by showing the demo fallback answering
//! when the backend goes away.
//!
//! Running:
//! ```bash
//! cargo run --example pipeline_demo
//! ```

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use ragline::client::BackendClient;
use ragline::config::{ChatOptions, ConnectionConfig};
use ragline::index::CategoryFilter;
use ragline::notify::Notifier;
use ragline::pipeline::Pipeline;

async fn mount_backend(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .json_body(json!({ "status": "onboarding module is running" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/connect");
            then.status(200).json_body(json!({
                "message": "Confluence 연결 성공! (총 4개 페이지)",
                "page_count": 4
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/confluence/categories");
            then.status(200).json_body(json!({
                "pages": [
                    { "id": "101", "title": "연차휴가 규정",   "path": ["HR", "근태"] },
                    { "id": "102", "title": "재택근무 지침",   "path": ["HR", "근태"] },
                    { "id": "103", "title": "VPN 접속 가이드", "path": ["IT", "보안"] },
                    { "id": "104", "title": "급여 지급 규정",  "path": ["FIN", "급여"] }
                ],
                "category_tree": {
                    "HR":  { "근태": 2 },
                    "IT":  { "보안": 1 },
                    "FIN": { "급여": 1 }
                },
                "total_pages": 4
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/initialize");
            then.status(200).json_body(json!({
                "message": "임베딩 매니저 및 챗봇 초기화 완료",
                "collection_info": { "points_count": 0 }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embedding/embed-pages");
            then.status(200).json_body(json!({
                "message": "작업 완료: 신규 2개 학습, 0개 건너뜀",
                "embedded_pages": 2,
                "skipped_pages": 0
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/collection/info");
            then.status(200)
                .json_body(json!({ "collection_info": { "points_count": 38 } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat");
            then.status(200).json_body(json!({
                "answer": "연차는 HR Portal의 전자결재에서 휴가신청서를 작성해 신청합니다.",
                "sources": [
                    { "title": "연차휴가 규정", "url": "https://wiki.example/101", "score": 0.93 },
                    { "title": "HR Portal 매뉴얼", "url": "https://wiki.example/900", "score": 0.71 }
                ]
            }));
        })
        .await;
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let server = MockServer::start_async().await;
    mount_backend(&server).await;

    let client = BackendClient::new(&server.base_url()).expect("mock server URL");
    let (notifier, notices) = Notifier::channel();
    let options = ChatOptions::default().with_demo_delay(std::time::Duration::from_millis(200));
    let mut pipeline = Pipeline::with_notifier(client, options, notifier);

    println!("== health probe ==");
    let healthy = pipeline.probe_backend().await;
    println!("backend healthy: {healthy}\n");

    println!("== connect ==");
    let config = ConnectionConfig {
        base_url: "https://lloydk.atlassian.net/wiki".to_owned(),
        email: "newbie@lloydk.example".to_owned(),
        api_token: "demo-token".to_owned(),
        space_key: "HR".to_owned(),
    };
    let message = pipeline.connect(config).await.expect("connect");
    println!("{message}\n");

    println!("== fetch & filter ==");
    let pages = pipeline.fetch_index().await.expect("fetch index");
    println!(
        "loaded {pages} pages, level-1 categories: {:?}",
        pipeline.index().level1_labels()
    );
    pipeline.index_mut().set_level1(CategoryFilter::label("HR"));
    pipeline.index_mut().select_all_filtered();
    println!(
        "selected {} pages under HR\n",
        pipeline.index().selection().len()
    );

    println!("== embed ==");
    pipeline.initialize_collection().await.expect("initialize");
    let report = pipeline.embed_selection().await.expect("embed");
    println!(
        "{} (new: {}, skipped: {})\n",
        report.message, report.embedded, report.skipped
    );

    println!("== chat (live) ==");
    let turn = pipeline
        .send("연차는 어떻게 사용하나요?")
        .await
        .expect("send");
    println!("assistant: {}", turn.answer.content);
    for source in &turn.answer.sources {
        println!("  - {} ({})", source.title, source.url);
    }

    println!("\n== chat (demo fallback) ==");
    pipeline.enable_demo_mode();
    let turn = pipeline
        .send("경조사 휴가는 며칠인가요?")
        .await
        .expect("send");
    let preview: String = turn.answer.content.chars().take(60).collect();
    println!("assistant: {preview}…");
    println!("citations: {}", turn.answer.sources.len());

    println!("\n== notices ==");
    for notice in notices.drain() {
        println!("[{}] {}", notice.level.as_str(), notice.message);
    }

    let snapshot = pipeline.snapshot();
    println!(
        "\nfinal state: connected={} pages={} selected={} points={} sessions={}",
        snapshot.connected,
        snapshot.pages_loaded,
        snapshot.selected,
        snapshot.collection.point_count,
        snapshot.sessions
    );
    Ok(())
}
