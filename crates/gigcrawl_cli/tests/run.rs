use std::path::Path;

use clap::Parser;
use gigcrawl_cli::{run, Cli, Exit};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key(name: &str) -> Option<String> {
    (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
}

fn write_config(dir: &Path, server: &MockServer) -> String {
    let config_path = dir.join("gigcrawl.ron");
    let content = format!(
        "(delay_ms: 0, extraction: (api_base_url: \"{}/v1\", timeout_secs: 5))",
        server.uri()
    );
    std::fs::write(&config_path, content).unwrap();
    config_path.display().to_string()
}

fn cli(config: &str, output: &Path, sources: &[String]) -> Cli {
    let mut args = vec![
        "gigcrawl".to_string(),
        "--config".to_string(),
        config.to_string(),
        "--output".to_string(),
        output.display().to_string(),
    ];
    for source in sources {
        args.push("--source".to_string());
        args.push(source.clone());
    }
    Cli::parse_from(args)
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/program"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<main><p>Act A, 15.06.2024</p></main>", "text/html"),
        )
        .mount(server)
        .await;
    let content = json!([{ "artist": "Act A", "date": "2024-06-15", "venue": "Club" }]).to_string();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn missing_credential_exits_before_any_request() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server);
    let output = temp.path().join("concerts.json");

    let cli = cli(&config, &output, &[format!("{}/program", server.uri())]);
    let exit = run(&cli, |_| None, CancellationToken::new()).await;

    assert_eq!(exit, Exit::Config);
    assert_eq!(exit.code(), 2);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn invalid_source_url_is_a_config_failure() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server);
    let output = temp.path().join("concerts.json");

    let cli = cli(&config, &output, &["mailto:someone@example.com".to_string()]);
    assert_eq!(run(&cli, key, CancellationToken::new()).await, Exit::Config);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_config_that_does_not_exist_is_a_config_failure() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.ron").display().to_string();
    let cli = cli(&missing, &temp.path().join("out.json"), &[]);
    assert_eq!(run(&cli, key, CancellationToken::new()).await, Exit::Config);
}

#[tokio::test]
async fn successful_run_writes_the_event_list() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server);
    let output = temp.path().join("out").join("concerts.json");

    let cli = cli(&config, &output, &[format!("{}/program", server.uri())]);
    let exit = run(&cli, key, CancellationToken::new()).await;
    assert_eq!(exit, Exit::Success);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written[0]["id"], 1);
    assert_eq!(written[0]["artist"], "Act A");
    assert_eq!(written[0]["date"], "2024-06-15");
    assert_eq!(written[0]["ticketUrl"], Value::Null);
}

#[tokio::test]
async fn cancelled_run_still_exits_cleanly_with_an_empty_list() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server);
    let output = temp.path().join("concerts.json");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let cli = cli(&config, &output, &[format!("{}/program", server.uri())]);
    assert_eq!(run(&cli, key, cancel).await, Exit::Success);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");
}

#[tokio::test]
async fn unwritable_output_exits_with_failure() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &server);
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "file").unwrap();

    let cli = cli(
        &config,
        &blocker.join("concerts.json"),
        &[format!("{}/program", server.uri())],
    );
    let exit = run(&cli, key, CancellationToken::new()).await;
    assert_eq!(exit, Exit::Failure);
    assert_eq!(exit.code(), 1);
}
