use std::time::Duration;

use gigcrawl_core::Source;
use gigcrawl_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer, route: &str) -> Source {
    Source::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

fn fetcher(settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(settings).expect("client builds")
}

#[tokio::test]
async fn fetcher_returns_decoded_html() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><main>ok</main></html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let src = source(&server, "/events");
    let page = fetcher(FetchSettings::default())
        .fetch(&src)
        .await
        .expect("fetch ok");

    assert_eq!(page.source, src);
    assert_eq!(page.final_url, src.as_str());
    assert_eq!(page.html, "<html><main>ok</main></html>");
    assert_eq!(page.encoding, "UTF-8");
}

#[tokio::test]
async fn fetcher_decodes_latin1_from_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(&b"<p>Caf\xe9</p>"[..], "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&source(&server, "/latin"))
        .await
        .expect("fetch ok");
    assert_eq!(page.html, "<p>Café</p>");
}

#[tokio::test]
async fn fetcher_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<main>moved</main>", "text/html"))
        .mount(&server)
        .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&source(&server, "/old"))
        .await
        .expect("fetch ok");
    assert!(page.final_url.ends_with("/new"));
    assert_eq!(page.html, "<main>moved</main>");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let src = source(&server, "/missing");
    let err = fetcher(FetchSettings::default())
        .fetch(&src)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.url, src.as_str());
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&source(&server, "/slow"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&source(&server, "/large"))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn fetcher_accepts_any_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "Act A - 15.06.2024",
            "text/plain; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&source(&server, "/listing.txt"))
        .await
        .expect("fetch ok");
    assert_eq!(page.html, "Act A - 15.06.2024");
}

#[tokio::test]
async fn fetcher_follows_a_long_redirect_chain() {
    let server = MockServer::start().await;
    for hop in 0..6 {
        Mock::given(method("GET"))
            .and(path(format!("/hop{hop}")))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("/hop{}", hop + 1)),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/hop6"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<main>landed</main>", "text/html"))
        .mount(&server)
        .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&source(&server, "/hop0"))
        .await
        .expect("fetch ok");
    assert!(page.final_url.ends_with("/hop6"));
    assert_eq!(page.html, "<main>landed</main>");
}
