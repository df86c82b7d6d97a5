// End-to-end inspections against a local mock server.
//
// Every page and every link target is served by wiremock, so these tests
// need no internet connection.

use std::time::Duration;

use page_inspector::{Inspector, InspectorConfig, WaitOutcome};
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn inspector() -> Inspector {
    Inspector::new(InspectorConfig::default()).expect("default config is valid")
}

#[tokio::test]
async fn test_full_inspection() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = format!(
        r##"<!DOCTYPE html>
        <html>
        <head><title>Mock   Home</title></head>
        <body>
          <h1>Welcome</h1>
          <h2><em>Section</em> one</h2>
          <h2>Section two</h2>
          <form>
            <input type="text" name="user">
            <input type="password" name="pass">
            <input type="password" name="again"/>
          </form>
          <a href="/ok">Fine</a>
          <a href="/missing">Broken</a>
          <a href="{base}/external">Outside</a>
          <a href="{base}/bot">Bot wall</a>
          <a href="rel">Relative</a>
          <a href="#top">Top</a>
          <a href="mailto:team@example.com">Mail</a>
        </body>
        </html>"##
    );

    serve(&server, "/index.html", html(page)).await;
    serve(&server, "/ok", ResponseTemplate::new(200)).await;
    serve(&server, "/missing", ResponseTemplate::new(404)).await;
    serve(&server, "/external", ResponseTemplate::new(301).insert_header("location", "/ok")).await;
    serve(&server, "/bot", ResponseTemplate::new(999)).await;
    // relative links are appended to the page URL as-is
    serve(&server, "/index.html/rel", ResponseTemplate::new(200)).await;

    let deadline = Instant::now() + Duration::from_secs(20);
    let inspection = inspector()
        .inspect(&format!("{}/index.html", base), Some(deadline))
        .await;

    assert_eq!(inspection.wait().await, WaitOutcome::Drained);
    let snapshot = inspection.snapshot();

    assert_eq!(snapshot.status_code, 200);
    assert_eq!(snapshot.status_msg, "200 OK");
    assert!(!snapshot.body_truncated);
    assert_eq!(snapshot.html_version, "HTML 5");
    assert_eq!(snapshot.page_title, "Mock Home");
    assert_eq!(snapshot.headings["h1"], vec!["Welcome"]);
    assert_eq!(snapshot.headings["h2"], vec!["Section", "Section two"]);
    assert_eq!(snapshot.login_field_count, 2);

    assert_eq!(snapshot.total_link_count, 7);
    assert_eq!(snapshot.links.len(), 7);
    assert_eq!(snapshot.internal_link_count, 4);
    assert_eq!(snapshot.external_link_count, 3);
    assert_eq!(
        snapshot.internal_link_count + snapshot.external_link_count,
        snapshot.total_link_count
    );

    assert_eq!(snapshot.accessible_link_count, 4);
    assert_eq!(snapshot.inaccessible_link_count, 1);
    assert_eq!(snapshot.not_analysed_link_count, 0);

    let types: Vec<&str> = snapshot.links.iter().map(|l| l.link_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["absolute", "absolute", "external", "unscannable", "relative", "fragment", "email"]
    );

    let statuses: Vec<u16> = snapshot.links.iter().map(|l| l.status_code).collect();
    assert_eq!(statuses, vec![200, 404, 200, 200, 200, 0, 0]);
}

#[tokio::test]
async fn test_deadline_leaves_links_not_analysed() {
    let server = MockServer::start().await;

    let links: String = (0..5)
        .map(|i| format!(r#"<a href="/slow/{i}">slow {i}</a>"#))
        .collect();
    serve(&server, "/", html(links)).await;

    for i in 0..5 {
        serve(
            &server,
            &format!("/slow/{i}"),
            ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
        )
        .await;
    }

    let config = InspectorConfig {
        max_concurrent_probes: 2,
        ..InspectorConfig::default()
    };
    let inspector = Inspector::new(config).unwrap();

    let started = std::time::Instant::now();
    let deadline = Instant::now() + Duration::from_millis(300);
    let inspection = inspector.inspect(&server.uri(), Some(deadline)).await;

    assert_eq!(inspection.wait().await, WaitOutcome::DeadlineElapsed);
    assert!(started.elapsed() < Duration::from_secs(5));

    let counts = inspection.link_counts();
    assert_eq!(counts.total, 5);
    assert!(counts.not_analysed > 0);
    assert_eq!(
        counts.accessible + counts.inaccessible + counts.not_analysed,
        counts.analyzable
    );
}

#[tokio::test]
async fn test_snapshot_while_probing_stays_consistent() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/page/{i}">page {i}</a>"#))
        .collect();
    serve(&server, "/", html(links)).await;
    for i in 0..20 {
        serve(
            &server,
            &format!("/page/{i}"),
            ResponseTemplate::new(200).set_delay(Duration::from_millis(5 * i)),
        )
        .await;
    }

    let deadline = Instant::now() + Duration::from_secs(20);
    let inspection = inspector().inspect(&server.uri(), Some(deadline)).await;

    // Counts taken mid-flight may lag behind, but never exceed the total
    let early = inspection.link_counts();
    assert!(early.accessible + early.inaccessible + early.not_analysed <= early.total);

    assert_eq!(inspection.wait().await, WaitOutcome::Drained);
    let done = inspection.link_counts();
    assert_eq!(done.accessible, 20);
    assert_eq!(done.not_analysed, 0);
    assert_eq!(done.accessible + done.inaccessible + done.not_analysed, done.total);
}

#[tokio::test]
async fn test_error_page_is_still_scanned() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/nope",
        ResponseTemplate::new(404).set_body_string("<title>Page not found</title><h1>Oops</h1>"),
    )
    .await;

    let inspection = inspector()
        .inspect(&format!("{}/nope", server.uri()), None)
        .await;

    let snapshot = inspection.snapshot();
    assert_eq!(snapshot.status_code, 404);
    assert_eq!(snapshot.status_msg, "404 Not Found");
    assert_eq!(snapshot.page_title, "Page not found");
    assert_eq!(snapshot.headings["h1"], vec!["Oops"]);
}

#[tokio::test]
async fn test_unreachable_host_defaults_to_https_and_400() {
    let inspection = inspector().inspect("127.0.0.1:1", None).await;

    let snapshot = inspection.snapshot();
    assert_eq!(snapshot.url, "https://127.0.0.1:1");
    assert_eq!(snapshot.status_code, 400);
    assert!(!snapshot.status_msg.is_empty());
    assert_eq!(snapshot.html_version, "Not defined");
    assert_eq!(snapshot.total_link_count, 0);
}
