mod support;

use std::time::Duration;

use pdfprint_lib::{
    LoadTimeoutPolicy, ObjectAcl, PipelineRequest, PrintError, PrintOptions, RenderSettings,
};
use support::{handler, FakeBrowser, FakeStore, StoreBehavior, FAKE_PDF};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn request(url: &str) -> PipelineRequest {
    PipelineRequest::new([("url", url)])
}

fn is_object_key(key: &str) -> bool {
    let Some(stem) = key.strip_suffix(".pdf") else {
        return false;
    };
    let Some((random, millis)) = stem.split_once('_') else {
        return false;
    };
    random.len() == 26
        && random
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        && !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
}

#[tokio::test(start_paused = true)]
async fn successful_render_and_upload_returns_public_url() {
    let browser = FakeBrowser::loading_after(Duration::from_millis(250));
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let response = handler
        .handle(PipelineRequest::new([
            ("url", "https://example.com"),
            ("landscape", "true"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let puts = puts.lock().unwrap();
    assert_eq!(puts.len(), 1);
    let put = &puts[0];
    assert!(is_object_key(&put.key), "unexpected key {}", put.key);
    assert_eq!(put.bucket, "docs");
    assert_eq!(put.body, FAKE_PDF);
    assert_eq!(put.content_type, "application/pdf");
    assert_eq!(put.acl, ObjectAcl::PublicRead);
    assert_eq!(put.expires_in, Duration::from_secs(360));

    let url = response.parsed_body().unwrap().url.unwrap();
    assert_eq!(
        url.as_str(),
        format!("https://s3-us-west-2.amazonaws.com/docs/{}", put.key)
    );

    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.navigated, vec!["https://example.com".to_string()]);
    assert_eq!(recorder.printed.len(), 1);
    let printed = &recorder.printed[0];
    assert!(printed.landscape);
    assert_eq!(
        PrintOptions {
            landscape: false,
            ..printed.clone()
        },
        PrintOptions::default()
    );
    assert_eq!(recorder.opened, 1);
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn url_is_not_treated_as_print_option() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let recorder = browser.recorder();
    let (store, _puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    handler.handle(request("https://example.com")).await.unwrap();

    assert_eq!(recorder.lock().unwrap().printed[0], PrintOptions::default());
}

#[tokio::test(start_paused = true)]
async fn load_timeout_prints_best_effort_after_deadline() {
    let browser = FakeBrowser::never_loading();
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let start = Instant::now();
    let response = handler.handle(request("https://slow.example.com")).await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(60), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(61), "returned after {elapsed:?}");
    assert!(response.parsed_body().unwrap().url.is_some());
    assert_eq!(puts.lock().unwrap().len(), 1);
    assert_eq!(recorder.lock().unwrap().printed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn load_timeout_fails_under_fail_fast_policy() {
    let browser = FakeBrowser::never_loading();
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let settings = RenderSettings {
        page_load_timeout: Duration::from_secs(5),
        load_timeout_policy: LoadTimeoutPolicy::FailFast,
        ..RenderSettings::default()
    };
    let handler = handler(browser, store, settings);

    let err = handler.handle(request("https://slow.example.com")).await.unwrap_err();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert_eq!(err.to_string(), "Unable to print pdf");
    assert!(puts.lock().unwrap().is_empty());
    let recorder = recorder.lock().unwrap();
    assert!(recorder.printed.is_empty());
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn print_failure_surfaces_generic_error_and_closes_session() {
    let browser = FakeBrowser {
        fail_print: true,
        ..FakeBrowser::loading_after(Duration::from_millis(10))
    };
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let err = handler.handle(request("https://example.com")).await.unwrap_err();

    assert_eq!(err.to_string(), "Unable to print pdf");
    assert!(puts.lock().unwrap().is_empty());
    let recorder = recorder.lock().unwrap();
    assert_eq!(recorder.opened, 1);
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_surfaces_generic_error_without_upload() {
    let browser = FakeBrowser {
        fail_navigate: true,
        ..FakeBrowser::loading_after(Duration::ZERO)
    };
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let err = handler.handle(request("https://unresolvable.invalid")).await.unwrap_err();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert_eq!(err.to_string(), "Unable to print pdf");
    assert!(puts.lock().unwrap().is_empty());
    let recorder = recorder.lock().unwrap();
    assert!(recorder.printed.is_empty());
    assert_eq!(recorder.opened, 1);
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn domain_enable_failure_skips_navigation() {
    let browser = FakeBrowser {
        fail_enable: true,
        ..FakeBrowser::loading_after(Duration::ZERO)
    };
    let recorder = browser.recorder();
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let err = handler.handle(request("https://example.com")).await.unwrap_err();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert!(puts.lock().unwrap().is_empty());
    let recorder = recorder.lock().unwrap();
    assert!(recorder.navigated.is_empty());
    assert!(recorder.printed.is_empty());
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn upload_rejection_returns_null_url() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let (store, puts) = FakeStore::new(StoreBehavior::Reject);
    let handler = handler(browser, store, RenderSettings::default());

    let response = handler.handle(request("https://example.com")).await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"url":null}"#);
    assert_eq!(puts.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn upload_timeout_returns_null_url_after_deadline() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let (store, _puts) = FakeStore::new(StoreBehavior::Hang);
    let handler = handler(browser, store, RenderSettings::default());

    let start = Instant::now();
    let response = handler.handle(request("https://example.com")).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, r#"{"url":null}"#);
    assert!(elapsed >= Duration::from_secs(30), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(31), "returned after {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn missing_url_fails_without_opening_a_session() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let recorder = browser.recorder();
    let (store, _puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let err = handler
        .handle(PipelineRequest::new([("landscape", "true")]))
        .await
        .unwrap_err();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert_eq!(recorder.lock().unwrap().opened, 0);
}

#[tokio::test(start_paused = true)]
async fn no_targets_is_a_render_failure() {
    let browser = FakeBrowser {
        no_targets: true,
        ..FakeBrowser::loading_after(Duration::ZERO)
    };
    let recorder = browser.recorder();
    let (store, _puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let err = handler.handle(request("https://example.com")).await.unwrap_err();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert_eq!(recorder.lock().unwrap().opened, 0);
}

#[tokio::test(start_paused = true)]
async fn consecutive_requests_use_distinct_keys() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let (store, puts) = FakeStore::new(StoreBehavior::Accept);
    let handler = handler(browser, store, RenderSettings::default());

    let first = handler.handle(request("https://example.com/a")).await.unwrap();
    let second = handler.handle(request("https://example.com/b")).await.unwrap();

    let puts = puts.lock().unwrap();
    assert_eq!(puts.len(), 2);
    assert_ne!(puts[0].key, puts[1].key);
    assert_ne!(
        first.parsed_body().unwrap().url,
        second.parsed_body().unwrap().url
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_pending_load_wait() {
    let browser = FakeBrowser::never_loading();
    let recorder = browser.recorder();
    let (store, _puts) = FakeStore::new(StoreBehavior::Accept);
    let shutdown = CancellationToken::new();
    let handler =
        handler(browser, store, RenderSettings::default()).with_shutdown(shutdown.clone());

    let cancel = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        shutdown.cancel();
    });

    let start = Instant::now();
    let err = handler.handle(request("https://example.com")).await.unwrap_err();
    cancel.await.unwrap();

    assert!(matches!(err, PrintError::UnableToPrint));
    assert!(start.elapsed() < Duration::from_secs(2));
    let recorder = recorder.lock().unwrap();
    assert!(recorder.printed.is_empty());
    assert_eq!(recorder.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn version_logging_does_not_affect_render() {
    let browser = FakeBrowser::loading_after(Duration::ZERO);
    let recorder = browser.recorder();
    let (store, _puts) = FakeStore::new(StoreBehavior::Accept);
    let settings = RenderSettings {
        log_browser_version: true,
        ..RenderSettings::default()
    };
    let handler = handler(browser, store, settings);

    handler.handle(request("https://example.com")).await.unwrap();

    assert_eq!(recorder.lock().unwrap().printed.len(), 1);
}
