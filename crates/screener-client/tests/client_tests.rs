// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use screener_app::{DetailRecord, RetrievalFailure};
use screener_client::{Client, DEFAULT_DETAIL_PATH};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

fn serve_once(status: u16, body: &'static str) -> Result<(String, thread::JoinHandle<String>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let url = request.url().to_owned();
        let response = Response::from_string(body)
            .with_status_code(status)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
        url
    });
    Ok((addr, handle))
}

#[test]
fn fetch_detail_decodes_partial_response() -> Result<()> {
    let (addr, handle) = serve_once(200, r#"{"ok": true, "filename": "a.pdf"}"#)?;

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(1))?;
    let response = client.fetch_detail("a.pdf")?;
    assert!(response.ok);
    assert_eq!(response.filename.as_deref(), Some("a.pdf"));
    assert!(response.email.is_none());

    let url = handle.join().expect("server thread should join");
    assert_eq!(url, "/api/resume_detail?file=a.pdf");
    Ok(())
}

#[test]
fn fetch_detail_sends_encoded_key() -> Result<()> {
    let (addr, handle) = serve_once(200, r#"{"ok": true}"#)?;

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(1))?;
    client.fetch_detail("Jane Doe & Co/cv.pdf")?;

    let url = handle.join().expect("server thread should join");
    assert_eq!(url, "/api/resume_detail?file=Jane+Doe+%26+Co%2Fcv.pdf");
    Ok(())
}

#[test]
fn rejected_lookup_is_returned_for_the_controller() -> Result<()> {
    let (addr, handle) = serve_once(200, r#"{"ok": false, "error": "not found"}"#)?;

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(1))?;
    let response = client.fetch_detail("missing.pdf")?;
    assert!(!response.ok);
    let error = DetailRecord::from_response("missing.pdf", response)
        .expect_err("ok=false must not build a record");
    assert_eq!(
        error,
        RetrievalFailure::Rejected(Some("not found".to_owned()))
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_success_status_is_a_retrieval_failure() -> Result<()> {
    let (addr, handle) = serve_once(404, r#"{"ok": false, "error": "missing"}"#)?;

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(1))?;
    let error = client
        .fetch_detail("gone.pdf")
        .expect_err("404 should fail");
    assert_eq!(error, RetrievalFailure::Status(404));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn undecodable_body_is_a_retrieval_failure() -> Result<()> {
    let (addr, handle) = serve_once(200, "<html>oops</html>")?;

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(1))?;
    let error = client
        .fetch_detail("a.pdf")
        .expect_err("html body should fail");
    assert!(matches!(error, RetrievalFailure::Decode(_)), "got {error:?}");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_server_is_a_transport_failure() -> Result<()> {
    let client = Client::new(
        "http://127.0.0.1:1",
        DEFAULT_DETAIL_PATH,
        Duration::from_millis(200),
    )?;
    let error = client
        .fetch_detail("a.pdf")
        .expect_err("unreachable endpoint should fail");
    match error {
        RetrievalFailure::Transport(message) => {
            assert!(message.contains("screener server running"), "{message}");
        }
        RetrievalFailure::Timeout => {}
        other => panic!("unexpected failure {other:?}"),
    }

    let ping = client.ping().expect_err("ping should fail");
    assert!(ping.to_string().contains("cannot reach"));
    Ok(())
}

#[test]
fn slow_server_hits_timeout() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        thread::sleep(Duration::from_millis(500));
        let _ = request.respond(Response::from_string(r#"{"ok": true}"#));
    });

    let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_millis(100))?;
    let error = client
        .fetch_detail("slow.pdf")
        .expect_err("slow response should time out");
    assert_eq!(error, RetrievalFailure::Timeout);

    handle.join().expect("server thread should join");
    Ok(())
}
