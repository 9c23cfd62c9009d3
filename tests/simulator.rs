//! End-to-end behaviour of the `/request` endpoint over real sockets.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use response_simulator::config::SimulatorConfig;
use response_simulator::shaping::SampleHeaderPool;

mod common;

const JSON: &str = "application/json; charset=utf-8";

#[tokio::test]
async fn test_defaults_match_explicit_parameters() {
    let server = common::start_server().await;
    let client = common::client();

    let implicit = client.get(server.url("")).send().await.unwrap();
    assert_eq!(implicit.status(), StatusCode::OK);
    assert_eq!(implicit.headers()[CONTENT_TYPE], JSON);
    let implicit = implicit.bytes().await.unwrap();

    let explicit = client
        .get(server.url("time=0&headers=400&body=400"))
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();

    assert_eq!(implicit, explicit);
    let expected = format!(r#"{{"a":""{}""}}"#, "B".repeat(392));
    assert_eq!(&implicit[..], expected.as_bytes());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_body_templates() {
    let server = common::start_server().await;
    let client = common::client();

    let cases: [(u32, &str); 6] = [
        (1, "1"),
        (2, "12"),
        (3, r#"""3"""#),
        (5, r#"""333"""#),
        (8, r#"{"a":""""}"#),
        (10, r#"{"a":""BB""}"#),
    ];
    for (size, expected) in cases {
        let res = client.get(server.url(&format!("body={size}"))).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "body={size}");
        assert_eq!(res.headers()[CONTENT_TYPE], JSON, "body={size}");
        assert_eq!(res.text().await.unwrap(), expected, "body={size}");
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_zero_body_is_no_content() {
    let server = common::start_server().await;
    let client = common::client();

    let res = client.get(server.url("body=0")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.headers().get(CONTENT_TYPE).is_none());
    assert!(res.headers().get("etag").is_some());
    assert!(res.bytes().await.unwrap().is_empty());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_invalid_parameters() {
    let server = common::start_server().await;
    let client = common::client();

    let queries = [
        "time=",
        "time=abc",
        "time=1.5",
        "time=-1",
        "time=5001",
        "headers=1001",
        "headers=x",
        "body=2001",
        "body=-0.0",
        "time=10&headers=10&body=99999",
    ];
    for query in queries {
        let res = client.get(server.url(query)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{query}");
        assert!(res.headers().get("etag").is_none(), "{query}");
        assert_eq!(res.text().await.unwrap(), "invalid request params", "{query}");
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_header_budget() {
    let server = common::start_server().await;
    let client = common::client();
    let pool = SampleHeaderPool::builtin();

    // Content-Type alone consumes a budget of 45.
    for query in ["headers=0&body=400", "headers=45&body=1"] {
        let res = client.get(server.url(query)).send().await.unwrap();
        assert_eq!(res.headers()[CONTENT_TYPE], JSON, "{query}");
        for (name, _) in pool.iter() {
            assert!(res.headers().get(name.as_str()).is_none(), "{query}: unexpected {name}");
        }
    }

    for query in ["headers=46&body=1", "headers=1000&body=2000", "headers=1&body=0"] {
        let res = client.get(server.url(query)).send().await.unwrap();
        for (name, value) in pool.iter() {
            let got = res.headers().get(name.as_str());
            assert_eq!(got.map(|v| v.as_bytes()), Some(value.as_bytes()), "{query}: {name}");
        }
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_request_id_comes_from_pool_only() {
    let server = common::start_server().await;
    let client = common::client();

    let res = client.get(server.url("headers=400")).send().await.unwrap();
    assert_eq!(res.headers()["x-request-id"], "ABCDEFGHIJKLMNOPQRSTUV");

    let res = client.get(server.url("headers=0")).send().await.unwrap();
    assert!(res.headers().get("x-request-id").is_none());

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let server = common::start_server().await;
    let client = common::client();

    let mut previous: Option<(StatusCode, Vec<(String, Vec<u8>)>, Vec<u8>)> = None;
    for _ in 0..3 {
        let res = client.get(server.url("headers=700&body=321")).send().await.unwrap();
        let status = res.status();
        let mut headers: Vec<_> = res
            .headers()
            .iter()
            .filter(|(name, _)| name.as_str() != "date")
            .map(|(name, value)| (name.to_string(), value.as_bytes().to_vec()))
            .collect();
        headers.sort();
        let body = res.bytes().await.unwrap().to_vec();

        let current = (status, headers, body);
        if let Some(previous) = &previous {
            assert_eq!(previous, &current);
        }
        previous = Some(current);
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_any_method_is_served() {
    let server = common::start_server().await;
    let client = common::client();

    for method in [reqwest::Method::POST, reqwest::Method::PUT, reqwest::Method::PATCH] {
        let res = client.request(method.clone(), server.url("body=2")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{method}");
        assert_eq!(res.text().await.unwrap(), "12");
    }

    let res = client.get(format!("http://{}/elsewhere", server.addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_wait_is_applied() {
    let server = common::start_server().await;
    let client = common::client();

    let start = Instant::now();
    let res = client.get(server.url("time=300&body=1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(start.elapsed() >= Duration::from_millis(300));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_slow_request_does_not_block_fast_one() {
    let server = common::start_server().await;
    let client = common::client();

    let slow_url = server.url("time=2000&body=1");
    let slow_client = client.clone();
    let slow = tokio::spawn(async move {
        let start = Instant::now();
        let res = slow_client.get(slow_url).send().await.unwrap();
        (res.status(), start.elapsed())
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    let res = client.get(server.url("time=0&body=1")).send().await.unwrap();
    let fast_elapsed = start.elapsed();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(fast_elapsed < Duration::from_millis(1000), "fast request took {fast_elapsed:?}");
    assert!(!slow.is_finished());

    let (status, slow_elapsed) = slow.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(slow_elapsed >= Duration::from_millis(2000));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_incomplete_headers_time_out() {
    let mut config = SimulatorConfig::default();
    config.timeouts.read_header_secs = 1;
    config.timeouts.shutdown_grace_secs = 1;
    let server = common::start_server_with(config).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET /request HTTP/1.1\r\nHost: localhost\r\n").await.unwrap();

    let mut buf = Vec::new();
    let closed = tokio::time::timeout(Duration::from_secs(4), stream.read_to_end(&mut buf)).await;
    assert!(closed.is_ok(), "connection was not closed after the read-header timeout");
    assert!(!String::from_utf8_lossy(&buf).contains("200 OK"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = common::start_server().await;
    let addr = server.addr;
    let client = common::client();

    let res = client.get(server.url("body=1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.stop().await.unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
