#![cfg(feature = "url")]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use tabload::ingestion::{load_from_url, LoadOptions};
use tabload::naming::TableCounter;
use tabload::types::Value;
use tabload::LoadError;

/// Serve one HTTP response on a random local port and return the base URL.
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
    });
    format!("http://{addr}")
}

fn fresh() -> LoadOptions {
    LoadOptions {
        counter: Arc::new(TableCounter::new()),
        ..Default::default()
    }
}

#[test]
fn csv_over_http_uses_text_naming() {
    let base = serve_once("200 OK", "a,b\n1,x\n");
    let tables = load_from_url(&format!("{base}/exports/people.csv?v=2"), &fresh()).unwrap();
    assert_eq!(tables[0].name, "csv0");
    assert_eq!(
        tables[0].rows[0],
        vec![Value::Integer(1), Value::Text("x".to_string())]
    );
}

#[test]
fn filename_is_the_url_path_stem() {
    let base = serve_once("200 OK", r#"[{"k": 1}]"#);
    let opts = LoadOptions {
        table_name: Some("%(filename)s_%(key)s".to_string()),
        ..fresh()
    };
    let tables = load_from_url(&format!("{base}/data/people.json"), &opts).unwrap();
    assert_eq!(tables[0].name, "people_json0");
}

#[test]
fn explicit_format_ignores_the_url_path() {
    let base = serve_once("200 OK", "| a |\n|---|\n| 1 |\n");
    let opts = LoadOptions {
        format: Some("markdown".to_string()),
        ..fresh()
    };
    let tables = load_from_url(&format!("{base}/render"), &opts).unwrap();
    assert_eq!(tables[0].rows, vec![vec![Value::Integer(1)]]);
}

#[test]
fn error_status_is_an_http_error() {
    let base = serve_once("404 Not Found", "missing");
    let err = load_from_url(&format!("{base}/nope.csv"), &fresh()).unwrap_err();
    match err {
        LoadError::Http { message, .. } => assert!(message.contains("404"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bad_urls_fail_before_any_request() {
    let err = load_from_url("ftp://example.com/a.csv", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidUrl { .. }));

    let err = load_from_url("https://example.invalid/data.unknownext", &fresh()).unwrap_err();
    assert!(matches!(err, LoadError::LoaderNotFound { .. }));
}
