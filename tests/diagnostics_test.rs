use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

use courier::config::{KeySource, Settings};
use courier::dispatch::{Dispatcher, Reply};
use courier::downstream::mock::{MockTransport, Scripted};

const KEY: &str = "k";
const SNIPPET_MESSAGE: &str = "llm payload snippet";

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run one `llm_elicit` call against `reply` and return the log output.
async fn elicit_logs(debug_payloads: bool, reply: Scripted) -> (Reply, String) {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let settings = Settings {
        debug_payloads,
        ..Settings::new(3000, None, None, Some("http://prompt".to_string()))
    };
    let dispatcher = Dispatcher::new(
        settings,
        KeySource::Fixed(KEY.to_string()),
        Arc::new(MockTransport::new(vec![reply])),
    );
    let result = dispatcher
        .dispatch(Some(KEY), &json!({"action": "llm_elicit", "question": "q"}), "diag")
        .await;

    (result, captured.text())
}

fn snippet_line(logs: &str) -> Option<&str> {
    logs.lines().find(|line| line.contains(SNIPPET_MESSAGE))
}

#[tokio::test]
async fn snippet_logged_when_debug_payloads_on() {
    let (reply, logs) = elicit_logs(true, Scripted::ok(json!({"summary": "short"}))).await;

    assert_eq!(reply.status, 200);
    let line = snippet_line(&logs).expect("snippet line missing");
    assert!(line.contains(r#"{"summary":"short"}"#), "{line}");
}

#[tokio::test]
async fn snippet_not_logged_by_default() {
    let (reply, logs) = elicit_logs(false, Scripted::ok(json!({"summary": "short"}))).await;

    assert_eq!(reply.status, 200);
    assert!(snippet_line(&logs).is_none(), "{logs}");
    assert!(!logs.contains(r#"{"summary":"short"}"#), "{logs}");
}

#[tokio::test]
async fn snippet_is_cut_to_500_chars() {
    let long = "z".repeat(2000);
    let (_, logs) = elicit_logs(true, Scripted::ok(json!({"text": long}))).await;

    let line = snippet_line(&logs).expect("snippet line missing");
    let (_, snippet) = line.rsplit_once("snippet=").unwrap();
    let snippet = snippet.trim_end();
    assert_eq!(snippet.chars().count(), 500);
    assert!(snippet.starts_with(r#"{"text":"zzz"#));
    assert!(!line.contains(&"z".repeat(492)));
}

#[tokio::test]
async fn error_bodies_logged_without_debug_payloads() {
    let (reply, logs) = elicit_logs(
        false,
        Scripted::Respond {
            status: 500,
            body: json!({"error": "model overloaded"}),
        },
    )
    .await;

    assert_eq!(reply.status, 502);
    assert!(snippet_line(&logs).is_none(), "{logs}");
    let line = logs
        .lines()
        .find(|line| line.contains("downstream error status"))
        .expect("error status line missing");
    assert!(line.contains("model overloaded"), "{line}");
    assert!(line.contains("status=500"), "{line}");
}
