use std::{
    sync::{
        Arc, Mutex, Once,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use hardstyle_watcher::scraper::{HttpFetcher, PageFetcher};
use hardstyle_watcher::utils::RetryPolicy;
use log::{Level, LevelFilter, Log, Metadata, Record};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

// Keeps every log record so tests can look for retry warnings
struct CapturingLogger;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static LOGGER: CapturingLogger = CapturingLogger;
static INIT: Once = Once::new();

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

fn install_logger() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Debug);
    });
}

fn warnings_about(url: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, message)| *level == Level::Warn && message.contains(url))
        .map(|(_, message)| message.clone())
        .collect()
}

// Answers the n-th request with the n-th status, repeating the last one
async fn serve(statuses: Vec<u16>, body: &'static str) -> (String, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst) as usize;
            let status = statuses.get(n).or(statuses.last()).copied().unwrap_or(200);

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let read = socket.read(&mut chunk).await.unwrap_or(0);
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let body = if status == 200 { body } else { "" };
            let response = format!(
                "HTTP/1.1 {status} Status\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/releases/"), hits)
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(
        RetryPolicy::new(3, Duration::from_millis(5), 2.0),
        Duration::ZERO,
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_retries_server_errors() {
    install_logger();
    let (url, hits) = serve(vec![500, 502, 200], "<html>releases</html>").await;

    let body = fetcher().fetch(&url).await.unwrap();

    assert_eq!(body, "<html>releases</html>");
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    // One warning before each of the two retries
    let warnings = warnings_about(&url);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("Attempt 1/3"));
    assert!(warnings[1].contains("Attempt 2/3"));
}

#[tokio::test]
async fn test_fetch_gives_up_after_policy_tries() {
    install_logger();
    let (url, hits) = serve(vec![503], "").await;

    let err = fetcher().fetch(&url).await.unwrap_err();

    assert_eq!(err.url, url);
    assert!(err.to_string().contains("503"));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(warnings_about(&url).len(), 2);
}

#[tokio::test]
async fn test_fetch_success_makes_one_request() {
    install_logger();
    let (url, hits) = serve(vec![200], "ok").await;

    assert_eq!(fetcher().fetch(&url).await.unwrap(), "ok");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(warnings_about(&url).is_empty());
}
