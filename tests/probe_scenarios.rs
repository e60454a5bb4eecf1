use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tracker_scout::config::ProbeConfig;
use tracker_scout::{Endpoint, Orchestrator, Probe, ProbeError, TrackerProber};

const ACTION_CONNECT: u32 = 0;
const ACTION_ERROR: u32 = 3;

#[derive(Clone, Copy)]
enum Reply {
    Correct,
    WrongTransaction,
    Action(u32),
    Truncated,
    Silent,
}

/// A loopback UDP "tracker" answering every connect request per `reply`.
async fn udp_tracker(reply: Reply) -> (String, tokio::task::JoinHandle<()>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = socket.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 64];
        loop {
            let Ok((size, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            if size < 16 {
                continue;
            }
            let transaction_id = u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]);

            let (action, transaction_id) = match reply {
                Reply::Correct | Reply::Truncated => (ACTION_CONNECT, transaction_id),
                Reply::WrongTransaction => (ACTION_CONNECT, transaction_id.wrapping_add(1)),
                Reply::Action(action) => (action, transaction_id),
                Reply::Silent => continue,
            };

            let mut response = Vec::with_capacity(16);
            response.extend_from_slice(&action.to_be_bytes());
            response.extend_from_slice(&transaction_id.to_be_bytes());
            response.extend_from_slice(&0x1122334455667788u64.to_be_bytes());
            if matches!(reply, Reply::Truncated) {
                response.truncate(10);
            }
            let _ = socket.send_to(&response, peer).await;
        }
    });

    (format!("udp://127.0.0.1:{port}"), handle)
}

/// A loopback HTTP server answering every request with `status`.
async fn http_tracker(status: u16, reason: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://127.0.0.1:{port}/announce")
}

fn probe_config() -> ProbeConfig {
    ProbeConfig {
        concurrency_limit: 16,
        probe_timeout: Duration::from_millis(400),
        ..ProbeConfig::default()
    }
}

async fn probe_url(url: &str) -> Result<Duration, ProbeError> {
    let config = probe_config();
    let prober = TrackerProber::new(&config).unwrap();
    let endpoint = Endpoint::parse(url).unwrap();
    prober.probe(&endpoint, config.probe_timeout).await
}

#[tokio::test]
async fn test_udp_correct_reply_is_alive() {
    let (url, _server) = udp_tracker(Reply::Correct).await;
    assert!(probe_url(&url).await.is_ok());
}

#[tokio::test]
async fn test_udp_transaction_mismatch_is_dead() {
    let (url, _server) = udp_tracker(Reply::WrongTransaction).await;
    assert!(matches!(
        probe_url(&url).await,
        Err(ProbeError::TransactionMismatch { .. })
    ));
}

#[tokio::test]
async fn test_udp_error_action_is_dead() {
    let (url, _server) = udp_tracker(Reply::Action(ACTION_ERROR)).await;
    assert!(matches!(
        probe_url(&url).await,
        Err(ProbeError::UnexpectedAction(ACTION_ERROR))
    ));
}

#[tokio::test]
async fn test_udp_truncated_reply_is_dead() {
    let (url, _server) = udp_tracker(Reply::Truncated).await;
    assert!(matches!(
        probe_url(&url).await,
        Err(ProbeError::ShortDatagram(10))
    ));
}

#[tokio::test]
async fn test_udp_silent_tracker_times_out() {
    let (url, _server) = udp_tracker(Reply::Silent).await;
    assert!(matches!(probe_url(&url).await, Err(ProbeError::Timeout)));
}

#[tokio::test]
async fn test_http_404_proves_liveness() {
    let url = http_tracker(404, "Not Found").await;
    assert!(probe_url(&url).await.is_ok());
}

#[tokio::test]
async fn test_http_503_is_dead() {
    let url = http_tracker(503, "Service Unavailable").await;
    assert!(matches!(
        probe_url(&url).await,
        Err(ProbeError::RejectedStatus(503))
    ));
}

#[tokio::test]
async fn test_one_answering_one_silent_udp_tracker() {
    let (a, _a_server) = udp_tracker(Reply::Correct).await;
    let (b, _b_server) = udp_tracker(Reply::Silent).await;

    let config = probe_config();
    let prober = TrackerProber::new(&config).unwrap();
    let orchestrator = Orchestrator::new(Arc::new(prober), config);

    let result = orchestrator.orchestrate(&[a.clone(), b]).await.unwrap();
    let urls: Vec<_> = result.iter().map(|t| t.url.clone()).collect();
    assert_eq!(urls, vec![a]);
}

#[tokio::test]
async fn test_mixed_schemes_end_to_end() {
    let (udp, _server) = udp_tracker(Reply::Correct).await;
    let alive_http = http_tracker(400, "Bad Request").await;
    let dead_http = http_tracker(502, "Bad Gateway").await;

    let ws_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ws = format!("ws://127.0.0.1:{}", ws_listener.local_addr().unwrap().port());

    let config = ProbeConfig {
        rank_by_latency: false,
        ..probe_config()
    };
    let prober = TrackerProber::new(&config).unwrap();
    let orchestrator = Orchestrator::new(Arc::new(prober), config);

    let candidates = vec![udp.clone(), alive_http.clone(), dead_http, ws.clone()];
    let result = orchestrator.orchestrate(&candidates).await.unwrap();

    let mut expected = vec![udp, alive_http, ws];
    expected.sort();
    let urls: Vec<_> = result.iter().map(|t| t.url.clone()).collect();
    assert_eq!(urls, expected);
}

/// Sleeps a fixed time and tracks how many calls overlap.
struct SleepingProbe {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Probe for SleepingProbe {
    async fn probe(
        &self,
        _endpoint: &Endpoint,
        _timeout: Duration,
    ) -> Result<Duration, ProbeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.delay)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_thousand_probes_run_in_waves() {
    let probe = Arc::new(SleepingProbe {
        delay: Duration::from_millis(100),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let config = ProbeConfig {
        concurrency_limit: 200,
        probe_timeout: Duration::from_secs(5),
        max_results: 0,
        ..ProbeConfig::default()
    };
    let orchestrator = Orchestrator::new(probe.clone(), config);
    let candidates: Vec<String> = (0..1000).map(|i| format!("udp://host{i}.test:80")).collect();

    let started = Instant::now();
    let result = orchestrator.orchestrate(&candidates).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.len(), 1000);
    assert!(probe.peak.load(Ordering::SeqCst) <= 200);
    // five waves of 100ms, far below the 100s a serial run would take
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}
