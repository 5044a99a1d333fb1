//! Autoplay scheduler tests: cooperative timer loop with cancellation.

use async_trait::async_trait;
use kairos::config::ReplayConfig;
use kairos::core::ResourceGroup;
use kairos::replay::autoplay::Autoplay;
use kairos::replay::driver::ReplayDriver;
use kairos::replay::session::ReplaySession;
use kairos::sink::{SinkAdapter, SinkError, StreamMetadata};
use oxigraph::io::RdfFormat;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

const MADE_BY: &str = "https://saref.etsi.org/core/measurementMadeBy";
const HAS_TIMESTAMP: &str = "https://saref.etsi.org/core/hasTimestamp";

struct MockSink {
    fail_writes: bool,
    writes: StdMutex<usize>,
}

impl MockSink {
    fn new() -> Arc<Self> {
        Arc::new(Self { fail_writes: false, writes: StdMutex::new(0) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { fail_writes: true, writes: StdMutex::new(0) })
    }

    fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl SinkAdapter for MockSink {
    async fn probe_existing_stream(
        &self,
        _destination: &str,
    ) -> Result<Option<StreamMetadata>, SinkError> {
        Ok(None)
    }

    async fn write_batch(
        &self,
        _destination: &str,
        _groups: &[ResourceGroup],
        _ordering_attribute: &str,
        _bucket_size: usize,
    ) -> Result<(), SinkError> {
        if self.fail_writes {
            return Err(SinkError::Write { status: 500, body: "mock failure".to_string() });
        }
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// A sequenced session over observations one second apart.
fn sequenced_session(count: usize, sink: Arc<MockSink>) -> ReplaySession {
    let mut doc = String::new();
    for i in 0..count {
        let subject = format!("http://example.org/obs/{}", i);
        doc.push_str(&format!(
            "<{}> <{}> <http://example.org/sensor/1> .\n",
            subject, MADE_BY
        ));
        doc.push_str(&format!(
            "<{}> <{}> \"2023-05-08T12:00:{:02}Z\" .\n",
            subject, HAS_TIMESTAMP, i
        ));
    }
    let mut session = ReplaySession::new(ReplayConfig::default(), sink).unwrap();
    session.load_dataset_reader(RdfFormat::NTriples, doc.as_bytes()).unwrap();
    session.build_sequence().unwrap();
    session
}

/// Wait until the autoplay loop has disabled itself.
async fn wait_until_stopped(autoplay: &Autoplay) {
    tokio::time::timeout(Duration::from_secs(60), async {
        while autoplay.is_enabled() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("autoplay loop did not stop in time");
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_replays_the_whole_sequence_then_stops() {
    let sink = MockSink::new();
    let session = Arc::new(Mutex::new(sequenced_session(3, Arc::clone(&sink))));
    let autoplay = Autoplay::new();

    assert!(autoplay.start(Arc::clone(&session)));
    wait_until_stopped(&autoplay).await;

    assert_eq!(sink.write_count(), 3);
    let session = session.lock().await;
    assert_eq!(session.cursor().position(), 3);
}

#[tokio::test]
async fn test_stop_before_first_wake_means_zero_replays() {
    let sink = MockSink::new();
    let session = Arc::new(Mutex::new(sequenced_session(3, Arc::clone(&sink))));
    let autoplay = Autoplay::new();

    // Start schedules an immediate wake, but the wake has not fired yet on
    // this single-threaded runtime; stopping first must win.
    autoplay.start(Arc::clone(&session));
    autoplay.stop();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(sink.write_count(), 0);
    assert!(!autoplay.is_enabled());
    assert_eq!(session.lock().await.cursor().position(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent_while_running() {
    let sink = MockSink::new();
    let session = Arc::new(Mutex::new(sequenced_session(3, Arc::clone(&sink))));
    let autoplay = Autoplay::new();

    assert!(autoplay.start(Arc::clone(&session)));
    // A second start while enabled must not schedule a second loop.
    assert!(!autoplay.start(Arc::clone(&session)));

    wait_until_stopped(&autoplay).await;
    assert_eq!(sink.write_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_wake_on_last_observation_stops_without_rescheduling() {
    let sink = MockSink::new();
    let mut session = sequenced_session(3, Arc::clone(&sink));
    // Replay everything but the last observation by hand.
    {
        let mut driver = ReplayDriver::new(&mut session);
        driver.advance_one().await.unwrap();
        driver.advance_one().await.unwrap();
    }
    let session = Arc::new(Mutex::new(session));
    let autoplay = Autoplay::new();

    assert!(autoplay.start(Arc::clone(&session)));
    wait_until_stopped(&autoplay).await;

    // The wake replayed the final observation; with no next timestamp to
    // pace against the loop stopped on its own.
    assert_eq!(sink.write_count(), 3);
    assert_eq!(session.lock().await.cursor().position(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_sink_failure_disables_autoplay() {
    let sink = MockSink::failing();
    let session = Arc::new(Mutex::new(sequenced_session(3, Arc::clone(&sink))));
    let autoplay = Autoplay::new();

    assert!(autoplay.start(Arc::clone(&session)));
    wait_until_stopped(&autoplay).await;

    assert_eq!(sink.write_count(), 0);
    assert_eq!(session.lock().await.cursor().position(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_can_be_restarted_after_a_stop() {
    let sink = MockSink::new();
    let session = Arc::new(Mutex::new(sequenced_session(2, Arc::clone(&sink))));
    let autoplay = Autoplay::new();

    autoplay.start(Arc::clone(&session));
    wait_until_stopped(&autoplay).await;
    assert_eq!(sink.write_count(), 2);

    // The run is over; a fresh start finds the cursor exhausted and stops
    // again without replaying anything.
    assert!(autoplay.start(Arc::clone(&session)));
    wait_until_stopped(&autoplay).await;
    assert_eq!(sink.write_count(), 2);
}
