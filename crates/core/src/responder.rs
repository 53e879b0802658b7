//! Delayed response delivery.
//!
//! Responsibilities:
//! - Queue one response per accepted notification.
//! - Wait out the configured delay, build the response bundle and transmit it.
//! - Report what happened to each job through a [`DeliveryHandle`].
//!
//! Notes:
//! - A single worker task drains an unbounded channel, so jobs run one at a time in the order
//!   they were scheduled. With a fixed delay, due times are monotonic.
//! - There is no retry. A failed transmission is logged and reported as
//!   [`DeliveryOutcome::Failed`].
//! - The worker stops once every [`Responder`] clone has been dropped and the queue is empty.

use crate::bundle::BundleBuilder;
use crate::transport::{BundleTransport, TransactionReceipt};
use crate::TransportError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Result of one scheduled delivery.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The client endpoint accepted the response.
    Delivered {
        correlation_id: String,
        receipt: TransactionReceipt,
    },
    /// No response bundle could be built; nothing was sent.
    Skipped { correlation_id: String },
    /// The transmission failed. It is not retried.
    Failed {
        correlation_id: String,
        error: TransportError,
    },
    /// The worker stopped before the job ran.
    Abandoned,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

struct Job {
    correlation_id: String,
    due: Instant,
    reply: oneshot::Sender<DeliveryOutcome>,
}

/// Handle used to schedule delayed responses. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Responder {
    jobs: mpsc::UnboundedSender<Job>,
    delay: Duration,
}

impl Responder {
    /// Start the worker task.
    ///
    /// Must be called from within a tokio runtime. The returned `JoinHandle` completes once all
    /// `Responder` clones are dropped and the queued jobs have run.
    pub fn spawn(
        builder: BundleBuilder,
        transport: Arc<dyn BundleTransport>,
        delay: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (jobs, queue) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(queue, builder, transport));
        tracing::info!(?delay, "responder started");
        (Self { jobs, delay }, worker)
    }

    /// Queue a response for `correlation_id`, due after the configured delay.
    ///
    /// Never blocks. If the worker has stopped, the returned handle resolves to
    /// [`DeliveryOutcome::Abandoned`].
    pub fn schedule(&self, correlation_id: impl Into<String>) -> DeliveryHandle {
        let (reply, outcome) = oneshot::channel();
        let job = Job {
            correlation_id: correlation_id.into(),
            due: Instant::now() + self.delay,
            reply,
        };

        if let Err(mpsc::error::SendError(job)) = self.jobs.send(job) {
            tracing::warn!(
                correlation_id = %job.correlation_id,
                "responder worker has stopped; response abandoned"
            );
        }

        DeliveryHandle { outcome }
    }
}

/// Pending result of a scheduled delivery. Dropping it does not cancel the job.
#[derive(Debug)]
pub struct DeliveryHandle {
    outcome: oneshot::Receiver<DeliveryOutcome>,
}

impl DeliveryHandle {
    pub async fn outcome(self) -> DeliveryOutcome {
        self.outcome.await.unwrap_or(DeliveryOutcome::Abandoned)
    }
}

async fn run_worker(
    mut queue: mpsc::UnboundedReceiver<Job>,
    builder: BundleBuilder,
    transport: Arc<dyn BundleTransport>,
) {
    while let Some(job) = queue.recv().await {
        tokio::time::sleep_until(job.due).await;
        let outcome = deliver(&builder, transport.as_ref(), job.correlation_id).await;
        // The caller may have dropped its handle.
        let _ = job.reply.send(outcome);
    }
    tracing::info!("responder stopped");
}

async fn deliver(
    builder: &BundleBuilder,
    transport: &dyn BundleTransport,
    correlation_id: String,
) -> DeliveryOutcome {
    let Some(bundle) = builder.build(&correlation_id) else {
        tracing::warn!(%correlation_id, "no response bundle built; skipping delivery");
        return DeliveryOutcome::Skipped { correlation_id };
    };

    match transport.transaction(&bundle).await {
        Ok(receipt) => {
            tracing::info!(
                %correlation_id,
                status = receipt.status,
                entries = ?receipt.entries,
                "response delivered"
            );
            DeliveryOutcome::Delivered {
                correlation_id,
                receipt,
            }
        }
        Err(error) => {
            tracing::error!(%correlation_id, "response delivery failed: {}", error);
            DeliveryOutcome::Failed {
                correlation_id,
                error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ResponseTemplate;
    use async_trait::async_trait;
    use fhir::Bundle;
    use std::sync::Mutex;

    const DELAY: Duration = Duration::from_millis(2000);

    /// Records each transmitted response identifier with the (paused) time it was sent.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, Instant)>>,
        fail: bool,
    }

    impl RecordingTransport {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(String, Instant)> {
            self.sent.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl BundleTransport for RecordingTransport {
        async fn transaction(&self, bundle: &Bundle) -> Result<TransactionReceipt, TransportError> {
            if self.fail {
                return Err(TransportError::Status {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            let identifier = bundle
                .message_header()
                .and_then(|h| h.response.as_ref())
                .map(|r| r.identifier.clone())
                .unwrap_or_default();
            self.sent
                .lock()
                .expect("lock")
                .push((identifier, Instant::now()));
            Ok(TransactionReceipt {
                status: 200,
                entries: Some(bundle.entry.len()),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sends_exactly_once_after_the_delay() {
        let transport = Arc::new(RecordingTransport::default());
        let (responder, _worker) = Responder::spawn(
            BundleBuilder::Template(ResponseTemplate::Embedded),
            transport.clone(),
            DELAY,
        );

        let start = Instant::now();
        let handle = responder.schedule("corr-1");

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert!(transport.sent().is_empty(), "nothing sent before the delay");

        match handle.outcome().await {
            DeliveryOutcome::Delivered {
                correlation_id,
                receipt,
            } => {
                assert_eq!(correlation_id, "corr-1");
                assert_eq!(receipt.entries, Some(3));
            }
            other => panic!("expected Delivered outcome, got {other:?}"),
        }

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "corr-1");
        assert!(sent[0].1 - start >= DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_sends_immediately() {
        let transport = Arc::new(RecordingTransport::default());
        let (responder, _worker) =
            Responder::spawn(BundleBuilder::Literal, transport.clone(), Duration::ZERO);

        let start = Instant::now();
        assert!(responder.schedule("now").outcome().await.is_delivered());
        assert_eq!(transport.sent()[0].1, start);
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_are_delivered_in_schedule_order() {
        let transport = Arc::new(RecordingTransport::default());
        let (responder, _worker) =
            Responder::spawn(BundleBuilder::Literal, transport.clone(), DELAY);

        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| responder.schedule(id))
            .collect();
        for handle in handles {
            assert!(handle.outcome().await.is_delivered());
        }

        let order: Vec<String> = transport.sent().into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_error_is_reported_as_failed() {
        let (responder, _worker) = Responder::spawn(
            BundleBuilder::Literal,
            Arc::new(RecordingTransport::failing()),
            DELAY,
        );

        match responder.schedule("corr-2").outcome().await {
            DeliveryOutcome::Failed {
                correlation_id,
                error,
            } => {
                assert_eq!(correlation_id, "corr-2");
                assert!(matches!(error, TransportError::Status { status: 503, .. }));
            }
            other => panic!("expected Failed outcome, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_template_skips_the_send() {
        let dir = tempfile::tempdir().expect("temp dir");
        let transport = Arc::new(RecordingTransport::default());
        let (responder, _worker) = Responder::spawn(
            BundleBuilder::Template(ResponseTemplate::File(dir.path().join("absent.json"))),
            transport.clone(),
            DELAY,
        );

        match responder.schedule("corr-3").outcome().await {
            DeliveryOutcome::Skipped { correlation_id } => assert_eq!(correlation_id, "corr-3"),
            other => panic!("expected Skipped outcome, got {other:?}"),
        }
        assert!(transport.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_worker_abandons_new_jobs() {
        let (responder, worker) = Responder::spawn(
            BundleBuilder::Literal,
            Arc::new(RecordingTransport::default()),
            DELAY,
        );
        worker.abort();
        let _ = worker.await;

        assert!(matches!(
            responder.schedule("late").outcome().await,
            DeliveryOutcome::Abandoned
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn worker_drains_queue_then_exits_when_handles_drop() {
        let transport = Arc::new(RecordingTransport::default());
        let (responder, worker) =
            Responder::spawn(BundleBuilder::Literal, transport.clone(), DELAY);

        let handle = responder.schedule("last");
        drop(responder);

        worker.await.expect("worker exits cleanly");
        assert!(handle.outcome().await.is_delivered());
        assert_eq!(transport.sent().len(), 1);
    }
}
