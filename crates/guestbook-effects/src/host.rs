//! Authoritative guestbook host
//!
//! The host owns the only writable copy of the ledger. Mutations are funnelled through
//! a bounded queue into a single writer task, which for each request:
//!
//! 1. reads host time and prepares the candidate entry,
//! 2. persists the snapshot that includes the candidate,
//! 3. commits the candidate under the write lock and broadcasts `NewSignature`,
//! 4. resolves the submitter's confirmation.
//!
//! A failure in steps 1-2 resolves the confirmation with `TransientUnavailable` and
//! leaves the ledger untouched. Readers share the read lock and only ever see committed
//! entries. Accepted submissions are never cancelled: dropping a [`PendingSignature`]
//! only discards the confirmation.

use guestbook_core::effects::{PhysicalTimeEffects, StorageEffects};
use guestbook_core::{
    Entry, GuestbookConfig, GuestbookError, GuestbookEvent, GuestbookLedger, LedgerSnapshot,
    Result, SignerAddress,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Identifier assigned to every accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    /// Create a new random submission ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Proof that a submission was committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureReceipt {
    /// Submission this receipt confirms
    pub submission_id: SubmissionId,
    /// Insertion position of the committed entry
    pub index: usize,
    /// The committed entry
    pub entry: Entry,
}

/// A submission accepted by the host but not yet confirmed
#[derive(Debug)]
pub struct PendingSignature {
    submission_id: SubmissionId,
    confirmation: oneshot::Receiver<Result<SignatureReceipt>>,
}

impl PendingSignature {
    /// Wrap the receiving half of a confirmation channel.
    ///
    /// Service implementations send exactly one outcome on the paired sender once
    /// the submission is committed or rejected.
    pub fn new(
        submission_id: SubmissionId,
        confirmation: oneshot::Receiver<Result<SignatureReceipt>>,
    ) -> Self {
        Self {
            submission_id,
            confirmation,
        }
    }

    /// Identifier of the submission
    pub fn submission_id(&self) -> SubmissionId {
        self.submission_id
    }

    /// Wait until the host has durably committed or rejected the submission
    pub async fn confirmed(self) -> Result<SignatureReceipt> {
        self.confirmation
            .await
            .map_err(|_| GuestbookError::unavailable("host stopped before confirming"))?
    }
}

struct SignRequest {
    submission_id: SubmissionId,
    caller: SignerAddress,
    message: String,
    reply: oneshot::Sender<Result<SignatureReceipt>>,
}

/// Runtime owning the authoritative ledger
#[derive(Debug)]
pub struct GuestbookHost {
    ledger: Arc<RwLock<GuestbookLedger>>,
    events: broadcast::Sender<GuestbookEvent>,
    queue: mpsc::Sender<SignRequest>,
    writer: JoinHandle<()>,
    deployed: bool,
}

impl GuestbookHost {
    /// Load the ledger from `storage`, deploying an empty one if none exists, and
    /// start the writer task.
    ///
    /// Claims `storage` exclusively first. While another host holds it, `open` fails
    /// with `TransientUnavailable`.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn open<T, S>(config: &GuestbookConfig, time: T, storage: S) -> Result<Self>
    where
        T: PhysicalTimeEffects + 'static,
        S: StorageEffects + 'static,
    {
        config.validate()?;
        // Held for the host's lifetime: the storage handler lives in the writer task
        storage.acquire_exclusive().await?;
        let key = config.storage.ledger_key.clone();
        let limit = config.ledger.max_message_bytes;

        let (ledger, deployed) = match storage.retrieve(&key).await? {
            Some(bytes) => {
                let ledger = LedgerSnapshot::decode(&bytes)?.into_ledger(limit)?;
                info!(
                    key = %key,
                    total = ledger.total_signatures(),
                    "Loaded guestbook ledger"
                );
                (ledger, false)
            }
            None => {
                let ledger = GuestbookLedger::with_message_limit(limit);
                storage
                    .store(&key, LedgerSnapshot::capture(&ledger).encode()?)
                    .await?;
                info!(key = %key, "Deployed empty guestbook ledger");
                (ledger, true)
            }
        };

        let ledger = Arc::new(RwLock::new(ledger));
        let (events, _) = broadcast::channel(config.host.event_capacity);
        let (queue, requests) = mpsc::channel(config.host.queue_capacity);

        let writer = tokio::spawn(run_writer(
            Writer {
                ledger: Arc::clone(&ledger),
                events: events.clone(),
                time,
                storage,
                key,
            },
            requests,
        ));

        Ok(Self {
            ledger,
            events,
            queue,
            writer,
            deployed,
        })
    }

    /// Whether `open` created a fresh ledger rather than loading one
    pub fn was_deployed(&self) -> bool {
        self.deployed
    }

    /// Validate and enqueue a signature.
    ///
    /// Validation failures are reported here, synchronously, and nothing is enqueued.
    /// Success means the host accepted the mutation; durability is signalled by
    /// [`PendingSignature::confirmed`].
    pub async fn submit(
        &self,
        caller: SignerAddress,
        message: impl Into<String>,
    ) -> Result<PendingSignature> {
        let message = message.into();
        self.ledger.read().await.validate_message(&message)?;

        let submission_id = SubmissionId::new();
        let (reply, confirmation) = oneshot::channel();
        self.queue
            .send(SignRequest {
                submission_id,
                caller,
                message,
                reply,
            })
            .await
            .map_err(|_| GuestbookError::unavailable("host is shut down"))?;

        debug!(%submission_id, signer = %caller, "submission accepted");
        Ok(PendingSignature::new(submission_id, confirmation))
    }

    /// Submit and wait for the confirmation
    pub async fn sign_book(
        &self,
        caller: SignerAddress,
        message: impl Into<String>,
    ) -> Result<SignatureReceipt> {
        self.submit(caller, message).await?.confirmed().await
    }

    /// Number of committed entries
    pub async fn total_signatures(&self) -> usize {
        self.ledger.read().await.total_signatures()
    }

    /// Up to `count` newest committed entries, newest first
    pub async fn last_signatures(&self, count: usize) -> Vec<Entry> {
        self.ledger.read().await.last_signatures(count)
    }

    /// Most recently committed entry
    pub async fn newest(&self) -> Option<Entry> {
        self.ledger.read().await.newest().cloned()
    }

    /// Receive every `NewSignature` committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GuestbookEvent> {
        self.events.subscribe()
    }

    /// Stop accepting submissions and wait for queued ones to finish
    pub async fn shutdown(self) -> Result<()> {
        let Self { queue, writer, .. } = self;
        drop(queue);
        writer
            .await
            .map_err(|e| GuestbookError::unavailable(format!("writer task failed: {e}")))
    }
}

struct Writer<T, S> {
    ledger: Arc<RwLock<GuestbookLedger>>,
    events: broadcast::Sender<GuestbookEvent>,
    time: T,
    storage: S,
    key: String,
}

async fn run_writer<T, S>(writer: Writer<T, S>, mut requests: mpsc::Receiver<SignRequest>)
where
    T: PhysicalTimeEffects,
    S: StorageEffects,
{
    while let Some(request) = requests.recv().await {
        let submission_id = request.submission_id;
        let outcome = writer
            .apply(submission_id, request.caller, request.message)
            .await;

        if let Err(err) = &outcome {
            error!(%submission_id, error = %err, "signature not committed");
        }
        // The submitter may have stopped waiting
        let _ = request.reply.send(outcome);
    }
    debug!("writer task stopped");
}

impl<T, S> Writer<T, S>
where
    T: PhysicalTimeEffects,
    S: StorageEffects,
{
    async fn apply(
        &self,
        submission_id: SubmissionId,
        caller: SignerAddress,
        message: String,
    ) -> Result<SignatureReceipt> {
        let now = self.time.current_timestamp().await?;

        // Only this task mutates, so the ledger cannot move between prepare and commit.
        let (pending, bytes) = {
            let ledger = self.ledger.read().await;
            let pending = ledger.prepare(caller, message, now)?;
            let bytes = LedgerSnapshot::encode_with_pending(&ledger, &pending)?;
            (pending, bytes)
        };

        self.storage.store(&self.key, bytes).await?;

        let entry = pending.entry().clone();
        let event = self.ledger.write().await.commit(pending)?;
        let index = event.index();

        // No subscribers is fine
        let _ = self.events.send(event);

        info!(
            %submission_id,
            index,
            signer = %entry.signer(),
            timestamp = entry.timestamp(),
            "signature committed"
        );
        Ok(SignatureReceipt {
            submission_id,
            index,
            entry,
        })
    }
}
