use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use courtside_core::{StoreEvent, StoreObserver};
use courtside_persistence::LocalStorage;
use courtside_types::LocalSnapshot;

enum SnapshotJob {
    Save(LocalSnapshot),
    Flush(oneshot::Sender<()>),
}

/// Keeps the on-device copy of roster and history current. Files are
/// written by a background task, off the store lock.
pub struct LocalSnapshotWriter {
    snapshot: LocalSnapshot,
    jobs: mpsc::UnboundedSender<SnapshotJob>,
}

/// Waits for snapshots queued by a [`LocalSnapshotWriter`] to reach disk.
#[derive(Clone)]
pub struct SnapshotFlusher {
    jobs: mpsc::UnboundedSender<SnapshotJob>,
}

impl LocalSnapshotWriter {
    /// Must be called inside a tokio runtime. The task ends once the writer
    /// and every flusher are dropped.
    pub fn spawn(
        storage: LocalStorage,
        snapshot: LocalSnapshot,
    ) -> (Self, SnapshotFlusher, JoinHandle<()>) {
        let (jobs, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(write_snapshots(storage, receiver));
        let flusher = SnapshotFlusher { jobs: jobs.clone() };
        (Self { snapshot, jobs }, flusher, task)
    }
}

impl StoreObserver for LocalSnapshotWriter {
    fn on_store_event(&mut self, event: &StoreEvent) {
        match event {
            StoreEvent::RosterChanged { players } => self.snapshot.players = players.clone(),
            StoreEvent::HistoryChanged { games } => self.snapshot.history = games.clone(),
            StoreEvent::SessionChanged { .. } => return,
        }
        if self.jobs.send(SnapshotJob::Save(self.snapshot.clone())).is_err() {
            warn!("Local snapshot writer has stopped; change not saved");
        }
    }
}

impl SnapshotFlusher {
    /// Returns once every snapshot queued before this call has been written.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.jobs.send(SnapshotJob::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn write_snapshots(storage: LocalStorage, mut jobs: mpsc::UnboundedReceiver<SnapshotJob>) {
    while let Some(job) = jobs.recv().await {
        match job {
            SnapshotJob::Save(snapshot) => {
                let storage = storage.clone();
                match tokio::task::spawn_blocking(move || storage.save_snapshot(&snapshot)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to write local snapshot: {}", e),
                    Err(e) => error!("Local snapshot write aborted: {}", e),
                }
            }
            SnapshotJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Hands store events to an async consumer.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<StoreEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StoreEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl StoreObserver for ChannelObserver {
    fn on_store_event(&mut self, event: &StoreEvent) {
        // A closed receiver means the consumer has shut down
        let _ = self.sender.send(event.clone());
    }
}
