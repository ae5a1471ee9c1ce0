use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::sync::SharedStore;

/// Periodic clock for the live session. The task ends on its own once the
/// session stops running, and is aborted on `stop` or drop.
pub struct SessionTimer {
    tick: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionTimer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            handle: Mutex::new(None),
        }
    }

    pub fn start(&self, store: SharedStore) {
        let mut handle = self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if handle.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let tick = self.tick;
        *handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // the first tick fires immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut store = store.write().await;
                let session = store.session();
                if !(session.is_active() && session.timer_running()) {
                    debug!("Session clock stopped");
                    break;
                }
                store.tick();
            }
        }));
    }

    pub fn stop(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(task) = handle.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
