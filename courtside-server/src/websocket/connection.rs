use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use courtside_types::{AccountId, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open scorer screen.
#[derive(Debug, Clone)]
pub struct ClientSocket {
    pub id: ConnectionId,
    /// Set once the screen has signed in over this socket.
    pub account_id: Option<AccountId>,
    pub last_seen: Instant,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientSocket {
    fn open(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let socket = Self {
            id,
            account_id: None,
            last_seen: Instant::now(),
            outbox,
        };
        (socket, inbox)
    }

    pub fn deliver(&self, message: ServerMessage) -> Result<(), String> {
        self.outbox
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }

    pub fn is_idle(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Open sockets. Every screen shows the same store, so store updates go to
/// all of them.
pub struct ConnectionManager {
    sockets: RwLock<HashMap<ConnectionId, ClientSocket>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            sockets: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the receiving end of the socket's outbox.
    pub async fn register(&self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (socket, inbox) = ClientSocket::open(id);
        self.sockets.write().await.insert(id, socket);
        inbox
    }

    /// Returns the removed socket, if it was still registered.
    pub async fn unregister(&self, id: ConnectionId) -> Option<ClientSocket> {
        self.sockets.write().await.remove(&id)
    }

    pub async fn get(&self, id: ConnectionId) -> Option<ClientSocket> {
        self.sockets.read().await.get(&id).cloned()
    }

    pub async fn set_account(&self, id: ConnectionId, account_id: Option<AccountId>) {
        if let Some(socket) = self.sockets.write().await.get_mut(&id) {
            socket.account_id = account_id;
        }
    }

    pub async fn touch(&self, id: ConnectionId) {
        if let Some(socket) = self.sockets.write().await.get_mut(&id) {
            socket.last_seen = Instant::now();
        }
    }

    pub async fn send_to(&self, id: ConnectionId, message: ServerMessage) -> Result<(), String> {
        match self.sockets.read().await.get(&id) {
            Some(socket) => socket.deliver(message),
            None => Err("Connection not found".to_string()),
        }
    }

    /// Returns how many sockets accepted the message.
    pub async fn broadcast(&self, message: ServerMessage) -> usize {
        self.sockets
            .read()
            .await
            .values()
            .filter(|socket| socket.deliver(message.clone()).is_ok())
            .count()
    }

    /// Drops sockets that have been silent for longer than `timeout`,
    /// including ones whose outbox has already closed.
    pub async fn prune_idle(&self, timeout: Duration) -> usize {
        let mut sockets = self.sockets.write().await;
        let before = sockets.len();
        sockets.retain(|id, socket| {
            let keep = !socket.is_idle(timeout) && !socket.outbox.is_closed();
            if !keep {
                tracing::info!(
                    "Removing idle connection {} (account {})",
                    id,
                    socket.account_id.as_deref().unwrap_or("none")
                );
            }
            keep
        });
        before - sockets.len()
    }

    pub async fn len(&self) -> usize {
        self.sockets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
