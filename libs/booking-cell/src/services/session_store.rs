use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::{BookingSession, SlotPage, ViewState};

/// Per-user conversation state shared by concurrent webhook tasks.
///
/// Callers take `lock_user` before reading and hold the guard until every
/// write for that message is done.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn lock_user(&self, user: &str) -> OwnedMutexGuard<()>;

    async fn booking_session(&self, user: &str) -> Option<BookingSession>;
    async fn save_booking_session(&self, user: &str, session: BookingSession);
    async fn clear_booking_session(&self, user: &str);

    async fn view_state(&self, user: &str) -> Option<ViewState>;
    async fn set_view_state(&self, user: &str, state: ViewState);
    async fn clear_view_state(&self, user: &str);

    async fn slot_page(&self, user: &str) -> Option<SlotPage>;
    async fn save_slot_page(&self, user: &str, page: SlotPage);
    async fn clear_slot_page(&self, user: &str);

    /// Users currently inside the booking dialogue.
    async fn active_sessions(&self) -> usize;

    /// Drops state untouched for longer than `max_idle`. Returns how many
    /// entries went.
    async fn sweep_idle(&self, max_idle: Duration) -> usize;
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    touched: DateTime<Utc>,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            touched: Utc::now(),
        }
    }
}

type Map<T> = RwLock<HashMap<String, Entry<T>>>;

async fn get<T: Clone>(map: &Map<T>, user: &str) -> Option<T> {
    map.read().await.get(user).map(|entry| entry.value.clone())
}

async fn put<T>(map: &Map<T>, user: &str, value: T) {
    map.write().await.insert(user.to_string(), Entry::new(value));
}

async fn remove<T>(map: &Map<T>, user: &str) {
    map.write().await.remove(user);
}

async fn evict<T>(map: &Map<T>, cutoff: DateTime<Utc>, busy: &HashSet<String>) -> usize {
    let mut map = map.write().await;
    let before = map.len();
    map.retain(|user, entry| entry.touched >= cutoff || busy.contains(user));
    before - map.len()
}

/// Process-local store. State does not survive a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    bookings: Map<BookingSession>,
    views: Map<ViewState>,
    slot_pages: Map<SlotPage>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts everything last written before `cutoff`, except for users
    /// whose lock is held right now.
    pub async fn sweep_before(&self, cutoff: DateTime<Utc>) -> usize {
        // Held for the whole sweep so nobody new can take a user lock
        let mut locks = self.locks.lock().await;

        let busy: HashSet<String> = locks
            .iter()
            .filter(|(_, lock)| lock.try_lock().is_err())
            .map(|(user, _)| user.clone())
            .collect();

        let evicted = evict(&self.bookings, cutoff, &busy).await
            + evict(&self.views, cutoff, &busy).await
            + evict(&self.slot_pages, cutoff, &busy).await;

        let bookings = self.bookings.read().await;
        let views = self.views.read().await;
        let slot_pages = self.slot_pages.read().await;
        locks.retain(|user, lock| {
            Arc::strong_count(lock) > 1
                || bookings.contains_key(user)
                || views.contains_key(user)
                || slot_pages.contains_key(user)
        });

        evicted
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn lock_user(&self, user: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(user.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn booking_session(&self, user: &str) -> Option<BookingSession> {
        get(&self.bookings, user).await
    }

    async fn save_booking_session(&self, user: &str, session: BookingSession) {
        put(&self.bookings, user, session).await;
    }

    async fn clear_booking_session(&self, user: &str) {
        remove(&self.bookings, user).await;
    }

    async fn view_state(&self, user: &str) -> Option<ViewState> {
        get(&self.views, user).await
    }

    async fn set_view_state(&self, user: &str, state: ViewState) {
        put(&self.views, user, state).await;
    }

    async fn clear_view_state(&self, user: &str) {
        remove(&self.views, user).await;
    }

    async fn slot_page(&self, user: &str) -> Option<SlotPage> {
        get(&self.slot_pages, user).await
    }

    async fn save_slot_page(&self, user: &str, page: SlotPage) {
        put(&self.slot_pages, user, page).await;
    }

    async fn clear_slot_page(&self, user: &str) {
        remove(&self.slot_pages, user).await;
    }

    async fn active_sessions(&self) -> usize {
        self.bookings.read().await.len()
    }

    async fn sweep_idle(&self, max_idle: Duration) -> usize {
        self.sweep_before(Utc::now() - max_idle).await
    }
}

/// Runs `sweep_idle` on `store` every `every` until the handle is aborted.
pub fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    max_idle: Duration,
    every: StdDuration,
) -> JoinHandle<()> {
    info!(
        "Session sweeper started: idle limit {} min, every {:?}",
        max_idle.num_minutes(),
        every
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = store.sweep_idle(max_idle).await;
            if evicted > 0 {
                info!("Expired {} idle session entries", evicted);
            } else {
                debug!("Session sweep found nothing idle");
            }
        }
    })
}
