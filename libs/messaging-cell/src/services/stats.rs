use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct DailyCounter {
    day: Option<NaiveDate>,
    count: u64,
    last_sent: Option<DateTime<Utc>>,
}

/// Counts successful outbound deliveries. The daily count restarts at
/// midnight UTC.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    total_sent: AtomicU64,
    daily: RwLock<DailyCounter>,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_sent(&self) {
        self.record_sent_at(Utc::now()).await;
    }

    pub async fn record_sent_at(&self, now: DateTime<Utc>) {
        self.total_sent.fetch_add(1, Ordering::Relaxed);

        let mut daily = self.daily.write().await;
        let today = now.date_naive();
        if daily.day != Some(today) {
            daily.day = Some(today);
            daily.count = 0;
        }
        daily.count += 1;
        daily.last_sent = Some(now);
    }

    pub async fn sent_today(&self, now: DateTime<Utc>) -> u64 {
        let daily = self.daily.read().await;
        if daily.day == Some(now.date_naive()) {
            daily.count
        } else {
            0
        }
    }

    pub async fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.daily.read().await.last_sent
    }

    pub fn total_sent(&self) -> u64 {
        self.total_sent.load(Ordering::Relaxed)
    }
}
