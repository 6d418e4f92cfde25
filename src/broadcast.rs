//! Live leaderboard broadcasting
//!
//! Publishes a full leaderboard snapshot to every subscriber of one shared
//! channel after any committed point-total change. New subscribers get one
//! immediate snapshot before the live stream. Delivery is best-effort: a
//! subscriber that connects while a publish is in flight may see a stale
//! snapshot followed by a fresher one, and a lagging subscriber drops the
//! oldest snapshots first (each snapshot is complete, so nothing is lost).

use tokio::sync::broadcast;
use tracing::debug;

use crate::db::ProgressDb;
use crate::error::Result;
use crate::models::LeaderboardSnapshot;
use crate::queries;

const CHANNEL_CAPACITY: usize = 64;

/// Publishes leaderboard snapshots to all subscribers
#[derive(Clone)]
pub struct StatsBroadcaster {
    db: ProgressDb,
    tx: broadcast::Sender<LeaderboardSnapshot>,
}

impl StatsBroadcaster {
    pub fn new(db: ProgressDb) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { db, tx }
    }

    /// Take a fresh snapshot without publishing it
    pub fn snapshot(&self) -> Result<LeaderboardSnapshot> {
        let conn = self.db.conn();
        queries::leaderboard_snapshot(&conn)
    }

    /// Query the current leaderboard and send it to all subscribers.
    /// Call only after the transaction that changed points has committed.
    pub fn publish(&self) -> Result<()> {
        let snapshot = self.snapshot()?;
        if self.tx.send(snapshot).is_err() {
            debug!("leaderboard publish with no subscribers");
        }
        Ok(())
    }

    /// Subscribe to the leaderboard stream. Returns the current snapshot
    /// plus a receiver for subsequent publishes.
    pub fn subscribe(&self) -> Result<(LeaderboardSnapshot, broadcast::Receiver<LeaderboardSnapshot>)> {
        // Subscribe before snapshotting so no committed change can fall
        // between the snapshot and the stream.
        let rx = self.tx.subscribe();
        let snapshot = self.snapshot()?;
        Ok((snapshot, rx))
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
