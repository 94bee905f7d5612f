//! Reader-facing statistics aggregation
//!
//! The content domain (articles, comments, reactions) lives outside this
//! core; it plugs in through `ContentStatsProvider`. The aggregator only
//! joins those externally-owned counters with follow-graph counts.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::account::{AccountId, IdentityStore};
use crate::error::ApiError;
use crate::follow::FollowGraph;

/// Counters owned by the external content domain.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub articles_published: u64,
    pub articles_read: u64,
    pub comments_made: u64,
    pub reactions_received: u64,
    pub bookmarks: u64,
}

/// Boundary trait the content collaborator implements.
pub trait ContentStatsProvider: Send + Sync + 'static {
    fn stats_for(&self, account_id: AccountId) -> ContentStats;
}

/// Standalone default: every content counter reads zero.
pub struct NoContent;

impl ContentStatsProvider for NoContent {
    fn stats_for(&self, _account_id: AccountId) -> ContentStats {
        ContentStats::default()
    }
}

/// The "my stats" answer: graph counts plus the content counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub followers: usize,
    pub following: usize,
    #[serde(flatten)]
    pub content: ContentStats,
}

#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<Mutex<IdentityStore>>,
    graph: Arc<Mutex<FollowGraph>>,
    provider: Arc<dyn ContentStatsProvider>,
}

impl StatsAggregator {
    pub fn new(
        store: Arc<Mutex<IdentityStore>>,
        graph: Arc<Mutex<FollowGraph>>,
        provider: Arc<dyn ContentStatsProvider>,
    ) -> Self {
        Self {
            store,
            graph,
            provider,
        }
    }

    pub fn my_stats(&self, account_id: AccountId) -> Result<UserStats, ApiError> {
        {
            let store = self
                .store
                .lock()
                .map_err(|e| ApiError::internal("identity store mutex poisoned", e))?;
            if !store.contains(account_id) {
                return Err(ApiError::UnknownUser);
            }
        }

        let (followers, following) = {
            let graph = self
                .graph
                .lock()
                .map_err(|e| ApiError::internal("follow graph mutex poisoned", e))?;
            (
                graph.follower_count(account_id),
                graph.following_count(account_id),
            )
        };

        Ok(UserStats {
            followers,
            following,
            content: self.provider.stats_for(account_id),
        })
    }
}
