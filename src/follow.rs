//! Directed follow graph
//!
//! Edges are the sole authority for "A follows B"; there is no derived or
//! cached follow state anywhere else. Callers lock the identity store
//! before the graph so existence checks and edge writes stay consistent.

use serde::Serialize;

use crate::account::{AccountId, IdentityStore, PublicProfile};
use crate::error::ApiError;

/// A directed fact about a pair of accounts; owned by neither endpoint.
/// Never updated in place: created by follow, destroyed by unfollow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowEdge {
    pub follower: AccountId,
    pub followed: AccountId,
}

/// One side of a follow listing: the counterpart account's public fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowListing {
    pub data: Vec<PublicProfile>,
    pub count: usize,
}

/// Deduplicated edge set, insertion-ordered. At most one edge per
/// (follower, followed) pair; all writes go through `&mut self`, so a
/// concurrent duplicate follow loses with `AlreadyFollowing`.
pub struct FollowGraph {
    edges: Vec<FollowEdge>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    fn has_edge(&self, follower: AccountId, followed: AccountId) -> bool {
        self.edges
            .iter()
            .any(|e| e.follower == follower && e.followed == followed)
    }

    /// Create a follow edge, returning the followed account's display name
    /// for confirmation messaging. Check order is fixed: self-follow, then
    /// existence, then duplicate edge.
    pub fn follow(
        &mut self,
        store: &IdentityStore,
        follower: AccountId,
        followed: AccountId,
    ) -> Result<String, ApiError> {
        if follower == followed {
            return Err(ApiError::SelfFollow);
        }
        let Some(account) = store.get(followed) else {
            return Err(ApiError::UnknownUser);
        };
        if self.has_edge(follower, followed) {
            return Err(ApiError::AlreadyFollowing);
        }

        self.edges.push(FollowEdge { follower, followed });
        Ok(account.display_name())
    }

    /// Remove the edge for the pair. The deletion count is the detection
    /// signal: removing nothing means there was nothing to unfollow.
    pub fn unfollow(
        &mut self,
        store: &IdentityStore,
        follower: AccountId,
        followed: AccountId,
    ) -> Result<String, ApiError> {
        let Some(account) = store.get(followed) else {
            return Err(ApiError::UnknownUser);
        };

        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.follower == follower && e.followed == followed));
        if self.edges.len() == before {
            return Err(ApiError::NotFollowing);
        }
        Ok(account.display_name())
    }

    /// Accounts the user follows, joined to their public profiles.
    pub fn list_followed(
        &self,
        store: &IdentityStore,
        user: AccountId,
    ) -> Result<FollowListing, ApiError> {
        if !store.contains(user) {
            return Err(ApiError::UnknownUser);
        }
        let data: Vec<PublicProfile> = self
            .edges
            .iter()
            .filter(|e| e.follower == user)
            .filter_map(|e| store.get(e.followed))
            .map(|a| a.profile())
            .collect();
        Ok(FollowListing {
            count: data.len(),
            data,
        })
    }

    /// Accounts following the user, joined to their public profiles.
    pub fn list_followers(
        &self,
        store: &IdentityStore,
        user: AccountId,
    ) -> Result<FollowListing, ApiError> {
        if !store.contains(user) {
            return Err(ApiError::UnknownUser);
        }
        let data: Vec<PublicProfile> = self
            .edges
            .iter()
            .filter(|e| e.followed == user)
            .filter_map(|e| store.get(e.follower))
            .map(|a| a.profile())
            .collect();
        Ok(FollowListing {
            count: data.len(),
            data,
        })
    }

    pub fn following_count(&self, user: AccountId) -> usize {
        self.edges.iter().filter(|e| e.follower == user).count()
    }

    pub fn follower_count(&self, user: AccountId) -> usize {
        self.edges.iter().filter(|e| e.followed == user).count()
    }
}

impl Default for FollowGraph {
    fn default() -> Self {
        Self::new()
    }
}
