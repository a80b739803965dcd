/// Follow graph: directed edges between users
///
/// Edges are stored as keyed `(follower, followee)` rows by the storage
/// backend. Both mutations are idempotent: following twice leaves one edge,
/// unfollowing an edge that does not exist succeeds without doing anything.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use feedline_shared::db::{memory::MemoryStorage, storage::Storage};
/// use feedline_shared::graph::FollowGraph;
/// use feedline_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = Arc::new(MemoryStorage::new());
/// let mut ids = Vec::new();
/// for email in ["a@example.com", "b@example.com"] {
///     let user = storage
///         .insert_user(CreateUser {
///             email: email.to_string(),
///             name: email.to_string(),
///             profile: String::new(),
///             password_hash: "$argon2id$...".to_string(),
///         })
///         .await?;
///     ids.push(user.id);
/// }
///
/// let graph = FollowGraph::new(storage);
/// graph.follow(ids[0], ids[1]).await?;
/// assert!(graph.followees_of(ids[0]).await?.contains(&ids[1]));
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::storage::Storage;
use crate::error::{ErrorCategory, StorageError};
use crate::models::{FollowEdge, UserId};

/// Error type for follow graph operations
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    /// A user tried to follow themselves
    #[error("Users cannot follow themselves")]
    SelfFollow,

    /// The account to follow does not exist
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// Backend failure
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for FollowError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownUser(id) => FollowError::UnknownUser(id),
            other => FollowError::Storage(other),
        }
    }
}

impl FollowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FollowError::SelfFollow => ErrorCategory::Conflict,
            FollowError::UnknownUser(_) => ErrorCategory::NotFound,
            FollowError::Storage(err) => err.category(),
        }
    }
}

/// Owns follow edges
#[derive(Clone)]
pub struct FollowGraph {
    storage: Arc<dyn Storage>,
}

impl FollowGraph {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Makes `follower` follow `followee`
    ///
    /// # Errors
    ///
    /// - `SelfFollow` if both ids are equal
    /// - `UnknownUser` if `followee` does not exist
    pub async fn follow(&self, follower: UserId, followee: UserId) -> Result<(), FollowError> {
        let edge = FollowEdge::new(follower, followee);
        if edge.is_self_follow() {
            return Err(FollowError::SelfFollow);
        }

        if self.storage.insert_follow(edge).await? {
            info!(follower_id = %follower, followee_id = %followee, "Follow edge created");
        } else {
            debug!(follower_id = %follower, followee_id = %followee, "Already following");
        }

        Ok(())
    }

    /// Removes the edge from `follower` to `followee` if there is one
    pub async fn unfollow(&self, follower: UserId, followee: UserId) -> Result<(), FollowError> {
        let edge = FollowEdge::new(follower, followee);

        if self.storage.delete_follow(edge).await? {
            info!(follower_id = %follower, followee_id = %followee, "Follow edge removed");
        } else {
            debug!(follower_id = %follower, followee_id = %followee, "Unfollow of missing edge");
        }

        Ok(())
    }

    /// Current followee set of `user`
    pub async fn followees_of(&self, user: UserId) -> Result<HashSet<UserId>, FollowError> {
        Ok(self.storage.followees_of(user).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStorage;
    use crate::models::user::CreateUser;

    async fn setup(n: usize) -> (FollowGraph, Vec<UserId>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut ids = Vec::new();

        for i in 0..n {
            let user = storage
                .insert_user(CreateUser {
                    email: format!("user{}@example.com", i),
                    name: format!("User {}", i),
                    profile: String::new(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }

        (FollowGraph::new(storage), ids)
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let (graph, ids) = setup(1).await;

        let result = graph.follow(ids[0], ids[0]).await;
        assert!(matches!(result, Err(FollowError::SelfFollow)));
        assert!(graph.followees_of(ids[0]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follow_is_idempotent() {
        let (graph, ids) = setup(2).await;

        graph.follow(ids[0], ids[1]).await.unwrap();
        graph.follow(ids[0], ids[1]).await.unwrap();

        let followees = graph.followees_of(ids[0]).await.unwrap();
        assert_eq!(followees.len(), 1);
        assert!(followees.contains(&ids[1]));
    }

    #[tokio::test]
    async fn test_follow_is_directed() {
        let (graph, ids) = setup(2).await;

        graph.follow(ids[0], ids[1]).await.unwrap();
        assert!(graph.followees_of(ids[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge_succeeds() {
        let (graph, ids) = setup(2).await;

        graph.unfollow(ids[0], ids[1]).await.unwrap();
        graph.unfollow(ids[0], UserId(404)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unfollow_removes_edge() {
        let (graph, ids) = setup(3).await;

        graph.follow(ids[0], ids[1]).await.unwrap();
        graph.follow(ids[0], ids[2]).await.unwrap();
        graph.unfollow(ids[0], ids[1]).await.unwrap();

        let followees = graph.followees_of(ids[0]).await.unwrap();
        assert_eq!(followees, HashSet::from([ids[2]]));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let (graph, ids) = setup(1).await;

        let result = graph.follow(ids[0], UserId(77)).await;
        assert!(matches!(result, Err(FollowError::UnknownUser(UserId(77)))));
        assert_eq!(result.unwrap_err().category(), ErrorCategory::NotFound);
    }
}
