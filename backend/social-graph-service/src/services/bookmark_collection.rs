use crate::db::{self, GraphClient};
use crate::domain::bookmark::{Bookmark, BookmarkCollection, CollectionTitle};
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use neo4rs::query;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct MembershipStatus {
    collection_owned: bool,
    bookmark_owned: bool,
    contained: bool,
}

#[derive(Clone)]
pub struct BookmarkCollectionService {
    graph: GraphClient,
}

impl BookmarkCollectionService {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    pub async fn create_collection(
        &self,
        user_id: Uuid,
        payload: CollectionTitle,
    ) -> Result<BookmarkCollection> {
        payload.validate()?;
        let collection: BookmarkCollection = self
            .graph
            .fetch_one(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     CREATE (user)-[:OWNS]->(c:BookmarkCollection {
                        collection_id: $collection_id,
                        title: $title,
                        owned_by: $user_id,
                        bookmark_count: 0,
                        created_at: $now,
                        updated_at: $now
                     })
                     RETURN c {.*} AS collection",
                )
                .param("user_id", user_id.to_string())
                .param("collection_id", Uuid::new_v4().to_string())
                .param("title", payload.title.trim().to_string())
                .param("now", db::now()),
                "collection",
                "User not found",
            )
            .await?;
        info!(%user_id, collection_id = %collection.collection_id, "Bookmark collection created");
        Ok(collection)
    }

    pub async fn get_collection(&self, collection_id: Uuid) -> Result<BookmarkCollection> {
        self.graph
            .fetch_one(
                query(
                    "MATCH (c:BookmarkCollection {collection_id: $collection_id})
                     RETURN c {.*} AS collection",
                )
                .param("collection_id", collection_id.to_string()),
                "collection",
                "Collection not found",
            )
            .await
    }

    async fn require_owner(&self, collection_id: Uuid, user_id: Uuid) -> Result<BookmarkCollection> {
        let collection = self.get_collection(collection_id).await?;
        if collection.owned_by != user_id {
            return Err(AppError::forbidden("You do not own this collection"));
        }
        Ok(collection)
    }

    pub async fn update_collection(
        &self,
        collection_id: Uuid,
        user_id: Uuid,
        payload: CollectionTitle,
    ) -> Result<BookmarkCollection> {
        payload.validate()?;
        self.require_owner(collection_id, user_id).await?;
        let collection = self
            .graph
            .fetch_one(
                query(
                    "MATCH (c:BookmarkCollection {collection_id: $collection_id})
                     SET c.title = $title, c.updated_at = $now
                     RETURN c {.*} AS collection",
                )
                .param("collection_id", collection_id.to_string())
                .param("title", payload.title.trim().to_string())
                .param("now", db::now()),
                "collection",
                "Collection not found",
            )
            .await?;
        debug!(%collection_id, "Bookmark collection renamed");
        Ok(collection)
    }

    /// Removes the collection only; its bookmarks stay on the user
    pub async fn delete_collection(&self, collection_id: Uuid, user_id: Uuid) -> Result<()> {
        self.require_owner(collection_id, user_id).await?;
        self.graph
            .run(
                query(
                    "MATCH (c:BookmarkCollection {collection_id: $collection_id})
                     OPTIONAL MATCH (c)-[:CONTAINS]->(b:Bookmark)
                     WHERE b.collection_id = c.collection_id
                     SET b.collection_id = null
                     WITH DISTINCT c
                     DETACH DELETE c",
                )
                .param("collection_id", collection_id.to_string()),
            )
            .await?;
        info!(%collection_id, %user_id, "Bookmark collection deleted");
        Ok(())
    }

    async fn membership(
        &self,
        collection_id: Uuid,
        bookmark_id: Uuid,
        user_id: Uuid,
    ) -> Result<MembershipStatus> {
        self.graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (u:User {user_id: $user_id})-[:OWNS]->(c:BookmarkCollection {collection_id: $collection_id})
                     OPTIONAL MATCH (owner:User {user_id: $user_id})-[:BOOKMARKED]->(b:Bookmark {bookmark_id: $bookmark_id})
                     RETURN {
                        collection_owned: c IS NOT NULL,
                        bookmark_owned: b IS NOT NULL,
                        contained: c IS NOT NULL AND b IS NOT NULL AND EXISTS { (c)-[:CONTAINS]->(b) }
                     } AS status",
                )
                .param("user_id", user_id.to_string())
                .param("collection_id", collection_id.to_string())
                .param("bookmark_id", bookmark_id.to_string()),
                "status",
                "Collection status",
            )
            .await
    }

    pub async fn add_bookmark(
        &self,
        collection_id: Uuid,
        bookmark_id: Uuid,
        user_id: Uuid,
    ) -> Result<BookmarkCollection> {
        self.require_owner(collection_id, user_id).await?;
        let status = self.membership(collection_id, bookmark_id, user_id).await?;
        if !status.bookmark_owned {
            return Err(AppError::not_found("Bookmark not found"));
        }
        if status.contained {
            return Err(AppError::bad_request("Bookmark is already in this collection"));
        }

        let collection = self
            .graph
            .fetch_optional::<BookmarkCollection>(
                query(
                    "MATCH (c:BookmarkCollection {collection_id: $collection_id})
                     MATCH (b:Bookmark {bookmark_id: $bookmark_id})
                     WHERE NOT EXISTS { (c)-[:CONTAINS]->(b) }
                     CREATE (c)-[:CONTAINS]->(b)
                     SET c.bookmark_count = coalesce(c.bookmark_count, 0) + 1,
                         c.updated_at = $now,
                         b.collection_id = c.collection_id
                     RETURN c {.*} AS collection",
                )
                .param("collection_id", collection_id.to_string())
                .param("bookmark_id", bookmark_id.to_string())
                .param("now", db::now()),
                "collection",
            )
            .await?
            .ok_or_else(|| AppError::bad_request("Bookmark is already in this collection"))?;
        debug!(%collection_id, %bookmark_id, "Bookmark added to collection");
        Ok(collection)
    }

    pub async fn remove_bookmark(
        &self,
        collection_id: Uuid,
        bookmark_id: Uuid,
        user_id: Uuid,
    ) -> Result<BookmarkCollection> {
        self.require_owner(collection_id, user_id).await?;
        let collection = self
            .graph
            .fetch_optional::<BookmarkCollection>(
                query(
                    "MATCH (c:BookmarkCollection {collection_id: $collection_id})-[r:CONTAINS]->(b:Bookmark {bookmark_id: $bookmark_id})
                     DELETE r
                     SET c.bookmark_count = CASE
                            WHEN coalesce(c.bookmark_count, 0) > 0
                            THEN c.bookmark_count - 1 ELSE 0 END,
                         c.updated_at = $now,
                         b.collection_id = CASE
                            WHEN b.collection_id = c.collection_id THEN null
                            ELSE b.collection_id END
                     RETURN c {.*} AS collection",
                )
                .param("collection_id", collection_id.to_string())
                .param("bookmark_id", bookmark_id.to_string())
                .param("now", db::now()),
                "collection",
            )
            .await?
            .ok_or_else(|| AppError::not_found("Bookmark is not in this collection"))?;
        debug!(%collection_id, %bookmark_id, "Bookmark removed from collection");
        Ok(collection)
    }

    pub async fn get_collection_bookmarks(
        &self,
        collection_id: Uuid,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Bookmark>> {
        self.require_owner(collection_id, user_id).await?;
        self.graph
            .fetch_all(
                query(
                    "MATCH (:BookmarkCollection {collection_id: $collection_id})-[:CONTAINS]->(b:Bookmark)
                     RETURN b {.*} AS bookmark
                     ORDER BY b.created_at DESC, b.bookmark_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("collection_id", collection_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "bookmark",
            )
            .await
    }

    pub async fn get_user_collections(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<BookmarkCollection>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (:User {user_id: $user_id})-[:OWNS]->(c:BookmarkCollection)
                     RETURN c {.*} AS collection
                     ORDER BY c.updated_at DESC, c.collection_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "collection",
            )
            .await
    }
}
