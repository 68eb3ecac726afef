/// Listing model and database operations
///
/// A listing is a user-owned inventory record with text fields, free-form
/// tags, and an ordered set of stored image filenames. Every read, update,
/// and delete is scoped to the owner: a listing that exists but belongs to
/// someone else is reported exactly like a listing that does not exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE listings (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     image_paths TEXT[] NOT NULL DEFAULT '{}',
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Tags and image paths are native text arrays; order and duplicates are
/// preserved as entered. The comma-separated encoding exists only at the
/// multipart form boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Listing model representing one car in a user's collection
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    /// Unique listing ID (generated)
    pub id: i64,

    /// Listing title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Ordered tags, duplicates preserved
    pub tags: Vec<String>,

    /// Stored image filenames, in upload order
    pub image_paths: Vec<String>,

    /// Owning user's ID
    pub owner_id: i64,

    /// When the listing was created
    pub created_at: DateTime<Utc>,

    /// When the listing was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListing {
    /// Listing title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Parsed tags (see [`parse_tags`])
    pub tags: Vec<String>,

    /// Stored image filenames
    pub image_paths: Vec<String>,

    /// Owning user's ID
    pub owner_id: i64,
}

/// Input for updating an existing listing
///
/// All fields are optional; None means "leave unchanged". A provided
/// image set fully replaces the old one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateListing {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New tag set (full replacement)
    pub tags: Option<Vec<String>>,

    /// New image set (full replacement)
    pub image_paths: Option<Vec<String>>,
}

impl UpdateListing {
    /// Whether any field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.image_paths.is_none()
    }
}

/// Parses a comma-separated tag string into an ordered tag list
///
/// Each segment is trimmed of surrounding whitespace. Interior empty
/// segments are kept; only an input with no non-empty segment at all
/// stores as an empty list. Order and duplicates are preserved.
///
/// # Example
///
/// ```
/// use carfolio_shared::models::listing::parse_tags;
///
/// assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
/// assert_eq!(parse_tags("a,,b"), vec!["a", "", "b"]);
/// assert_eq!(parse_tags(""), Vec::<String>::new());
/// ```
pub fn parse_tags(raw: &str) -> Vec<String> {
    let tags: Vec<String> = raw.split(',').map(|tag| tag.trim().to_string()).collect();

    if tags.iter().all(|tag| tag.is_empty()) {
        return Vec::new();
    }

    tags
}

impl Listing {
    /// Creates a new listing owned by the given user
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key
    /// violation) or the database is unreachable
    pub async fn create(pool: &PgPool, data: CreateListing) -> Result<Self, sqlx::Error> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (title, description, tags, image_paths, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, tags, image_paths, owner_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.tags)
        .bind(data.image_paths)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(listing)
    }

    /// Lists all listings owned by the given user
    ///
    /// Ordered by id so repeated reads are stable.
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, description, tags, image_paths, owner_id,
                   created_at, updated_at
            FROM listings
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(listings)
    }

    /// Searches the user's listings for a keyword
    ///
    /// Case-insensitive substring match over title, description, and the
    /// comma-joined tag string. An empty result is not an error.
    pub async fn search(
        pool: &PgPool,
        owner_id: i64,
        keyword: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", keyword);

        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, description, tags, image_paths, owner_id,
                   created_at, updated_at
            FROM listings
            WHERE owner_id = $1
              AND (title ILIKE $2
                   OR description ILIKE $2
                   OR array_to_string(tags, ',') ILIKE $2)
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(listings)
    }

    /// Finds a listing by id, scoped to its owner
    ///
    /// # Returns
    ///
    /// None when the listing is absent or owned by another user; the two
    /// cases are indistinguishable by design.
    pub async fn find_by_owner(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, title, description, tags, image_paths, owner_id,
                   created_at, updated_at
            FROM listings
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(listing)
    }

    /// Updates a listing, scoped to its owner
    ///
    /// Only fields set in `data` are written; `updated_at` is bumped on
    /// every update. Concurrent updates to the same listing are
    /// last-write-wins; no locking is taken.
    ///
    /// # Returns
    ///
    /// The updated listing, or None when absent/not owned
    pub async fn update(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
        data: UpdateListing,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            // Nothing to write; still report NotFound for foreign rows.
            return Self::find_by_owner(pool, owner_id, id).await;
        }

        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE listings SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }
        if data.image_paths.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image_paths = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND owner_id = $2 \
             RETURNING id, title, description, tags, image_paths, owner_id, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Listing>(&query).bind(id).bind(owner_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(tags) = data.tags {
            q = q.bind(tags);
        }
        if let Some(image_paths) = data.image_paths {
            q = q.bind(image_paths);
        }

        let listing = q.fetch_optional(pool).await?;

        Ok(listing)
    }

    /// Deletes a listing, scoped to its owner
    ///
    /// # Returns
    ///
    /// The stored image filenames of the deleted listing, so the caller
    /// can run best-effort file cleanup; None when absent/not owned
    pub async fn delete(
        pool: &PgPool,
        owner_id: i64,
        id: i64,
    ) -> Result<Option<Vec<String>>, sqlx::Error> {
        let row: Option<(Vec<String>,)> = sqlx::query_as(
            r#"
            DELETE FROM listings
            WHERE id = $1 AND owner_id = $2
            RETURNING image_paths
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(paths,)| paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_trims_whitespace() {
        assert_eq!(parse_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_tags("sedan, cheap"), vec!["sedan", "cheap"]);
    }

    #[test]
    fn test_parse_tags_empty_input() {
        assert_eq!(parse_tags(""), Vec::<String>::new());
        assert_eq!(parse_tags("   "), Vec::<String>::new());
        assert_eq!(parse_tags(",,,"), Vec::<String>::new());
    }

    #[test]
    fn test_parse_tags_keeps_interior_empty_segments() {
        assert_eq!(parse_tags("a,,b"), vec!["a", "", "b"]);
        assert_eq!(parse_tags("a, ,b"), vec!["a", "", "b"]);
        assert_eq!(parse_tags("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_parse_tags_preserves_order_and_duplicates() {
        assert_eq!(parse_tags("b,a,b"), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_parse_tags_single() {
        assert_eq!(parse_tags("sedan"), vec!["sedan"]);
        assert_eq!(parse_tags("  sedan  "), vec!["sedan"]);
    }

    #[test]
    fn test_update_listing_is_empty() {
        assert!(UpdateListing::default().is_empty());

        let update = UpdateListing {
            title: Some("Civic".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // Integration tests for database operations are in carfolio-api/tests/
}
