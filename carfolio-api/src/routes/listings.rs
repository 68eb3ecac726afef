/// Car listing endpoints
///
/// All endpoints require bearer token authentication and are scoped to
/// the authenticated owner: a listing that exists but belongs to another
/// user is reported as 404, indistinguishable from one that doesn't
/// exist.
///
/// # Endpoints
///
/// - `POST /cars` - Create listing (multipart form)
/// - `GET /cars` - List the caller's listings
/// - `GET /cars/search?keyword=` - Keyword search over the caller's listings
/// - `GET /cars/:id` - Fetch one listing
/// - `PUT /cars/:id` - Partial update (multipart form)
/// - `DELETE /cars/:id` - Delete listing and its image files
///
/// # Multipart form fields
///
/// - `title`, `description`: text
/// - `tags`: comma-separated text (the comma encoding exists only at this
///   boundary; tags are stored as a native array)
/// - `images`: up to 10 image files; extras are silently dropped

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap},
    Extension, Json,
};
use bytes::Bytes;
use carfolio_shared::{
    auth::middleware::AuthContext,
    models::listing::{parse_tags, CreateListing, Listing, UpdateListing},
    storage::{ImageStore, MAX_IMAGES_PER_LISTING},
};
use serde::{Deserialize, Serialize};

/// Listing representation returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    /// Listing ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Tags, order preserved
    pub tags: Vec<String>,

    /// Absolute image URLs, built from the request's base address
    pub image_urls: Vec<String>,

    /// Owning user's ID
    pub owner_id: i64,
}

impl ListingResponse {
    /// Builds the wire representation, turning stored filenames into
    /// absolute URLs under the request's base address
    fn from_listing(listing: Listing, base: &str) -> Self {
        let image_urls = listing
            .image_paths
            .iter()
            .map(|filename| ImageStore::url_for(base, filename))
            .collect();

        Self {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            tags: listing.tags,
            image_urls,
            owner_id: listing.owner_id,
        }
    }
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match against title, description, and tags
    pub keyword: String,
}

/// Delete confirmation response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
}

/// Fields read from a listing multipart form
///
/// Every field is optional at this level; create and update enforce
/// their own presence rules.
#[derive(Debug, Default)]
struct ListingForm {
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    images: Vec<Bytes>,
}

/// Reads a listing multipart form
///
/// Image files beyond [`MAX_IMAGES_PER_LISTING`] are silently dropped.
async fn read_listing_form(mut multipart: Multipart) -> Result<ListingForm, ApiError> {
    let mut form = ListingForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());

        match name.as_deref() {
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid title field: {}", e)))?;
                form.title = Some(text);
            }
            Some("description") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Invalid description field: {}", e))
                })?;
                form.description = Some(text);
            }
            Some("tags") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid tags field: {}", e)))?;
                form.tags = Some(text);
            }
            Some("images") => {
                // Cap at 10 images per request; extras are dropped
                if form.images.len() < MAX_IMAGES_PER_LISTING {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Invalid image field: {}", e)))?;
                    form.images.push(bytes);
                }
            }
            _ => { /* ignore unknown fields */ }
        }
    }

    Ok(form)
}

/// Builds the request's base address (scheme + authority) for image URLs
///
/// The scheme comes from X-Forwarded-Proto when a proxy sets it,
/// defaulting to http.
fn request_base(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// Stores uploaded image bytes, returning the generated filenames
async fn store_images(images: &ImageStore, uploads: &[Bytes]) -> Result<Vec<String>, ApiError> {
    let mut filenames = Vec::with_capacity(uploads.len());
    for bytes in uploads {
        filenames.push(images.store(bytes).await?);
    }
    Ok(filenames)
}

/// Create a listing
///
/// # Endpoint
///
/// ```text
/// POST /cars
/// Authorization: Bearer <token>
/// Content-Type: multipart/form-data
///
/// title=Civic&description=clean&tags=sedan, cheap&images=<file>...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `422 Unprocessable Entity`: Missing title or description
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<Json<ListingResponse>> {
    let form = read_listing_form(multipart).await?;

    let mut missing = Vec::new();
    if form.title.is_none() {
        missing.push("title");
    }
    if form.description.is_none() {
        missing.push("description");
    }
    if !missing.is_empty() {
        return Err(ApiError::ValidationError(
            missing
                .into_iter()
                .map(|field| ValidationErrorDetail {
                    field: field.to_string(),
                    message: "Field is required".to_string(),
                })
                .collect(),
        ));
    }

    let tags = parse_tags(form.tags.as_deref().unwrap_or(""));
    let image_paths = store_images(&state.images, &form.images).await?;

    let listing = Listing::create(
        &state.db,
        CreateListing {
            title: form.title.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            tags,
            image_paths,
            owner_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(listing_id = listing.id, owner_id = auth.user_id, "Created listing");

    let base = request_base(&headers);
    Ok(Json(ListingResponse::from_listing(listing, &base)))
}

/// List all of the caller's listings
///
/// # Endpoint
///
/// ```text
/// GET /cars
/// Authorization: Bearer <token>
/// ```
pub async fn list_listings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let listings = Listing::list_by_owner(&state.db, auth.user_id).await?;

    let base = request_base(&headers);
    let body = listings
        .into_iter()
        .map(|l| ListingResponse::from_listing(l, &base))
        .collect();

    Ok(Json(body))
}

/// Search the caller's listings by keyword
///
/// Substring match over title, description, and tags. No match is an
/// empty list, never an error.
///
/// # Endpoint
///
/// ```text
/// GET /cars/search?keyword=sedan
/// Authorization: Bearer <token>
/// ```
pub async fn search_listings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ListingResponse>>> {
    let listings = Listing::search(&state.db, auth.user_id, &query.keyword).await?;

    let base = request_base(&headers);
    let body = listings
        .into_iter()
        .map(|l| ListingResponse::from_listing(l, &base))
        .collect();

    Ok(Json(body))
}

/// Fetch one listing
///
/// # Endpoint
///
/// ```text
/// GET /cars/:id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Listing absent or owned by another user
pub async fn get_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<ListingResponse>> {
    let listing = Listing::find_by_owner(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

    let base = request_base(&headers);
    Ok(Json(ListingResponse::from_listing(listing, &base)))
}

/// Update a listing (partial)
///
/// Each field is independently optional; absent fields are left
/// unchanged. An empty-string title, description, or tags field is also
/// treated as "not provided" (the transport contract: a caller cannot
/// clear a field). Supplying any image files fully replaces the old image
/// set; the old files are deleted best-effort.
///
/// # Endpoint
///
/// ```text
/// PUT /cars/:id
/// Authorization: Bearer <token>
/// Content-Type: multipart/form-data
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Listing absent or owned by another user
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<ListingResponse>> {
    let form = read_listing_form(multipart).await?;

    // Ownership check before touching any files
    let existing = Listing::find_by_owner(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

    // Empty strings mean "do not update" at this boundary
    let mut update = UpdateListing {
        title: form.title.filter(|t| !t.is_empty()),
        description: form.description.filter(|d| !d.is_empty()),
        tags: form
            .tags
            .filter(|t| !t.is_empty())
            .map(|t| parse_tags(&t)),
        image_paths: None,
    };

    // A new image set fully replaces the old one
    if !form.images.is_empty() {
        state.images.delete_all(&existing.image_paths).await;
        update.image_paths = Some(store_images(&state.images, &form.images).await?);
    }

    let listing = Listing::update(&state.db, auth.user_id, id, update)
        .await?
        // Deleted between the ownership check and the write; benign race
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

    tracing::info!(listing_id = listing.id, owner_id = auth.user_id, "Updated listing");

    let base = request_base(&headers);
    Ok(Json(ListingResponse::from_listing(listing, &base)))
}

/// Delete a listing and its stored image files
///
/// File deletion is best-effort: a failure leaves orphaned files but
/// never fails the request.
///
/// # Endpoint
///
/// ```text
/// DELETE /cars/:id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Listing absent or owned by another user
pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let image_paths = Listing::delete(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

    state.images.delete_all(&image_paths).await;

    tracing::info!(listing_id = id, owner_id = auth.user_id, "Deleted listing");

    Ok(Json(DeleteResponse {
        message: "Car deleted successfully".to_string(),
    }))
}
