use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::book_store::{BookDraft, BookPatch, CatalogPatch, StoreError};
use crate::filtering::{filter_books, pick_random, FilterOptions};
use crate::interchange::{export_books, import_content, ExportFormat, ImportResult};
use tower_http::services::ServeDir;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::session::Identity;
use super::state::{GuardedBookService, ServerState};
use super::{log_requests, RequestsLoggingLevel};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub user: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => StatusCode::NOT_FOUND.into_response(),
        StoreError::Backend(err) => {
            error!("Store failure: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn home(identity: Identity, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        user: identity.0,
    };
    Json(stats)
}

// =============================================================================
// Catalogs
// =============================================================================

#[derive(Deserialize, Debug)]
struct CreateCatalogBody {
    pub name: String,
    pub description: Option<String>,
}

async fn get_catalogs(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
) -> Response {
    match book_service.get_catalogs(identity.as_deref()) {
        Ok(catalogs) => Json(catalogs).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn create_catalog(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Json(body): Json<CreateCatalogBody>,
) -> Response {
    if body.name.trim().is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Catalog name must not be empty")
            .into_response();
    }
    match book_service.create_catalog(identity.as_deref(), &body.name, body.description.as_deref())
    {
        Ok(catalog) => (StatusCode::CREATED, Json(catalog)).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn update_catalog(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Json(patch): Json<CatalogPatch>,
) -> Response {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return (StatusCode::UNPROCESSABLE_ENTITY, "Catalog name must not be empty")
                .into_response();
        }
    }
    match book_service.update_catalog(identity.as_deref(), &catalog_id, &patch) {
        Ok(catalog) => Json(catalog).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn delete_catalog(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
) -> Response {
    match book_service.delete_catalog(identity.as_deref(), &catalog_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

// =============================================================================
// Books
// =============================================================================

/// Filter dimensions as query parameters; `tags` is comma-separated.
#[derive(Deserialize, Debug, Default)]
struct BooksQuery {
    #[serde(default)]
    favorites: bool,
    #[serde(default)]
    read: bool,
    #[serde(default)]
    unread: bool,
    genre: Option<String>,
    holiday_category: Option<String>,
    tags: Option<String>,
    search: Option<String>,
}

impl BooksQuery {
    fn into_filters(self) -> FilterOptions {
        FilterOptions {
            favorites: self.favorites,
            read: self.read,
            unread: self.unread,
            genre: self.genre,
            holiday_category: self.holiday_category,
            tags: self.tags.map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
            search: self.search,
        }
    }
}

async fn get_books(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Query(query): Query<BooksQuery>,
) -> Response {
    match book_service.get_books(identity.as_deref(), &catalog_id) {
        Ok(books) => Json(filter_books(&books, &query.into_filters())).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn get_random_book(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Query(query): Query<BooksQuery>,
) -> Response {
    match book_service.get_books(identity.as_deref(), &catalog_id) {
        Ok(books) => {
            let visible = filter_books(&books, &query.into_filters());
            Json(pick_random(&visible)).into_response()
        }
        Err(err) => store_error_response(err),
    }
}

fn default_auto_enrich() -> bool {
    true
}

#[derive(Deserialize, Debug)]
struct AddBookBody {
    #[serde(flatten)]
    pub draft: BookDraft,
    #[serde(default = "default_auto_enrich")]
    pub auto_enrich: bool,
}

async fn add_book(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Json(body): Json<AddBookBody>,
) -> Response {
    if body.draft.title.trim().is_empty() || body.draft.author.trim().is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Title and author must not be empty")
            .into_response();
    }
    match book_service
        .add_book(identity.as_deref(), &catalog_id, &body.draft, body.auto_enrich)
        .await
    {
        Ok(book) => (StatusCode::CREATED, Json(book)).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn get_book(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(book_id): Path<String>,
) -> Response {
    match book_service.get_book_by_id(identity.as_deref(), &book_id) {
        Ok(Some(book)) => Json(book).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn update_book(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(book_id): Path<String>,
    Json(patch): Json<BookPatch>,
) -> Response {
    match book_service.update_book(identity.as_deref(), &book_id, &patch) {
        Ok(book) => Json(book).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn delete_book(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(book_id): Path<String>,
) -> Response {
    match book_service.delete_book(identity.as_deref(), &book_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn toggle_favorite(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(book_id): Path<String>,
) -> Response {
    match book_service.toggle_favorite(identity.as_deref(), &book_id) {
        Ok(book) => Json(book).into_response(),
        Err(err) => store_error_response(err),
    }
}

async fn toggle_read(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(book_id): Path<String>,
) -> Response {
    match book_service.toggle_read(identity.as_deref(), &book_id) {
        Ok(book) => Json(book).into_response(),
        Err(err) => store_error_response(err),
    }
}

// =============================================================================
// Import / export
// =============================================================================

/// Decode an uploaded file into an import preview. Malformed uploads are a
/// normal outcome here: the failure lands in the result's error list and
/// the response is still 200.
async fn import_preview(mut multipart: Multipart) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return Json(ImportResult::failure("File is empty"))
                .into_response()
        }
        Err(err) => {
            return Json(ImportResult::failure(format!(
                "Failed to read file: {}",
                err
            )))
            .into_response()
        }
    };

    let filename = field.file_name().unwrap_or_default().to_string();
    let content = match field.text().await {
        Ok(content) => content,
        Err(err) => {
            return Json(ImportResult::failure(format!(
                "Failed to read file: {}",
                err
            )))
            .into_response()
        }
    };

    Json(import_content(&content, &filename)).into_response()
}

#[derive(Deserialize, Debug)]
struct CommitImportBody {
    pub books: Vec<BookDraft>,
}

async fn commit_import(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Json(body): Json<CommitImportBody>,
) -> Response {
    let outcome = book_service
        .commit_import(identity.as_deref(), &catalog_id, &body.books)
        .await;
    info!(
        "Imported {} of {} records into catalog {} ({} failed)",
        outcome.imported,
        body.books.len(),
        catalog_id,
        outcome.failed
    );
    Json(outcome).into_response()
}

#[derive(Deserialize, Debug)]
struct ExportQuery {
    pub format: ExportFormat,
}

async fn export_catalog(
    identity: Identity,
    State(book_service): State<GuardedBookService>,
    Path(catalog_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let owner = identity.as_deref();

    let catalog = match book_service.get_catalogs(owner) {
        Ok(catalogs) => match catalogs.into_iter().find(|c| c.id == catalog_id) {
            Some(catalog) => catalog,
            None => return StatusCode::NOT_FOUND.into_response(),
        },
        Err(err) => return store_error_response(err),
    };

    let books = match book_service.get_books(owner, &catalog_id) {
        Ok(books) => books,
        Err(err) => return store_error_response(err),
    };

    let document = export_books(&books, query.format, &catalog.name);
    let disposition = if document.inline {
        format!("inline; filename=\"{}\"", document.filename)
    } else {
        format!("attachment; filename=\"{}\"", document.filename)
    };

    (
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.content,
    )
        .into_response()
}

// =============================================================================
// App assembly
// =============================================================================

pub fn make_app(state: ServerState) -> Router {
    let mut app = Router::new()
        .route("/", get(home))
        .route("/catalogs", get(get_catalogs))
        .route("/catalogs", post(create_catalog))
        .route("/catalogs/{catalog_id}", put(update_catalog))
        .route("/catalogs/{catalog_id}", delete(delete_catalog))
        .route("/catalogs/{catalog_id}/books", get(get_books))
        .route("/catalogs/{catalog_id}/books", post(add_book))
        .route("/catalogs/{catalog_id}/books/random", get(get_random_book))
        .route("/catalogs/{catalog_id}/import/commit", post(commit_import))
        .route("/catalogs/{catalog_id}/export", get(export_catalog))
        .route("/import", post(import_preview))
        .route("/books/{book_id}", get(get_book))
        .route("/books/{book_id}", put(update_book))
        .route("/books/{book_id}", delete(delete_book))
        .route("/books/{book_id}/favorite", post(toggle_favorite))
        .route("/books/{book_id}/read", post(toggle_read))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    if let Some(frontend_dir_path) = &state.config.frontend_dir_path {
        info!("Serving frontend from {}", frontend_dir_path);
        app = app.fallback_service(ServeDir::new(frontend_dir_path));
    }

    app.with_state(state)
}

pub async fn run_server(
    book_service: GuardedBookService,
    logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> anyhow::Result<()> {
    let state = ServerState {
        config: super::ServerConfig {
            requests_logging_level: logging_level,
            port,
            frontend_dir_path,
        },
        start_time: Instant::now(),
        book_service,
        hash: env!("GIT_HASH").to_string(),
    };

    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
