//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppResult, ResponseStatus},
    models::book::{Book, BookPayload, BookQuery, BookSummary},
    AppState,
};

use super::{AppJson, AppQuery};

#[derive(Serialize, ToSchema)]
pub struct BookIdData {
    #[serde(rename = "bookId")]
    pub book_id: String,
}

/// Body of a successful create
#[derive(Serialize, ToSchema)]
pub struct BookCreatedResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub data: BookIdData,
}

#[derive(Serialize, ToSchema)]
pub struct BookListData {
    pub books: Vec<BookSummary>,
}

/// Body of a list request
#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub status: ResponseStatus,
    pub data: BookListData,
}

#[derive(Serialize, ToSchema)]
pub struct BookData {
    pub book: Book,
}

/// Body of a get-by-id request
#[derive(Serialize, ToSchema)]
pub struct BookDetailResponse {
    pub status: ResponseStatus,
    pub data: BookData,
}

/// Body of a successful update or delete
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageResponse {
    fn success(message: &str) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.to_string(),
        }
    }
}

/// Add a book to the shelf
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookCreatedResponse),
        (status = 400, description = "Missing name or readPage greater than pageCount", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookCreatedResponse>)> {
    let book_id = state.services.catalog.create_book(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            status: ResponseStatus::Success,
            message: "Buku berhasil ditambahkan".to_string(),
            data: BookIdData { book_id },
        }),
    ))
}

/// List books, optionally filtered by a single criterion
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books in insertion order", body = BookListResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AppQuery(pairs): AppQuery<Vec<(String, String)>>,
) -> AppResult<Json<BookListResponse>> {
    let query = BookQuery::from_pairs(pairs);
    let books = state.services.catalog.list_books(&query).await;

    Ok(Json(BookListResponse {
        status: ResponseStatus::Success,
        data: BookListData { books },
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetailResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<BookDetailResponse>> {
    let book = state.services.catalog.get_book(&book_id).await?;

    Ok(Json(BookDetailResponse {
        status: ResponseStatus::Success,
        data: BookData { book },
    }))
}

/// Replace a book's fields
#[utoipa::path(
    put,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Missing name or readPage greater than pageCount", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    AppJson(payload): AppJson<BookPayload>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.update_book(&book_id, payload).await?;
    Ok(Json(MessageResponse::success("Buku berhasil diperbarui")))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{bookId}",
    tag = "books",
    params(("bookId" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.delete_book(&book_id).await?;
    Ok(Json(MessageResponse::success("Buku berhasil dihapus")))
}
