//! Book catalog service

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookPayload, BookQuery, BookSummary, PayloadError},
    repository::Repository,
};

const CREATE_FAILED: &str = "Gagal menambahkan buku";
const UPDATE_FAILED: &str = "Gagal memperbarui buku";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Validate and store a new book, returning its id
    pub async fn create_book(&self, payload: BookPayload) -> AppResult<String> {
        let fields = payload
            .validate()
            .map_err(|e| rejected(CREATE_FAILED, e))?;

        let book = self.repository.books.insert(fields).await;
        tracing::info!(book_id = %book.id, "Book created");
        Ok(book.id)
    }

    /// List books matching the query, in insertion order
    pub async fn list_books(&self, query: &BookQuery) -> Vec<BookSummary> {
        self.repository.books.list(&query.filter()).await
    }

    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await
            .ok_or_else(|| AppError::NotFound("Buku tidak ditemukan".to_string()))
    }

    /// Replace every mutable field of a book.
    ///
    /// The payload is validated before the id is looked up.
    pub async fn update_book(&self, id: &str, payload: BookPayload) -> AppResult<Book> {
        let fields = payload
            .validate()
            .map_err(|e| rejected(UPDATE_FAILED, e))?;

        let book = self
            .repository
            .books
            .update(id, fields, self.config.recompute_finished_on_update)
            .await
            .ok_or_else(|| AppError::NotFound(format!("{}. Id tidak ditemukan", UPDATE_FAILED)))?;

        tracing::info!(book_id = %book.id, "Book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.repository
            .books
            .delete(id)
            .await
            .ok_or_else(|| AppError::NotFound("Buku gagal dihapus. Id tidak ditemukan".to_string()))?;

        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Number of books currently held
    pub async fn count(&self) -> usize {
        self.repository.books.count().await
    }
}

fn rejected(context: &str, error: PayloadError) -> AppError {
    tracing::debug!(?error, "Book payload rejected");
    AppError::Validation(format!("{}. {}", context, error))
}
