//! In-memory book storage

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio::sync::RwLock;

use crate::models::book::{Book, BookFields, BookFilter, BookSummary};

/// Length of generated book identifiers
pub const ID_LENGTH: usize = 16;

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a random URL-safe book identifier
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Insertion-ordered book collection behind a single lock
#[derive(Clone, Default)]
pub struct BooksRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BooksRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new book and return the stored record
    pub async fn insert(&self, fields: BookFields) -> Book {
        let now = Utc::now();
        let book = Book {
            id: generate_id(),
            finished: fields.is_finished(),
            name: fields.name,
            year: fields.year,
            author: fields.author,
            summary: fields.summary,
            publisher: fields.publisher,
            page_count: fields.page_count,
            read_page: fields.read_page,
            reading: fields.reading,
            inserted_at: now,
            updated_at: now,
        };

        self.books.write().await.push(book.clone());
        book
    }

    /// Books matching the filter, in insertion order
    pub async fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.books
            .read()
            .await
            .iter()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<Book> {
        self.books.read().await.iter().find(|book| book.id == id).cloned()
    }

    /// Replace the mutable fields of a book in place.
    ///
    /// `finished` is only recomputed when `recompute_finished` is set.
    pub async fn update(&self, id: &str, fields: BookFields, recompute_finished: bool) -> Option<Book> {
        let mut books = self.books.write().await;
        let book = books.iter_mut().find(|book| book.id == id)?;

        if recompute_finished {
            book.finished = fields.is_finished();
        }
        book.name = fields.name;
        book.year = fields.year;
        book.author = fields.author;
        book.summary = fields.summary;
        book.publisher = fields.publisher;
        book.page_count = fields.page_count;
        book.read_page = fields.read_page;
        book.reading = fields.reading;
        book.updated_at = Utc::now();

        Some(book.clone())
    }

    /// Remove a book, keeping the order of the others
    pub async fn delete(&self, id: &str) -> Option<Book> {
        let mut books = self.books.write().await;
        let index = books.iter().position(|book| book.id == id)?;
        Some(books.remove(index))
    }

    /// Number of books in the collection
    pub async fn count(&self) -> usize {
        self.books.read().await.len()
    }
}
