use thiserror::Error;

use crate::book::{Book, BookId, InvalidBookField};
use crate::storage::{KeyValueStorage, StorageError, StorageResult};

/// The one key the whole serialized collection lives under.
pub const BOOKS_KEY: &str = "library_books";

#[derive(Debug, Error)]
pub enum OpenLibraryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored books are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}
pub type OpenLibraryResult<T> = Result<T, OpenLibraryError>;

#[derive(Debug, Error)]
pub enum AddBookError {
    #[error(transparent)]
    InvalidField(#[from] InvalidBookField),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
pub type AddBookResult<T> = Result<T, AddBookError>;

#[derive(Debug, Error)]
pub enum DeleteBookError {
    #[error("there are no books in the library")]
    NoBooks,
    #[error("no book with id {0}")]
    DoesntExist(BookId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
pub type DeleteBookResult<T> = Result<T, DeleteBookError>;

#[derive(Debug, Error)]
pub enum BorrowBookError {
    #[error("no book with id {0}")]
    DoesntExist(BookId),
    #[error("book {0} is already borrowed")]
    AlreadyBorrowed(BookId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
pub type BorrowBookResult<T> = Result<T, BorrowBookError>;

#[derive(Debug, Error)]
pub enum ReturnBookError {
    #[error("no book with id {0}")]
    DoesntExist(BookId),
    #[error("book {0} is not currently borrowed")]
    NotBorrowed(BookId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
pub type ReturnBookResult<T> = Result<T, ReturnBookError>;

#[derive(Debug, Error)]
pub enum UpdateBookError {
    #[error("no book with id {0}")]
    DoesntExist(BookId),
    #[error(transparent)]
    InvalidField(#[from] InvalidBookField),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
pub type UpdateBookResult<T> = Result<T, UpdateBookError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("search query must not be blank")]
pub struct BlankQuery;
pub type SearchBooksResult<T> = Result<T, BlankQuery>;

/// A blank result is not an error; an empty library and a query that matched
/// nothing are separate outcomes so the caller can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Matches(Vec<Book>),
    NoMatches,
    NoBooks,
}

/// Owns the book collection and keeps it in step with the backing storage:
/// every successful mutation persists the whole collection before returning.
#[derive(Debug)]
pub struct Library<S: KeyValueStorage> {
    storage: S,
    books: Vec<Book>,
    // last state known to be persisted
    saved_books: Vec<Book>,
}

impl<S: KeyValueStorage> Library<S> {
    /// An absent key means the library was never saved and starts empty.
    pub fn open(storage: S) -> OpenLibraryResult<Library<S>> {
        let books = match storage.read(BOOKS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Book>>(&raw)?,
            None => Vec::new(),
        };
        log::debug!("opened library with {} books", books.len());

        Ok(Library {
            storage,
            saved_books: books.clone(),
            books,
        })
    }

    pub fn add_book(&mut self, title: &str, author: &str, year: i32) -> AddBookResult<Book> {
        let book = Book::new(title, author, year)?;
        self.books.push(book.clone());
        self.save()?;

        log::debug!("added book {}", book.id);
        Ok(book)
    }

    pub fn delete_book(&mut self, id: &str) -> DeleteBookResult<Book> {
        if self.books.is_empty() {
            return Err(DeleteBookError::NoBooks);
        }

        let position = self
            .books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| DeleteBookError::DoesntExist(id.to_string()))?;

        let removed = self.books.remove(position);
        self.save()?;

        log::debug!("deleted book {}", removed.id);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn search(&self, query: &str) -> SearchBooksResult<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BlankQuery);
        }
        if self.books.is_empty() {
            return Ok(SearchOutcome::NoBooks);
        }

        let matches: Vec<Book> = self
            .books
            .iter()
            .filter(|book| book.matches(query))
            .cloned()
            .collect();

        if matches.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }
        Ok(SearchOutcome::Matches(matches))
    }

    pub fn borrow_book(&mut self, id: &str) -> BorrowBookResult<Book> {
        let book = match self.books.iter_mut().find(|book| book.id == id) {
            Some(book) => book,
            None => return Err(BorrowBookError::DoesntExist(id.to_string())),
        };

        if book.borrow_book().is_err() {
            // reported as a no-op, nothing changed so nothing to persist
            return Err(BorrowBookError::AlreadyBorrowed(id.to_string()));
        }

        let borrowed = book.clone();
        self.save()?;
        Ok(borrowed)
    }

    pub fn return_book(&mut self, id: &str) -> ReturnBookResult<Book> {
        let book = match self.books.iter_mut().find(|book| book.id == id) {
            Some(book) => book,
            None => return Err(ReturnBookError::DoesntExist(id.to_string())),
        };

        if book.return_book().is_err() {
            return Err(ReturnBookError::NotBorrowed(id.to_string()));
        }

        let returned = book.clone();
        self.save()?;
        Ok(returned)
    }

    /// Edits resolve strictly by id; the title is data, not identity.
    pub fn update_book(
        &mut self,
        id: &str,
        title: &str,
        author: &str,
        year: i32,
    ) -> UpdateBookResult<Book> {
        let book = match self.books.iter_mut().find(|book| book.id == id) {
            Some(book) => book,
            None => return Err(UpdateBookError::DoesntExist(id.to_string())),
        };

        book.update_details(title, author, year)?;

        let updated = book.clone();
        self.save()?;
        Ok(updated)
    }

    pub fn books(&self) -> Vec<&Book> {
        self.books.iter().collect()
    }

    /// Erases the stored key entirely rather than writing an empty array.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.storage.remove(BOOKS_KEY)?;
        self.books.clear();
        self.saved_books.clear();

        log::debug!("cleared the library");
        Ok(())
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn save(&mut self) -> StorageResult<()> {
        let result = serde_json::to_string(&self.books)
            .map_err(|err| StorageError::new(BOOKS_KEY, err.into()))
            .and_then(|payload| self.storage.write(BOOKS_KEY, &payload));

        if let Err(err) = result {
            // keep memory and storage in step: drop the unpersisted change
            self.books = self.saved_books.clone();
            return Err(err);
        }

        self.saved_books = self.books.clone();
        Ok(())
    }
}
