use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type BookId = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBookField {
    #[error("title must not be blank")]
    EmptyTitle,
    #[error("author must not be blank")]
    EmptyAuthor,
    #[error("publication year must not be negative")]
    NegativeYear,
}

pub type NewBookResult<T> = Result<T, InvalidBookField>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("book is already borrowed")]
pub struct AlreadyBorrowed;
pub type BorrowResult<T> = Result<T, AlreadyBorrowed>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("book is not borrowed")]
pub struct NotBorrowed;
pub type ReturnResult<T> = Result<T, NotBorrowed>;

/// One catalogued book. The id is assigned at construction and never changes;
/// title and author are plain mutable data.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Book {
    pub id: BookId,
    title: String,
    author: String,
    year: i32,
    borrowed: bool,
}

impl Book {
    pub fn new(title: &str, author: &str, year: i32) -> NewBookResult<Book> {
        let (title, author, year) = validated_fields(title, author, year)?;
        Ok(Book {
            id: Uuid::new_v4().to_string(),
            title,
            author,
            year,
            borrowed: false,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn borrowed(&self) -> bool {
        self.borrowed
    }

    pub fn borrow_book(&mut self) -> BorrowResult<()> {
        if self.borrowed {
            return Err(AlreadyBorrowed);
        }
        self.borrowed = true;
        Ok(())
    }

    pub fn return_book(&mut self) -> ReturnResult<()> {
        if !self.borrowed {
            return Err(NotBorrowed);
        }
        self.borrowed = false;
        Ok(())
    }

    /// Replaces title, author and year. The id and the borrowed flag are
    /// untouched; nothing changes when validation fails.
    pub fn update_details(&mut self, title: &str, author: &str, year: i32) -> NewBookResult<()> {
        let (title, author, year) = validated_fields(title, author, year)?;
        self.title = title;
        self.author = author;
        self.year = year;
        Ok(())
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.author.to_lowercase().contains(&query)
    }
}

fn validated_fields(title: &str, author: &str, year: i32) -> NewBookResult<(String, String, i32)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InvalidBookField::EmptyTitle);
    }
    let author = author.trim();
    if author.is_empty() {
        return Err(InvalidBookField::EmptyAuthor);
    }
    if year < 0 {
        return Err(InvalidBookField::NegativeYear);
    }
    Ok((title.to_string(), author.to_string(), year))
}

#[cfg(test)]
mod tests {
    use super::{AlreadyBorrowed, Book, InvalidBookField, NotBorrowed};

    #[test]
    fn test_new_book() {
        let book = Book::new("Dune", "Frank Herbert", 1965).unwrap();

        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.year(), 1965);
        assert!(!book.borrowed());
    }

    #[test]
    fn test_new_book_unique_ids() {
        let first = Book::new("Dune", "Frank Herbert", 1965).unwrap();
        let second = Book::new("Dune", "Frank Herbert", 1965).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_new_book_trims_fields() {
        let book = Book::new("  Dune ", " Frank Herbert  ", 1965).unwrap();

        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
    }

    #[test]
    fn test_new_book_validation() {
        assert_eq!(
            Book::new("", "Frank Herbert", 1965),
            Err(InvalidBookField::EmptyTitle)
        );
        assert_eq!(
            Book::new("   ", "Frank Herbert", 1965),
            Err(InvalidBookField::EmptyTitle)
        );
        assert_eq!(Book::new("Dune", " ", 1965), Err(InvalidBookField::EmptyAuthor));
        assert_eq!(
            Book::new("Dune", "Frank Herbert", -1),
            Err(InvalidBookField::NegativeYear)
        );
    }

    #[test]
    fn test_borrow_and_return() {
        let mut book = Book::new("Dune", "Frank Herbert", 1965).unwrap();

        book.borrow_book().unwrap();
        assert!(book.borrowed());

        assert_eq!(book.borrow_book(), Err(AlreadyBorrowed));
        assert!(book.borrowed());

        book.return_book().unwrap();
        assert!(!book.borrowed());

        assert_eq!(book.return_book(), Err(NotBorrowed));
        assert!(!book.borrowed());
    }

    #[test]
    fn test_update_details() {
        let mut book = Book::new("Dune", "Frank Herbert", 1965).unwrap();
        let id = book.id.clone();
        book.borrow_book().unwrap();

        book.update_details("Dune Messiah", "Frank Herbert", 1969).unwrap();

        assert_eq!(book.id, id);
        assert_eq!(book.title(), "Dune Messiah");
        assert_eq!(book.year(), 1969);
        assert!(book.borrowed());
    }

    #[test]
    fn test_update_details_invalid_leaves_book_unchanged() {
        let mut book = Book::new("Dune", "Frank Herbert", 1965).unwrap();

        let result = book.update_details("Dune Messiah", "", 1969);

        assert_eq!(result, Err(InvalidBookField::EmptyAuthor));
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert_eq!(book.year(), 1965);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let book = Book::new("A Year of Magic", "Ursula Vernon", 2001).unwrap();

        assert!(book.matches("year"));
        assert!(book.matches("YEAR"));
        assert!(book.matches("vernon"));
        assert!(!book.matches("herbert"));
    }

    #[test]
    fn test_stored_shape_restores_borrowed_verbatim() {
        let raw = r#"[{"id":"one","title":"Dune","author":"Frank Herbert","year":1965,"borrowed":true},
                      {"id":"two","title":"Emma","author":"Jane Austen","year":1815,"borrowed":false}]"#;

        let books: Vec<Book> = serde_json::from_str(raw).unwrap();

        assert_eq!(books[0].id, "one");
        assert!(books[0].borrowed());
        assert_eq!(books[1].id, "two");
        assert!(!books[1].borrowed());
    }
}
