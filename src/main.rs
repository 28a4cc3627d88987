use std::io::{self, BufRead, Write};
use std::path::Path;

use book_store::book::Book;
use book_store::library::{Library, SearchOutcome};
use book_store::storage::file::FileStorage;

fn main() -> anyhow::Result<()> {
    if Path::new(".env").exists() {
        dotenv::from_filename(".env")?;
    }
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let store_dir = std::env::var("BOOK_STORE_DIR").unwrap_or(".book_store".to_string());
    log::info!("Opening library stored under {:?}", store_dir);
    let mut library = Library::open(FileStorage::new(&store_dir))?;

    println!("book_store: type 'help' for the command list, 'quit' to leave.");
    let stdin = io::stdin();
    loop {
        print!("library> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "add" => add_book(&mut library, rest),
            "list" => list_books(&library),
            "search" => search_books(&library, rest),
            "borrow" => borrow_book(&mut library, rest),
            "return" => return_book(&mut library, rest),
            "edit" => edit_book(&mut library, rest),
            "delete" => delete_book(&mut library, rest),
            "clear" => clear_books(&mut library),
            "help" => print_help(),
            "quit" | "exit" => break,
            _ => println!("Unknown command {:?}, type 'help'.", command),
        }
    }

    Ok(())
}

fn split_fields(rest: &str, count: usize) -> Option<Vec<String>> {
    let fields: Vec<String> = rest
        .splitn(count, '|')
        .map(|field| field.trim().to_string())
        .collect();
    if fields.len() == count {
        Some(fields)
    } else {
        None
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    match raw.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => {
            println!("The year must be a whole number.");
            None
        }
    }
}

fn add_book(library: &mut Library<FileStorage>, rest: &str) {
    let fields = match split_fields(rest, 3) {
        Some(fields) => fields,
        None => {
            println!("Usage: add <title> | <author> | <year>");
            return;
        }
    };
    let year = match parse_year(&fields[2]) {
        Some(year) => year,
        None => return,
    };

    match library.add_book(&fields[0], &fields[1], year) {
        Ok(book) => println!(
            "{} by {} has been added to the library ({}).",
            book.title(),
            book.author(),
            book.id
        ),
        Err(err) => println!("{}", err),
    }
}

fn list_books(library: &Library<FileStorage>) {
    let books = library.books();
    if books.is_empty() {
        println!("No books in the library to display.");
        return;
    }
    print_books(&books);
}

fn print_books(books: &[&Book]) {
    for book in books {
        println!(
            "{}  {} by {}, {} [{}]",
            book.id,
            book.title(),
            book.author(),
            book.year(),
            if book.borrowed() { "Borrowed" } else { "Available" },
        );
    }
}

fn search_books(library: &Library<FileStorage>, query: &str) {
    match library.search(query) {
        Ok(SearchOutcome::Matches(books)) => {
            let books: Vec<&Book> = books.iter().collect();
            print_books(&books);
        }
        Ok(SearchOutcome::NoMatches) => println!("No books found matching {:?}.", query.trim()),
        Ok(SearchOutcome::NoBooks) => println!("No books in the library to search."),
        Err(err) => println!("{}", err),
    }
}

fn borrow_book(library: &mut Library<FileStorage>, id: &str) {
    match library.borrow_book(id) {
        Ok(book) => println!("{} has been borrowed successfully.", book.title()),
        Err(err) => println!("{}", err),
    }
}

fn return_book(library: &mut Library<FileStorage>, id: &str) {
    match library.return_book(id) {
        Ok(book) => println!("{} has been returned successfully.", book.title()),
        Err(err) => println!("{}", err),
    }
}

fn edit_book(library: &mut Library<FileStorage>, rest: &str) {
    let fields = match split_fields(rest, 4) {
        Some(fields) => fields,
        None => {
            println!("Usage: edit <id> | <title> | <author> | <year>");
            return;
        }
    };
    let year = match parse_year(&fields[3]) {
        Some(year) => year,
        None => return,
    };

    match library.update_book(&fields[0], &fields[1], &fields[2], year) {
        Ok(book) => println!("{} has been updated.", book.title()),
        Err(err) => println!("{}", err),
    }
}

fn delete_book(library: &mut Library<FileStorage>, id: &str) {
    match library.delete_book(id) {
        Ok(book) => println!("{} has been deleted from the library.", book.title()),
        Err(err) => println!("{}", err),
    }
}

fn clear_books(library: &mut Library<FileStorage>) {
    match library.clear() {
        Ok(()) => println!("All books cleared from the library."),
        Err(err) => println!("{}", err),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  add <title> | <author> | <year>");
    println!("  list");
    println!("  search <text>");
    println!("  borrow <id>");
    println!("  return <id>");
    println!("  edit <id> | <title> | <author> | <year>");
    println!("  delete <id>");
    println!("  clear");
    println!("  quit");
}
