use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use library::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// libcat - Library catalog and circulation manager
#[derive(Parser)]
#[command(name = "libcat")]
#[command(about = "Library catalog with ranked search, circulation and review sentiment", long_about = None)]
struct Cli {
    /// Path to the JSON data file
    #[arg(short, long, global = true, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Keep everything in memory; nothing is read or written
    #[arg(long, global = true)]
    in_memory: bool,

    /// Default loan period in days
    #[arg(long, global = true, default_value = "14")]
    loan_days: u32,

    /// Sentiment lexicon file (vader_lexicon.txt format); defaults to the built-in one
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to the catalog
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "")]
        isbn: String,
        #[arg(long, default_value = "")]
        genre: String,
        /// Number of copies owned
        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        copies: i64,
    },

    /// List all books, or show one
    Books {
        #[arg(long)]
        id: Option<BookId>,
    },

    /// Change fields of a book
    UpdateBook {
        #[arg(long)]
        id: BookId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        copies: Option<u32>,
    },

    /// Remove a book from the catalog
    DeleteBook {
        #[arg(long)]
        id: BookId,
    },

    /// Register a borrower
    AddBorrower {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// List all borrowers, or show one
    Borrowers {
        #[arg(long)]
        id: Option<BorrowerId>,
    },

    /// Change a borrower's contact details
    UpdateBorrower {
        #[arg(long)]
        id: BorrowerId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Remove a borrower
    DeleteBorrower {
        #[arg(long)]
        id: BorrowerId,
    },

    /// Borrow one copy of a book
    Borrow {
        #[arg(long)]
        book_id: BookId,
        #[arg(long)]
        borrower_id: BorrowerId,
        /// Loan period, overriding --loan-days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Return a borrowed copy
    Return {
        #[arg(long)]
        transaction_id: TransactionId,
    },

    /// List transactions
    Transactions {
        /// Only open transactions
        #[arg(long)]
        active: bool,
        /// Only open transactions past their due date
        #[arg(long, conflicts_with = "active")]
        overdue: bool,
    },

    /// Ranked free-text search over the catalog
    Search {
        query: String,
        /// title, author, genre or all
        #[arg(long, default_value = "all")]
        scope: SearchScope,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Add a review; its sentiment is classified on the way in
    Review {
        #[arg(long)]
        book_id: BookId,
        #[arg(long)]
        borrower_id: BorrowerId,
        #[arg(long)]
        text: String,
        /// 1 to 5
        #[arg(long, allow_negative_numbers = true)]
        rating: i64,
    },

    /// List reviews of a book
    Reviews {
        #[arg(long)]
        book_id: BookId,
    },

    /// Summarize review sentiment for a book
    Sentiment {
        #[arg(long)]
        book_id: BookId,
    },

    /// Race concurrent borrows against a fresh in-memory library.
    /// The data file is never written.
    Stress {
        /// Number of concurrent borrow tasks
        #[arg(long, default_value = "64")]
        tasks: usize,

        /// Copies of the contested book
        #[arg(long, default_value = "1")]
        copies: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = if cli.in_memory {
        LibraryConfig::in_memory()
    } else {
        LibraryConfig::default().with_data_file(&cli.data_file)
    }
    .with_loan_days(cli.loan_days);
    let config = match &cli.lexicon {
        Some(path) => config.with_lexicon_file(path),
        None => config,
    };

    let start = Instant::now();
    let library = Library::open(config).context("Failed to open library")?;
    info!(books = library.books().len(), "opened library in {:?}", start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::AddBook {
            title,
            author,
            isbn,
            genre,
            copies,
        } => {
            let book = library.add_book(NewBook::new(title, author, isbn, genre, copies))?;
            println!("{} Added book {}", "✓".green(), book.id);
            print_book(&book);
        }
        Commands::Books { id } => handle_books(&library, id)?,
        Commands::UpdateBook {
            id,
            title,
            author,
            isbn,
            genre,
            copies,
        } => {
            let patch = BookPatch {
                title,
                author,
                isbn,
                genre,
                copies,
            };
            let book = library.update_book(id, patch)?;
            println!("{} Updated book {}", "✓".green(), book.id);
            print_book(&book);
        }
        Commands::DeleteBook { id } => {
            let book = library.delete_book(id)?;
            println!("{} Deleted book {} ({})", "✓".green(), id, book.title);
        }
        Commands::AddBorrower { name, email, phone } => {
            let borrower = library.add_borrower(NewBorrower::new(name, email, phone))?;
            println!("{} Registered borrower {}", "✓".green(), borrower.id);
        }
        Commands::Borrowers { id } => handle_borrowers(&library, id)?,
        Commands::UpdateBorrower {
            id,
            name,
            email,
            phone,
        } => {
            let borrower = library.update_borrower(&id, BorrowerPatch { name, email, phone })?;
            println!("{} Updated borrower {}", "✓".green(), borrower.id);
        }
        Commands::DeleteBorrower { id } => {
            let borrower = library.delete_borrower(&id)?;
            println!("{} Deleted borrower {} ({})", "✓".green(), id, borrower.name);
        }
        Commands::Borrow {
            book_id,
            borrower_id,
            days,
        } => report(library.borrow(book_id, &borrower_id, days))?,
        Commands::Return { transaction_id } => report(library.return_book(transaction_id))?,
        Commands::Transactions { active, overdue } => handle_transactions(&library, active, overdue),
        Commands::Search {
            query,
            scope,
            limit,
        } => handle_search(&library, &query, scope, limit),
        Commands::Review {
            book_id,
            borrower_id,
            text,
            rating,
        } => report(library.add_review(book_id, &borrower_id, &text, rating))?,
        Commands::Reviews { book_id } => handle_reviews(&library, book_id),
        Commands::Sentiment { book_id } => {
            let title = library
                .book(book_id)
                .map(|b| b.title)
                .unwrap_or_else(|| format!("book {book_id}"));
            println!("{}", format!("Sentiment for {title}:").bold().blue());
            println!("  {}", library.summarize_sentiment(book_id));
        }
        Commands::Stress { tasks, copies } => handle_stress(tasks, copies, cli.loan_days).await?,
    }

    Ok(())
}

/// Print an outcome, turning failures into an error exit
fn report(outcome: Outcome) -> Result<()> {
    if !outcome.ok {
        bail!("{}", outcome.message);
    }
    println!("{} {}", "✓".green(), outcome.message);
    Ok(())
}

/// Handle the 'books' command
fn handle_books(library: &Library, id: Option<BookId>) -> Result<()> {
    match id {
        Some(id) => {
            let book = library.book(id).ok_or_else(|| anyhow!("Book {} not found", id))?;
            print_book(&book);
        }
        None => {
            let books = library.books();
            println!("{}", format!("{} books:", books.len()).bold().blue());
            for book in &books {
                print_book(book);
            }
        }
    }
    Ok(())
}

/// Handle the 'borrowers' command
fn handle_borrowers(library: &Library, id: Option<BorrowerId>) -> Result<()> {
    let borrowers = match id {
        Some(id) => vec![
            library
                .borrower(&id)
                .ok_or_else(|| anyhow!("Borrower {} not found", id))?,
        ],
        None => library.borrowers(),
    };

    for borrower in &borrowers {
        println!("{} {}", borrower.id.to_string().green(), borrower.name.bold());
        println!("{}Email: {}", "• ".cyan(), borrower.email);
        println!("{}Phone: {}", "• ".cyan(), borrower.phone);
        let open: Vec<String> = borrower.borrowed_books.iter().map(|t| t.to_string()).collect();
        println!("{}Open transactions: [{}]", "• ".cyan(), open.join(", "));
    }
    Ok(())
}

/// Handle the 'transactions' command
fn handle_transactions(library: &Library, active: bool, overdue: bool) {
    let now = Utc::now();
    let transactions: Vec<Transaction> = if overdue {
        library.overdue_transactions(now)
    } else if active {
        library.list_active_transactions().iter().cloned().collect()
    } else {
        library.list_all_transactions()
    };

    println!("{}", format!("{} transactions:", transactions.len()).bold().blue());
    for t in &transactions {
        let status = match t.return_date {
            Some(returned) => format!("returned {}", returned.format("%Y-%m-%d")).normal(),
            None if t.is_overdue(now) => "overdue".red(),
            None => "open".yellow(),
        };
        println!(
            "{}. book {} by {} - due {} [{}]",
            t.transaction_id.to_string().green(),
            t.book_id,
            t.borrower_id,
            t.due_date.format("%Y-%m-%d"),
            status
        );
    }
}

/// Handle the 'search' command
fn handle_search(library: &Library, query: &str, scope: SearchScope, limit: usize) {
    let hits = library.search_books(query, scope);

    println!(
        "{}",
        format!("Search results for '{}' in {}:", query, scope).bold().blue()
    );
    if hits.is_empty() {
        println!("  no matches");
    }
    for (rank, hit) in hits.iter().take(limit).enumerate() {
        println!(
            "{}. [{}] {} by {} ({}) - Score: {:.3}, {}/{} available",
            (rank + 1).to_string().green(),
            hit.book.id,
            hit.book.title,
            hit.book.author,
            hit.book.genre,
            hit.score,
            hit.book.available,
            hit.book.copies
        );
    }
}

/// Handle the 'reviews' command
fn handle_reviews(library: &Library, book_id: BookId) {
    let reviews = library.list_reviews(book_id);
    println!("{}", format!("{} reviews of book {}:", reviews.len(), book_id).bold().blue());
    for review in &reviews {
        let label = match review.sentiment {
            SentimentLabel::Positive => review.sentiment.as_str().green(),
            SentimentLabel::Negative => review.sentiment.as_str().red(),
            SentimentLabel::Neutral => review.sentiment.as_str().normal(),
        };
        println!(
            "{}. {}/5 [{} {:+.3}] {} - {}",
            review.review_id,
            review.rating,
            label,
            review.sentiment_scores.compound,
            review.borrower_id,
            review.review_text
        );
    }
}

/// Handle the 'stress' command
async fn handle_stress(tasks: usize, copies: u32, loan_days: u32) -> Result<()> {
    let library = Library::open(LibraryConfig::in_memory().with_loan_days(loan_days))?;
    let book = library.add_book(NewBook::new(
        "The Contested Copy",
        "Anonymous",
        "",
        "Test",
        i64::from(copies),
    ))?;
    let borrowers = (0..tasks)
        .map(|i| {
            library
                .add_borrower(NewBorrower::new(format!("Member {i}"), "", ""))
                .map(|b| b.id)
        })
        .collect::<Result<Vec<_>, _>>()?;

    println!(
        "Racing {} borrows for {} {} of book {}...",
        tasks,
        copies,
        if copies == 1 { "copy" } else { "copies" },
        book.id
    );

    // Use tokio tasks to issue the borrows concurrently
    let start = Instant::now();
    let mut handles = vec![];
    for borrower in borrowers {
        let library = library.clone();
        let days = rand::random::<u32>() % 28 + 1;
        handles.push(tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let outcome = library.borrow(book.id, &borrower, Some(days));
            (outcome, start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(tasks);
    let mut successes = 0;
    for handle in handles {
        let (outcome, elapsed) = handle.await.context("Borrow task panicked")?;
        if outcome.ok {
            successes += 1;
        }
        timings.push(elapsed);
    }
    let total_time = start.elapsed();

    let available = library
        .book(book.id)
        .map(|b| b.available)
        .ok_or_else(|| anyhow!("Book {} disappeared", book.id))?;
    let expected = (copies as usize).min(tasks);

    println!("Stress results:");
    println!("Successful borrows: {}", successes);
    println!("Rejected borrows: {}", tasks - successes);
    println!("Final available: {}", available);
    if !timings.is_empty() {
        timings.sort();
        let p50 = timings[timings.len() / 2];
        let p99 = timings[((timings.len() as f32 * 0.99) as usize).min(timings.len() - 1)];
        println!("P50 latency: {:?}", p50);
        println!("P99 latency: {:?}", p99);
    }
    println!("Total time: {:?}", total_time);

    if successes != expected || available as usize != copies as usize - expected {
        bail!("Availability invariant violated: {successes} successes, {available} available");
    }
    println!("{} Invariant held: exactly {} borrows succeeded", "✓".green(), expected);
    Ok(())
}

/// Helper function to format and print a book
fn print_book(book: &Book) {
    println!(
        "{}. {} by {} [{}] ISBN {} - {}/{} available",
        book.id.to_string().green(),
        book.title.bold(),
        book.author,
        book.genre,
        book.isbn,
        book.available,
        book.copies
    );
}
