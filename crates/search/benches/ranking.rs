//! Benchmarks for ranking
//!
//! Run with: cargo bench --package search
//!
//! Ranks queries against a synthetic catalog of generated titles and authors.

use catalog::{Book, BookId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use search::{SearchScope, SimilarityRanker};

const WORDS: &[&str] = &[
    "shadow", "river", "garden", "winter", "empire", "silent", "letters", "stars", "house",
    "ocean", "midnight", "glass", "crown", "wild", "journey", "memory", "storm", "forest",
];

const GENRES: &[&str] = &["Fiction", "Classic", "Fantasy", "Mystery", "Science Fiction", "History"];

fn synthetic_catalog(size: u32) -> Vec<Book> {
    (0..size)
        .map(|i| {
            let n = i as usize;
            Book {
                id: BookId(i + 1),
                title: format!(
                    "The {} of the {} {}",
                    WORDS[n % WORDS.len()],
                    WORDS[(n / 3) % WORDS.len()],
                    WORDS[(n / 7) % WORDS.len()]
                ),
                author: format!("Author {}", n % 400),
                isbn: format!("978{:010}", i),
                genre: GENRES[n % GENRES.len()].to_string(),
                copies: 2,
                available: 2,
            }
        })
        .collect()
}

fn bench_title_search(c: &mut Criterion) {
    let books = synthetic_catalog(5_000);
    let ranker = SimilarityRanker::new();

    c.bench_function("rank_title_5k", |b| {
        b.iter(|| {
            let ranked = ranker.rank(black_box("winter garden"), SearchScope::Title, &books);
            black_box(ranked)
        })
    });
}

fn bench_all_fields_search(c: &mut Criterion) {
    let books = synthetic_catalog(5_000);
    let ranker = SimilarityRanker::new();

    c.bench_function("rank_all_5k", |b| {
        b.iter(|| {
            let ids = ranker.search(black_box("midnight storm fantasy"), SearchScope::All, &books);
            black_box(ids)
        })
    });
}

criterion_group!(benches, bench_title_search, bench_all_fields_search);
criterion_main!(benches);
