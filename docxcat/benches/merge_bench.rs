//! Performance benchmarks for docxcat.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure the performance of core operations
//! using criterion for statistical analysis.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use docxcat::config::{MergeOptions, SortPolicy};
use docxcat::io::{OutputDocument, SourceDocument};
use docxcat::merge::text::TextMerger;
use docxcat::sort::sort_paths;
use rand::seq::SliceRandom;
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

/// Generate shuffled file names with numeric prefixes and digit runs.
fn shuffled_names(count: usize) -> Vec<PathBuf> {
    let mut names: Vec<PathBuf> = (0..count)
        .map(|i| match i % 3 {
            0 => PathBuf::from(format!("{i}-chapter.docx")),
            1 => PathBuf::from(format!("section{i}.docx")),
            _ => PathBuf::from(format!("Part {} of {count}.docx", i / 3)),
        })
        .collect();
    names.shuffle(&mut rand::thread_rng());
    names
}

/// Write `count` documents of `paragraphs` paragraphs each.
fn create_sources(dir: &TempDir, count: usize, paragraphs: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let mut doc = OutputDocument::new();
            for p in 0..paragraphs {
                doc.add_paragraph(&format!("Document {i}, paragraph {p}: lorem ipsum dolor sit amet"))
                    .add_run(" bold tail")
                    .bold(Some(true));
            }
            let path = dir.path().join(format!("{i}.docx"));
            doc.save(&path).unwrap();
            path
        })
        .collect()
}

/// Benchmark: Sort file names under each policy
fn bench_sort(c: &mut Criterion) {
    let names = shuffled_names(1000);
    let mut group = c.benchmark_group("sort_1000_names");

    for policy in SortPolicy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &names, |b, names| {
            b.iter(|| {
                let mut paths = names.clone();
                sort_paths(black_box(&mut paths), policy);
                paths
            });
        });
    }

    group.finish();
}

/// Benchmark: Parse a single source document
fn bench_open_source(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let path = create_sources(&dir, 1, 500).remove(0);

    c.bench_function("open_500_paragraphs", |b| {
        b.iter(|| SourceDocument::open(black_box(&path)).unwrap());
    });
}

/// Benchmark: Text-only merge with different input counts
fn bench_text_merge(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let mut group = c.benchmark_group("text_merge");
    let options = MergeOptions {
        add_headings: true,
        insert_breaks: true,
        use_full_merge: false,
    };

    for count in [2, 8, 32] {
        let sources = create_sources(&dir, count, 50);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sources, |b, sources| {
            b.iter(|| TextMerger::new().build(black_box(sources), &options).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort, bench_open_source, bench_text_merge);
criterion_main!(benches);
