use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fat::content::read_text_lines;
use fat::search::perform_search;
use fat::{Content, SearchState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn create_log_file_with_patterns(size_kb: usize, pattern_frequency: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let target_size = size_kb * 1024;
    let mut current_size = 0;
    let mut line_num = 0;
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    // Create realistic log patterns
    let log_levels = ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"];
    let services = ["auth", "database", "cache", "payment", "notification"];
    let error_patterns = [
        "timeout",
        "connection_failed",
        "null_pointer",
        "out_of_memory",
    ];

    while current_size < target_size {
        let log_level = log_levels[rng.gen_range(0..log_levels.len())];
        let service = services[line_num % services.len()];

        let log_line = if line_num % pattern_frequency == 0 {
            // Insert search pattern every N lines
            let error = error_patterns[line_num / pattern_frequency % error_patterns.len()];
            format!(
                "[2024-09-02T10:{}:{:02}] {} {}: Request {} failed with {} user_{}\n",
                (line_num / 3600) % 24,
                (line_num / 60) % 60,
                log_level,
                service,
                line_num,
                error,
                line_num % 1000
            )
        } else if line_num % 7 == 0 {
            // Non-ASCII lines exercise the UTF-8 column math
            format!(
                "[2024-09-02T10:{}:{:02}] {} {}: Benutzer über Größe {} geprüft ✓\n",
                (line_num / 3600) % 24,
                (line_num / 60) % 60,
                log_level,
                service,
                rng.gen_range(0..10_000)
            )
        } else {
            format!(
                "[2024-09-02T10:{}:{:02}] {} {}: Request {} processed successfully user_{}\n",
                (line_num / 3600) % 24,
                (line_num / 60) % 60,
                log_level,
                service,
                line_num,
                line_num % 1000
            )
        };

        temp_file.write_all(log_line.as_bytes()).unwrap();
        current_size += log_line.len();
        line_num += 1;
    }

    temp_file.flush().unwrap();
    temp_file
}

fn load(size_kb: usize, pattern_frequency: usize) -> Content {
    let temp_file = create_log_file_with_patterns(size_kb, pattern_frequency);
    read_text_lines(temp_file.path()).expect("Failed to read generated log")
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{}KB", size_kb)
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

fn bench_search_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_patterns");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let sizes_kb = [100, 500, 5000, 15000];
    let pattern_frequency = 100;

    for &size_kb in &sizes_kb {
        let content = load(size_kb, pattern_frequency);
        let label = size_label(size_kb);

        // Sparse literal, the common case
        group.bench_with_input(
            BenchmarkId::new("sparse_literal", &label),
            &content,
            |b, content| b.iter(|| black_box(perform_search(content, b"timeout"))),
        );

        // Matches on every line
        group.bench_with_input(
            BenchmarkId::new("dense_literal", &label),
            &content,
            |b, content| b.iter(|| black_box(perform_search(content, b"Request"))),
        );

        // Multibyte term
        group.bench_with_input(
            BenchmarkId::new("utf8_literal", &label),
            &content,
            |b, content| b.iter(|| black_box(perform_search(content, "Größe".as_bytes()))),
        );

        // No match at all, full scan
        group.bench_with_input(
            BenchmarkId::new("absent_literal", &label),
            &content,
            |b, content| b.iter(|| black_box(perform_search(content, b"segfault"))),
        );
    }

    group.finish();
}

fn bench_overlapping_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlapping_matches");
    group.sample_size(10);

    // Worst case for overlap handling: every byte starts a match
    let lines: Vec<String> = (0..10_000).map(|_| "a".repeat(200)).collect();
    let content: Content = lines.into_iter().collect();

    group.bench_function("single_byte_run", |b| {
        b.iter(|| black_box(perform_search(&content, b"aa")))
    });

    group.finish();
}

fn bench_match_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_navigation");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(2));

    let content = load(5000, 50);
    let mut state = SearchState::new();
    state.submit(&content, b"timeout").unwrap();

    // n in the viewer
    group.bench_function("next_match", |b| {
        b.iter(|| black_box(state.next_match()))
    });

    // N in the viewer
    group.bench_function("prev_match", |b| {
        b.iter(|| black_box(state.prev_match()))
    });

    // Resubmitting a term always rescans
    group.bench_function("resubmit", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut fresh = SearchState::new();
        b.iter(|| {
            let term = format!("user_{}", rng.gen_range(0..1000));
            black_box(fresh.submit(&content, term.as_bytes()))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_search_patterns,
    bench_overlapping_matches,
    bench_match_navigation
);
criterion_main!(benches);
