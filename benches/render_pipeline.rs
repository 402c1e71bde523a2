use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fat::content::{generate_hex_dump, read_text_lines};
use fat::render::{render_content, RenderInput};
use fat::{Content, SearchState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use tempfile::NamedTempFile;

fn create_test_file(size_kb: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let target_size = size_kb * 1024;
    let mut current_size = 0;
    let mut line_num = 0;

    while current_size < target_size {
        let log_line = format!(
            "[2024-09-02T10:{}:{}] INFO: Request {} user_{}\n",
            (line_num / 3600) % 24,
            (line_num / 60) % 60,
            line_num,
            line_num % 1000
        );
        temp_file.write_all(log_line.as_bytes()).unwrap();
        current_size += log_line.len();
        line_num += 1;
    }

    temp_file.flush().unwrap();
    temp_file
}

fn create_binary_file(size_kb: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut data = vec![0u8; size_kb * 1024];
    rng.fill(&mut data[..]);
    temp_file.write_all(&data).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Long lines of mixed-width words so wrapping has real break decisions to make.
fn long_line_content(lines: usize) -> Content {
    let words = ["lorem", "ipsum", "größe", "日本語", "dolor", "sit", "amet,", "✓"];
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    (0..lines)
        .map(|_| {
            let count = rng.gen_range(20..120);
            (0..count)
                .map(|_| words[rng.gen_range(0..words.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_loading");
    group.sample_size(10);

    for &size_kb in &[100, 1000, 10000] {
        let text = create_test_file(size_kb);
        group.bench_with_input(
            BenchmarkId::new("text_lines", size_kb),
            &text,
            |b, file| b.iter(|| black_box(read_text_lines(file.path()))),
        );

        let binary = create_binary_file(size_kb);
        group.bench_with_input(
            BenchmarkId::new("hex_dump", size_kb),
            &binary,
            |b, file| b.iter(|| black_box(generate_hex_dump(file.path()))),
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_content");

    let content = long_line_content(2000);
    let mut search = SearchState::new();
    search.submit(&content, "größe".as_bytes()).unwrap();

    for &(width, height) in &[(80u16, 24u16), (200, 60)] {
        let label = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("scrolled", &label), &content, |b, content| {
            let input = RenderInput {
                content,
                top_line: 100,
                left_char: 40,
                wrap: false,
                search: None,
            };
            b.iter(|| black_box(render_content(&input, width, height)))
        });

        group.bench_with_input(BenchmarkId::new("wrapped", &label), &content, |b, content| {
            let input = RenderInput {
                content,
                top_line: 100,
                left_char: 0,
                wrap: true,
                search: None,
            };
            b.iter(|| black_box(render_content(&input, width, height)))
        });

        group.bench_with_input(
            BenchmarkId::new("wrapped_highlighted", &label),
            &content,
            |b, content| {
                let input = RenderInput {
                    content,
                    top_line: 100,
                    left_char: 0,
                    wrap: true,
                    search: Some(&search),
                };
                b.iter(|| black_box(render_content(&input, width, height)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_loading, bench_render);
criterion_main!(benches);
