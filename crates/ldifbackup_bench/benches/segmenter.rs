//! Segmenter benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ldifbackup_bench::generate_dump;
use ldifbackup_core::{Dialect, OutputMode, Segmenter, SegmenterConfig};
use ldifbackup_source::MemorySource;

const DIALECTS: [Dialect; 3] = [Dialect::Unwrapped, Dialect::Wrapped, Dialect::Versioned];

/// Benchmark segmentation of each dialect, per-entry mode (key extraction on).
fn bench_segment_dialects(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    for dialect in DIALECTS {
        let dump = generate_dump(dialect, 1_000, 300);
        let config = SegmenterConfig::new().dialect(dialect);
        group.throughput(Throughput::Bytes(dump.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(dialect), &dump, |b, dump| {
            b.iter(|| {
                let segmenter =
                    Segmenter::new(MemorySource::new(dump), &config, &OutputMode::per_entry())
                        .unwrap();
                let count = segmenter.map(|e| e.unwrap()).count();
                black_box(count);
            });
        });
    }

    group.finish();
}

/// Benchmark the cost of the exclusion filter.
fn bench_segment_exclusions(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_exclude");
    let dump = generate_dump(Dialect::Wrapped, 1_000, 300);
    group.throughput(Throughput::Bytes(dump.len() as u64));

    for count in [0usize, 1, 8] {
        let mut config = SegmenterConfig::new();
        config.exclude = ["userPassword", "pwdHistory", "pwdChangedTime", "pwdFailureTime",
            "pwdAccountLockedTime", "authPassword", "sambaNTPassword", "sambaLMPassword"]
            .iter()
            .take(count)
            .map(|s| s.to_string())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &dump, |b, dump| {
            b.iter(|| {
                let segmenter =
                    Segmenter::new(MemorySource::new(dump), &config, &OutputMode::per_entry())
                        .unwrap();
                black_box(segmenter.map(|e| e.unwrap()).count());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_segment_dialects, bench_segment_exclusions);
criterion_main!(benches);
