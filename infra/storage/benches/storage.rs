use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use imghub_storage::Storage;
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Benchmark: Path Resolution & Security Validation
// ============================================================================

fn bench_path_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_resolution");

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async {
        let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
        storage.save("/existing/cat.jpg", b"x").await.unwrap();
        storage
    });

    group.bench_function("existing_path", |b| {
        b.iter(|| {
            black_box(storage.resolve("/existing/cat.jpg").unwrap());
        });
    });

    group.bench_function("missing_nested_path", |b| {
        b.iter(|| {
            black_box(storage.resolve("/foo/bar/baz/test.png").unwrap());
        });
    });

    group.bench_function("traversal_rejected", |b| {
        b.iter(|| {
            black_box(storage.resolve("/a/../../etc/passwd").unwrap_err());
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Save & Get
// ============================================================================

fn bench_file_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_operations");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage =
        rt.block_on(async { Storage::builder().root(temp.path()).connect().await.unwrap() });

    let sizes = [("1KB", 1024), ("100KB", 100 * 1024), ("1MB", 1024 * 1024)];

    for (name, size) in sizes {
        let data: Vec<u8> = (0..size).map(|i| u8::try_from(i % 256).unwrap()).collect();
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("save", name), &data, |b, data| {
            b.to_async(&rt).iter(|| async {
                storage.save(format!("/bench/{name}.png"), data).await.unwrap();
            });
        });

        rt.block_on(async {
            storage.save(format!("/read/{name}.png"), &data).await.unwrap();
        });

        group.bench_function(BenchmarkId::new("get", name), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(storage.get(format!("/read/{name}.png")).await.unwrap());
            });
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async {
        let storage = Storage::builder().root(temp.path()).connect().await.unwrap();
        for i in 0..500 {
            storage.save(format!("/dir{}/img{i}.png", i % 10), b"x").await.unwrap();
        }
        storage
    });

    c.bench_function("list_500", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(storage.list().await.unwrap());
        });
    });
}

criterion_group!(benches, bench_path_resolution, bench_file_operations, bench_list);

criterion_main!(benches);
