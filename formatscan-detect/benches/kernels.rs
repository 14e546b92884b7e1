//! Difference-kernel and delta-engine benchmarks.
//!
//! Compares the scalar and AVX2 kernel paths on row-sized buffers and on
//! whole-frame delta computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use formatscan_core::Resolution;
use formatscan_detect::{DeltaEngine, DiffKernels, KernelPath, Pitch};

fn generate_rows(len: usize) -> (Vec<u8>, Vec<u8>) {
    let p: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
    let q: Vec<u8> = (0..len).map(|i| (i * 17 % 256) as u8).collect();
    (p, q)
}

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernels");

    for &width in &[1280usize, 1920, 3840] {
        let (p, q) = generate_rows(width);
        let n = width / Pitch::X16.bytes();
        group.throughput(Throughput::Bytes(width as u64));

        for (name, path) in [("scalar", KernelPath::Scalar), ("avx2", KernelPath::Avx2)] {
            let kernels = DiffKernels::with_path(path);
            group.bench_with_input(BenchmarkId::new(format!("sad_{name}"), width), &width, |b, _| {
                b.iter(|| kernels.sad(black_box(&p), black_box(&q), Pitch::X16, n))
            });
            group.bench_with_input(BenchmarkId::new(format!("ssd_{name}"), width), &width, |b, _| {
                b.iter(|| kernels.ssd(black_box(&p), black_box(&q), Pitch::X16, n))
            });
        }
    }

    group.finish();
}

fn bench_deltas(c: &mut Criterion) {
    let mut group = c.benchmark_group("deltas");

    for &(width, height, name) in &[(1280u32, 720u32, "720p"), (1920, 1080, "1080p")] {
        let res = Resolution::new(width, height).unwrap();
        let luma: Vec<u8> = (0..res.luma_pixels())
            .map(|i| ((i as u64).wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        group.throughput(Throughput::Bytes(res.luma_pixels() as u64));

        for (path_name, path) in [("scalar", KernelPath::Scalar), ("avx2", KernelPath::Avx2)] {
            let engine = DeltaEngine::with_kernels(DiffKernels::with_path(path));
            group.bench_function(BenchmarkId::new(format!("deltas_{path_name}"), name), |b| {
                b.iter(|| engine.deltas(black_box(&luma), res).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_kernels, bench_deltas);
criterion_main!(benches);
