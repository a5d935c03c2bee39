use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gecompress::{compress_to_vec, decompress_to_vec, CompressionType, Profile};
use rand::{Rng, SeedableRng};

/// Asset-like input: short byte alphabet with plenty of repeated spans.
fn sample(len: usize) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x1172);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        if data.len() > 512 && rng.gen_bool(0.4) {
            let start = rng.gen_range(0..data.len() - 512);
            let run = rng.gen_range(4..512).min(len - data.len());
            data.extend_from_within(start..start + run);
        } else {
            data.push(rng.gen_range(0..48));
        }
    }
    data
}

fn bench_compress(c: &mut Criterion) {
    let data = sample(0x90000);
    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for compression in CompressionType::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", compression)),
            &data,
            |b, data| b.iter(|| compress_to_vec(black_box(data), Profile::GoldenEye, compression)),
        );
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let data = sample(0x90000);
    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for compression in CompressionType::ALL {
        let compressed = compress_to_vec(&data, Profile::GoldenEye, compression).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", compression)),
            &compressed,
            |b, compressed| {
                b.iter(|| decompress_to_vec(black_box(compressed), Profile::GoldenEye, data.len()))
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
