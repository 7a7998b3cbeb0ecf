//! Codec encoding/decoding benchmarks.

use bearcall_protocol::{
    decode_argument, decode_call, encode_argument, encode_call, Options, Value,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;

fn test_args(payload_size: usize) -> HashMap<String, Value> {
    let mut args = HashMap::new();
    args.insert("id".to_string(), Value::U32(12345));
    args.insert("attempt".to_string(), Value::int(3));
    args.insert("data".to_string(), Value::Str("x".repeat(payload_size)));
    args.insert(
        "meta".to_string(),
        Value::Record(vec![
            ("verbose".to_string(), Value::Bool(true)),
            ("weight".to_string(), Value::F64(0.5)),
        ]),
    );
    args
}

fn bench_argument_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("argument_encode");

    for size in [100, 1000, 10000] {
        let value = Value::Str("x".repeat(size));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| black_box(encode_argument(value, "data").unwrap()));
        });
    }

    group.finish();
}

fn bench_argument_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("argument_decode");

    for size in [100, 1000, 10000] {
        let value = Value::Str("x".repeat(size));
        let encoded = encode_argument(&value, "data").unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_argument(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_call_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_encode");
    let opts = Options::new();

    for size in [100, 1000, 10000] {
        let args = test_args(size);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &args, |b, args| {
            b.iter(|| black_box(encode_call("apply", &opts, args).unwrap()));
        });
    }

    group.finish();
}

fn bench_call_encode_compressed(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_encode_compressed");
    let opts = Options::new().with_compression(true);

    for size in [100, 1000, 10000] {
        let args = test_args(size);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &args, |b, args| {
            b.iter(|| black_box(encode_call("apply", &opts, args).unwrap()));
        });
    }

    group.finish();
}

fn bench_call_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_decode");
    let opts = Options::new();

    for size in [100, 1000, 10000] {
        let encoded = encode_call("apply", &opts, &test_args(size)).unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| black_box(decode_call(encoded, &opts).unwrap()));
        });
    }

    group.finish();
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");

    for size in [100, 1000, 10000, 100000] {
        let data = vec![0x42u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(crc32fast::hash(data)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_argument_encode,
    bench_argument_decode,
    bench_call_encode,
    bench_call_encode_compressed,
    bench_call_decode,
    bench_crc32,
);

criterion_main!(benches);
