//! Benchmarks for packed repeated field decoding.
//!
//! Compares this crate's `decode_packed` against prost's packed-scalar
//! merge path, for a range of element counts and varint widths.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protoscan::leb128::LebCodec;
use protoscan::scalar::{Fixed32, Fixed64, Sfixed32, Sfixed64};
use protoscan::wire::{self, WireType};
use protoscan::{DecodeError, Decoder, FieldDecoder, MessageHandler};

/// Wraps a single packed repeated field of type `T` at field number 1.
#[derive(Default)]
struct PackedHolder<T> {
    values: Vec<T>,
}

impl<T: protoscan::scalar::ScalarField> MessageHandler for PackedHolder<T> {
    fn decode_field(
        &mut self,
        field: &mut FieldDecoder<'_, '_, '_>,
        field_number: u32,
    ) -> Result<(), DecodeError> {
        if field_number == 1 {
            if let FieldDecoder::LengthDelimited(l) = field {
                l.decode_packed(&mut self.values)?;
            }
        }
        Ok(())
    }
}

fn encode_field_fixed<T: Copy, const WIDTH: usize>(
    values: &[T],
    to_bytes: impl Fn(T) -> [u8; WIDTH],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(values.len() * WIDTH);
    for &v in values {
        body.extend_from_slice(&to_bytes(v));
    }
    let mut buf = Vec::with_capacity(body.len() + 8);
    wire::encode_tag(WireType::Len, 1, &mut buf);
    (body.len() as u64).encode_leb128(&mut buf);
    buf.extend_from_slice(&body);
    buf
}

fn encode_field_varint(values: &[u64]) -> Vec<u8> {
    let mut body = Vec::new();
    for &v in values {
        v.encode_leb128(&mut body);
    }
    let mut buf = Vec::with_capacity(body.len() + 8);
    wire::encode_tag(WireType::Len, 1, &mut buf);
    (body.len() as u64).encode_leb128(&mut buf);
    buf.extend_from_slice(&body);
    buf
}

fn encode_prost_packed_varint(values: &[u64]) -> Vec<u8> {
    let mut raw = Vec::new();
    for &v in values {
        prost::encoding::encode_varint(v, &mut raw);
    }
    let mut buf = Vec::new();
    prost::encoding::encode_varint(raw.len() as u64, &mut buf);
    buf.extend_from_slice(&raw);
    buf
}

fn bench_packed_fixed32(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_fixed32");

    for count in [10, 100, 1000, 10000] {
        let values: Vec<Fixed32> = (0..count).map(|i| Fixed32(i as u32)).collect();
        let encoded = encode_field_fixed(&values, |v| v.0.to_le_bytes());

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("protoscan", count),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<Fixed32>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );

        let raw_u32: Vec<u32> = values.iter().map(|v| v.0).collect();
        let mut prost_buf = Vec::new();
        prost::encoding::encode_varint(raw_u32.len() as u64 * 4, &mut prost_buf);
        for v in &raw_u32 {
            prost_buf.extend_from_slice(&v.to_le_bytes());
        }

        group.bench_with_input(
            BenchmarkId::new("prost", count),
            &prost_buf,
            |b, data| {
                b.iter(|| {
                    let mut out = Vec::new();
                    let mut buf = &data[..];
                    prost::encoding::fixed32::merge_repeated(
                        prost::encoding::WireType::LengthDelimited,
                        &mut out,
                        &mut buf,
                        prost::encoding::DecodeContext::default(),
                    )
                    .unwrap();
                    std::hint::black_box(out)
                })
            },
        );
    }

    group.finish();
}

fn bench_packed_fixed64(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_fixed64");

    for count in [10, 100, 1000, 10000] {
        let values: Vec<Fixed64> = (0..count).map(|i| Fixed64(i as u64)).collect();
        let encoded = encode_field_fixed(&values, |v| v.0.to_le_bytes());

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("protoscan", count),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<Fixed64>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );
    }

    group.finish();
}

fn bench_packed_sfixed32(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_sfixed32");

    for count in [10, 100, 1000, 10000] {
        let values: Vec<Sfixed32> = (0..count)
            .map(|i| Sfixed32(if i % 2 == 0 { i as i32 } else { -(i as i32) }))
            .collect();
        let encoded = encode_field_fixed(&values, |v| v.0.to_le_bytes());

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("protoscan", count),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<Sfixed32>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );
    }

    group.finish();
}

fn bench_packed_sfixed64(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_sfixed64");

    for count in [10, 100, 1000, 10000] {
        let values: Vec<Sfixed64> = (0..count)
            .map(|i| Sfixed64(if i % 2 == 0 { i as i64 } else { -(i as i64) }))
            .collect();
        let encoded = encode_field_fixed(&values, |v| v.0.to_le_bytes());

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("protoscan", count),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<Sfixed64>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );
    }

    group.finish();
}

fn bench_packed_u32_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_u32_varint");

    for count in [10, 100, 1000, 10000] {
        let small_values: Vec<u64> = (0..count).map(|i| (i % 127) as u64).collect();
        let small_encoded = encode_field_varint(&small_values);
        let small_prost = encode_prost_packed_varint(&small_values);

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("small_protoscan", count),
            &small_encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<u32>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("small_prost", count),
            &small_prost,
            |b, data| {
                b.iter(|| {
                    let mut out = Vec::new();
                    let mut buf = &data[..];
                    prost::encoding::uint32::merge_repeated(
                        prost::encoding::WireType::LengthDelimited,
                        &mut out,
                        &mut buf,
                        prost::encoding::DecodeContext::default(),
                    )
                    .unwrap();
                    std::hint::black_box(out)
                })
            },
        );

        let large_values: Vec<u64> = (0..count).map(|i| (u32::MAX - i as u32) as u64).collect();
        let large_encoded = encode_field_varint(&large_values);
        let large_prost = encode_prost_packed_varint(&large_values);

        group.bench_with_input(
            BenchmarkId::new("large_protoscan", count),
            &large_encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<u32>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("large_prost", count),
            &large_prost,
            |b, data| {
                b.iter(|| {
                    let mut out = Vec::new();
                    let mut buf = &data[..];
                    prost::encoding::uint32::merge_repeated(
                        prost::encoding::WireType::LengthDelimited,
                        &mut out,
                        &mut buf,
                        prost::encoding::DecodeContext::default(),
                    )
                    .unwrap();
                    std::hint::black_box(out)
                })
            },
        );
    }

    group.finish();
}

fn bench_packed_u64_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_u64_varint");

    for count in [10, 100, 1000, 10000] {
        let small_values: Vec<u64> = (0..count).map(|i| (i % 127) as u64).collect();
        let small_encoded = encode_field_varint(&small_values);

        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("small_protoscan", count),
            &small_encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<u64>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );

        let large_values: Vec<u64> = (0..count).map(|i| u64::MAX - i as u64).collect();
        let large_encoded = encode_field_varint(&large_values);

        group.bench_with_input(
            BenchmarkId::new("large_protoscan", count),
            &large_encoded,
            |b, data| {
                b.iter(|| {
                    let mut holder = PackedHolder::<u64>::default();
                    Decoder::new(data).decode_full_object(&mut holder).unwrap();
                    std::hint::black_box(holder.values)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    packed_benches,
    bench_packed_fixed32,
    bench_packed_fixed64,
    bench_packed_sfixed32,
    bench_packed_sfixed64,
    bench_packed_u32_varint,
    bench_packed_u64_varint,
);

criterion_main!(packed_benches);
