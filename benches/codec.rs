//! Benchmark comparing protoscan vs prost decode throughput.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod prost_types {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct PhoneNumber {
        #[prost(string, tag = "1")]
        pub number: String,
        #[prost(int32, tag = "2")]
        pub phone_type: i32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Person {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(int32, tag = "2")]
        pub id: i32,
        #[prost(string, tag = "3")]
        pub email: String,
        #[prost(message, repeated, tag = "4")]
        pub phones: Vec<PhoneNumber>,
    }
}

mod protoscan_types {
    use protoscan::{DecodeError, FieldDecoder, MessageHandler};

    #[derive(Clone, Default)]
    pub struct PhoneNumber {
        pub number: String,
        pub phone_type: i32,
    }

    impl MessageHandler for PhoneNumber {
        fn decode_field(
            &mut self,
            field: &mut FieldDecoder<'_, '_, '_>,
            field_number: u32,
        ) -> Result<(), DecodeError> {
            match field_number {
                1 => {
                    if let FieldDecoder::LengthDelimited(l) = field {
                        l.decode_string(&mut self.number)?;
                    }
                }
                2 => {
                    if let FieldDecoder::Numeric(n) = field {
                        n.decode_int32(&mut self.phone_type)?;
                    }
                }
                _ => {}
            }
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    pub struct Person {
        pub name: String,
        pub id: i32,
        pub email: String,
        pub phones: Vec<PhoneNumber>,
    }

    impl MessageHandler for Person {
        fn decode_field(
            &mut self,
            field: &mut FieldDecoder<'_, '_, '_>,
            field_number: u32,
        ) -> Result<(), DecodeError> {
            match field_number {
                1 => {
                    if let FieldDecoder::LengthDelimited(l) = field {
                        l.decode_string(&mut self.name)?;
                    }
                }
                2 => {
                    if let FieldDecoder::Numeric(n) = field {
                        n.decode_int32(&mut self.id)?;
                    }
                }
                3 => {
                    if let FieldDecoder::LengthDelimited(l) = field {
                        l.decode_string(&mut self.email)?;
                    }
                }
                4 => {
                    if let FieldDecoder::LengthDelimited(l) = field {
                        l.decode_repeated_message(&mut self.phones)?;
                    }
                }
                _ => {}
            }
            Ok(())
        }
    }
}

fn create_prost_person(num_phones: usize) -> prost_types::Person {
    prost_types::Person {
        name: "Alice Johnson".to_string(),
        id: 12345,
        email: "alice.johnson@example.com".to_string(),
        phones: (0..num_phones)
            .map(|i| prost_types::PhoneNumber {
                number: format!("555-{:04}", i),
                phone_type: (i % 3) as i32,
            })
            .collect(),
    }
}

fn decode_benchmark(c: &mut Criterion) {
    use prost::Message as _;

    let mut group = c.benchmark_group("decode");

    for num_phones in [0, 1, 10, 100] {
        let prost_person = create_prost_person(num_phones);
        let mut encoded = Vec::new();
        prost_person.encode(&mut encoded).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("prost", num_phones),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let person = prost_types::Person::decode(&data[..]).unwrap();
                    std::hint::black_box(person)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("protoscan", num_phones),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut person = protoscan_types::Person::default();
                    protoscan::Decoder::new(data)
                        .decode_full_object(&mut person)
                        .unwrap();
                    std::hint::black_box(person)
                })
            },
        );
    }

    group.finish();
}

fn decode_and_access_benchmark(c: &mut Criterion) {
    use prost::Message as _;

    let mut group = c.benchmark_group("decode_and_access");

    for num_phones in [0, 1, 10, 100] {
        let prost_person = create_prost_person(num_phones);
        let mut encoded = Vec::new();
        prost_person.encode(&mut encoded).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("prost", num_phones),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let person = prost_types::Person::decode(&data[..]).unwrap();
                    let mut sum = person.name.len() + person.email.len() + person.id as usize;
                    for phone in &person.phones {
                        sum += phone.number.len() + phone.phone_type as usize;
                    }
                    std::hint::black_box(sum)
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("protoscan", num_phones),
            &encoded,
            |b, data| {
                b.iter(|| {
                    let mut person = protoscan_types::Person::default();
                    protoscan::Decoder::new(data)
                        .decode_full_object(&mut person)
                        .unwrap();
                    let mut sum = person.name.len() + person.email.len() + person.id as usize;
                    for phone in &person.phones {
                        sum += phone.number.len() + phone.phone_type as usize;
                    }
                    std::hint::black_box(sum)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, decode_benchmark, decode_and_access_benchmark);
criterion_main!(benches);
