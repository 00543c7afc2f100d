//! Example message decoding using protoscan.
//!
//! This demonstrates what a hand-written message handler looks like for:
//!
//! ```proto
//! message PhoneNumber {
//!     string number = 1;
//!     int32 type = 2;
//! }
//!
//! message Person {
//!     string name = 1;
//!     int32 id = 2;
//!     string email = 3;
//!     repeated PhoneNumber phones = 4;
//! }
//! ```

use protoscan::leb128::LebCodec;
use protoscan::wire::{self, WireType};
use protoscan::{DecodeError, Decoder, FieldDecoder, MessageHandler};

#[derive(Debug, Clone, Default)]
struct PhoneNumber {
    number: String,
    phone_type: i32,
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

#[derive(Debug, Clone, Default)]
struct Person {
    name: String,
    id: i32,
    email: String,
    phones: Vec<PhoneNumber>,
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

fn encode_string_field(field_number: u32, s: &str, buf: &mut Vec<u8>) {
    wire::encode_tag(WireType::Len, field_number, buf);
    (s.len() as u64).encode_leb128(buf);
    buf.extend_from_slice(s.as_bytes());
}

fn encode_varint_field(field_number: u32, value: u64, buf: &mut Vec<u8>) {
    wire::encode_tag(WireType::Varint, field_number, buf);
    value.encode_leb128(buf);
}

fn encode_phone(phone: &PhoneNumber, buf: &mut Vec<u8>) {
    let mut body = Vec::new();
    encode_string_field(1, &phone.number, &mut body);
    encode_varint_field(2, phone.phone_type as u64, &mut body);
    wire::encode_tag(WireType::Len, 4, buf);
    (body.len() as u64).encode_leb128(buf);
    buf.extend_from_slice(&body);
}

fn main() {
    let mut buf = Vec::new();
    encode_string_field(1, "Alice", &mut buf);
    encode_varint_field(2, 123, &mut buf);
    encode_string_field(3, "alice@example.com", &mut buf);
    encode_phone(
        &PhoneNumber {
            number: "555-1234".into(),
            phone_type: 1,
        },
        &mut buf,
    );
    encode_phone(
        &PhoneNumber {
            number: "555-5678".into(),
            phone_type: 2,
        },
        &mut buf,
    );

    println!("Encoded {} bytes", buf.len());
    println!("Raw bytes: {:02x?}", buf);
    println!();

    let mut person = Person::default();
    Decoder::new(&buf).decode_full_object(&mut person).unwrap();

    println!("Decoded Person:");
    println!("  name: {}", person.name);
    println!("  id: {}", person.id);
    println!("  email: {}", person.email);
    println!("  phones_len: {}", person.phones.len());

    for (i, phone) in person.phones.iter().enumerate() {
        println!("  phone[{}]: {} (type={})", i, phone.number, phone.phone_type);
    }
}
