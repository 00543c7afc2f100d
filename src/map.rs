//! Map-entry decoding.
//!
//! A protobuf map field is sugar for `repeated { K key = 1; V value = 2; }`:
//! each entry arrives as its own length-delimited submessage, decoded here
//! independent of field ordering, then merged into the caller's map
//! container via [`Extend`] (last-writer-wins on duplicate keys, matching
//! both `BTreeMap::extend` and `HashMap::extend`).

use alloc::string::String;
use core::hash::Hash;

use crate::decoder::DecodeCtx;
use crate::error::DecodeError;
use crate::field_decoder::FieldDecoder;
use crate::message::MessageHandler;
use crate::scalar::ScalarField;
use crate::scanner::Scanner;

/// Types protobuf allows as map keys: every integral scalar and `string`,
/// never floating point, bytes, message, or enum-as-message.
///
/// The restriction is enforced by the type system, not at runtime: the
/// blanket impl below requires [`Ord`] (which `f32`/`f64` don't implement
/// because of `NaN`) and [`ScalarField`] (which `Bytes`/message types don't
/// implement), so a key type this crate shouldn't allow simply has no
/// `MapKey` impl to satisfy a map setter's bound.
pub trait MapKey: Ord + Hash + Clone {
    /// Read field 1 of a map entry into `target`, if `field`'s wire type
    /// matches this key type. Declines (leaves `target` untouched) on a
    /// mismatch, the same contract as any other typed setter.
    fn decode_from(field: &mut FieldDecoder<'_, '_, '_>, target: &mut Self) -> Result<(), DecodeError>;
}

impl<T> MapKey for T
where
    T: ScalarField + Ord + Hash + Clone,
{
    fn decode_from(field: &mut FieldDecoder<'_, '_, '_>, target: &mut Self) -> Result<(), DecodeError> {
        if let FieldDecoder::Numeric(n) = field {
            n.decode_singular(target)?;
        }
        Ok(())
    }
}

impl MapKey for String {
    fn decode_from(field: &mut FieldDecoder<'_, '_, '_>, target: &mut Self) -> Result<(), DecodeError> {
        if let FieldDecoder::LengthDelimited(l) = field {
            l.decode_string(target)?;
        }
        Ok(())
    }
}

/// Walk one map entry's sub-slice, dispatching field 1 to `K::decode_from`
/// and field 2 to `decode_value`, in whatever order they appear. Any other
/// field number is skipped. Fails if either field never appeared.
fn decode_entry<K, V>(
    data: &[u8],
    ctx: DecodeCtx<'_>,
    mut decode_value: impl FnMut(&mut FieldDecoder<'_, '_, '_>, &mut V) -> Result<(), DecodeError>,
) -> Result<(K, V), DecodeError>
where
    K: MapKey + Default,
    V: Default,
{
    let mut scanner = Scanner::sub_scanner(data);
    let mut key: Option<K> = None;
    let mut value: Option<V> = None;

    loop {
        let tag = match scanner.get_tag()? {
            Some(tag) => tag,
            None => break,
        };
        match tag.field_number() {
            1 => {
                let mut k = K::default();
                let consumed = {
                    let mut fd = FieldDecoder::new(&mut scanner, tag, ctx)?;
                    K::decode_from(&mut fd, &mut k)?;
                    fd.consumed()
                };
                if consumed {
                    key = Some(k);
                } else {
                    scanner.skip()?;
                }
            }
            2 => {
                let mut v = V::default();
                let consumed = {
                    let mut fd = FieldDecoder::new(&mut scanner, tag, ctx)?;
                    decode_value(&mut fd, &mut v)?;
                    fd.consumed()
                };
                if consumed {
                    value = Some(v);
                } else {
                    scanner.skip()?;
                }
            }
            _ => scanner.skip_over(tag)?,
        }
    }

    match (key, value) {
        (Some(key), Some(value)) => Ok((key, value)),
        _ => Err(DecodeError::map_entry_missing_field()),
    }
}

/// Decode a map entry whose value is a scalar type.
pub(crate) fn decode_map_entry_scalar<K, V>(data: &[u8], ctx: DecodeCtx<'_>) -> Result<(K, V), DecodeError>
where
    K: MapKey + Default,
    V: ScalarField + Default,
{
    decode_entry::<K, V>(data, ctx, |field, slot| match field {
        FieldDecoder::Numeric(n) => n.decode_singular(slot),
        _ => Ok(()),
    })
}

/// Decode a map entry whose value is an embedded message.
pub(crate) fn decode_map_entry_message<K, M>(data: &[u8], ctx: DecodeCtx<'_>) -> Result<(K, M), DecodeError>
where
    K: MapKey + Default,
    M: MessageHandler + Default,
{
    decode_entry::<K, M>(data, ctx, |field, slot| match field {
        FieldDecoder::LengthDelimited(l) => l.decode_message(slot),
        _ => Ok(()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use alloc::collections::BTreeMap;

    #[derive(Default)]
    struct StringToInt32Map {
        map: BTreeMap<String, i32>,
    }

    impl MessageHandler for StringToInt32Map {
        fn decode_field(
            &mut self,
            field: &mut FieldDecoder<'_, '_, '_>,
            field_number: u32,
        ) -> Result<(), DecodeError> {
            if field_number == 1 {
                if let FieldDecoder::LengthDelimited(l) = field {
                    l.decode_map_entry_scalar::<String, i32, _>(&mut self.map)?;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_map_key_then_value_ordering() {
        // field 1 (map entries), entry: key="foo" (field 1), value=42 (field 2)
        let data = [0x0A, 0x09, 0x0A, 0x03, b'f', b'o', b'o', 0x10, 0x2A];
        let mut handler = StringToInt32Map::default();
        Decoder::new(&data).decode_full_object(&mut handler).unwrap();
        assert_eq!(handler.map.get("foo"), Some(&42));
    }

    #[test]
    fn test_map_value_then_key_ordering() {
        // Same entry, value (field 2) before key (field 1).
        let data = [0x0A, 0x09, 0x10, 0x2A, 0x0A, 0x03, b'f', b'o', b'o'];
        let mut handler = StringToInt32Map::default();
        Decoder::new(&data).decode_full_object(&mut handler).unwrap();
        assert_eq!(handler.map.get("foo"), Some(&42));
    }

    #[test]
    fn test_map_entry_missing_value_is_malformed() {
        // Entry with only a key, no value field at all.
        let data = [0x0A, 0x05, 0x0A, 0x03, b'f', b'o', b'o'];
        let mut handler = StringToInt32Map::default();
        let err = Decoder::new(&data)
            .decode_full_object(&mut handler)
            .unwrap_err();
        assert_eq!(
            err.malformed_reason(),
            Some(crate::error::MalformedReason::MapEntryMissingField)
        );
    }

    #[derive(Default, PartialEq, Debug)]
    struct Addr {
        city: String,
    }

    impl MessageHandler for Addr {
        fn decode_field(
            &mut self,
            field: &mut FieldDecoder<'_, '_, '_>,
            field_number: u32,
        ) -> Result<(), DecodeError> {
            if field_number == 1 {
                if let FieldDecoder::LengthDelimited(l) = field {
                    l.decode_string(&mut self.city)?;
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct StringToAddrMap {
        map: BTreeMap<String, Addr>,
    }

    impl MessageHandler for StringToAddrMap {
        fn decode_field(
            &mut self,
            field: &mut FieldDecoder<'_, '_, '_>,
            field_number: u32,
        ) -> Result<(), DecodeError> {
            if field_number == 1 {
                if let FieldDecoder::LengthDelimited(l) = field {
                    l.decode_map_entry_message::<String, Addr, _>(&mut self.map)?;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_map_entry_message_value() {
        // map entry: key="hq" (field 1), value=Addr{city:"Reno"} (field 2).
        let data = [
            0x0A, 0x0C, // field 1 (map entry), len 12
            0x0A, 0x02, b'h', b'q', // entry.field1 (key) = "hq"
            0x12, 0x06, // entry.field2 (value), len 6
            0x0A, 0x04, b'R', b'e', b'n', b'o', // value.field1 = "Reno"
        ];
        let mut handler = StringToAddrMap::default();
        Decoder::new(&data).decode_full_object(&mut handler).unwrap();
        assert_eq!(
            handler.map.get("hq"),
            Some(&Addr {
                city: String::from("Reno")
            })
        );
        assert_eq!(handler.map.len(), 1);
    }
}
