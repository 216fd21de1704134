//! Canonical byte encoding of any `Serialize` value, used for snapshots.
//!
//! Every serde data model item is written as a tag byte followed by a
//! fixed-width or length-prefixed payload, so the encoding is prefix-free and
//! two values encode identically exactly when serde reports them identically.
//!
//! - integers are widened to 128 bits (signed and unsigned tagged apart)
//! - floats are written as their raw bit patterns, so NaN, +inf, -inf and
//!   -0.0 all stay distinct
//! - map entries are encoded separately, sorted by key bytes and then
//!   appended, so hash-map iteration order never reaches the digest
//! - map keys may be any serializable type
//! - struct fields keep declaration order
//!
//! Sequences keep their iteration order.

use serde::ser::{self, Serialize};
use thiserror::Error;

const BOOL: u8 = 0x01;
const SIGNED: u8 = 0x02;
const UNSIGNED: u8 = 0x03;
const F32: u8 = 0x04;
const F64: u8 = 0x05;
const CHAR: u8 = 0x06;
const STR: u8 = 0x07;
const BYTES: u8 = 0x08;
const NONE: u8 = 0x09;
const SOME: u8 = 0x0a;
const UNIT: u8 = 0x0b;
const UNIT_STRUCT: u8 = 0x0c;
const UNIT_VARIANT: u8 = 0x0d;
const NEWTYPE_STRUCT: u8 = 0x0e;
const NEWTYPE_VARIANT: u8 = 0x0f;
const SEQ: u8 = 0x10;
const TUPLE: u8 = 0x11;
const TUPLE_STRUCT: u8 = 0x12;
const TUPLE_VARIANT: u8 = 0x13;
const MAP: u8 = 0x14;
const STRUCT: u8 = 0x15;
const STRUCT_VARIANT: u8 = 0x16;
const FIELD: u8 = 0x17;
const END: u8 = 0xff;

/// A value's `Serialize` impl reported an error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SnapshotError(String);

impl ser::Error for SnapshotError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        SnapshotError(msg.to_string())
    }
}

/// Encodes `value` into its canonical bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SnapshotError> {
    let mut encoder = Encoder::default();
    value.serialize(&mut encoder)?;
    Ok(encoder.out)
}

#[derive(Default)]
struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    fn tag(&mut self, tag: u8) {
        self.out.push(tag);
    }

    fn len(&mut self, len: usize) {
        self.out.extend_from_slice(&(len as u64).to_le_bytes());
    }

    fn text(&mut self, s: &str) {
        self.len(s.len());
        self.out.extend_from_slice(s.as_bytes());
    }

    fn signed(&mut self, v: i128) -> Result<(), SnapshotError> {
        self.tag(SIGNED);
        self.out.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    fn unsigned(&mut self, v: u128) -> Result<(), SnapshotError> {
        self.tag(UNSIGNED);
        self.out.extend_from_slice(&v.to_le_bytes());
        Ok(())
    }

    fn variant(&mut self, tag: u8, index: u32, name: &str) {
        self.tag(tag);
        self.out.extend_from_slice(&index.to_le_bytes());
        self.text(name);
    }
}

impl<'a> ser::Serializer for &'a mut Encoder {
    type Ok = ();
    type Error = SnapshotError;
    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = MapEncoder<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), SnapshotError> {
        self.tag(BOOL);
        self.out.push(u8::from(v));
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<(), SnapshotError> {
        self.signed(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<(), SnapshotError> {
        self.signed(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<(), SnapshotError> {
        self.signed(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<(), SnapshotError> {
        self.signed(v.into())
    }

    fn serialize_i128(self, v: i128) -> Result<(), SnapshotError> {
        self.signed(v)
    }

    fn serialize_u8(self, v: u8) -> Result<(), SnapshotError> {
        self.unsigned(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<(), SnapshotError> {
        self.unsigned(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<(), SnapshotError> {
        self.unsigned(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<(), SnapshotError> {
        self.unsigned(v.into())
    }

    fn serialize_u128(self, v: u128) -> Result<(), SnapshotError> {
        self.unsigned(v)
    }

    fn serialize_f32(self, v: f32) -> Result<(), SnapshotError> {
        self.tag(F32);
        self.out.extend_from_slice(&v.to_bits().to_le_bytes());
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), SnapshotError> {
        self.tag(F64);
        self.out.extend_from_slice(&v.to_bits().to_le_bytes());
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), SnapshotError> {
        self.tag(CHAR);
        self.out.extend_from_slice(&u32::from(v).to_le_bytes());
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<(), SnapshotError> {
        self.tag(STR);
        self.text(v);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), SnapshotError> {
        self.tag(BYTES);
        self.len(v.len());
        self.out.extend_from_slice(v);
        Ok(())
    }

    fn serialize_none(self) -> Result<(), SnapshotError> {
        self.tag(NONE);
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), SnapshotError> {
        self.tag(SOME);
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), SnapshotError> {
        self.tag(UNIT);
        Ok(())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<(), SnapshotError> {
        self.tag(UNIT_STRUCT);
        self.text(name);
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        index: u32,
        variant: &'static str,
    ) -> Result<(), SnapshotError> {
        self.variant(UNIT_VARIANT, index, variant);
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<(), SnapshotError> {
        self.tag(NEWTYPE_STRUCT);
        self.text(name);
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), SnapshotError> {
        self.variant(NEWTYPE_VARIANT, index, variant);
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a>, SnapshotError> {
        self.tag(SEQ);
        Ok(Compound { enc: self })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Compound<'a>, SnapshotError> {
        self.tag(TUPLE);
        Ok(Compound { enc: self })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, SnapshotError> {
        self.tag(TUPLE_STRUCT);
        self.text(name);
        Ok(Compound { enc: self })
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, SnapshotError> {
        self.variant(TUPLE_VARIANT, index, variant);
        Ok(Compound { enc: self })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder<'a>, SnapshotError> {
        self.tag(MAP);
        Ok(MapEncoder {
            parent: self,
            entries: Vec::new(),
            key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, SnapshotError> {
        self.tag(STRUCT);
        self.text(name);
        Ok(Compound { enc: self })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>, SnapshotError> {
        self.variant(STRUCT_VARIANT, index, variant);
        Ok(Compound { enc: self })
    }
}

/// Sequences, tuples and structs: elements in order, then [`END`].
struct Compound<'a> {
    enc: &'a mut Encoder,
}

impl Compound<'_> {
    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        value.serialize(&mut *self.enc)
    }

    fn field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SnapshotError> {
        self.enc.tag(FIELD);
        self.enc.text(key);
        value.serialize(&mut *self.enc)
    }

    fn finish(self) -> Result<(), SnapshotError> {
        self.enc.tag(END);
        Ok(())
    }
}

impl ser::SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

impl ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

impl ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SnapshotError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SnapshotError> {
        self.field(key, value)
    }

    fn end(self) -> Result<(), SnapshotError> {
        self.finish()
    }
}

/// Maps: entries buffered, sorted by encoded key, then written out.
struct MapEncoder<'a> {
    parent: &'a mut Encoder,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    key: Option<Vec<u8>>,
}

impl ser::SerializeMap for MapEncoder<'_> {
    type Ok = ();
    type Error = SnapshotError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), SnapshotError> {
        self.key = Some(encode(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SnapshotError> {
        let key = self
            .key
            .take()
            .ok_or_else(|| SnapshotError("map value serialized before its key".into()))?;
        self.entries.push((key, encode(value)?));
        Ok(())
    }

    fn end(self) -> Result<(), SnapshotError> {
        let MapEncoder {
            parent,
            mut entries,
            ..
        } = self;
        entries.sort();
        for (key, value) in entries {
            parent.out.extend_from_slice(&key);
            parent.out.extend_from_slice(&value);
        }
        parent.tag(END);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use serde::Serialize;

    use super::*;

    #[test]
    fn scalars_are_tagged_and_fixed_width() {
        assert_eq!(encode(&true).unwrap(), vec![BOOL, 1]);
        let mut expected = vec![UNSIGNED];
        expected.extend_from_slice(&7u128.to_le_bytes());
        assert_eq!(encode(&7u8).unwrap(), expected);
    }

    #[test]
    fn signed_and_unsigned_differ() {
        assert_ne!(encode(&1i32).unwrap(), encode(&1u32).unwrap());
    }

    #[test]
    fn wide_integers_encode() {
        assert!(encode(&u128::MAX).is_ok());
        assert!(encode(&i128::MIN).is_ok());
        assert_ne!(encode(&u128::MAX).unwrap(), encode(&(u128::MAX - 1)).unwrap());
    }

    #[test]
    fn non_finite_floats_stay_distinct() {
        let inf = encode(&f64::INFINITY).unwrap();
        let nan = encode(&f64::NAN).unwrap();
        let neg_inf = encode(&f64::NEG_INFINITY).unwrap();
        assert_ne!(inf, nan);
        assert_ne!(nan, neg_inf);
        assert_ne!(inf, neg_inf);
        assert_ne!(encode(&0.0f64).unwrap(), encode(&-0.0f64).unwrap());
        assert_ne!(encode(&f32::NAN).unwrap(), encode(&f32::INFINITY).unwrap());
    }

    #[test]
    fn tuple_keyed_maps_encode_in_key_order() {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        for i in 0..32u8 {
            forward.insert((i, 255 - i), u32::from(i));
        }
        for i in (0..32u8).rev() {
            backward.insert((i, 255 - i), u32::from(i));
        }
        let sorted: BTreeMap<_, _> = forward.clone().into_iter().collect();

        let a = encode(&forward).unwrap();
        assert_eq!(a, encode(&backward).unwrap());
        assert_eq!(a, encode(&sorted).unwrap());
    }

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(f64),
        Rect { w: u32, h: u32 },
        Pair(u8, u8),
    }

    #[test]
    fn enum_variants_are_distinct() {
        let encoded: Vec<Vec<u8>> = [
            Shape::Dot,
            Shape::Circle(1.0),
            Shape::Rect { w: 1, h: 1 },
            Shape::Pair(1, 1),
        ]
        .iter()
        .map(|s| encode(s).unwrap())
        .collect();
        for (i, a) in encoded.iter().enumerate() {
            for b in &encoded[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[derive(Serialize)]
    struct Sparse {
        #[serde(skip_serializing_if = "Option::is_none")]
        a: Option<u8>,
        b: Option<u8>,
    }

    #[test]
    fn skipped_fields_do_not_collide() {
        let with_a = encode(&Sparse { a: Some(1), b: None }).unwrap();
        let without_a = encode(&Sparse { a: None, b: Some(1) }).unwrap();
        assert_ne!(with_a, without_a);
    }

    #[test]
    fn nested_collections_are_prefix_free() {
        let a: Vec<Vec<u8>> = vec![vec![1], vec![]];
        let b: Vec<Vec<u8>> = vec![vec![], vec![1]];
        assert_ne!(encode(&a).unwrap(), encode(&b).unwrap());
        assert_ne!(encode(&("ab", "c")).unwrap(), encode(&("a", "bc")).unwrap());
    }
}
