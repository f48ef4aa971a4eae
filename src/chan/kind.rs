use serde::Deserialize;
use serde::Deserializer;
use serde::de::EnumAccess;
use serde::de::Error;
use serde::de::IgnoredAny;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::VariantAccess;
use serde::de::Visitor;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// The shape of a decoded message whose type is not known to the receiver.
///
/// Decoding consumes the whole value and keeps only its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MessageKind {
  Nil,
  Bool,
  Int,
  Float,
  Str,
  Bytes,
  Array,
  Map,
  Variant,
}

impl MessageKind {
  #[inline]
  pub(crate) const fn as_str(self) -> &'static str {
    match self {
      Self::Nil => "nil",
      Self::Bool => "bool",
      Self::Int => "int",
      Self::Float => "float",
      Self::Str => "str",
      Self::Bytes => "bytes",
      Self::Array => "array",
      Self::Map => "map",
      Self::Variant => "variant",
    }
  }
}

impl Display for MessageKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for MessageKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_any(KindVisitor)
  }
}

// -----------------------------------------------------------------------------
// Visitor
// -----------------------------------------------------------------------------

struct KindVisitor;

impl<'de> Visitor<'de> for KindVisitor {
  type Value = MessageKind;

  fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("any value")
  }

  fn visit_bool<E: Error>(self, _: bool) -> Result<MessageKind, E> {
    Ok(MessageKind::Bool)
  }

  fn visit_i64<E: Error>(self, _: i64) -> Result<MessageKind, E> {
    Ok(MessageKind::Int)
  }

  fn visit_i128<E: Error>(self, _: i128) -> Result<MessageKind, E> {
    Ok(MessageKind::Int)
  }

  fn visit_u64<E: Error>(self, _: u64) -> Result<MessageKind, E> {
    Ok(MessageKind::Int)
  }

  fn visit_u128<E: Error>(self, _: u128) -> Result<MessageKind, E> {
    Ok(MessageKind::Int)
  }

  fn visit_f64<E: Error>(self, _: f64) -> Result<MessageKind, E> {
    Ok(MessageKind::Float)
  }

  fn visit_str<E: Error>(self, _: &str) -> Result<MessageKind, E> {
    Ok(MessageKind::Str)
  }

  fn visit_bytes<E: Error>(self, _: &[u8]) -> Result<MessageKind, E> {
    Ok(MessageKind::Bytes)
  }

  fn visit_none<E: Error>(self) -> Result<MessageKind, E> {
    Ok(MessageKind::Nil)
  }

  fn visit_unit<E: Error>(self) -> Result<MessageKind, E> {
    Ok(MessageKind::Nil)
  }

  fn visit_some<D>(self, deserializer: D) -> Result<MessageKind, D::Error>
  where
    D: Deserializer<'de>,
  {
    MessageKind::deserialize(deserializer)
  }

  fn visit_newtype_struct<D>(self, deserializer: D) -> Result<MessageKind, D::Error>
  where
    D: Deserializer<'de>,
  {
    MessageKind::deserialize(deserializer)
  }

  fn visit_seq<A>(self, mut seq: A) -> Result<MessageKind, A::Error>
  where
    A: SeqAccess<'de>,
  {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(MessageKind::Array)
  }

  fn visit_map<A>(self, mut map: A) -> Result<MessageKind, A::Error>
  where
    A: MapAccess<'de>,
  {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(MessageKind::Map)
  }

  fn visit_enum<A>(self, data: A) -> Result<MessageKind, A::Error>
  where
    A: EnumAccess<'de>,
  {
    let (IgnoredAny, variant) = data.variant::<IgnoredAny>()?;
    variant.newtype_variant::<IgnoredAny>()?;
    Ok(MessageKind::Variant)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
