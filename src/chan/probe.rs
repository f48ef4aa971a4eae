//! Detection of [`ExitStatus`] values among application messages.
//!
//! Message types are generic, so the check cannot rely on [`Any`]. Instead
//! the value is serialized into [`Probe`], which inspects only the first
//! serializer call: an [`ExitStatus`] always starts with a newtype variant
//! of the reserved [`EXIT_STATUS_NAME`]. Every other call stops the probe
//! immediately, so nothing below the top level is ever visited.
//!
//! [`ExitStatus`]: crate::core::ExitStatus
//! [`Any`]: std::any::Any

use serde::Serialize;
use serde::Serializer;
use serde::ser;
use serde::ser::Impossible;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::EXIT_STATUS_NAME;

/// Returns `true` if `data` is an [`ExitStatus`] (or a reference to one).
///
/// [`ExitStatus`]: crate::core::ExitStatus
pub(crate) fn is_exit_status<M>(data: &M) -> bool
where
  M: Serialize + ?Sized,
{
  matches!(data.serialize(Probe), Ok(true))
}

// -----------------------------------------------------------------------------
// Probe Error
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct Stop;

impl Display for Stop {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("probe stopped")
  }
}

impl std::error::Error for Stop {}

impl ser::Error for Stop {
  #[inline]
  fn custom<T>(_msg: T) -> Self
  where
    T: Display,
  {
    Self
  }
}

// -----------------------------------------------------------------------------
// Probe Serializer
// -----------------------------------------------------------------------------

macro_rules! stop {
  ($($method:ident($($ty:ty),*)),+ $(,)?) => {
    $(
      #[inline]
      fn $method(self, $(_: $ty),*) -> Result<Self::Ok, Self::Error> {
        Ok(false)
      }
    )+
  };
}

struct Probe;

impl Serializer for Probe {
  type Ok = bool;
  type Error = Stop;

  type SerializeSeq = Impossible<bool, Stop>;
  type SerializeTuple = Impossible<bool, Stop>;
  type SerializeTupleStruct = Impossible<bool, Stop>;
  type SerializeTupleVariant = Impossible<bool, Stop>;
  type SerializeMap = Impossible<bool, Stop>;
  type SerializeStruct = Impossible<bool, Stop>;
  type SerializeStructVariant = Impossible<bool, Stop>;

  stop! {
    serialize_bool(bool),
    serialize_i8(i8),
    serialize_i16(i16),
    serialize_i32(i32),
    serialize_i64(i64),
    serialize_u8(u8),
    serialize_u16(u16),
    serialize_u32(u32),
    serialize_u64(u64),
    serialize_f32(f32),
    serialize_f64(f64),
    serialize_char(char),
    serialize_str(&str),
    serialize_bytes(&[u8]),
    serialize_none(),
    serialize_unit(),
    serialize_unit_struct(&'static str),
    serialize_unit_variant(&'static str, u32, &'static str),
  }

  #[inline]
  fn serialize_some<T>(self, _value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: Serialize + ?Sized,
  {
    Ok(false)
  }

  #[inline]
  fn serialize_newtype_struct<T>(self, _name: &'static str, _value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: Serialize + ?Sized,
  {
    Ok(false)
  }

  #[inline]
  fn serialize_newtype_variant<T>(
    self,
    name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _value: &T,
  ) -> Result<Self::Ok, Self::Error>
  where
    T: Serialize + ?Sized,
  {
    Ok(name == EXIT_STATUS_NAME)
  }

  #[inline]
  fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_tuple_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleStruct, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeTupleVariant, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_struct(
    self,
    _name: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStruct, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn serialize_struct_variant(
    self,
    _name: &'static str,
    _variant_index: u32,
    _variant: &'static str,
    _len: usize,
  ) -> Result<Self::SerializeStructVariant, Self::Error> {
    Err(Stop)
  }

  #[inline]
  fn collect_str<T>(self, _value: &T) -> Result<Self::Ok, Self::Error>
  where
    T: Display + ?Sized,
  {
    Ok(false)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
