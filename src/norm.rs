//! One-byte field norm compression.
//!
//! Length norms are stored one byte per document per field, so they are
//! squeezed through a tiny floating point format: 3 mantissa bits and an
//! exponent biased so that the representable range covers roughly
//! `5.8e-10..=7.5e9`. Decoding goes through a 256-entry table built once on
//! first use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimilarityError;

/// A compressed field norm.
pub type NormValue = u8;

const MANTISSA_BITS: u32 = 3;
const ZERO_EXPONENT: i32 = 15;
/// The small-float value of the smallest exponent, after shifting.
const ZERO_POINT: i32 = (63 - ZERO_EXPONENT) << MANTISSA_BITS;

/// The byte that decodes to exactly `1.0`.
pub const NORM_ONE: NormValue = 124;

/// Decoded value of every possible norm byte.
pub static NORM_TABLE: Lazy<[f32; 256]> = Lazy::new(|| {
  let mut table = [0.0f32; 256];
  for (byte, slot) in table.iter_mut().enumerate() {
    *slot = decode_small_float(byte as u8);
  }
  table
});

/// Encodes a float into a single byte, truncating the mantissa.
///
/// Zero and negative values map to `0`. Positive values too small to be
/// represented map to `1` so that a present-but-tiny norm never becomes
/// zero. Values too large saturate at `255`.
pub fn encode_small_float(value: f32) -> NormValue {
  let bits = value.to_bits() as i32;
  let small = bits >> (24 - MANTISSA_BITS);

  if small <= ZERO_POINT {
    if bits <= 0 {
      0
    } else {
      1
    }
  } else if small >= ZERO_POINT + 0x100 {
    255
  } else {
    (small - ZERO_POINT) as NormValue
  }
}

/// Expands a byte produced by [`encode_small_float`] back into a float.
pub fn decode_small_float(byte: NormValue) -> f32 {
  if byte == 0 {
    return 0.0;
  }
  let mut bits = (byte as u32) << (24 - MANTISSA_BITS);
  bits += ((63 - ZERO_EXPONENT) as u32) << 24;
  f32::from_bits(bits)
}

/// Table lookup for a norm read from storage.
///
/// Only the low 8 bits are significant; anything wider is masked rather
/// than rejected.
pub fn decode_norm(value: u32) -> f32 {
  NORM_TABLE[(value & 0xff) as usize]
}

/// How a similarity stores its length norms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormCodec {
  /// Lossy one-byte small-float encoding.
  #[default]
  SmallFloat,
  /// Norms are not kept. Every field reads back as a neutral `1.0`.
  Omitted,
}

impl NormCodec {
  /// Compresses a length norm.
  pub fn encode(self, norm: f32) -> NormValue {
    match self {
      NormCodec::SmallFloat => encode_small_float(norm),
      NormCodec::Omitted => NORM_ONE,
    }
  }

  /// Expands a stored norm byte.
  pub fn decode(self, byte: NormValue) -> f32 {
    match self {
      NormCodec::SmallFloat => NORM_TABLE[byte as usize],
      NormCodec::Omitted => 1.0,
    }
  }

  /// The settings string for this codec.
  pub fn as_str(self) -> &'static str {
    match self {
      NormCodec::SmallFloat => "small_float",
      NormCodec::Omitted => "omitted",
    }
  }
}

impl fmt::Display for NormCodec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for NormCodec {
  type Err = SimilarityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "small_float" => Ok(NormCodec::SmallFloat),
      "omitted" | "none" => Ok(NormCodec::Omitted),
      other => Err(SimilarityError::invalid(
        "norm_codec",
        format!("expected `small_float` or `omitted`, got `{other}`"),
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_known_values() {
    assert_eq!(encode_small_float(1.0), NORM_ONE);
    assert_eq!(decode_small_float(NORM_ONE), 1.0);
    assert_eq!(encode_small_float(0.5), 120);
    assert_eq!(decode_small_float(120), 0.5);
  }

  #[test]
  fn test_zero_negative_and_tiny() {
    assert_eq!(encode_small_float(0.0), 0);
    assert_eq!(encode_small_float(-0.0), 0);
    assert_eq!(encode_small_float(-3.5), 0);
    assert_eq!(encode_small_float(f32::MIN_POSITIVE), 1);
    assert_eq!(decode_small_float(0), 0.0);
  }

  #[test]
  fn test_saturation() {
    assert_eq!(encode_small_float(f32::MAX), 255);
    assert_eq!(encode_small_float(f32::INFINITY), 255);
    assert!(decode_small_float(255) > 7.0e9);
    assert!(decode_small_float(1) > 0.0 && decode_small_float(1) < 1.0e-9);
  }

  #[test]
  fn test_every_byte_is_a_fixed_point() {
    for b in 0..=255u8 {
      let decoded = NORM_TABLE[b as usize];
      assert_eq!(encode_small_float(decoded), b, "byte {b}");
    }
  }

  #[test]
  fn test_table_is_increasing() {
    for pair in NORM_TABLE.windows(2) {
      assert!(pair[0] < pair[1]);
    }
  }

  #[test]
  fn test_decode_norm_masks_high_bits() {
    assert_eq!(decode_norm(0x100 | NORM_ONE as u32), 1.0);
    assert_eq!(decode_norm(0xffff_ff00), 0.0);
  }

  #[test]
  fn test_omitted_codec_is_neutral() {
    let codec = NormCodec::Omitted;
    assert_eq!(codec.encode(0.01), NORM_ONE);
    assert_eq!(codec.decode(0), 1.0);
    assert_eq!(codec.decode(200), 1.0);
    assert_eq!(NormCodec::SmallFloat.decode(codec.encode(42.0)), 1.0);
  }

  #[test]
  fn test_codec_names() {
    assert_eq!("small_float".parse::<NormCodec>().unwrap(), NormCodec::SmallFloat);
    assert_eq!("omitted".parse::<NormCodec>().unwrap(), NormCodec::Omitted);
    assert!("zstd".parse::<NormCodec>().is_err());
    assert_eq!(
      serde_json::to_string(&NormCodec::SmallFloat).unwrap(),
      "\"small_float\""
    );
  }
}
