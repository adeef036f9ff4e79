//! Canonical JSON encoding for trace step hashes
//!
//! Produces the same bytes as Python's `json.dumps(value, sort_keys=True)`
//! so that step logs written by either side verify on the other:
//! `", "` and `": "` separators, every char outside printable ASCII
//! escaped as `\uXXXX` (UTF-16 surrogate pairs above the BMP), and floats
//! in `repr` form (`1.0`, `1e-05`, `1e+16`).
//!
//! Key order comes from `serde_json::Map`, which is sorted by code point.

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};

/// Encode `value` as canonical JSON bytes
pub fn to_canonical_vec<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PythonFormatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// `serde_json` formatter mirroring Python's default `json.dumps` output
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f32<W: ?Sized + Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float_repr(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        // Quotes, backslashes and C0 controls never reach here; serde_json
        // routes them through `write_char_escape` with Python-compatible output.
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Python's `repr(float)`: shortest round-trip digits, exponent form when
/// the decimal exponent is below -4 or at least 16
fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let magnitude = value.abs();

    let scientific = format!("{:e}", magnitude);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if magnitude != 0.0 && !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs())
    } else {
        let fixed = format!("{}", magnitude);
        if fixed.contains('.') {
            format!("{}{}", sign, fixed)
        } else {
            format!("{}{}.0", sign, fixed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_repr_matches_python() {
        let cases = [
            (0.1, "0.1"),
            (1.0, "1.0"),
            (1e-05, "1e-05"),
            (0.0001, "0.0001"),
            (1.5e-07, "1.5e-07"),
            (1e16, "1e+16"),
            (9.9e15, "9900000000000000.0"),
            (-2.5, "-2.5"),
            (123456789.123, "123456789.123"),
            (1e22, "1e+22"),
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (1717000000.123456, "1717000000.123456"),
        ];
        for (value, expected) in cases {
            assert_eq!(python_float_repr(value), expected, "repr of {:?}", value);
        }
    }

    #[test]
    fn test_separators_and_escapes() {
        let value = json!({
            "b": [1, 2.5, null],
            "a": "h\u{e9}llo \u{1f680}\t\u{7f}",
        });
        let encoded = String::from_utf8(to_canonical_vec(&value).unwrap()).unwrap();
        assert_eq!(
            encoded,
            r#"{"a": "h\u00e9llo \ud83d\ude80\t\u007f", "b": [1, 2.5, null]}"#
        );
    }

    #[test]
    fn test_empty_containers() {
        let encoded = to_canonical_vec(&json!({"x": {}, "y": []})).unwrap();
        assert_eq!(encoded, br#"{"x": {}, "y": []}"#);
    }
}
