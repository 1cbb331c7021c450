//! Literal parsing and the `\DDD` escape scheme.
//!
//! One shared conversion routine normalizes every integer spelling
//! (decimal, hex, octal, optionally signed) to `i64`, so downstream code
//! never sees the original base.

use crate::arg_type::ArgType;
use crate::error::LiteralError;
use crate::value::Value;

/// Parse an integer literal: optionally signed decimal, `0x…` hex, or
/// `0o…` octal.
pub fn parse_int(text: &str) -> Result<i64, LiteralError> {
    let err = || LiteralError::InvalidInt {
        text: text.to_string(),
    };

    let (negative, magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (radix, digits) = if let Some(hex) = magnitude.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = magnitude.strip_prefix("0o") {
        (8, oct)
    } else {
        (10, magnitude)
    };

    if digits.is_empty() {
        return Err(err());
    }

    // Parse the magnitude wide, then range-check, so the sign can be applied
    // without a second overflow path.
    let wide = i128::from_str_radix(digits, radix).map_err(|_| err())?;
    let signed = if negative { -wide } else { wide };
    i64::try_from(signed).map_err(|_| err())
}

/// Parse a boolean literal: exactly `true` or `false`.
pub fn parse_bool(text: &str) -> Result<bool, LiteralError> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(LiteralError::InvalidBool {
            text: text.to_string(),
        }),
    }
}

/// Validate a string literal: no whitespace, no `#`, and every backslash
/// starts a three-digit decimal escape. The empty string is valid.
pub fn validate_string(text: &str) -> Result<(), LiteralError> {
    let err = || LiteralError::InvalidString {
        text: text.to_string(),
    };

    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '#' {
            return Err(err());
        }
        if c == '\\' {
            for _ in 0..3 {
                match chars.next() {
                    Some(d) if d.is_ascii_digit() => {}
                    _ => return Err(err()),
                }
            }
        }
    }
    Ok(())
}

/// Decode `\DDD` escape sequences to their characters.
///
/// Called by WRITE only; DPRINT emits the raw form. A malformed escape is
/// passed through unchanged rather than dropped, so the function is total
/// over arbitrary input.
pub fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut digits = String::new();
        for _ in 0..3 {
            match chars.peek() {
                Some(d) if d.is_ascii_digit() => {
                    digits.push(*d);
                    chars.next();
                }
                _ => break,
            }
        }

        match digits.len() {
            3 => {
                // Three decimal digits never exceed 999, always a valid
                // scalar value.
                let code: u32 = digits.parse().unwrap_or(0);
                match char::from_u32(code) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            _ => {
                out.push('\\');
                out.push_str(&digits);
            }
        }
    }

    out
}

/// Parse a value literal of the declared type into a [`Value`].
///
/// Only the four value-bearing argument types produce values; `label`,
/// `type` and `var` operands are not literals and are rejected.
pub fn parse_value(kind: ArgType, text: &str) -> Result<Value, LiteralError> {
    match kind {
        ArgType::Int => parse_int(text).map(Value::Int),
        ArgType::Bool => parse_bool(text).map(Value::Bool),
        ArgType::String => {
            validate_string(text)?;
            Ok(Value::Str(text.to_string()))
        }
        ArgType::Nil => {
            if text == "nil" {
                Ok(Value::Nil)
            } else {
                Err(LiteralError::InvalidNil {
                    text: text.to_string(),
                })
            }
        }
        ArgType::Label | ArgType::Type | ArgType::Var => Err(LiteralError::NotAValue {
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_forms() {
        assert_eq!(parse_int("0"), Ok(0));
        assert_eq!(parse_int("42"), Ok(42));
        assert_eq!(parse_int("-13"), Ok(-13));
        assert_eq!(parse_int("+7"), Ok(7));
        assert_eq!(parse_int("007"), Ok(7));
    }

    #[test]
    fn hex_and_octal_forms() {
        assert_eq!(parse_int("0x1A"), Ok(26));
        assert_eq!(parse_int("0xff"), Ok(255));
        assert_eq!(parse_int("-0x10"), Ok(-16));
        assert_eq!(parse_int("0o17"), Ok(15));
        assert_eq!(parse_int("+0o10"), Ok(8));
    }

    #[test]
    fn malformed_ints_rejected() {
        for bad in ["", "-", "0x", "0o", "0xZZ", "0o8", "1.5", "1e3", "ten", "0X1A"] {
            assert!(parse_int(bad).is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn int_range_boundaries() {
        assert_eq!(parse_int("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808"), Ok(i64::MIN));
        assert!(parse_int("9223372036854775808").is_err());
    }

    #[test]
    fn bool_literals() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("false"), Ok(false));
        assert!(parse_bool("True").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn string_validation() {
        assert!(validate_string("").is_ok());
        assert!(validate_string("hello").is_ok());
        assert!(validate_string("a\\032b").is_ok());
        assert!(validate_string("a b").is_err());
        assert!(validate_string("a#b").is_err());
        assert!(validate_string("a\\9z").is_err());
        assert!(validate_string("trailing\\").is_err());
    }

    #[test]
    fn escape_decoding() {
        assert_eq!(decode_escapes("a\\032b"), "a b");
        assert_eq!(decode_escapes("\\072\\105"), "Hi");
        assert_eq!(decode_escapes("plain"), "plain");
        assert_eq!(decode_escapes(""), "");
    }

    #[test]
    fn escape_decoding_is_total() {
        // Never called on these after validation, but must not mangle them.
        assert_eq!(decode_escapes("bad\\9z"), "bad\\9z");
        assert_eq!(decode_escapes("tail\\"), "tail\\");
    }

    #[test]
    fn value_parsing_dispatch() {
        assert_eq!(parse_value(ArgType::Int, "0x10"), Ok(Value::Int(16)));
        assert_eq!(parse_value(ArgType::Bool, "true"), Ok(Value::Bool(true)));
        assert_eq!(
            parse_value(ArgType::String, "ab"),
            Ok(Value::Str("ab".to_string()))
        );
        assert_eq!(parse_value(ArgType::Nil, "nil"), Ok(Value::Nil));
        assert!(parse_value(ArgType::Nil, "null").is_err());
        assert!(parse_value(ArgType::Label, "loop").is_err());
    }
}
