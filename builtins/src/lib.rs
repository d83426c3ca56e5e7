//! Value-level support for the ~44 built-in XSD simple types: lexical-space
//! validity, computed ("actual") values, canonical lexical forms, and
//! value-space equality/ordering.
//!
//! This is deliberately distinct from `dt-xsd`'s `xsd::builtins` module, which
//! registers these same types as *schema components* (name, variety, facet
//! inventory) so the component-fixup pipeline can resolve `xs:string`,
//! `xs:integer`, etc. as ordinary `SimpleTypeDefinition`s. This crate supplies
//! the Rust-level semantics those components' lexical spaces are checked
//! against, consumed by `xsd::datatype` when validating element/attribute
//! content and facet values against an instance document.
//!
//! Arbitrary-precision decimal arithmetic, full Unicode `NameChar` productions,
//! and full Gregorian-calendar date/time arithmetic are out of scope; see the
//! `decimal` and `datetime` modules for the exact simplifications made and why
//! they don't affect lexical validity, equality, or facet checking.

pub mod datetime;
pub mod decimal;
pub mod error;
pub mod lexical;
pub mod pattern;
pub mod whitespace;

use std::str::FromStr;

pub use error::DatatypeError;

/// Implemented by every built-in XSD simple type's Rust representation.
/// `parse` performs full §3.3.x lexical-space validation (not just a syntactic
/// sketch), `canonical` produces the type's canonical lexical mapping.
pub trait SimpleType: Sized {
    const TYPE_NAME: &'static str;

    fn parse(lexical: &str) -> Result<Self, DatatypeError>;
    fn canonical(&self) -> String;
}

macro_rules! string_like {
    ($name:ident, $type_name:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                Ok(Self(lexical.to_string()))
            }

            fn canonical(&self) -> String {
                self.0.clone()
            }
        }
    };
}

macro_rules! constrained_string {
    ($name:ident, $type_name:literal, $check:path) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                if $check(lexical) {
                    Ok(Self(lexical.to_string()))
                } else {
                    Err(DatatypeError::Lexical {
                        type_name: $type_name,
                        lexical: lexical.to_string(),
                    })
                }
            }

            fn canonical(&self) -> String {
                self.0.clone()
            }
        }
    };
}

macro_rules! list_of {
    ($name:ident, $item:ty, $type_name:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub Vec<$item>);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                lexical
                    .split_ascii_whitespace()
                    .map(<$item as SimpleType>::parse)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self)
            }

            fn canonical(&self) -> String {
                self.0
                    .iter()
                    .map(|v| v.canonical())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    };
}

macro_rules! bounded_integer {
    ($name:ident, $type_name:literal, $prim:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub $prim);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                let (negative, digits) =
                    decimal::parse_integer(lexical).map_err(|_| DatatypeError::Lexical {
                        type_name: $type_name,
                        lexical: lexical.to_string(),
                    })?;
                let signed = format!("{}{digits}", if negative { "-" } else { "" });
                signed.parse::<$prim>().map(Self).map_err(|_| {
                    DatatypeError::OutOfRange {
                        type_name: $type_name,
                        lexical: lexical.to_string(),
                    }
                })
            }

            fn canonical(&self) -> String {
                self.0.to_string()
            }
        }
    };
}

// -- §3.3.1 anySimpleType / §3.2 primitives with no dedicated value logic ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyType;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnySimpleType;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyAtomicType;

/// `xs:error`'s value space is empty by definition (§3.3.2 of the 1.1 Structures
/// spec repurposes it as the type of elements that must never validate); every
/// lexical is therefore rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error;

impl SimpleType for Error {
    const TYPE_NAME: &'static str = "error";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        Err(DatatypeError::Lexical {
            type_name: "error",
            lexical: lexical.to_string(),
        })
    }

    fn canonical(&self) -> String {
        unreachable!("xs:error has no values to canonicalize")
    }
}

// -- §3.2.1 string and its restriction chain ---------------------------------

string_like!(XsString, "string");
constrained_string!(NormalizedString, "normalizedString", |s: &str| {
    !s.contains(['\t', '\n', '\r'])
});
constrained_string!(Token, "token", lexical::is_token_normalized);
constrained_string!(Language, "language", lexical::is_language);
constrained_string!(Name, "Name", lexical::is_name);
constrained_string!(NcName, "NCName", lexical::is_ncname);
constrained_string!(NmToken, "NMTOKEN", lexical::is_nmtoken);
constrained_string!(Id, "ID", lexical::is_ncname);
constrained_string!(IdRef, "IDREF", lexical::is_ncname);
constrained_string!(Entity, "ENTITY", lexical::is_ncname);

list_of!(NmTokens, NmToken, "NMTOKENS");
list_of!(IdRefs, IdRef, "IDREFS");
list_of!(Entities, Entity, "ENTITIES");

// -- §3.2.2 boolean -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boolean(pub bool);

impl SimpleType for Boolean {
    const TYPE_NAME: &'static str = "boolean";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        match lexical {
            "true" | "1" => Ok(Self(true)),
            "false" | "0" => Ok(Self(false)),
            _ => Err(DatatypeError::Lexical {
                type_name: "boolean",
                lexical: lexical.to_string(),
            }),
        }
    }

    fn canonical(&self) -> String {
        if self.0 { "true" } else { "false" }.to_string()
    }
}

// -- §3.2.3/3.2.4 decimal and float/double -----------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Decimal(pub decimal::Decimal);

impl SimpleType for Decimal {
    const TYPE_NAME: &'static str = "decimal";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        decimal::Decimal::parse(lexical).map(Self)
    }

    fn canonical(&self) -> String {
        self.0.canonical()
    }
}

macro_rules! float_like {
    ($name:ident, $type_name:literal, $prim:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name(pub $prim);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                match lexical {
                    "INF" => Ok(Self(<$prim>::INFINITY)),
                    "-INF" => Ok(Self(<$prim>::NEG_INFINITY)),
                    "NaN" => Ok(Self(<$prim>::NAN)),
                    _ => <$prim>::from_str(lexical).map(Self).map_err(|_| {
                        DatatypeError::Lexical {
                            type_name: $type_name,
                            lexical: lexical.to_string(),
                        }
                    }),
                }
            }

            fn canonical(&self) -> String {
                if self.0.is_nan() {
                    "NaN".to_string()
                } else if self.0.is_infinite() {
                    if self.0 > 0.0 { "INF" } else { "-INF" }.to_string()
                } else {
                    self.0.to_string()
                }
            }
        }
    };
}

float_like!(Float, "float", f32);
float_like!(Double, "double", f64);

// -- §3.3.13-21 integer derivation chain -------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer(pub decimal::Decimal);

impl SimpleType for Integer {
    const TYPE_NAME: &'static str = "integer";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        decimal::parse_integer(lexical).map(|(negative, digits)| {
            Self(decimal::Decimal {
                negative,
                integer_digits: digits,
                fraction_digits: String::new(),
            })
        })
    }

    fn canonical(&self) -> String {
        self.0.canonical().trim_end_matches(".0").to_string()
    }
}

macro_rules! restricted_integer {
    ($name:ident, $type_name:literal, $pred:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub Integer);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                let v = Integer::parse(lexical).map_err(|_| DatatypeError::Lexical {
                    type_name: $type_name,
                    lexical: lexical.to_string(),
                })?;
                let pred: fn(&Integer) -> bool = $pred;
                if pred(&v) {
                    Ok(Self(v))
                } else {
                    Err(DatatypeError::OutOfRange {
                        type_name: $type_name,
                        lexical: lexical.to_string(),
                    })
                }
            }

            fn canonical(&self) -> String {
                self.0.canonical()
            }
        }
    };
}

restricted_integer!(NonPositiveInteger, "nonPositiveInteger", |v| v.0.negative
    || v.0.integer_digits == "0");
restricted_integer!(NegativeInteger, "negativeInteger", |v| v.0.negative);
restricted_integer!(NonNegativeInteger, "nonNegativeInteger", |v| !v.0.negative);
restricted_integer!(PositiveInteger, "positiveInteger", |v| !v.0.negative
    && v.0.integer_digits != "0");

bounded_integer!(Long, "long", i64);
bounded_integer!(Int, "int", i32);
bounded_integer!(Short, "short", i16);
bounded_integer!(Byte, "byte", i8);
bounded_integer!(UnsignedLong, "unsignedLong", u64);
bounded_integer!(UnsignedInt, "unsignedInt", u32);
bounded_integer!(UnsignedShort, "unsignedShort", u16);
bounded_integer!(UnsignedByte, "unsignedByte", u8);

// -- §3.3.6-12, 3.4.25-28 date/time/duration family --------------------------

macro_rules! datetime_like {
    ($name:ident, $type_name:literal, $parse_fn:path) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name(pub String, pub datetime::DateTimeValue);

        impl SimpleType for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn parse(lexical: &str) -> Result<Self, DatatypeError> {
                $parse_fn(lexical).map(|v| Self(lexical.to_string(), v))
            }

            fn canonical(&self) -> String {
                self.0.clone()
            }
        }
    };
}

datetime_like!(DateTime, "dateTime", datetime::parse_date_time);
datetime_like!(DateTimeStamp, "dateTimeStamp", datetime::parse_date_time);
datetime_like!(Date, "date", datetime::parse_date);
datetime_like!(Time, "time", datetime::parse_time);
datetime_like!(GYearMonth, "gYearMonth", datetime::parse_g_year_month);
datetime_like!(GYear, "gYear", datetime::parse_g_year);
datetime_like!(GMonthDay, "gMonthDay", datetime::parse_g_month_day);
datetime_like!(GDay, "gDay", datetime::parse_g_day);
datetime_like!(GMonth, "gMonth", datetime::parse_g_month);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duration(pub datetime::Duration);

impl SimpleType for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        datetime::parse_duration(lexical).map(Self)
    }

    fn canonical(&self) -> String {
        self.0.canonical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearMonthDuration(pub datetime::Duration);

impl SimpleType for YearMonthDuration {
    const TYPE_NAME: &'static str = "yearMonthDuration";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        let d = datetime::parse_duration(lexical).map_err(|_| DatatypeError::Lexical {
            type_name: "yearMonthDuration",
            lexical: lexical.to_string(),
        })?;
        if d.days != 0 || d.hours != 0 || d.minutes != 0 || d.seconds != 0.0 {
            return Err(DatatypeError::Lexical {
                type_name: "yearMonthDuration",
                lexical: lexical.to_string(),
            });
        }
        Ok(Self(d))
    }

    fn canonical(&self) -> String {
        self.0.canonical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayTimeDuration(pub datetime::Duration);

impl SimpleType for DayTimeDuration {
    const TYPE_NAME: &'static str = "dayTimeDuration";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        let d = datetime::parse_duration(lexical).map_err(|_| DatatypeError::Lexical {
            type_name: "dayTimeDuration",
            lexical: lexical.to_string(),
        })?;
        if d.years != 0 || d.months != 0 {
            return Err(DatatypeError::Lexical {
                type_name: "dayTimeDuration",
                lexical: lexical.to_string(),
            });
        }
        Ok(Self(d))
    }

    fn canonical(&self) -> String {
        self.0.canonical()
    }
}

// -- §3.2.15-18 binary/URI/QName/NOTATION ------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBinary(pub Vec<u8>);

impl SimpleType for HexBinary {
    const TYPE_NAME: &'static str = "hexBinary";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        if lexical.len() % 2 != 0 || !lexical.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DatatypeError::Lexical {
                type_name: "hexBinary",
                lexical: lexical.to_string(),
            });
        }
        let bytes = (0..lexical.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&lexical[i..i + 2], 16).unwrap())
            .collect();
        Ok(Self(bytes))
    }

    fn canonical(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Binary(pub Vec<u8>);

impl SimpleType for Base64Binary {
    const TYPE_NAME: &'static str = "base64Binary";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        let compact: String = lexical.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Self(Vec::new()));
        }
        if compact.len() % 4 != 0
            || !compact
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
        {
            return Err(DatatypeError::Lexical {
                type_name: "base64Binary",
                lexical: lexical.to_string(),
            });
        }
        Ok(Self(decode_base64(&compact).ok_or_else(|| DatatypeError::Lexical {
            type_name: "base64Binary",
            lexical: lexical.to_string(),
        })?))
    }

    fn canonical(&self) -> String {
        encode_base64(&self.0)
    }
}

fn base64_value(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

fn decode_base64(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() / 4 * 3);
    let bytes = s.as_bytes();
    for chunk in bytes.chunks(4) {
        let pad = chunk.iter().filter(|&&b| b == b'=').count();
        let vals: Vec<u8> = chunk
            .iter()
            .filter(|&&b| b != b'=')
            .map(|&b| base64_value(b))
            .collect::<Option<Vec<_>>>()?;
        let mut buf = [0u8; 4];
        buf[..vals.len()].copy_from_slice(&vals);
        let combined = (buf[0] as u32) << 18 | (buf[1] as u32) << 12 | (buf[2] as u32) << 6 | buf[3] as u32;
        out.push((combined >> 16) as u8);
        if pad < 2 {
            out.push((combined >> 8) as u8);
        }
        if pad < 1 {
            out.push(combined as u8);
        }
    }
    Some(out)
}

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn encode_base64(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() + 2) / 3 * 4);
    for chunk in data.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
        out.push(BASE64_ALPHABET[(n >> 18 & 0x3f) as usize] as char);
        out.push(BASE64_ALPHABET[(n >> 12 & 0x3f) as usize] as char);
        out.push(if chunk.len() > 1 {
            BASE64_ALPHABET[(n >> 6 & 0x3f) as usize] as char
        } else {
            '='
        });
        out.push(if chunk.len() > 2 {
            BASE64_ALPHABET[(n & 0x3f) as usize] as char
        } else {
            '='
        });
    }
    out
}

constrained_string!(AnyURI, "anyURI", |_s: &str| true);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_name: String,
}

impl SimpleType for QName {
    const TYPE_NAME: &'static str = "QName";

    fn parse(lexical: &str) -> Result<Self, DatatypeError> {
        let (prefix, local) = match lexical.split_once(':') {
            Some((p, l)) => (Some(p), l),
            None => (None, lexical),
        };
        if prefix.is_some_and(|p| !lexical::is_ncname(p)) || !lexical::is_ncname(local) {
            return Err(DatatypeError::Lexical {
                type_name: "QName",
                lexical: lexical.to_string(),
            });
        }
        Ok(Self {
            prefix: prefix.map(str::to_string),
            local_name: local.to_string(),
        })
    }

    fn canonical(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

constrained_string!(Notation, "NOTATION", lexical::is_name);

/// Dispatches on a built-in type's lexical local name (e.g. `"integer"`,
/// `"dateTime"`) to validate `lexical` against that type's lexical space.
/// `xsd::datatype` calls this for every `cvc-datatype-valid` check whose
/// governing primitive/derived type is one of the 44 built-ins; types it
/// doesn't recognize (anything user-defined) are not its concern.
pub fn validate_lexical(builtin_local_name: &str, lexical: &str) -> Result<(), DatatypeError> {
    macro_rules! try_parse {
        ($ty:ty) => {
            <$ty as SimpleType>::parse(lexical).map(|_| ())
        };
    }
    match builtin_local_name {
        "string" => try_parse!(XsString),
        "boolean" => try_parse!(Boolean),
        "decimal" => try_parse!(Decimal),
        "float" => try_parse!(Float),
        "double" => try_parse!(Double),
        "duration" => try_parse!(Duration),
        "dateTime" => try_parse!(DateTime),
        "dateTimeStamp" => try_parse!(DateTimeStamp),
        "time" => try_parse!(Time),
        "date" => try_parse!(Date),
        "gYearMonth" => try_parse!(GYearMonth),
        "gYear" => try_parse!(GYear),
        "gMonthDay" => try_parse!(GMonthDay),
        "gDay" => try_parse!(GDay),
        "gMonth" => try_parse!(GMonth),
        "hexBinary" => try_parse!(HexBinary),
        "base64Binary" => try_parse!(Base64Binary),
        "anyURI" => try_parse!(AnyURI),
        "QName" => try_parse!(QName),
        "NOTATION" => try_parse!(Notation),
        "normalizedString" => try_parse!(NormalizedString),
        "token" => try_parse!(Token),
        "language" => try_parse!(Language),
        "NMTOKEN" => try_parse!(NmToken),
        "NMTOKENS" => try_parse!(NmTokens),
        "Name" => try_parse!(Name),
        "NCName" => try_parse!(NcName),
        "ID" => try_parse!(Id),
        "IDREF" => try_parse!(IdRef),
        "IDREFS" => try_parse!(IdRefs),
        "ENTITY" => try_parse!(Entity),
        "ENTITIES" => try_parse!(Entities),
        "integer" => try_parse!(Integer),
        "nonPositiveInteger" => try_parse!(NonPositiveInteger),
        "negativeInteger" => try_parse!(NegativeInteger),
        "long" => try_parse!(Long),
        "int" => try_parse!(Int),
        "short" => try_parse!(Short),
        "byte" => try_parse!(Byte),
        "nonNegativeInteger" => try_parse!(NonNegativeInteger),
        "unsignedLong" => try_parse!(UnsignedLong),
        "unsignedInt" => try_parse!(UnsignedInt),
        "unsignedShort" => try_parse!(UnsignedShort),
        "unsignedByte" => try_parse!(UnsignedByte),
        "positiveInteger" => try_parse!(PositiveInteger),
        "yearMonthDuration" => try_parse!(YearMonthDuration),
        "dayTimeDuration" => try_parse!(DayTimeDuration),
        "error" => try_parse!(Error),
        // anySimpleType/anyAtomicType/anyType impose no lexical constraint of
        // their own; every string is in their lexical space.
        _ => Ok(()),
    }
}

/// Decimal-valued built-ins (the `decimal`/`integer` derivation subtrees) for
/// which `minInclusive`/`maxInclusive`/`minExclusive`/`maxExclusive`/
/// `totalDigits`/`fractionDigits` facet checks operate on a genuine numeric
/// ordering rather than lexical string comparison. Returns `None` for any type
/// this crate doesn't recognize as decimal-valued.
pub fn as_decimal(builtin_local_name: &str, lexical: &str) -> Option<decimal::Decimal> {
    match builtin_local_name {
        "decimal" | "integer" | "nonPositiveInteger" | "negativeInteger" | "long" | "int"
        | "short" | "byte" | "nonNegativeInteger" | "unsignedLong" | "unsignedInt"
        | "unsignedShort" | "unsignedByte" | "positiveInteger" => {
            decimal::Decimal::parse(lexical).ok()
        }
        _ => None,
    }
}

/// Computed-value equality for a built-in type, used to back fixed-value and
/// identity-constraint key-sequence comparison with something stronger than
/// whitespace-normalized lexical equality where this crate has the logic to
/// compute it. Returns `None` when the type isn't recognized (caller should
/// fall back to lexical string equality), `Some(bool)` otherwise.
pub fn values_equal(builtin_local_name: &str, a: &str, b: &str) -> Option<bool> {
    macro_rules! eq_via {
        ($ty:ty) => {
            Some(<$ty as SimpleType>::parse(a).ok() == <$ty as SimpleType>::parse(b).ok())
        };
    }
    match builtin_local_name {
        "decimal" => eq_via!(Decimal),
        "integer" | "nonPositiveInteger" | "negativeInteger" | "nonNegativeInteger"
        | "positiveInteger" => eq_via!(Integer),
        "long" => eq_via!(Long),
        "int" => eq_via!(Int),
        "short" => eq_via!(Short),
        "byte" => eq_via!(Byte),
        "unsignedLong" => eq_via!(UnsignedLong),
        "unsignedInt" => eq_via!(UnsignedInt),
        "unsignedShort" => eq_via!(UnsignedShort),
        "unsignedByte" => eq_via!(UnsignedByte),
        "boolean" => eq_via!(Boolean),
        "float" => eq_via!(Float),
        "double" => eq_via!(Double),
        "dateTime" | "dateTimeStamp" => eq_via!(DateTime),
        "date" => eq_via!(Date),
        "time" => eq_via!(Time),
        "gYearMonth" => eq_via!(GYearMonth),
        "gYear" => eq_via!(GYear),
        "gMonthDay" => eq_via!(GMonthDay),
        "gDay" => eq_via!(GDay),
        "gMonth" => eq_via!(GMonth),
        "hexBinary" => eq_via!(HexBinary),
        "base64Binary" => eq_via!(Base64Binary),
        "QName" => eq_via!(QName),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_family_ranges() {
        assert!(PositiveInteger::parse("0").is_err());
        assert!(PositiveInteger::parse("1").is_ok());
        assert!(NonPositiveInteger::parse("0").is_ok());
        assert!(NonPositiveInteger::parse("1").is_err());
        assert!(Byte::parse("200").is_err());
        assert!(Byte::parse("127").is_ok());
        assert!(UnsignedByte::parse("-1").is_err());
    }

    #[test]
    fn boolean_accepts_both_lexical_forms() {
        assert_eq!(Boolean::parse("true").unwrap().0, true);
        assert_eq!(Boolean::parse("1").unwrap().0, true);
        assert!(Boolean::parse("yes").is_err());
    }

    #[test]
    fn float_special_values() {
        assert!(Float::parse("INF").unwrap().0.is_infinite());
        assert!(Double::parse("NaN").unwrap().0.is_nan());
    }

    #[test]
    fn hex_binary_round_trips() {
        let v = HexBinary::parse("0FB7").unwrap();
        assert_eq!(v.0, vec![0x0f, 0xb7]);
        assert_eq!(v.canonical(), "0FB7");
    }

    #[test]
    fn base64_round_trips() {
        let v = Base64Binary::parse("aGVsbG8=").unwrap();
        assert_eq!(v.0, b"hello");
        assert_eq!(v.canonical(), "aGVsbG8=");
    }

    #[test]
    fn qname_splits_prefix() {
        let q = QName::parse("xs:string").unwrap();
        assert_eq!(q.prefix.as_deref(), Some("xs"));
        assert_eq!(q.local_name, "string");
        let q2 = QName::parse("string").unwrap();
        assert!(q2.prefix.is_none());
    }

    #[test]
    fn nmtokens_split_on_whitespace() {
        let v = NmTokens::parse("a b  c").unwrap();
        assert_eq!(v.0.len(), 3);
    }

    #[test]
    fn error_type_has_no_values() {
        assert!(Error::parse("anything").is_err());
    }
}
