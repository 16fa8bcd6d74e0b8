use serde::Deserialize;
use serde::de::Error as DeError;
use serde_json::value::RawValue;

/// Decimal amount returned as either a JSON string or number.
///
/// Numbers keep their raw token, so `0.0700` stays `"0.0700"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDecimal(String);

impl TransportDecimal {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let parsed = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(parsed.trim().to_owned()))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(token.to_owned())),
            _ => Err(D::Error::custom(
                "expected decimal field to be JSON string or number",
            )),
        }
    }
}

/// Integer that may arrive quoted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportInt {
    Int(i64),
    String(String),
}

impl TransportInt {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::String(value) => value.trim().parse().ok(),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|value| u64::try_from(value).ok())
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_i64().and_then(|value| u32::try_from(value).ok())
    }

    /// Decimal rendering, preserving a quoted value as-is.
    pub fn into_string(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::String(value) => value.trim().to_owned(),
        }
    }
}

/// Boolean that may arrive as `true`, `1` or `"1"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransportFlag {
    Bool(bool),
    Int(i64),
    String(String),
}

impl TransportFlag {
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::String(value) => {
                let value = value.trim();
                !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
            }
        }
    }
}
