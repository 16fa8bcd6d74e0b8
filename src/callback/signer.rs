//! Signed callback URLs.
//!
//! A callback URL carries an optional handler name (`h`) and a JSON context
//! object (`c`), both base64url-encoded without padding, plus `s`: the lowercase
//! hex HMAC-SHA256 of the encoded `h` followed by the encoded `c`. A URL with
//! neither `h` nor `c` is unsigned and only triggers events.

use std::collections::HashMap;
use std::fmt;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::callback::CallbackType;
use crate::domain::ValidationError;

type HmacSha256 = Hmac<Sha256>;

/// Decoded callback context: a JSON object in insertion order.
pub type CallbackContext = serde_json::Map<String, Value>;

const HANDLER_PARAM: &str = "h";
const CONTEXT_PARAM: &str = "c";
const SIGNATURE_PARAM: &str = "s";

/// base64url that accepts input with or without `=` padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone)]
/// HMAC key shared by the URL builder and the webhook parser.
pub struct SigningKey {
    mac: HmacSha256,
}

impl SigningKey {
    pub const FIELD: &'static str = "signing_key";

    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, ValidationError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|_| ValidationError::Empty { field: Self::FIELD })?;
        Ok(Self { mac })
    }

    /// Lowercase hex HMAC-SHA256 over `handler ++ context`.
    fn sign(&self, handler: &str, context: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(handler.as_bytes());
        mac.update(context.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

#[derive(Debug, thiserror::Error)]
/// Failure while building a callback URL.
pub enum CallbackError {
    #[error("failed to encode callback context: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("callback context must serialize to a JSON object")]
    ContextNotObject,

    #[error("invalid callback URL: {0}")]
    InvalidUrl(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
/// A callback URL failed verification. Webhook receivers answer 403.
pub enum InvalidSignature {
    #[error("Missing callback signature")]
    Missing,

    #[error("Invalid callback signature")]
    Mismatch,

    #[error("Invalid callback context: malformed JSON")]
    MalformedContext,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Verified contents of a callback URL.
pub struct ParsedCallback {
    pub handler: Option<String>,
    pub context: CallbackContext,
}

#[derive(Debug, Clone)]
/// Builds callback URLs under a base URL, signing any handler or context.
pub struct CallbackUrlBuilder {
    base_url: String,
    key: SigningKey,
}

impl CallbackUrlBuilder {
    pub fn new(base_url: impl Into<String>, key: SigningKey) -> Self {
        Self {
            base_url: base_url.into(),
            key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same key, different base URL.
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            key: self.key.clone(),
        }
    }

    /// Build the URL for `kind`.
    ///
    /// `context` must serialize to a JSON object; `null` or `{}` count as no
    /// context. Without a handler and context the URL is returned unsigned.
    pub fn build<C: Serialize + ?Sized>(
        &self,
        kind: CallbackType,
        handler: Option<&str>,
        context: &C,
    ) -> Result<String, CallbackError> {
        let path = format!("{}/{}", self.base_url.trim_end_matches('/'), kind.path());

        let context = match serde_json::to_value(context)? {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => Some(Value::Object(map)),
            _ => return Err(CallbackError::ContextNotObject),
        };

        if handler.is_none() && context.is_none() {
            return Ok(path);
        }

        let encoded_handler = handler.map(|handler| URL_SAFE_NO_PAD.encode(handler.as_bytes()));
        let encoded_context = context
            .map(|context| serde_json::to_string(&context))
            .transpose()?
            .map(|json| URL_SAFE_NO_PAD.encode(json.as_bytes()));

        let signature = self.key.sign(
            encoded_handler.as_deref().unwrap_or_default(),
            encoded_context.as_deref().unwrap_or_default(),
        );

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(h) = encoded_handler.as_deref() {
            query.append_pair(HANDLER_PARAM, h);
        }
        if let Some(c) = encoded_context.as_deref() {
            query.append_pair(CONTEXT_PARAM, c);
        }
        query.append_pair(SIGNATURE_PARAM, &signature);

        Ok(format!("{path}?{}", query.finish()))
    }

    pub fn dlr<C: Serialize + ?Sized>(
        &self,
        handler: Option<&str>,
        context: &C,
    ) -> Result<String, CallbackError> {
        self.build(CallbackType::Dlr, handler, context)
    }

    pub fn reply<C: Serialize + ?Sized>(
        &self,
        handler: Option<&str>,
        context: &C,
    ) -> Result<String, CallbackError> {
        self.build(CallbackType::Reply, handler, context)
    }

    pub fn link_hits<C: Serialize + ?Sized>(
        &self,
        handler: Option<&str>,
        context: &C,
    ) -> Result<String, CallbackError> {
        self.build(CallbackType::LinkHits, handler, context)
    }
}

#[derive(Debug, Clone)]
/// Verifies and decodes the query of an incoming callback.
pub struct CallbackUrlParser {
    key: SigningKey,
}

impl CallbackUrlParser {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Verify and decode `h`/`c`/`s` from already-decoded query parameters.
    pub fn parse(&self, query: &HashMap<String, String>) -> Result<ParsedCallback, InvalidSignature> {
        self.parse_parts(
            query.get(HANDLER_PARAM).map(String::as_str),
            query.get(CONTEXT_PARAM).map(String::as_str),
            query.get(SIGNATURE_PARAM).map(String::as_str),
        )
    }

    /// Like [`CallbackUrlParser::parse`], taking a raw query string (no leading `?`).
    pub fn parse_query_str(&self, query: &str) -> Result<ParsedCallback, InvalidSignature> {
        let params = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>();
        self.parse(&params)
    }

    /// Constant-time check of `signature` against the encoded handler and context.
    pub fn verify(&self, handler: &str, context: &str, signature: &str) -> bool {
        let expected = self.key.sign(handler, context);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    fn parse_parts(
        &self,
        handler: Option<&str>,
        context: Option<&str>,
        signature: Option<&str>,
    ) -> Result<ParsedCallback, InvalidSignature> {
        if handler.is_none() && context.is_none() {
            return Ok(ParsedCallback::default());
        }

        let signature = signature.ok_or(InvalidSignature::Missing)?;
        if !self.verify(
            handler.unwrap_or_default(),
            context.unwrap_or_default(),
            signature,
        ) {
            return Err(InvalidSignature::Mismatch);
        }

        let context = match context.map(decode).filter(|json| !json.is_empty()) {
            Some(json) => match serde_json::from_str::<Value>(&json) {
                Ok(Value::Object(map)) => map,
                _ => return Err(InvalidSignature::MalformedContext),
            },
            None => CallbackContext::new(),
        };

        let handler = handler.map(decode);

        Ok(ParsedCallback { handler, context })
    }
}

/// Lenient base64url decode; anything undecodable becomes an empty string.
fn decode(data: &str) -> String {
    URL_SAFE_LENIENT
        .decode(data)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://app.example.com/webhooks/transmitsms/";

    fn key() -> SigningKey {
        SigningKey::new("test-signing-key").unwrap()
    }

    fn builder() -> CallbackUrlBuilder {
        CallbackUrlBuilder::new(BASE, key())
    }

    fn parser() -> CallbackUrlParser {
        CallbackUrlParser::new(key())
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        let parsed = url::Url::parse(url).unwrap();
        parsed.query_pairs().into_owned().collect()
    }

    #[test]
    fn round_trip_handler_and_context() {
        let context = json!({"order_id": 123, "customer": "Jane", "tags": ["a", "b"]});
        let url = builder()
            .build(CallbackType::Dlr, Some("OrderHandler"), &context)
            .unwrap();
        assert!(url.starts_with("https://app.example.com/webhooks/transmitsms/dlr?h="));

        let parsed = parser().parse(&query_of(&url)).unwrap();
        assert_eq!(parsed.handler.as_deref(), Some("OrderHandler"));
        assert_eq!(Value::Object(parsed.context), context);
    }

    #[test]
    fn query_params_are_ordered_h_c_s() {
        let url = builder()
            .reply(Some("h1"), &json!({"k": "v"}))
            .unwrap();
        let query = url.split_once('?').unwrap().1;
        let keys = query
            .split('&')
            .map(|pair| pair.split_once('=').unwrap().0)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["h", "c", "s"]);
    }

    #[test]
    fn encoded_values_have_no_padding() {
        let url = builder().dlr(Some("ab"), &()).unwrap();
        let query = query_of(&url);
        assert_eq!(query["h"], "YWI");
        assert!(!query.contains_key("c"));
        assert_eq!(query["s"].len(), 64);
        assert!(query["s"].bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn context_only_round_trip() {
        let url = builder()
            .link_hits(None, &json!({"campaign": "spring"}))
            .unwrap();
        let query = query_of(&url);
        assert!(!query.contains_key("h"));

        let parsed = parser().parse(&query).unwrap();
        assert_eq!(parsed.handler, None);
        assert_eq!(parsed.context["campaign"], "spring");
    }

    #[test]
    fn events_only_url_is_unsigned() {
        let url = builder().build(CallbackType::LinkHits, None, &json!({})).unwrap();
        assert_eq!(url, "https://app.example.com/webhooks/transmitsms/link-hits");

        let url = builder().dlr(None, &()).unwrap();
        assert_eq!(url, "https://app.example.com/webhooks/transmitsms/dlr");

        let parsed = parser().parse(&HashMap::new()).unwrap();
        assert_eq!(parsed, ParsedCallback::default());
    }

    #[test]
    fn building_is_deterministic() {
        let context = json!({"b": 1, "a": 2});
        let first = builder().dlr(Some("x"), &context).unwrap();
        let second = builder().dlr(Some("x"), &context).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn context_keeps_insertion_order() {
        let mut context = CallbackContext::new();
        context.insert("zeta".to_owned(), json!(1));
        context.insert("alpha".to_owned(), json!(2));
        let url = builder().dlr(None, &context).unwrap();

        let parsed = parser().parse(&query_of(&url)).unwrap();
        let keys = parsed.context.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn non_object_context_is_rejected() {
        let err = builder().dlr(Some("x"), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, CallbackError::ContextNotObject));
        let err = builder().dlr(None, &"text").unwrap_err();
        assert!(matches!(err, CallbackError::ContextNotObject));
    }

    #[test]
    fn typed_context_serializes_as_object() {
        #[derive(Serialize)]
        struct Order {
            order_id: u64,
        }

        let url = builder().dlr(None, &Order { order_id: 9 }).unwrap();
        let parsed = parser().parse(&query_of(&url)).unwrap();
        assert_eq!(parsed.context["order_id"], 9);
    }

    #[test]
    fn missing_signature_is_rejected() {
        let url = builder().dlr(Some("x"), &()).unwrap();
        let mut query = query_of(&url);
        query.remove("s");
        let err = parser().parse(&query).unwrap_err();
        assert_eq!(err, InvalidSignature::Missing);
        assert_eq!(err.to_string(), "Missing callback signature");
    }

    #[test]
    fn any_tampering_is_detected() {
        let url = builder()
            .dlr(Some("OrderHandler"), &json!({"order_id": 1}))
            .unwrap();
        let original = query_of(&url);

        for param in ["h", "c", "s"] {
            let value = original[param].clone();
            for idx in 0..value.len() {
                let mut bytes = value.clone().into_bytes();
                bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
                let mut query = original.clone();
                query.insert(param.to_owned(), String::from_utf8(bytes).unwrap());

                let err = parser().parse(&query).unwrap_err();
                assert_eq!(err, InvalidSignature::Mismatch, "{param}[{idx}]");
            }
        }
    }

    #[test]
    fn wrong_key_is_rejected() {
        let url = builder().dlr(Some("x"), &()).unwrap();
        let other = CallbackUrlParser::new(SigningKey::new("other").unwrap());
        let err = other.parse(&query_of(&url)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid callback signature");
    }

    #[test]
    fn malformed_context_is_rejected_after_verification() {
        let c = URL_SAFE_NO_PAD.encode("{not json");
        let s = key().sign("", &c);
        let query = HashMap::from([("c".to_owned(), c), ("s".to_owned(), s)]);
        assert_eq!(
            parser().parse(&query).unwrap_err(),
            InvalidSignature::MalformedContext
        );

        let c = URL_SAFE_NO_PAD.encode("[1,2]");
        let s = key().sign("", &c);
        let query = HashMap::from([("c".to_owned(), c), ("s".to_owned(), s)]);
        assert_eq!(
            parser().parse(&query).unwrap_err(),
            InvalidSignature::MalformedContext
        );
    }

    #[test]
    fn undecodable_handler_becomes_empty() {
        let h = "!!!".to_owned();
        let s = key().sign(&h, "");
        let query = HashMap::from([("h".to_owned(), h), ("s".to_owned(), s)]);
        let parsed = parser().parse(&query).unwrap();
        assert_eq!(parsed.handler.as_deref(), Some(""));
        assert!(parsed.context.is_empty());
    }

    #[test]
    fn empty_handler_round_trips() {
        let url = builder().dlr(Some(""), &json!({})).unwrap();
        assert!(url.contains("?h=&s="));

        let parsed = parser().parse(&query_of(&url)).unwrap();
        assert_eq!(parsed.handler.as_deref(), Some(""));
        assert!(parsed.context.is_empty());
    }

    #[test]
    fn padded_values_are_accepted() {
        let h = "YWI=".to_owned();
        let s = key().sign(&h, "");
        let query = HashMap::from([("h".to_owned(), h), ("s".to_owned(), s)]);
        assert_eq!(parser().parse(&query).unwrap().handler.as_deref(), Some("ab"));
    }

    #[test]
    fn parse_query_str_decodes_percent_encoding() {
        let url = builder().reply(Some("a b"), &json!({"x": "y z"})).unwrap();
        let query = url.split_once('?').unwrap().1;
        let parsed = parser().parse_query_str(query).unwrap();
        assert_eq!(parsed.handler.as_deref(), Some("a b"));
        assert_eq!(parsed.context["x"], "y z");
    }

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let other = builder().with_base_url("https://hooks.example.com//");
        assert_eq!(other.base_url(), "https://hooks.example.com//");
        assert_eq!(
            other.dlr(None, &()).unwrap(),
            "https://hooks.example.com/dlr"
        );
    }

    #[test]
    fn signing_key_is_redacted_and_non_empty() {
        assert_eq!(format!("{:?}", key()), "SigningKey(***)");
        assert!(SigningKey::new("").is_err());
    }
}
