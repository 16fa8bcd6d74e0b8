use serde::Deserialize;

use super::scalar::{TransportDecimal, TransportFlag, TransportInt};
use crate::domain::{Balance, FormatNumber, FormattedNumber, NumberType};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing {field}")]
    MissingField { field: &'static str },
}

pub const GET_BALANCE_ENDPOINT: &str = "get-balance";
pub const FORMAT_NUMBER_ENDPOINT: &str = "format-number";

#[derive(Debug, Clone, Deserialize)]
struct BalanceJsonResponse {
    #[serde(default)]
    balance: Option<TransportDecimal>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FormatNumberJsonResponse {
    #[serde(default)]
    number: Option<NumberJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct NumberJson {
    #[serde(default)]
    countrycode: Option<TransportInt>,
    #[serde(default)]
    nationalnumber: Option<TransportInt>,
    #[serde(default)]
    international: Option<TransportInt>,
    #[serde(default, rename = "type")]
    number_type: Option<TransportInt>,
    #[serde(default, rename = "isValid")]
    is_valid: Option<TransportFlag>,
}

pub fn decode_get_balance_json_response(json: &str) -> Result<Balance, TransportError> {
    let parsed: BalanceJsonResponse = serde_json::from_str(json)?;
    let balance = parsed
        .balance
        .ok_or(TransportError::MissingField { field: "balance" })?;

    Ok(Balance {
        balance: balance.into_string(),
        currency: parsed.currency,
    })
}

pub fn encode_format_number_form(request: &FormatNumber) -> Vec<(String, String)> {
    vec![
        ("msisdn".to_owned(), request.msisdn().as_str().to_owned()),
        (
            FormatNumber::COUNTRY_FIELD.to_owned(),
            request.country_code().to_owned(),
        ),
    ]
}

/// Decode `format-number`; the fields sit under `number`, or at the top level
/// on older API versions.
pub fn decode_format_number_json_response(json: &str) -> Result<FormattedNumber, TransportError> {
    let parsed: FormatNumberJsonResponse = serde_json::from_str(json)?;
    let number = match parsed.number {
        Some(number) => number,
        None => serde_json::from_str::<NumberJson>(json)?,
    };

    let text = |value: Option<TransportInt>| value.map(TransportInt::into_string).unwrap_or_default();

    let international = text(number.international);
    if international.is_empty() {
        return Err(TransportError::MissingField {
            field: "international",
        });
    }

    Ok(FormattedNumber {
        country_code: text(number.countrycode),
        national_number: text(number.nationalnumber),
        international,
        number_type: number
            .number_type
            .as_ref()
            .and_then(TransportInt::as_i64)
            .map_or(NumberType::Invalid, NumberType::from_code),
        is_valid: number.is_valid.as_ref().is_some_and(TransportFlag::as_bool),
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::Recipient;

    use super::*;

    #[test]
    fn decode_balance_keeps_decimal_token() {
        let json = r#"{"balance": 150.50, "currency": "AUD", "error": {"code": "SUCCESS"}}"#;
        let balance = decode_get_balance_json_response(json).unwrap();
        assert_eq!(balance.balance, "150.50");
        assert_eq!(balance.currency.as_deref(), Some("AUD"));

        assert!(matches!(
            decode_get_balance_json_response(r#"{"currency": "AUD"}"#),
            Err(TransportError::MissingField { field: "balance" })
        ));
    }

    #[test]
    fn encode_format_number() {
        let req = FormatNumber::new(Recipient::new("0400 000 000").unwrap(), "au").unwrap();
        assert_eq!(
            encode_format_number_form(&req),
            vec![
                ("msisdn".to_owned(), "0400000000".to_owned()),
                ("countrycode".to_owned(), "AU".to_owned()),
            ]
        );
    }

    #[test]
    fn decode_nested_number() {
        let json = r#"{"number": {"countrycode": 61, "nationalnumber": "400000000",
            "international": 61400000000, "type": 1, "isValid": true},
            "error": {"code": "SUCCESS", "description": "OK"}}"#;
        let number = decode_format_number_json_response(json).unwrap();
        assert_eq!(number.country_code, "61");
        assert_eq!(number.national_number, "400000000");
        assert_eq!(number.international, "61400000000");
        assert!(number.is_mobile());
        assert!(number.is_valid);
    }

    #[test]
    fn decode_top_level_number() {
        let json = r#"{"countrycode": "64", "nationalnumber": "212172782",
            "international": "64212172782", "type": 0, "isValid": 0}"#;
        let number = decode_format_number_json_response(json).unwrap();
        assert!(number.is_landline());
        assert!(!number.is_valid);
        assert!(decode_format_number_json_response("{}").is_err());
    }
}
