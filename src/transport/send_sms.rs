use chrono::NaiveDateTime;
use serde::Deserialize;

use super::scalar::{TransportDecimal, TransportInt};
use crate::callback::CallbackType;
use crate::domain::{
    Destination, EmailAddress, ListId, ListSummary, MessageId, MessageText, Recipient, SendAt,
    SendSms, SenderId, SmsSent, TrackedLinkUrl, ValidityMinutes,
};
use crate::support::{InvalidArgument, phone};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing {field}")]
    MissingField { field: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
struct SendSmsJsonResponse {
    #[serde(default)]
    message_id: Option<TransportInt>,
    #[serde(default)]
    send_at: Option<String>,
    #[serde(default)]
    recipients: Option<TransportInt>,
    #[serde(default)]
    cost: Option<TransportDecimal>,
    #[serde(default)]
    sms: Option<TransportInt>,
    #[serde(default)]
    list: Option<ListJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListJson {
    id: TransportInt,
    #[serde(default)]
    name: Option<String>,
}

pub const SEND_SMS_ENDPOINT: &str = "send-sms";

/// Form body for `send-sms`.
///
/// With `format_numbers` and a country code, recipients and a phone-number sender
/// are converted to E.164 here and `countrycode` is not sent.
pub fn encode_send_sms_form(request: &SendSms) -> Result<Vec<(String, String)>, InvalidArgument> {
    let options = request.options();
    let local_country = options
        .country_code
        .as_deref()
        .filter(|_| options.format_numbers);

    let mut params = vec![(
        MessageText::FIELD.to_owned(),
        request.message().as_str().to_owned(),
    )];

    match request.destination() {
        Destination::Recipients(recipients) => {
            let to = recipients
                .iter()
                .map(Recipient::as_str)
                .collect::<Vec<_>>()
                .join(",");
            let to = match local_country {
                Some(country) => phone::format_multiple(&to, Some(country))?,
                None => to,
            };
            params.push((Recipient::FIELD.to_owned(), to));
        }
        Destination::List(list_id) => {
            params.push((ListId::FIELD.to_owned(), list_id.value().to_string()));
        }
    }

    if let Some(from) = options.from.as_ref() {
        let from = match local_country {
            Some(country) => phone::format_sender_id(from.as_str(), Some(country))?,
            None => from.as_str().to_owned(),
        };
        params.push((SenderId::FIELD.to_owned(), from));
    }
    if let (Some(country), None) = (options.country_code.as_deref(), local_country) {
        params.push(("countrycode".to_owned(), country.to_owned()));
    }
    if let Some(send_at) = options.send_at {
        params.push((SendAt::FIELD.to_owned(), send_at.to_wire()));
    }
    if let Some(validity) = options.validity {
        params.push((ValidityMinutes::FIELD.to_owned(), validity.value().to_string()));
    }
    if let Some(email) = options.replies_to_email.as_ref() {
        params.push((EmailAddress::FIELD.to_owned(), email.as_str().to_owned()));
    }
    if let Some(url) = options.tracked_link_url.as_ref() {
        params.push((TrackedLinkUrl::FIELD.to_owned(), url.as_str().to_owned()));
    }
    for kind in CallbackType::ALL {
        if let Some(url) = options.callback(kind) {
            params.push((kind.field().to_owned(), url.as_str().to_owned()));
        }
    }

    Ok(params)
}

pub fn decode_send_sms_json_response(json: &str) -> Result<SmsSent, TransportError> {
    let parsed: SendSmsJsonResponse = serde_json::from_str(json)?;

    let message_id = parsed
        .message_id
        .as_ref()
        .and_then(TransportInt::as_u64)
        .ok_or(TransportError::MissingField {
            field: MessageId::FIELD,
        })?;

    Ok(SmsSent {
        message_id: MessageId::new(message_id),
        send_at: parsed.send_at.as_deref().and_then(parse_timestamp),
        recipients: count(parsed.recipients.as_ref()),
        cost: parsed.cost.map(TransportDecimal::into_string),
        sms: count(parsed.sms.as_ref()),
        list: parsed.list.and_then(|list| {
            Some(ListSummary {
                id: ListId::new(list.id.as_u64()?),
                name: list.name,
            })
        }),
    })
}

fn count(value: Option<&TransportInt>) -> u32 {
    value.and_then(TransportInt::as_u32).unwrap_or_default()
}

/// `YYYY-MM-DD HH:MM:SS`, as the API writes timestamps.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::callback::{CallbackUrlBuilder, SigningKey};
    use crate::domain::{CallbackUrl, SendOptions};

    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn encode_recipients_with_all_options() {
        let options = SendOptions {
            from: Some(SenderId::new("MyBrand").unwrap()),
            country_code: Some("AU".to_owned()),
            send_at: SendAt::from_unix(1_700_000_000),
            validity: Some(ValidityMinutes::new(60).unwrap()),
            replies_to_email: Some(EmailAddress::new("ops@example.com").unwrap()),
            tracked_link_url: Some(TrackedLinkUrl::new("https://example.com/p").unwrap()),
            link_hits_callback: Some(CallbackUrl::new("https://hooks.example.com/l").unwrap()),
            dlr_callback: Some(CallbackUrl::new("https://hooks.example.com/d").unwrap()),
            ..Default::default()
        };
        let recipients = vec![
            Recipient::new("0400000000").unwrap(),
            Recipient::new("61400000001").unwrap(),
        ];
        let req =
            SendSms::to_many(recipients, MessageText::new("hello").unwrap(), options).unwrap();
        let params = encode_send_sms_form(&req).unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("message", "hello"),
                ("to", "0400000000,61400000001"),
                ("from", "MyBrand"),
                ("countrycode", "AU"),
                ("send_at", "2023-11-14 22:13:20"),
                ("validity", "60"),
                ("replies_to_email", "ops@example.com"),
                ("tracked_link_url", "https://example.com/p"),
                ("dlr_callback", "https://hooks.example.com/d"),
                ("link_hits_callback", "https://hooks.example.com/l"),
            ]
        );
    }

    #[test]
    fn encode_formats_locally_when_requested() {
        let options = SendOptions {
            from: Some(SenderId::new("0400 111 222").unwrap()),
            country_code: Some("AU".to_owned()),
            format_numbers: true,
            ..Default::default()
        };
        let recipients = vec![Recipient::new("0400000000").unwrap()];
        let req = SendSms::to_many(recipients, MessageText::new("hi").unwrap(), options).unwrap();
        let params = encode_send_sms_form(&req).unwrap();

        assert_eq!(
            pairs(&params),
            vec![
                ("message", "hi"),
                ("to", "61400000000"),
                ("from", "61400111222"),
            ]
        );
    }

    #[test]
    fn encode_local_formatting_rejects_unknown_country() {
        let options = SendOptions {
            country_code: Some("XX".to_owned()),
            format_numbers: true,
            ..Default::default()
        };
        let recipients = vec![Recipient::new("0400000000").unwrap()];
        let req = SendSms::to_many(recipients, MessageText::new("hi").unwrap(), options).unwrap();
        assert!(matches!(
            encode_send_sms_form(&req),
            Err(InvalidArgument::UnknownCountry { .. })
        ));
    }

    #[test]
    fn encode_list_with_signed_callback() {
        let builder = CallbackUrlBuilder::new(
            "https://hooks.example.com",
            SigningKey::new("k").unwrap(),
        );
        let options = SendOptions::default()
            .with_signed_callback(&builder, CallbackType::Dlr, Some("orders"), &())
            .unwrap();
        let req = SendSms::to_list(ListId::new(77), MessageText::new("hi").unwrap(), options);
        let params = encode_send_sms_form(&req).unwrap();

        assert_eq!(params[1], ("list_id".to_owned(), "77".to_owned()));
        assert_eq!(params[2].0, "dlr_callback");
        assert!(params[2].1.starts_with("https://hooks.example.com/dlr?h="));
    }

    #[test]
    fn decode_sms_sent() {
        let json = r#"
        {
          "message_id": 12345,
          "send_at": "2024-05-01 10:30:00",
          "recipients": 2,
          "cost": 0.1400,
          "sms": 1,
          "list": {"id": "77", "name": "VIP"},
          "error": {"code": "SUCCESS", "description": "OK"}
        }
        "#;
        let sent = decode_send_sms_json_response(json).unwrap();
        assert_eq!(sent.message_id, MessageId::new(12345));
        assert_eq!(
            sent.send_at,
            NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(10, 30, 0))
        );
        assert_eq!(sent.recipients, 2);
        assert_eq!(sent.cost.as_deref(), Some("0.1400"));
        assert_eq!(sent.sms, 1);
        let list = sent.list.unwrap();
        assert_eq!(list.id, ListId::new(77));
        assert_eq!(list.name.as_deref(), Some("VIP"));
    }

    #[test]
    fn decode_requires_message_id() {
        let err = decode_send_sms_json_response(r#"{"recipients": 1}"#).unwrap_err();
        assert!(matches!(err, TransportError::MissingField { field: "message_id" }));
        assert!(matches!(
            decode_send_sms_json_response("nope"),
            Err(TransportError::Json(_))
        ));
    }
}
