//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{Destination, FormatNumber, SEND_SMS_MAX_RECIPIENTS, SendOptions, SendSms};
pub use response::{Balance, FormattedNumber, ListSummary, NumberType, RateLimitInfo, SmsSent};
pub use validation::{ValidationError, ValidationKind};
pub use value::{
    ApiKey, ApiSecret, CallbackUrl, EmailAddress, ErrorCode, KnownErrorCode, ListId, MessageId,
    MessageText, PhoneNumber, Recipient, SendAt, SenderId, TrackedLinkUrl, ValidityMinutes,
};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::callback::{CallbackType, CallbackUrlBuilder, SigningKey};

    use super::*;

    fn recipient() -> Recipient {
        Recipient::new("61400000000").unwrap()
    }

    #[test]
    fn send_sms_requires_recipients() {
        let msg = MessageText::new("hi").unwrap();
        let err = SendSms::to_many(Vec::new(), msg, SendOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Empty {
                field: Recipient::FIELD
            }
        ));
    }

    #[test]
    fn send_sms_recipient_limit_is_enforced() {
        let msg = MessageText::new("hi").unwrap();

        let at_cap = vec![recipient(); SEND_SMS_MAX_RECIPIENTS];
        assert!(SendSms::to_many(at_cap, msg.clone(), SendOptions::default()).is_ok());

        let over_cap = vec![recipient(); SEND_SMS_MAX_RECIPIENTS + 1];
        let err = SendSms::to_many(over_cap, msg, SendOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManyRecipients {
                max: 500,
                actual: 501
            }
        );
    }

    #[test]
    fn to_list_targets_list() {
        let msg = MessageText::new("hi").unwrap();
        let req = SendSms::to_list(ListId::new(42), msg, SendOptions::default());
        assert_eq!(req.destination(), &Destination::List(ListId::new(42)));
    }

    #[test]
    fn signed_callback_is_attached_to_matching_slot() {
        let builder = CallbackUrlBuilder::new(
            "https://app.example.com/webhooks/transmitsms",
            SigningKey::new("secret").unwrap(),
        );
        let options = SendOptions::default()
            .with_signed_callback(
                &builder,
                CallbackType::Reply,
                Some("orders"),
                &json!({"order_id": 7}),
            )
            .unwrap();

        let url = options.callback(CallbackType::Reply).unwrap().as_str();
        assert!(url.starts_with("https://app.example.com/webhooks/transmitsms/reply?h="));
        assert!(options.callback(CallbackType::Dlr).is_none());
        assert!(options.callback(CallbackType::LinkHits).is_none());
    }

    #[test]
    fn format_number_normalizes_country() {
        let req = FormatNumber::new(Recipient::new("0400000000").unwrap(), " au ").unwrap();
        assert_eq!(req.country_code(), "AU");
        assert!(FormatNumber::new(recipient(), " ").is_err());
    }

    #[test]
    fn validation_kinds_map_to_api_codes() {
        let err = ApiKey::new("").unwrap_err();
        assert_eq!(err.kind(), ValidationKind::FieldEmpty);
        assert_eq!(err.code(), "FIELD_EMPTY");
    }
}
