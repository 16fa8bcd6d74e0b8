//! Transport layer: HTTP and wire-format details (serialization/deserialization).

mod account;
mod envelope;
mod rate_limit;
mod scalar;
mod send_sms;

pub use account::{
    FORMAT_NUMBER_ENDPOINT, GET_BALANCE_ENDPOINT, decode_format_number_json_response,
    decode_get_balance_json_response, encode_format_number_form,
};
pub use envelope::{ApiFailure, decode_api_failure};
pub use rate_limit::decode_rate_limit_headers;
pub use send_sms::{SEND_SMS_ENDPOINT, decode_send_sms_json_response, encode_send_sms_form};
