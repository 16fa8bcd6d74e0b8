use serde::Serialize;

use crate::callback::{CallbackError, CallbackType, CallbackUrlBuilder};
use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CallbackUrl, EmailAddress, ListId, MessageText, Recipient, SendAt, SenderId, TrackedLinkUrl,
    ValidityMinutes,
};
use crate::support::MAX_RECIPIENTS;

pub const SEND_SMS_MAX_RECIPIENTS: usize = MAX_RECIPIENTS;

#[derive(Debug, Clone, Default)]
/// Optional `send-sms` parameters.
pub struct SendOptions {
    /// Sender id; falls back to the client's default sender.
    pub from: Option<SenderId>,
    /// Country used to format local recipients (`countrycode`).
    pub country_code: Option<String>,
    /// Format recipients and a phone-number sender locally instead of sending
    /// `countrycode`. Only applies when a country code is set.
    pub format_numbers: bool,
    pub send_at: Option<SendAt>,
    pub validity: Option<ValidityMinutes>,
    pub replies_to_email: Option<EmailAddress>,
    pub tracked_link_url: Option<TrackedLinkUrl>,
    pub dlr_callback: Option<CallbackUrl>,
    pub reply_callback: Option<CallbackUrl>,
    pub link_hits_callback: Option<CallbackUrl>,
}

impl SendOptions {
    pub fn callback(&self, kind: CallbackType) -> Option<&CallbackUrl> {
        match kind {
            CallbackType::Dlr => self.dlr_callback.as_ref(),
            CallbackType::Reply => self.reply_callback.as_ref(),
            CallbackType::LinkHits => self.link_hits_callback.as_ref(),
        }
    }

    pub fn set_callback(&mut self, kind: CallbackType, url: CallbackUrl) {
        let slot = match kind {
            CallbackType::Dlr => &mut self.dlr_callback,
            CallbackType::Reply => &mut self.reply_callback,
            CallbackType::LinkHits => &mut self.link_hits_callback,
        };
        *slot = Some(url);
    }

    /// Attach a signed callback URL for `kind`, carrying `handler` and `context`.
    pub fn with_signed_callback<C: Serialize + ?Sized>(
        mut self,
        builder: &CallbackUrlBuilder,
        kind: CallbackType,
        handler: Option<&str>,
        context: &C,
    ) -> Result<Self, CallbackError> {
        let url = builder.build(kind, handler, context)?;
        self.set_callback(kind, CallbackUrl::new(url)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Who receives the message.
pub enum Destination {
    Recipients(Vec<Recipient>),
    List(ListId),
}

#[derive(Debug, Clone)]
/// A validated `send-sms` request.
pub struct SendSms {
    destination: Destination,
    message: MessageText,
    options: SendOptions,
}

impl SendSms {
    /// Send to explicit recipients (1..=500).
    pub fn to_many(
        recipients: Vec<Recipient>,
        message: MessageText,
        options: SendOptions,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: Recipient::FIELD,
            });
        }
        if recipients.len() > SEND_SMS_MAX_RECIPIENTS {
            return Err(ValidationError::TooManyRecipients {
                max: SEND_SMS_MAX_RECIPIENTS,
                actual: recipients.len(),
            });
        }
        Ok(Self {
            destination: Destination::Recipients(recipients),
            message,
            options,
        })
    }

    /// Send to every member of a contact list.
    pub fn to_list(list_id: ListId, message: MessageText, options: SendOptions) -> Self {
        Self {
            destination: Destination::List(list_id),
            message,
            options,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut SendOptions {
        &mut self.options
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A `format-number` request.
pub struct FormatNumber {
    msisdn: Recipient,
    country_code: String,
}

impl FormatNumber {
    pub const COUNTRY_FIELD: &'static str = "countrycode";

    pub fn new(msisdn: Recipient, country_code: impl Into<String>) -> Result<Self, ValidationError> {
        let country_code = country_code.into().trim().to_ascii_uppercase();
        if country_code.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::COUNTRY_FIELD,
            });
        }
        Ok(Self {
            msisdn,
            country_code,
        })
    }

    pub fn msisdn(&self) -> &Recipient {
        &self.msisdn
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }
}
