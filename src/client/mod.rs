//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod retry;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::callback::CallbackError;
use crate::domain::{
    ApiKey, ApiSecret, Balance, ErrorCode, FormatNumber, FormattedNumber, KnownErrorCode,
    RateLimitInfo, SendSms, SenderId, SmsSent, ValidationError,
};
use crate::support::InvalidArgument;

pub use retry::RetryPolicy;

/// SMS API base URL.
pub const BASE_URL_SMS: &str = "https://api.transmitsms.com";
/// MMS API base URL.
pub const BASE_URL_MMS: &str = "https://api.transmitmessage.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
struct HttpRequest<'a> {
    method: Method,
    url: &'a str,
    credentials: &'a Credentials,
    params: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest<'a>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let builder = match request.method {
                Method::Get => self.client.get(request.url).query(&request.params),
                Method::Post => self.client.post(request.url).form(&request.params),
            };
            let response = builder
                .basic_auth(
                    request.credentials.api_key.as_str(),
                    Some(request.credentials.api_secret.as_str()),
                )
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_owned(), value.to_owned()))
                })
                .collect();
            let body = response.text().await?;
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[derive(Debug, Clone)]
/// API key and secret, sent with HTTP basic auth.
pub struct Credentials {
    api_key: ApiKey,
    api_secret: ApiSecret,
}

impl Credentials {
    /// Validate that both parts are non-empty.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            api_secret: ApiSecret::new(api_secret)?,
        })
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub fn api_secret(&self) -> &ApiSecret {
        &self.api_secret
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`TransmitSmsClient`].
///
/// This error preserves:
/// - HTTP-level failures (transport failures, non-2xx status without an API envelope),
/// - API-level failures (an `error.code` other than `SUCCESS`),
/// - validation/parse failures.
pub enum TransmitSmsError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status without a TransmitSMS error envelope.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// TransmitSMS reported an error.
    #[error("API error ({}): {message}", .code.as_ref().map_or("unknown", ErrorCode::as_str))]
    Api {
        code: Option<ErrorCode>,
        kind: Option<KnownErrorCode>,
        message: String,
        status: u16,
    },

    /// HTTP 429 or `OVER_LIMIT`.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        status: u16,
        rate_limit: RateLimitInfo,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local phone-number formatting failed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// A callback URL could not be built.
    #[error("callback error: {0}")]
    Callback(#[from] CallbackError),
}

impl TransmitSmsError {
    /// Whether retrying the same request may succeed: transport failures, 429 and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited { .. } => true,
            Self::HttpStatus { status, .. } | Self::Api { status, .. } => {
                *status == 429 || (500..=599).contains(status)
            }
            _ => false,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. }
            | Self::Api { status, .. }
            | Self::RateLimited { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Known family of the API error code.
    pub fn kind(&self) -> Option<KnownErrorCode> {
        match self {
            Self::Api { kind, .. } => *kind,
            Self::RateLimited { .. } => Some(KnownErrorCode::RateLimit),
            _ => None,
        }
    }

    /// Server-requested wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { rate_limit, .. } => rate_limit
                .effective_retry_after(chrono::Utc::now().timestamp())
                .map(Duration::from_secs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`TransmitSmsClient`].
///
/// Use this when you need to customize the base URL, timeout, user-agent,
/// defaults or retries.
pub struct TransmitSmsClientBuilder {
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
    default_from: Option<SenderId>,
    default_country_code: Option<String>,
    retry: RetryPolicy,
}

impl TransmitSmsClientBuilder {
    /// Create a builder with the SMS base URL, a 30 second timeout and no retries.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: BASE_URL_SMS.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            default_from: None,
            default_country_code: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use [`BASE_URL_SMS`].
    pub fn sms(self) -> Self {
        self.base_url(BASE_URL_SMS)
    }

    /// Use [`BASE_URL_MMS`].
    pub fn mms(self) -> Self {
        self.base_url(BASE_URL_MMS)
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sender used when a request has none.
    pub fn default_from(mut self, from: SenderId) -> Self {
        self.default_from = Some(from);
        self
    }

    /// Country code used when a request has none.
    pub fn default_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.default_country_code = Some(country_code.into());
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Build a [`TransmitSmsClient`].
    pub fn build(self) -> Result<TransmitSmsClient, TransmitSmsError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| TransmitSmsError::Transport(Box::new(err)))?;

        Ok(TransmitSmsClient {
            credentials: self.credentials,
            base_url: self.base_url,
            default_from: self.default_from,
            default_country_code: self.default_country_code,
            retry: self.retry,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level TransmitSMS client.
///
/// This type applies request defaults, encodes forms, retries per its
/// [`RetryPolicy`] and maps the API error envelope to [`TransmitSmsError`].
pub struct TransmitSmsClient {
    credentials: Credentials,
    base_url: String,
    default_from: Option<SenderId>,
    default_country_code: Option<String>,
    retry: RetryPolicy,
    http: Arc<dyn HttpTransport>,
}

impl TransmitSmsClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`TransmitSmsClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, TransmitSmsError> {
        Self::builder(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> TransmitSmsClientBuilder {
        TransmitSmsClientBuilder::new(credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_from(&self) -> Option<&SenderId> {
        self.default_from.as_ref()
    }

    pub fn default_country_code(&self) -> Option<&str> {
        self.default_country_code.as_deref()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send an SMS.
    ///
    /// The client's default sender and country code fill in unset options.
    ///
    /// Errors:
    /// - [`TransmitSmsError::InvalidArgument`] when local number formatting fails,
    /// - [`TransmitSmsError::Api`] / [`TransmitSmsError::RateLimited`] for API errors,
    /// - [`TransmitSmsError::HttpStatus`] for other non-2xx responses.
    pub async fn send_sms(&self, mut request: SendSms) -> Result<SmsSent, TransmitSmsError> {
        let options = request.options_mut();
        if options.from.is_none() {
            options.from = self.default_from.clone();
        }
        if options.country_code.is_none() {
            options.country_code = self.default_country_code.clone();
        }

        let params = crate::transport::encode_send_sms_form(&request)?;
        let body = self
            .execute(Method::Post, crate::transport::SEND_SMS_ENDPOINT, params)
            .await?;

        crate::transport::decode_send_sms_json_response(&body)
            .map_err(|err| TransmitSmsError::Parse(Box::new(err)))
    }

    /// Fetch the account balance.
    pub async fn get_balance(&self) -> Result<Balance, TransmitSmsError> {
        let body = self
            .execute(
                Method::Get,
                crate::transport::GET_BALANCE_ENDPOINT,
                Vec::new(),
            )
            .await?;

        crate::transport::decode_get_balance_json_response(&body)
            .map_err(|err| TransmitSmsError::Parse(Box::new(err)))
    }

    /// Ask TransmitSMS to format and classify a number.
    pub async fn format_number(
        &self,
        request: FormatNumber,
    ) -> Result<FormattedNumber, TransmitSmsError> {
        let params = crate::transport::encode_format_number_form(&request);
        let body = self
            .execute(Method::Post, crate::transport::FORMAT_NUMBER_ENDPOINT, params)
            .await?;

        crate::transport::decode_format_number_json_response(&body)
            .map_err(|err| TransmitSmsError::Parse(Box::new(err)))
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        let endpoint = endpoint.strip_suffix(".json").unwrap_or(endpoint);
        format!("{}/{endpoint}.json", self.base_url.trim_end_matches('/'))
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        params: Vec<(String, String)>,
    ) -> Result<String, TransmitSmsError> {
        let url = self.endpoint_url(endpoint);
        let mut attempt = 1;

        loop {
            tracing::debug!(method = ?method, endpoint, attempt, "sending TransmitSMS request");

            let request = HttpRequest {
                method,
                url: &url,
                credentials: &self.credentials,
                params: params.clone(),
            };
            let err = match self.attempt(request).await {
                Ok(body) => return Ok(body),
                Err(err) => err,
            };

            if !err.is_retryable() || !self.retry.allows_another(attempt) {
                return Err(err);
            }

            let delay = self.retry.delay_for(attempt, err.retry_after());
            tracing::warn!(
                endpoint,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying TransmitSMS request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, request: HttpRequest<'_>) -> Result<String, TransmitSmsError> {
        let response = self
            .http
            .send(request)
            .await
            .map_err(TransmitSmsError::Transport)?;

        match crate::transport::decode_api_failure(response.status, &response.body) {
            None => Ok(response.body),
            Some(failure) => Err(failure_to_error(failure, response)),
        }
    }
}

fn failure_to_error(
    failure: crate::transport::ApiFailure,
    response: HttpResponse,
) -> TransmitSmsError {
    let kind = failure.code.as_ref().and_then(ErrorCode::known_kind);

    if response.status == 429 || kind == Some(KnownErrorCode::RateLimit) {
        return TransmitSmsError::RateLimited {
            message: failure.message,
            status: response.status,
            rate_limit: crate::transport::decode_rate_limit_headers(&response.headers),
        };
    }

    match failure.code {
        Some(code) => TransmitSmsError::Api {
            code: Some(code),
            kind,
            message: failure.message,
            status: response.status,
        },
        None => {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            TransmitSmsError::HttpStatus {
                status: response.status,
                body,
            }
        }
    }
}
