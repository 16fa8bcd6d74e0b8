use std::io;

use transmitsms::{
    CallbackType, CallbackUrlBuilder, Credentials, MessageText, Recipient, SendOptions, SendSms,
    SigningKey, TransmitSmsClient,
};

fn required(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = required("TRANSMITSMS_API_KEY")?;
    let api_secret = required("TRANSMITSMS_API_SECRET")?;
    let to = required("TRANSMITSMS_TO")?;
    let message = std::env::var("TRANSMITSMS_MESSAGE")
        .unwrap_or_else(|_| "Hello from the transmitsms demo.".to_owned());
    let country = std::env::var("TRANSMITSMS_COUNTRY").ok();

    let client = TransmitSmsClient::new(Credentials::new(api_key, api_secret)?)?;

    let balance = client.get_balance().await?;
    println!(
        "balance: {} {}",
        balance.balance,
        balance.currency.as_deref().unwrap_or_default()
    );

    let recipients = Recipient::parse_list(&to, country.as_deref())?;
    let mut options = SendOptions {
        country_code: country,
        ..Default::default()
    };

    if let (Ok(base), Ok(secret)) = (
        std::env::var("TRANSMITSMS_WEBHOOK_BASE"),
        std::env::var("TRANSMITSMS_WEBHOOK_KEY"),
    ) {
        let builder = CallbackUrlBuilder::new(base, SigningKey::new(secret)?);
        options = options.with_signed_callback(
            &builder,
            CallbackType::Dlr,
            Some("demo"),
            &serde_json::json!({"source": "send_sms demo"}),
        )?;
    }

    let request = SendSms::to_many(recipients, MessageText::new(message)?, options)?;
    let sent = client.send_sms(request).await?;
    println!(
        "message_id: {}, recipients: {}, cost: {:?}",
        sent.message_id.value(),
        sent.recipients,
        sent.cost
    );

    Ok(())
}
