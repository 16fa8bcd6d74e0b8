use std::io;

use transmitsms::{
    CallbackEvent, CallbackPayload, CallbackType, HandlerError, HandlerRegistry, SigningKey,
    WebhookReceiver,
};

fn required(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

fn log_delivery(event: &CallbackEvent) -> Result<(), HandlerError> {
    if let CallbackPayload::Dlr(dlr) = &event.payload {
        println!(
            "delivery report for {}: {} (context: {})",
            dlr.message_id.value(),
            dlr.status,
            serde_json::Value::Object(event.context.clone())
        );
    }
    Ok(())
}

/// Feed one callback URL, as TransmitSMS would request it, through the receiver.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let secret = required("TRANSMITSMS_WEBHOOK_KEY")?;
    let callback_url = url::Url::parse(&required("TRANSMITSMS_CALLBACK_URL")?)?;

    let mut registry = HandlerRegistry::new();
    registry
        .register(CallbackType::Dlr, "demo", log_delivery)
        .listen(|event: &CallbackEvent| -> Result<(), HandlerError> {
            println!("{} callback from {}", event.kind, event.payload.mobile());
            Ok(())
        });

    let receiver = WebhookReceiver::new(SigningKey::new(secret)?, registry);
    let response = receiver.handle_query_str(
        callback_url.path(),
        callback_url.query().unwrap_or_default(),
    );
    println!("{} {}", response.status, response.body);

    Ok(())
}
