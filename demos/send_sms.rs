// ABOUTME: Command line ESME that binds to an SMSC, submits one message and unbinds
// ABOUTME: Optionally binds as transceiver and waits for the delivery receipt

use argh::FromArgs;
use smpp_esme::client::{BindCredentials, ClientOptions, SmsMessage, SubmitMode};
use std::error::Error;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Send one SMS through an SMSC
#[derive(FromArgs)]
struct CliArgs {
    /// log every PDU exchanged
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the system id
    #[argh(option)]
    system_id: Option<String>,

    /// the password
    #[argh(option)]
    password: Option<String>,

    /// the hostname or IP address of the SMSC (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port to use when connecting to the SMSC (default: 2775)
    #[argh(option, short = 'p')]
    port: Option<u16>,

    /// the message to send
    #[argh(option, short = 'm')]
    message: String,

    /// the recipient telephone number
    #[argh(option, short = 't')]
    to: String,

    /// the telephone number that the message will be from
    #[argh(option, short = 'f')]
    from: String,

    /// request a delivery receipt and wait this many seconds for it
    #[argh(option, short = 'r')]
    receipt_wait: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(2775);
    let system_id = cli_args.system_id.unwrap_or_default();
    let password = cli_args.password.unwrap_or_default();

    let credentials = match cli_args.receipt_wait {
        Some(_) => BindCredentials::transceiver(system_id, password),
        None => BindCredentials::transmitter(system_id, password),
    };

    let mut session = ClientOptions::new()
        .submit_mode(SubmitMode::Sync)
        .bind(format!("{host}:{port}"), credentials)
        .await?;
    println!("Bound to {host}:{port} as {:?}", session.role());

    let mut builder = SmsMessage::builder()
        .to(cli_args.to)
        .from(cli_args.from)
        .text(cli_args.message);
    if cli_args.receipt_wait.is_some() {
        builder = builder.with_delivery_receipt();
    }
    let sms = builder.build()?;

    let outcome = match session.send_sms(&sms).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Failed to send message: {e}");
            if !e.is_fatal() {
                let _ = session.unbind().await;
            }
            return Err(e.into());
        }
    };
    println!(
        "Message accepted, seq={} id={}",
        outcome.sequence(),
        outcome.message_id().unwrap_or("")
    );

    if let Some(seconds) = cli_args.receipt_wait {
        match tokio::time::timeout(Duration::from_secs(seconds), session.receive_message()).await {
            Ok(Ok(deliver)) if deliver.is_delivery_receipt() => {
                println!("Receipt: {}", String::from_utf8_lossy(deliver.payload()));
            }
            Ok(Ok(deliver)) => {
                println!("Message from {}: {}", deliver.body.source_addr, String::from_utf8_lossy(deliver.payload()));
            }
            Ok(Err(e)) => eprintln!("Receive failed: {e}"),
            Err(_) => eprintln!("No receipt within {seconds}s"),
        }
    }

    if session.is_bound() {
        if let Err(e) = session.unbind().await {
            eprintln!("Warning: Unbind failed: {e}");
        }
    }
    Ok(())
}
