//! SMPP v3.4 ESME protocol engine.
//!
//! * [`codec`] - PDU header, framing, encode/decode traits and the
//!   command-id decoder registry
//! * [`datatypes`] - the supported PDUs, protocol enums and the optional
//!   parameter (TLV) registry
//! * [`connection`] - whole-PDU framed I/O over a byte stream
//! * [`client`] - the session state machine, response correlation and the
//!   transmitter/receiver/transceiver roles
//!
//! # Examples
//!
//! ## Basic SMS Sending
//!
//! ```rust,no_run
//! use smpp_esme::client::{ClientBuilder, SmsMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and bind as transmitter
//!     let mut session = ClientBuilder::quick_transmitter(
//!         "localhost:2775",
//!         "system_id",
//!         "password"
//!     ).await?;
//!
//!     let sms = SmsMessage::new("1234567890", "0987654321", "Hello, World!");
//!     let outcome = session.send_sms(&sms).await?;
//!     println!("Message sent with ID: {:?}", outcome.message_id());
//!
//!     session.unbind().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Full Control over Submission Fields
//!
//! ```rust,no_run
//! use smpp_esme::client::{BindCredentials, ClientBuilder, SubmitParams};
//! use smpp_esme::datatypes::{
//!     DataCoding, NumericPlanIndicator, PriorityFlag, Tlv, TlvTag, TlvValue, TypeOfNumber,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = BindCredentials::transceiver("system_id", "password")
//!         .with_system_type("VMA");
//!     let mut session = ClientBuilder::transceiver("localhost:2775", credentials).await?;
//!
//!     let params = SubmitParams::builder()
//!         .source_addr("Acme")
//!         .source_addr_ton(TypeOfNumber::Alphanumeric)
//!         .dest_addr_ton(TypeOfNumber::International)
//!         .dest_addr_npi(NumericPlanIndicator::Isdn)
//!         .priority_flag(PriorityFlag::Level1)
//!         .data_coding(DataCoding::Latin1)
//!         .registered_delivery(1)
//!         .build()?;
//!     let reference = Tlv::new(TlvTag::UserMessageReference, TlvValue::U16(42))?;
//!
//!     session
//!         .submit_sm("447700900123", b"Hello with options!", &params, vec![reference])
//!         .await?;
//!
//!     let receipt = session.receive_message().await?;
//!     println!("receipt: {}", String::from_utf8_lossy(receipt.payload()));
//!
//!     session.unbind().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;

mod macros;

#[cfg(test)]
mod tests;

pub use codec::{CodecError, Decodable, Encodable, Frame, PduHeader, PduRegistry, RawPdu};

pub use client::{
    BindCredentials, ClientBuilder, Session, SessionOptions, SessionState, SmppClient,
    SmppConnection, SmppError, SmppReceiver, SmppResult, SmppTransceiver, SmppTransmitter,
    SmsMessage, SubmitMode, SubmitOutcome, SubmitParams,
};
