// ABOUTME: SMPP ESME client module: session state machine, correlation, role traits and builders
// ABOUTME: Exports the session, its configuration types, error taxonomy and convenience constructors

//! SMPP Client Module
//!
//! One [`Session`] type plays every ESME role. The role is chosen at bind
//! time and checked on each call:
//!
//! * **Transmitter** - `submit_sm`, `submit_multi`, `send_sms`
//! * **Receiver** - `receive_message`
//! * **Transceiver** - both
//!
//! Every response goes through a single correlation check (command id,
//! then sequence number, then command_status) before its body is decoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smpp_esme::client::{ClientBuilder, SmsMessage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ClientBuilder::quick_transmitter(
//!     "localhost:2775",
//!     "system_id",
//!     "password"
//! ).await?;
//!
//! let message = SmsMessage::new("123456789", "987654321", "Hello!");
//! let outcome = session.send_sms(&message).await?;
//! println!("accepted as {:?}", outcome.message_id());
//!
//! // Unbind also closes the connection
//! session.unbind().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Asynchronous Submission
//!
//! In [`SubmitMode::Async`] a submit returns its sequence number without
//! waiting. Responses are collected by sequence, in any order:
//!
//! ```rust,no_run
//! use smpp_esme::client::{BindCredentials, ClientOptions, SubmitMode, SubmitParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ClientOptions::new()
//!     .submit_mode(SubmitMode::Async)
//!     .bind("localhost:2775", BindCredentials::transmitter("id", "pass"))
//!     .await?;
//!
//! let params = SubmitParams::builder().source_addr("Acme").build()?;
//! let first = session.submit_sm("111", b"one", &params, Vec::new()).await?;
//! let second = session.submit_sm("222", b"two", &params, Vec::new()).await?;
//!
//! let response = session.collect_submit_response(second.sequence()).await?;
//! let response = session.collect_submit_response(first.sequence()).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod correlator;
pub mod error;
pub mod session;
pub mod traits;
pub mod types;

pub use builder::{ClientBuilder, ClientOptions};
pub use correlator::{Correlator, correlate};
pub use error::{ConfigError, ProtocolError, SmppError, SmppResult, StateError};
pub use session::{MAX_SEQUENCE_NUMBER, Session, SessionState};
pub use traits::{SmppClient, SmppConnection, SmppReceiver, SmppTransceiver, SmppTransmitter};
pub use types::{
    BindCredentials, SessionOptions, SmsMessage, SmsMessageBuilder, SubmitMode,
    SubmitMultiOutcome, SubmitOutcome, SubmitParams, SubmitParamsBuilder,
};
