// ABOUTME: Role traits for SMPP sessions using native async functions
// ABOUTME: Splits connection, session, transmitter and receiver capabilities, implemented by Session

use crate::client::error::SmppResult;
use crate::client::session::Session;
use crate::client::types::{
    BindCredentials, SmsMessage, SubmitMultiOutcome, SubmitOutcome, SubmitParams,
};
use crate::datatypes::{BindResponse, DeliverSm, Tlv};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Base connection management for SMPP clients
pub trait SmppConnection {
    /// Establish a TCP connection to the SMSC. The client starts Connected.
    async fn connect<T: ToSocketAddrs>(addr: T) -> SmppResult<Self>
    where
        Self: Sized;

    /// Close the connection without unbinding.
    async fn disconnect(&mut self) -> SmppResult<()>;

    fn is_connected(&self) -> bool;
}

/// Session operations common to every role.
pub trait SmppClient: SmppConnection {
    /// Bind to the SMSC. The role comes from `credentials.bind_type`.
    async fn bind(&mut self, credentials: &BindCredentials) -> SmppResult<BindResponse>;

    /// Unbind from the SMSC and close the connection.
    async fn unbind(&mut self) -> SmppResult<()>;

    /// Send enquire_link to test the connection.
    async fn enquire_link(&mut self) -> SmppResult<()>;
}

/// Message submission, for transmitter and transceiver binds.
pub trait SmppTransmitter: SmppClient {
    /// Send a simple text message.
    async fn send_sms(&mut self, message: &SmsMessage) -> SmppResult<SubmitOutcome>;

    /// Submit to one destination with full control over the mandatory
    /// fields and optional parameters.
    async fn submit_sm(
        &mut self,
        destination: &str,
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitOutcome>;

    /// Submit to several SME addresses and/or distribution lists.
    async fn submit_multi(
        &mut self,
        numbers: &[&str],
        lists: &[&str],
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitMultiOutcome>;
}

/// Message reception, for receiver and transceiver binds.
pub trait SmppReceiver: SmppClient {
    /// Wait for the next deliver_sm: a mobile originated message or a
    /// delivery receipt.
    async fn receive_message(&mut self) -> SmppResult<DeliverSm>;
}

/// Combines both transmitter and receiver capabilities.
pub trait SmppTransceiver: SmppTransmitter + SmppReceiver {}

impl<T> SmppTransceiver for T where T: SmppTransmitter + SmppReceiver {}

// Session checks the bound role at call time, so it implements every
// capability; a transmitter asked to receive fails with a state error.

impl SmppConnection for Session<TcpStream> {
    async fn connect<T: ToSocketAddrs>(addr: T) -> SmppResult<Self> {
        Session::connect(addr).await
    }

    async fn disconnect(&mut self) -> SmppResult<()> {
        Session::disconnect(self).await
    }

    fn is_connected(&self) -> bool {
        Session::is_connected(self)
    }
}

impl SmppClient for Session<TcpStream> {
    async fn bind(&mut self, credentials: &BindCredentials) -> SmppResult<BindResponse> {
        Session::bind(self, credentials).await
    }

    async fn unbind(&mut self) -> SmppResult<()> {
        Session::unbind(self).await
    }

    async fn enquire_link(&mut self) -> SmppResult<()> {
        Session::enquire_link(self).await
    }
}

impl SmppTransmitter for Session<TcpStream> {
    async fn send_sms(&mut self, message: &SmsMessage) -> SmppResult<SubmitOutcome> {
        Session::send_sms(self, message).await
    }

    async fn submit_sm(
        &mut self,
        destination: &str,
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitOutcome> {
        Session::submit_sm(self, destination, message, params, optional).await
    }

    async fn submit_multi(
        &mut self,
        numbers: &[&str],
        lists: &[&str],
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitMultiOutcome> {
        Session::submit_multi(self, numbers, lists, message, params, optional).await
    }
}

impl SmppReceiver for Session<TcpStream> {
    async fn receive_message(&mut self) -> SmppResult<DeliverSm> {
        Session::receive_message(self).await
    }
}
