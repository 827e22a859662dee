// ABOUTME: Matches SMSC responses to the requests that caused them
// ABOUTME: Validates command, sequence and status, and parks out-of-order async responses

use crate::client::error::ProtocolError;
use crate::codec::{Frame, RawPdu};
use crate::datatypes::{CommandId, DeliverSm};
use std::collections::{HashMap, VecDeque};

/// Validate a response against the request it should answer.
///
/// Checks, in order: the command id (when `expected_command` is set), the
/// sequence number (when `expected_sequence` is nonzero), then the
/// command_status. The body is only decoded once all three pass. `pdu` has
/// already been taken off the stream in full, so any failure here leaves
/// the stream positioned at the next PDU.
pub fn correlate(
    pdu: &RawPdu,
    expected_command: Option<CommandId>,
    expected_sequence: u32,
) -> Result<Frame, ProtocolError> {
    let header = &pdu.header;

    if let Some(expected) = expected_command {
        if header.command_id != expected {
            return Err(ProtocolError::UnexpectedCommand {
                expected,
                actual: header.command_id,
            });
        }
    }

    if expected_sequence != 0 && header.sequence_number != expected_sequence {
        return Err(ProtocolError::SequenceMismatch {
            expected: expected_sequence,
            actual: header.sequence_number,
        });
    }

    if !header.command_status.is_ok() {
        return Err(ProtocolError::Status {
            command: header.command_id,
            status: header.command_status,
        });
    }

    Ok(pdu.decode()?)
}

/// Bookkeeping for requests sent without waiting for their response.
///
/// `outstanding` maps each unanswered sequence to the response command it
/// expects. A response that arrives while some other sequence is being
/// waited for is parked until its own caller collects it. Deliveries that
/// arrive while waiting for a response are queued for the receiver.
#[derive(Debug, Default)]
pub struct Correlator {
    outstanding: HashMap<u32, CommandId>,
    parked: HashMap<u32, RawPdu>,
    deliveries: VecDeque<DeliverSm>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `sequence` as awaiting a `response` PDU.
    pub fn track(&mut self, sequence: u32, response: CommandId) {
        self.outstanding.insert(sequence, response);
    }

    pub fn is_outstanding(&self, sequence: u32) -> bool {
        self.outstanding.contains_key(&sequence)
    }

    /// The response command expected for `sequence`, if outstanding.
    pub fn expected(&self, sequence: u32) -> Option<CommandId> {
        self.outstanding.get(&sequence).copied()
    }

    /// Park a response for an outstanding sequence. Hands the PDU back when
    /// nobody is waiting for it, or when a response for that sequence is
    /// already parked.
    pub fn park(&mut self, pdu: RawPdu) -> Result<(), RawPdu> {
        let sequence = pdu.header.sequence_number;
        if !self.is_outstanding(sequence) || self.parked.contains_key(&sequence) {
            return Err(pdu);
        }
        self.parked.insert(sequence, pdu);
        Ok(())
    }

    pub fn take_parked(&mut self, sequence: u32) -> Option<RawPdu> {
        self.parked.remove(&sequence)
    }

    /// The response for `sequence` has been consumed.
    pub fn complete(&mut self, sequence: u32) {
        self.outstanding.remove(&sequence);
        self.parked.remove(&sequence);
    }

    /// Stop waiting for `sequence`. Returns false if it was not outstanding.
    pub fn forget(&mut self, sequence: u32) -> bool {
        self.parked.remove(&sequence);
        self.outstanding.remove(&sequence).is_some()
    }

    /// Unanswered sequences, lowest first.
    pub fn outstanding(&self) -> Vec<u32> {
        let mut sequences: Vec<u32> = self.outstanding.keys().copied().collect();
        sequences.sort_unstable();
        sequences
    }

    pub fn queue_delivery(&mut self, deliver: DeliverSm) {
        self.deliveries.push_back(deliver);
    }

    pub fn next_delivery(&mut self) -> Option<DeliverSm> {
        self.deliveries.pop_front()
    }

    pub fn clear(&mut self) {
        self.outstanding.clear();
        self.parked.clear();
        self.deliveries.clear();
    }
}
