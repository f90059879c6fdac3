//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::fixed_header::PacketKind;
use crate::properties::PropertyId;
use crate::properties::PropertyScope;
use crate::reason_code::ReasonCode;
use crate::topic::TopicError;

#[derive(Debug, thiserror::Error)]
pub enum MqttCodecError {
    #[error("The input ended before a field could be read completely")]
    Truncated,

    #[error("A variable byte integer was longer than 4 bytes or larger than 268,435,455")]
    VarintOverflow,

    #[error("A string was not valid UTF-8 or contained a control character")]
    InvalidUtf8,

    #[error("Malformed packet: {0}")]
    MalformedPacket(&'static str),

    #[error("Protocol error: {0}")]
    ProtocolError(&'static str),

    #[error("Unknown property identifier 0x{0:02X}")]
    UnknownPropertyId(u32),

    #[error("The property {id:?} is not allowed in {scope}")]
    PropertyNotAllowedForKind { id: PropertyId, scope: PropertyScope },

    #[error("The property {0:?} may only appear once")]
    DuplicateProperty(PropertyId),

    #[error("The property block length does not match its content")]
    MalformedProperties,

    #[error("The value given for property {0:?} does not have its wire type")]
    PropertyTypeMismatch(PropertyId),

    #[error("The reason code 0x{code:02X} is not valid in a {kind} packet")]
    InvalidReasonCode { code: u8, kind: PacketKind },

    #[error("The client identifier is not valid")]
    InvalidClientId,

    #[error("The protocol name {0:?} is not supported")]
    UnsupportedProtocolName(String),

    #[error("The protocol level {0} is not supported")]
    UnsupportedProtocolVersion(u8),

    #[error("Invalid topic name")]
    InvalidTopicName(#[source] TopicError),

    #[error("Invalid topic filter")]
    InvalidTopicFilter(#[source] TopicError),

    #[error("A packet of {size} bytes exceeds the maximum packet size of {maximum} bytes")]
    PacketTooLarge { size: usize, maximum: u32 },

    #[error("An I/O error occurred")]
    Io(#[from] std::io::Error),
}

impl MqttCodecError {
    /// The reason code a server reports when it closes a connection because of this error
    ///
    /// Only meaningful for MQTT 5.0, where CONNACK and DISCONNECT carry a reason code.
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            MqttCodecError::Truncated
            | MqttCodecError::VarintOverflow
            | MqttCodecError::InvalidUtf8
            | MqttCodecError::MalformedPacket(_)
            | MqttCodecError::UnknownPropertyId(_)
            | MqttCodecError::MalformedProperties
            | MqttCodecError::PropertyTypeMismatch(_)
            | MqttCodecError::InvalidReasonCode { .. } => ReasonCode::MALFORMED_PACKET,
            MqttCodecError::ProtocolError(_)
            | MqttCodecError::PropertyNotAllowedForKind { .. }
            | MqttCodecError::DuplicateProperty(_) => ReasonCode::PROTOCOL_ERROR,
            MqttCodecError::InvalidClientId => ReasonCode::CLIENT_IDENTIFIER_NOT_VALID,
            MqttCodecError::UnsupportedProtocolName(_)
            | MqttCodecError::UnsupportedProtocolVersion(_) => {
                ReasonCode::UNSUPPORTED_PROTOCOL_VERSION
            }
            MqttCodecError::InvalidTopicName(_) => ReasonCode::TOPIC_NAME_INVALID,
            MqttCodecError::InvalidTopicFilter(_) => ReasonCode::TOPIC_FILTER_INVALID,
            MqttCodecError::PacketTooLarge { .. } => ReasonCode::PACKET_TOO_LARGE,
            MqttCodecError::Io(_) => ReasonCode::UNSPECIFIED_ERROR,
        }
    }
}

/// Lets `MqttCodecError` be the error type of winnow parsers
///
/// Running out of input is the only recoverable error. Everything else cuts, so combinators like
/// `repeat_till` report it instead of backtracking.
impl<'i> winnow::error::ParserError<&'i winnow::Bytes> for MqttCodecError {
    type Inner = Self;

    fn from_input(_input: &&'i winnow::Bytes) -> Self {
        MqttCodecError::Truncated
    }

    fn is_backtrack(&self) -> bool {
        matches!(self, MqttCodecError::Truncated)
    }

    fn into_inner(self) -> Result<Self::Inner, Self> {
        Ok(self)
    }
}

impl<'i> winnow::error::FromExternalError<&'i winnow::Bytes, MqttCodecError> for MqttCodecError {
    fn from_external_error(_input: &&'i winnow::Bytes, e: MqttCodecError) -> Self {
        e
    }
}
