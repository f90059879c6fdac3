//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Reason codes and the packets they may appear in
//!
//! A reason code is a plain data value carried inside a packet. Which values are valid depends
//! on both the packet kind and the protocol version, so validity is always checked against a
//! `(PacketKind, ProtocolVersion)` pair.

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::integers::parse_u8;
use crate::level::ProtocolVersion;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[doc = crate::util::md_speclink!("_Toc3901031")]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReasonCode(pub u8);

macro_rules! define_reason_codes {
    ($( $name:ident = $code:literal => $description:literal ),* $(,)?) => {
        impl ReasonCode {
            $( pub const $name: ReasonCode = ReasonCode($code); )*

            /// A human readable explanation of the code
            ///
            /// Codes shared by several packet kinds are described by their most general meaning.
            pub const fn description(self) -> &'static str {
                match self.0 {
                    $( $code => $description, )*
                    _ => "Unknown reason code",
                }
            }

            /// Whether the code is defined by any MQTT version
            pub const fn is_known(self) -> bool {
                matches!(self.0, $( $code )|*)
            }
        }
    };
}

define_reason_codes! {
    SUCCESS = 0x00 => "Success",
    GRANTED_QOS_1 = 0x01 => "Granted QoS 1",
    GRANTED_QOS_2 = 0x02 => "Granted QoS 2",
    SERVER_UNAVAILABLE_V3 = 0x03 => "Connection refused, the server is unavailable",
    DISCONNECT_WITH_WILL_MESSAGE = 0x04 => "Disconnect with Will Message",
    NOT_AUTHORIZED_V3 = 0x05 => "Connection refused, the client is not authorized",
    NO_MATCHING_SUBSCRIBERS = 0x10 => "No matching subscribers",
    NO_SUBSCRIPTION_EXISTED = 0x11 => "No subscription existed",
    CONTINUE_AUTHENTICATION = 0x18 => "Continue authentication",
    RE_AUTHENTICATE = 0x19 => "Re-authenticate",
    UNSPECIFIED_ERROR = 0x80 => "Unspecified error",
    MALFORMED_PACKET = 0x81 => "Malformed Packet",
    PROTOCOL_ERROR = 0x82 => "Protocol Error",
    IMPLEMENTATION_SPECIFIC_ERROR = 0x83 => "Implementation specific error",
    UNSUPPORTED_PROTOCOL_VERSION = 0x84 => "Unsupported Protocol Version",
    CLIENT_IDENTIFIER_NOT_VALID = 0x85 => "Client Identifier not valid",
    BAD_USER_NAME_OR_PASSWORD = 0x86 => "Bad User Name or Password",
    NOT_AUTHORIZED = 0x87 => "Not authorized",
    SERVER_UNAVAILABLE = 0x88 => "Server unavailable",
    SERVER_BUSY = 0x89 => "Server busy",
    BANNED = 0x8A => "Banned",
    SERVER_SHUTTING_DOWN = 0x8B => "Server shutting down",
    BAD_AUTHENTICATION_METHOD = 0x8C => "Bad authentication method",
    KEEP_ALIVE_TIMEOUT = 0x8D => "Keep Alive timeout",
    SESSION_TAKEN_OVER = 0x8E => "Session taken over",
    TOPIC_FILTER_INVALID = 0x8F => "Topic Filter invalid",
    TOPIC_NAME_INVALID = 0x90 => "Topic Name invalid",
    PACKET_IDENTIFIER_IN_USE = 0x91 => "Packet Identifier in use",
    PACKET_IDENTIFIER_NOT_FOUND = 0x92 => "Packet Identifier not found",
    RECEIVE_MAXIMUM_EXCEEDED = 0x93 => "Receive Maximum exceeded",
    TOPIC_ALIAS_INVALID = 0x94 => "Topic Alias invalid",
    PACKET_TOO_LARGE = 0x95 => "Packet too large",
    MESSAGE_RATE_TOO_HIGH = 0x96 => "Message rate too high",
    QUOTA_EXCEEDED = 0x97 => "Quota exceeded",
    ADMINISTRATIVE_ACTION = 0x98 => "Administrative action",
    PAYLOAD_FORMAT_INVALID = 0x99 => "Payload format invalid",
    RETAIN_NOT_SUPPORTED = 0x9A => "Retain not supported",
    QOS_NOT_SUPPORTED = 0x9B => "QoS not supported",
    USE_ANOTHER_SERVER = 0x9C => "Use another server",
    SERVER_MOVED = 0x9D => "Server moved",
    SHARED_SUBSCRIPTIONS_NOT_SUPPORTED = 0x9E => "Shared Subscriptions not supported",
    CONNECTION_RATE_EXCEEDED = 0x9F => "Connection rate exceeded",
    MAXIMUM_CONNECT_TIME = 0xA0 => "Maximum connect time",
    SUBSCRIPTION_IDENTIFIERS_NOT_SUPPORTED = 0xA1 => "Subscription Identifiers not supported",
    WILDCARD_SUBSCRIPTIONS_NOT_SUPPORTED = 0xA2 => "Wildcard Subscriptions not supported",
}

impl ReasonCode {
    // MQTT 3.1.1 CONNACK return codes that share a value with a MQTT 5.0 code
    pub const UNACCEPTABLE_PROTOCOL_VERSION_V3: ReasonCode = ReasonCode(0x01);
    pub const IDENTIFIER_REJECTED_V3: ReasonCode = ReasonCode(0x02);
    pub const BAD_USER_NAME_OR_PASSWORD_V3: ReasonCode = ReasonCode(0x04);

    pub const NORMAL_DISCONNECTION: ReasonCode = ReasonCode::SUCCESS;
    pub const GRANTED_QOS_0: ReasonCode = ReasonCode::SUCCESS;

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Codes of 0x80 and above report a failure
    #[inline]
    pub const fn is_failure(self) -> bool {
        self.0 >= 0x80
    }

    pub fn is_valid_for(self, kind: PacketKind, version: ProtocolVersion) -> bool {
        allowed_reason_codes(kind, version).contains(&self)
    }

    /// Read a single reason code and check it against the codes allowed for `kind`
    pub fn parse(input: &mut &Bytes, kind: PacketKind, version: ProtocolVersion) -> MResult<Self> {
        let code = ReasonCode(parse_u8(input)?);
        code.validate(kind, version)?;
        Ok(code)
    }

    pub fn write<W: WriteMqttPacket>(
        &self,
        buffer: &mut W,
        kind: PacketKind,
        version: ProtocolVersion,
    ) -> WResult<W> {
        self.validate(kind, version)?;
        buffer.write_byte(self.0)
    }

    fn validate(self, kind: PacketKind, version: ProtocolVersion) -> MResult<()> {
        if !self.is_valid_for(kind, version) {
            return Err(MqttCodecError::InvalidReasonCode { code: self.0, kind });
        }

        Ok(())
    }
}

impl core::fmt::Debug for ReasonCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ReasonCode(0x{:02X}: {})", self.0, self.description())
    }
}

const fn codes<const N: usize>(values: [u8; N]) -> [ReasonCode; N] {
    let mut out = [ReasonCode::SUCCESS; N];
    let mut i = 0;
    while i < N {
        out[i] = ReasonCode(values[i]);
        i += 1;
    }
    out
}

const CONNACK_V3: [ReasonCode; 6] = codes([0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
const SUBACK_V3: [ReasonCode; 4] = codes([0x00, 0x01, 0x02, 0x80]);

#[doc = crate::util::md_speclink!("_Toc3901079")]
const CONNACK_V5: [ReasonCode; 22] = codes([
    0x00, 0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x8C, 0x90, 0x95,
    0x97, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9F,
]);
const PUBACK_V5: [ReasonCode; 9] = codes([0x00, 0x10, 0x80, 0x83, 0x87, 0x90, 0x91, 0x97, 0x99]);
const PUBREL_V5: [ReasonCode; 2] = codes([0x00, 0x92]);
const SUBACK_V5: [ReasonCode; 12] = codes([
    0x00, 0x01, 0x02, 0x80, 0x83, 0x87, 0x8F, 0x91, 0x97, 0x9E, 0xA1, 0xA2,
]);
const UNSUBACK_V5: [ReasonCode; 7] = codes([0x00, 0x11, 0x80, 0x83, 0x87, 0x8F, 0x91]);
#[doc = crate::util::md_speclink!("_Toc3901208")]
const DISCONNECT_V5: [ReasonCode; 29] = codes([
    0x00, 0x04, 0x80, 0x81, 0x82, 0x83, 0x87, 0x89, 0x8B, 0x8D, 0x8E, 0x8F, 0x90, 0x93, 0x94,
    0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0x9F, 0xA0, 0xA1, 0xA2,
]);
const AUTH_V5: [ReasonCode; 3] = codes([0x00, 0x18, 0x19]);

/// All reason codes a packet of `kind` may carry under `version`
///
/// Packet kinds without a reason code on the wire yield an empty set.
pub fn allowed_reason_codes(kind: PacketKind, version: ProtocolVersion) -> &'static [ReasonCode] {
    match (version, kind) {
        (ProtocolVersion::V3_1_1, PacketKind::ConnAck) => &CONNACK_V3,
        (ProtocolVersion::V3_1_1, PacketKind::SubAck) => &SUBACK_V3,
        (ProtocolVersion::V3_1_1, _) => &[],
        (ProtocolVersion::V5, PacketKind::ConnAck) => &CONNACK_V5,
        (ProtocolVersion::V5, PacketKind::PubAck | PacketKind::PubRec) => &PUBACK_V5,
        (ProtocolVersion::V5, PacketKind::PubRel | PacketKind::PubComp) => &PUBREL_V5,
        (ProtocolVersion::V5, PacketKind::SubAck) => &SUBACK_V5,
        (ProtocolVersion::V5, PacketKind::UnsubAck) => &UNSUBACK_V5,
        (ProtocolVersion::V5, PacketKind::Disconnect) => &DISCONNECT_V5,
        (ProtocolVersion::V5, PacketKind::Auth) => &AUTH_V5,
        (ProtocolVersion::V5, _) => &[],
    }
}
