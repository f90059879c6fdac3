//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Handling of MQTT Control Packets

use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use self::auth::MAuth;
use self::connack::MConnack;
use self::connect::MConnect;
use self::disconnect::MDisconnect;
use self::pingreq::MPingreq;
use self::pingresp::MPingresp;
use self::puback::MPuback;
use self::pubcomp::MPubcomp;
use self::publish::MPublish;
use self::pubrec::MPubrec;
use self::pubrel::MPubrel;
use self::suback::MSuback;
use self::subscribe::MSubscribe;
use self::unsuback::MUnsuback;
use self::unsubscribe::MUnsubscribe;
use crate::binary::parse_slice;
use crate::error::MqttCodecError;
use crate::fixed_header::MFixedHeader;
use crate::fixed_header::PacketKind;
use crate::level::ProtocolVersion;
use crate::properties::Properties;
use crate::properties::PropertyScope;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

pub mod auth;
pub mod connack;
pub mod connect;
pub mod disconnect;
pub mod pingreq;
pub mod pingresp;
pub mod puback;
pub mod pubcomp;
pub mod publish;
pub mod pubrec;
pub mod pubrel;
pub mod suback;
pub mod subscribe;
pub mod unsuback;
pub mod unsubscribe;

/// Read a property block, which only exists in MQTT 5.0
pub(crate) fn parse_properties(
    version: ProtocolVersion,
    input: &mut &Bytes,
    scope: impl Into<PropertyScope>,
) -> MResult<Properties> {
    match version {
        ProtocolVersion::V3_1_1 => Ok(Properties::new()),
        ProtocolVersion::V5 => Properties::parse(input, scope),
    }
}

pub(crate) fn write_properties<W: WriteMqttPacket>(
    version: ProtocolVersion,
    properties: &Properties,
    buffer: &mut W,
    scope: impl Into<PropertyScope>,
) -> WResult<W> {
    match version {
        ProtocolVersion::V3_1_1 if properties.is_empty() => Ok(()),
        ProtocolVersion::V3_1_1 => Err(MqttCodecError::MalformedPacket(
            "properties can only be sent with MQTT 5.0",
        )
        .into()),
        ProtocolVersion::V5 => properties.write(buffer, scope),
    }
}

/// An acknowledgement made of a packet identifier, a reason code and properties
///
/// MQTT 5.0 allows leaving out the trailing fields: without properties the property length
/// may be omitted, and a successful acknowledgement may consist of the packet identifier only.
macro_rules! define_ack_packet {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub version: $crate::level::ProtocolVersion,
            pub packet_identifier: $crate::variable_header::PacketIdentifier,
            pub reason_code: $crate::reason_code::ReasonCode,
            pub properties: $crate::properties::Properties,
        }

        impl $name {
            pub fn new(
                version: $crate::level::ProtocolVersion,
                packet_identifier: $crate::variable_header::PacketIdentifier,
            ) -> Self {
                $name {
                    version,
                    packet_identifier,
                    reason_code: $crate::reason_code::ReasonCode::SUCCESS,
                    properties: $crate::properties::Properties::new(),
                }
            }

            pub fn parse(
                version: $crate::level::ProtocolVersion,
                input: &mut &winnow::Bytes,
            ) -> $crate::MResult<Self> {
                let mut packet = Self::new(version, $crate::variable_header::PacketIdentifier::parse(input)?);

                if version == $crate::level::ProtocolVersion::V3_1_1 || input.is_empty() {
                    return Ok(packet);
                }

                packet.reason_code = $crate::reason_code::ReasonCode::parse(
                    input,
                    $crate::fixed_header::PacketKind::$kind,
                    version,
                )?;

                if !input.is_empty() {
                    packet.properties = $crate::properties::Properties::parse(
                        input,
                        $crate::fixed_header::PacketKind::$kind,
                    )?;
                }

                Ok(packet)
            }

            pub fn write<W: $crate::write::WriteMqttPacket>(
                &self,
                buffer: &mut W,
            ) -> $crate::write::WResult<W> {
                self.packet_identifier.write(buffer)?;

                match self.version {
                    $crate::level::ProtocolVersion::V3_1_1 => {
                        if self.reason_code != $crate::reason_code::ReasonCode::SUCCESS {
                            return Err($crate::error::MqttCodecError::MalformedPacket(
                                "reason codes can only be sent with MQTT 5.0",
                            )
                            .into());
                        }

                        $crate::packets::write_properties(
                            self.version,
                            &self.properties,
                            buffer,
                            $crate::fixed_header::PacketKind::$kind,
                        )
                    }
                    $crate::level::ProtocolVersion::V5 => {
                        if self.reason_code == $crate::reason_code::ReasonCode::SUCCESS
                            && self.properties.is_empty()
                        {
                            return Ok(());
                        }

                        self.reason_code.write(
                            buffer,
                            $crate::fixed_header::PacketKind::$kind,
                            self.version,
                        )?;

                        if self.properties.is_empty() {
                            return Ok(());
                        }

                        self.properties
                            .write(buffer, $crate::fixed_header::PacketKind::$kind)
                    }
                }
            }
        }
    };
}
pub(crate) use define_ack_packet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttPacket {
    Connect(MConnect),
    Connack(MConnack),
    Publish(MPublish),
    Puback(MPuback),
    Pubrec(MPubrec),
    Pubrel(MPubrel),
    Pubcomp(MPubcomp),
    Subscribe(MSubscribe),
    Suback(MSuback),
    Unsubscribe(MUnsubscribe),
    Unsuback(MUnsuback),
    Pingreq(MPingreq),
    Pingresp(MPingresp),
    Disconnect(MDisconnect),
    Auth(MAuth),
}

impl MqttPacket {
    /// Parse a frame that has to span the whole input
    pub fn parse_complete(version: ProtocolVersion, input: &[u8]) -> MResult<Self> {
        let mut input = Bytes::new(input);
        let packet = Self::parse(version, &mut input)?;

        if !input.is_empty() {
            return Err(MqttCodecError::MalformedPacket(
                "unexpected bytes after the end of the packet",
            ));
        }

        Ok(packet)
    }

    /// Parse a single frame off the front of the input
    ///
    /// `version` is the protocol version of the connection. A CONNECT carries its own version,
    /// which callers should use for the following packets.
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("MqttPacket", |input: &mut &Bytes| {
            let header = MFixedHeader::parse(input)?;
            let body = parse_slice(input, header.remaining_length as usize)?;

            Self::parse_body(version, header, &mut Bytes::new(body))
        })
        .parse_next(input)
    }

    fn parse_body(version: ProtocolVersion, header: MFixedHeader, input: &mut &Bytes) -> MResult<Self> {
        let packet = match header.kind {
            PacketKind::Connect => MConnect::parse(input).map(MqttPacket::from),
            PacketKind::ConnAck => MConnack::parse(version, input).map(MqttPacket::from),
            PacketKind::Publish => MPublish::parse(version, header.flags, input).map(MqttPacket::from),
            PacketKind::PubAck => MPuback::parse(version, input).map(MqttPacket::from),
            PacketKind::PubRec => MPubrec::parse(version, input).map(MqttPacket::from),
            PacketKind::PubRel => MPubrel::parse(version, input).map(MqttPacket::from),
            PacketKind::PubComp => MPubcomp::parse(version, input).map(MqttPacket::from),
            PacketKind::Subscribe => MSubscribe::parse(version, input).map(MqttPacket::from),
            PacketKind::SubAck => MSuback::parse(version, input).map(MqttPacket::from),
            PacketKind::Unsubscribe => MUnsubscribe::parse(version, input).map(MqttPacket::from),
            PacketKind::UnsubAck => MUnsuback::parse(version, input).map(MqttPacket::from),
            PacketKind::PingReq => MPingreq::parse(version, input).map(MqttPacket::from),
            PacketKind::PingResp => MPingresp::parse(version, input).map(MqttPacket::from),
            PacketKind::Disconnect => MDisconnect::parse(version, input).map(MqttPacket::from),
            PacketKind::Auth => MAuth::parse(version, input).map(MqttPacket::from),
        }?;

        if !input.is_empty() {
            return Err(MqttCodecError::MalformedPacket(
                "the packet body is longer than its content",
            ));
        }

        Ok(packet)
    }

    /// Write the complete frame, fixed header included
    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        let mut body = Vec::new();

        match self {
            MqttPacket::Connect(p) => p.write(&mut body)?,
            MqttPacket::Connack(p) => p.write(&mut body)?,
            MqttPacket::Publish(p) => p.write(&mut body)?,
            MqttPacket::Puback(p) => p.write(&mut body)?,
            MqttPacket::Pubrec(p) => p.write(&mut body)?,
            MqttPacket::Pubrel(p) => p.write(&mut body)?,
            MqttPacket::Pubcomp(p) => p.write(&mut body)?,
            MqttPacket::Subscribe(p) => p.write(&mut body)?,
            MqttPacket::Suback(p) => p.write(&mut body)?,
            MqttPacket::Unsubscribe(p) => p.write(&mut body)?,
            MqttPacket::Unsuback(p) => p.write(&mut body)?,
            MqttPacket::Pingreq(p) => p.write(&mut body)?,
            MqttPacket::Pingresp(p) => p.write(&mut body)?,
            MqttPacket::Disconnect(p) => p.write(&mut body)?,
            MqttPacket::Auth(p) => p.write(&mut body)?,
        }

        let header = MFixedHeader {
            kind: self.kind(),
            flags: self.flags(),
            remaining_length: u32::try_from(body.len())
                .map_err(|_| MqttCodecError::VarintOverflow)?,
        };

        header.write(buffer)?;
        buffer.write_slice(&body)
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            MqttPacket::Connect(_) => PacketKind::Connect,
            MqttPacket::Connack(_) => PacketKind::ConnAck,
            MqttPacket::Publish(_) => PacketKind::Publish,
            MqttPacket::Puback(_) => PacketKind::PubAck,
            MqttPacket::Pubrec(_) => PacketKind::PubRec,
            MqttPacket::Pubrel(_) => PacketKind::PubRel,
            MqttPacket::Pubcomp(_) => PacketKind::PubComp,
            MqttPacket::Subscribe(_) => PacketKind::Subscribe,
            MqttPacket::Suback(_) => PacketKind::SubAck,
            MqttPacket::Unsubscribe(_) => PacketKind::Unsubscribe,
            MqttPacket::Unsuback(_) => PacketKind::UnsubAck,
            MqttPacket::Pingreq(_) => PacketKind::PingReq,
            MqttPacket::Pingresp(_) => PacketKind::PingResp,
            MqttPacket::Disconnect(_) => PacketKind::Disconnect,
            MqttPacket::Auth(_) => PacketKind::Auth,
        }
    }

    fn flags(&self) -> u8 {
        match self {
            MqttPacket::Publish(p) => p.flags().bits(),
            other => other.kind().default_flags().unwrap_or(0),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match self {
            MqttPacket::Connect(p) => p.version,
            MqttPacket::Connack(p) => p.version,
            MqttPacket::Publish(p) => p.version,
            MqttPacket::Puback(p) => p.version,
            MqttPacket::Pubrec(p) => p.version,
            MqttPacket::Pubrel(p) => p.version,
            MqttPacket::Pubcomp(p) => p.version,
            MqttPacket::Subscribe(p) => p.version,
            MqttPacket::Suback(p) => p.version,
            MqttPacket::Unsubscribe(p) => p.version,
            MqttPacket::Unsuback(p) => p.version,
            MqttPacket::Pingreq(p) => p.version,
            MqttPacket::Pingresp(p) => p.version,
            MqttPacket::Disconnect(p) => p.version,
            MqttPacket::Auth(p) => p.version,
        }
    }

    pub fn packet_identifier(&self) -> Option<PacketIdentifier> {
        match self {
            MqttPacket::Publish(p) => p.packet_identifier,
            MqttPacket::Puback(p) => Some(p.packet_identifier),
            MqttPacket::Pubrec(p) => Some(p.packet_identifier),
            MqttPacket::Pubrel(p) => Some(p.packet_identifier),
            MqttPacket::Pubcomp(p) => Some(p.packet_identifier),
            MqttPacket::Subscribe(p) => Some(p.packet_identifier),
            MqttPacket::Suback(p) => Some(p.packet_identifier),
            MqttPacket::Unsubscribe(p) => Some(p.packet_identifier),
            MqttPacket::Unsuback(p) => Some(p.packet_identifier),
            MqttPacket::Connect(_)
            | MqttPacket::Connack(_)
            | MqttPacket::Pingreq(_)
            | MqttPacket::Pingresp(_)
            | MqttPacket::Disconnect(_)
            | MqttPacket::Auth(_) => None,
        }
    }

    /// The properties of the packet, `None` for packets without a property block
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            MqttPacket::Connect(p) => Some(&p.properties),
            MqttPacket::Connack(p) => Some(&p.properties),
            MqttPacket::Publish(p) => Some(&p.properties),
            MqttPacket::Puback(p) => Some(&p.properties),
            MqttPacket::Pubrec(p) => Some(&p.properties),
            MqttPacket::Pubrel(p) => Some(&p.properties),
            MqttPacket::Pubcomp(p) => Some(&p.properties),
            MqttPacket::Subscribe(p) => Some(&p.properties),
            MqttPacket::Suback(p) => Some(&p.properties),
            MqttPacket::Unsubscribe(p) => Some(&p.properties),
            MqttPacket::Unsuback(p) => Some(&p.properties),
            MqttPacket::Disconnect(p) => Some(&p.properties),
            MqttPacket::Auth(p) => Some(&p.properties),
            MqttPacket::Pingreq(_) | MqttPacket::Pingresp(_) => None,
        }
    }
}

macro_rules! impl_from_packets {
    ($($variant:ident => $packet:ty),* $(,)?) => {
        $(
            impl From<$packet> for MqttPacket {
                fn from(value: $packet) -> Self {
                    MqttPacket::$variant(value)
                }
            }
        )*
    };
}

impl_from_packets! {
    Connect => MConnect,
    Connack => MConnack,
    Publish => MPublish,
    Puback => MPuback,
    Pubrec => MPubrec,
    Pubrel => MPubrel,
    Pubcomp => MPubcomp,
    Subscribe => MSubscribe,
    Suback => MSuback,
    Unsubscribe => MUnsubscribe,
    Unsuback => MUnsuback,
    Pingreq => MPingreq,
    Pingresp => MPingresp,
    Disconnect => MDisconnect,
    Auth => MAuth,
}
