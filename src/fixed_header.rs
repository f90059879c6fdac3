//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::error::MqttCodecError;
use crate::integers::parse_u8;
use crate::integers::parse_variable_u32;
use crate::integers::write_variable_u32;
use crate::qos::QualityOfService;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The packet type nibble of the fixed header
///
/// The value 0 is reserved and never a valid packet type.
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PacketKind {
    Connect = 1,
    ConnAck = 2,
    Publish = 3,
    PubAck = 4,
    PubRec = 5,
    PubRel = 6,
    PubComp = 7,
    Subscribe = 8,
    SubAck = 9,
    Unsubscribe = 10,
    UnsubAck = 11,
    PingReq = 12,
    PingResp = 13,
    Disconnect = 14,
    Auth = 15,
}

impl PacketKind {
    /// The name the MQTT standard uses for this packet type
    pub const fn name(self) -> &'static str {
        match self {
            PacketKind::Connect => "CONNECT",
            PacketKind::ConnAck => "CONNACK",
            PacketKind::Publish => "PUBLISH",
            PacketKind::PubAck => "PUBACK",
            PacketKind::PubRec => "PUBREC",
            PacketKind::PubRel => "PUBREL",
            PacketKind::PubComp => "PUBCOMP",
            PacketKind::Subscribe => "SUBSCRIBE",
            PacketKind::SubAck => "SUBACK",
            PacketKind::Unsubscribe => "UNSUBSCRIBE",
            PacketKind::UnsubAck => "UNSUBACK",
            PacketKind::PingReq => "PINGREQ",
            PacketKind::PingResp => "PINGRESP",
            PacketKind::Disconnect => "DISCONNECT",
            PacketKind::Auth => "AUTH",
        }
    }

    /// The flags every packet of this kind must carry
    ///
    /// PUBLISH has no fixed value, its flags are validated by [`PublishFlags`].
    #[doc = crate::util::md_speclink!("_Toc3901023")]
    pub const fn default_flags(self) -> Option<u8> {
        match self {
            PacketKind::Publish => None,
            PacketKind::PubRel | PacketKind::Subscribe | PacketKind::Unsubscribe => Some(0b0010),
            _ => Some(0b0000),
        }
    }
}

impl core::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The DUP, QoS and RETAIN bits of a PUBLISH fixed header
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishFlags {
    pub dup: bool,
    pub qos: QualityOfService,
    pub retain: bool,
}

impl PublishFlags {
    pub fn from_bits(flags: u8) -> MResult<Self> {
        let dup = flags & 0b1000 != 0;
        let qos = QualityOfService::from_bits((flags & 0b0110) >> 1, "PUBLISH QoS must not be 3")?;
        let retain = flags & 0b0001 != 0;

        if dup && qos == QualityOfService::AtMostOnce {
            return Err(MqttCodecError::MalformedPacket(
                "PUBLISH with QoS 0 must not have the DUP flag set",
            ));
        }

        Ok(PublishFlags { dup, qos, retain })
    }

    pub fn bits(&self) -> u8 {
        (u8::from(self.dup) << 3) | (u8::from(self.qos) << 1) | u8::from(self.retain)
    }
}

/// The first byte and remaining length of a control packet
#[doc = crate::util::md_speclink!("_Toc3901021")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MFixedHeader {
    pub kind: PacketKind,
    pub flags: u8,
    pub remaining_length: u32,
}

impl MFixedHeader {
    pub fn parse(input: &mut &Bytes) -> MResult<MFixedHeader> {
        trace("MFixedHeader", |input: &mut &Bytes| {
            let ((kind, flags), remaining_length) = (
                parse_u8.try_map(Self::split_first_byte),
                parse_variable_u32,
            )
                .parse_next(input)?;

            Ok(MFixedHeader {
                kind,
                flags,
                remaining_length,
            })
        })
        .parse_next(input)
    }

    /// Split the first header byte into packet type and flags, checking the fixed flag values
    pub fn split_first_byte(first: u8) -> MResult<(PacketKind, u8)> {
        let kind = PacketKind::try_from(first >> 4)
            .map_err(|_| MqttCodecError::MalformedPacket("reserved packet type 0"))?;
        let flags = first & 0b0000_1111;

        if let Some(expected) = kind.default_flags() {
            if flags != expected {
                return Err(MqttCodecError::MalformedPacket(
                    "fixed header flags do not match the packet type",
                ));
            }
        }

        Ok((kind, flags))
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte((u8::from(self.kind) << 4) | (self.flags & 0b0000_1111))?;
        write_variable_u32(buffer, self.remaining_length)
    }
}
