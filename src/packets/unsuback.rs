//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::eof;
use winnow::combinator::repeat_till;
use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::level::ProtocolVersion;
use crate::packets::parse_properties;
use crate::packets::write_properties;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The answer to an UNSUBSCRIBE
///
/// In MQTT 3.1.1 it consists of the packet identifier only and `reason_codes` stays empty.
#[doc = crate::util::md_speclink!("_Toc3901187")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MUnsuback {
    pub version: ProtocolVersion,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub reason_codes: Vec<ReasonCode>,
}

impl MUnsuback {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("MUnsuback", |input: &mut &Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = parse_properties(version, input, PacketKind::UnsubAck)?;

            let reason_codes = if version.is_v5() {
                if input.is_empty() {
                    return Err(MqttCodecError::ProtocolError(
                        "an UNSUBACK must contain at least one reason code",
                    ));
                }

                let (reason_codes, _): (Vec<ReasonCode>, _) = repeat_till(
                    1..,
                    |input: &mut &Bytes| ReasonCode::parse(input, PacketKind::UnsubAck, version),
                    eof,
                )
                .parse_next(input)?;

                reason_codes
            } else {
                Vec::new()
            };

            Ok(MUnsuback {
                version,
                packet_identifier,
                properties,
                reason_codes,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        match self.version {
            ProtocolVersion::V3_1_1 if !self.reason_codes.is_empty() => {
                return Err(MqttCodecError::MalformedPacket(
                    "reason codes can only be sent with MQTT 5.0",
                )
                .into());
            }
            ProtocolVersion::V5 if self.reason_codes.is_empty() => {
                return Err(MqttCodecError::ProtocolError(
                    "an UNSUBACK must contain at least one reason code",
                )
                .into());
            }
            _ => {}
        }

        self.packet_identifier.write(buffer)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::UnsubAck)?;

        for reason_code in &self.reason_codes {
            reason_code.write(buffer, PacketKind::UnsubAck, self.version)?;
        }

        Ok(())
    }
}
