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

/// The answer to a SUBSCRIBE, with one reason code per requested topic filter
///
/// Successful reason codes double as the granted QoS.
#[doc = crate::util::md_speclink!("_Toc3901171")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSuback {
    pub version: ProtocolVersion,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub reason_codes: Vec<ReasonCode>,
}

impl MSuback {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("MSuback", |input: &mut &Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = parse_properties(version, input, PacketKind::SubAck)?;

            if input.is_empty() {
                return Err(MqttCodecError::ProtocolError(
                    "a SUBACK must contain at least one reason code",
                ));
            }

            let (reason_codes, _): (Vec<ReasonCode>, _) = repeat_till(
                1..,
                |input: &mut &Bytes| ReasonCode::parse(input, PacketKind::SubAck, version),
                eof,
            )
            .parse_next(input)?;

            Ok(MSuback {
                version,
                packet_identifier,
                properties,
                reason_codes,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.reason_codes.is_empty() {
            return Err(MqttCodecError::ProtocolError(
                "a SUBACK must contain at least one reason code",
            )
            .into());
        }

        self.packet_identifier.write(buffer)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::SubAck)?;

        for reason_code in &self.reason_codes {
            reason_code.write(buffer, PacketKind::SubAck, self.version)?;
        }

        Ok(())
    }
}
