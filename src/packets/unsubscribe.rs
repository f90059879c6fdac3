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
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::topic::validate_topic_filter;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[doc = crate::util::md_speclink!("_Toc3901179")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MUnsubscribe {
    pub version: ProtocolVersion,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub topic_filters: Vec<String>,
}

fn parse_topic_filter(input: &mut &Bytes) -> MResult<String> {
    trace("parse_topic_filter", |input: &mut &Bytes| {
        let topic_filter = parse_string(input)?;
        validate_topic_filter(topic_filter).map_err(MqttCodecError::InvalidTopicFilter)?;
        Ok(topic_filter.to_owned())
    })
    .parse_next(input)
}

impl MUnsubscribe {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("MUnsubscribe", |input: &mut &Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = parse_properties(version, input, PacketKind::Unsubscribe)?;

            if input.is_empty() {
                return Err(MqttCodecError::ProtocolError(
                    "an UNSUBSCRIBE must contain at least one topic filter",
                ));
            }

            let (topic_filters, _): (Vec<String>, _) =
                repeat_till(1.., parse_topic_filter, eof).parse_next(input)?;

            Ok(MUnsubscribe {
                version,
                packet_identifier,
                properties,
                topic_filters,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.topic_filters.is_empty() {
            return Err(MqttCodecError::ProtocolError(
                "an UNSUBSCRIBE must contain at least one topic filter",
            )
            .into());
        }

        self.packet_identifier.write(buffer)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::Unsubscribe)?;

        for topic_filter in &self.topic_filters {
            validate_topic_filter(topic_filter).map_err(MqttCodecError::InvalidTopicFilter)?;
            write_string(buffer, topic_filter)?;
        }

        Ok(())
    }
}
