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
use crate::integers::parse_u8;
use crate::integers::write_u8;
use crate::level::ProtocolVersion;
use crate::packets::parse_properties;
use crate::packets::write_properties;
use crate::properties::Properties;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::topic::validate_topic_filter;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

const QOS_MASK: u8 = 0b0000_0011;
const NO_LOCAL_FLAG: u8 = 0b0000_0100;
const RETAIN_AS_PUBLISHED_FLAG: u8 = 0b0000_1000;
const RETAIN_HANDLING_MASK: u8 = 0b0011_0000;
const RESERVED_V3_MASK: u8 = 0b1111_1100;
const RESERVED_V5_MASK: u8 = 0b1100_0000;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum RetainHandling {
    #[default]
    SendRetainedMessagesAlways = 0,
    SendRetainedMessagesOnNewSubscribe = 1,
    DoNotSendRetainedMessages = 2,
}

#[doc = crate::util::md_speclink!("_Toc3901169")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionOptions {
    pub quality_of_service: QualityOfService,
    pub no_local: bool,
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscriptionOptions {
    pub fn new(quality_of_service: QualityOfService) -> Self {
        SubscriptionOptions {
            quality_of_service,
            ..Default::default()
        }
    }

    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        let options = parse_u8(input)?;

        let reserved = match version {
            ProtocolVersion::V3_1_1 => RESERVED_V3_MASK,
            ProtocolVersion::V5 => RESERVED_V5_MASK,
        };

        if options & reserved != 0 {
            return Err(MqttCodecError::MalformedPacket(
                "reserved subscription option bits must be zero",
            ));
        }

        let quality_of_service = QualityOfService::from_bits(
            options & QOS_MASK,
            "the subscription QoS must not be 3",
        )?;
        let retain_handling = RetainHandling::try_from((options & RETAIN_HANDLING_MASK) >> 4)
            .map_err(|_| MqttCodecError::MalformedPacket("retain handling must not be 3"))?;

        Ok(SubscriptionOptions {
            quality_of_service,
            no_local: options & NO_LOCAL_FLAG != 0,
            retain_as_published: options & RETAIN_AS_PUBLISHED_FLAG != 0,
            retain_handling,
        })
    }

    pub fn write<W: WriteMqttPacket>(&self, version: ProtocolVersion, buffer: &mut W) -> WResult<W> {
        let mut options = u8::from(self.quality_of_service);

        if self.no_local {
            options |= NO_LOCAL_FLAG;
        }

        if self.retain_as_published {
            options |= RETAIN_AS_PUBLISHED_FLAG;
        }

        options |= u8::from(self.retain_handling) << 4;

        if version == ProtocolVersion::V3_1_1 && options & RESERVED_V3_MASK != 0 {
            return Err(MqttCodecError::MalformedPacket(
                "subscription options other than QoS can only be sent with MQTT 5.0",
            )
            .into());
        }

        write_u8(buffer, options)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub topic_filter: String,
    pub options: SubscriptionOptions,
}

impl Subscription {
    fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("Subscription", |input: &mut &Bytes| {
            let topic_filter = parse_string(input)?;
            validate_topic_filter(topic_filter).map_err(MqttCodecError::InvalidTopicFilter)?;
            let options = SubscriptionOptions::parse(version, input)?;

            Ok(Subscription {
                topic_filter: topic_filter.to_owned(),
                options,
            })
        })
        .parse_next(input)
    }

    fn write<W: WriteMqttPacket>(&self, version: ProtocolVersion, buffer: &mut W) -> WResult<W> {
        validate_topic_filter(&self.topic_filter).map_err(MqttCodecError::InvalidTopicFilter)?;
        write_string(buffer, &self.topic_filter)?;
        self.options.write(version, buffer)
    }
}

#[doc = crate::util::md_speclink!("_Toc3901161")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MSubscribe {
    pub version: ProtocolVersion,
    pub packet_identifier: PacketIdentifier,
    pub properties: Properties,
    pub subscriptions: Vec<Subscription>,
}

impl MSubscribe {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        trace("MSubscribe", |input: &mut &Bytes| {
            let packet_identifier = PacketIdentifier::parse(input)?;
            let properties = parse_properties(version, input, PacketKind::Subscribe)?;

            if input.is_empty() {
                return Err(MqttCodecError::ProtocolError(
                    "a SUBSCRIBE must contain at least one topic filter",
                ));
            }

            let (subscriptions, _): (Vec<Subscription>, _) = repeat_till(
                1..,
                |input: &mut &Bytes| Subscription::parse(version, input),
                eof,
            )
            .parse_next(input)?;

            Ok(MSubscribe {
                version,
                packet_identifier,
                properties,
                subscriptions,
            })
        })
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.subscriptions.is_empty() {
            return Err(MqttCodecError::ProtocolError(
                "a SUBSCRIBE must contain at least one topic filter",
            )
            .into());
        }

        self.packet_identifier.write(buffer)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::Subscribe)?;

        for subscription in &self.subscriptions {
            subscription.write(self.version, buffer)?;
        }

        Ok(())
    }
}
