//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::time::Duration;
use std::time::SystemTime;

use winnow::stream::Stream;
use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::fixed_header::PublishFlags;
use crate::level::ProtocolVersion;
use crate::packets::parse_properties;
use crate::packets::write_properties;
use crate::properties::Properties;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::topic::validate_topic_name;
use crate::variable_header::PacketIdentifier;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[doc = crate::util::md_speclink!("_Toc3901100")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MPublish {
    pub version: ProtocolVersion,
    pub dup: bool,
    pub qos: QualityOfService,
    pub retain: bool,
    pub topic_name: String,
    /// Present if and only if the QoS is above 0
    pub packet_identifier: Option<PacketIdentifier>,
    pub properties: Properties,
    pub payload: Vec<u8>,
}

impl MPublish {
    /// A QoS 0 message without properties
    pub fn new(version: ProtocolVersion, topic_name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        MPublish {
            version,
            dup: false,
            qos: QualityOfService::AtMostOnce,
            retain: false,
            topic_name: topic_name.into(),
            packet_identifier: None,
            properties: Properties::new(),
            payload: payload.into(),
        }
    }

    pub fn parse(version: ProtocolVersion, flags: u8, input: &mut &Bytes) -> MResult<Self> {
        let PublishFlags { dup, qos, retain } = PublishFlags::from_bits(flags)?;

        let topic_name = parse_string(input)?;

        let packet_identifier = if qos == QualityOfService::AtMostOnce {
            None
        } else {
            Some(PacketIdentifier::parse(input)?)
        };

        let properties = parse_properties(version, input, PacketKind::Publish)?;
        Self::check_topic_name(version, topic_name, &properties)?;

        let payload = input.finish().to_vec();

        Ok(MPublish {
            version,
            dup,
            qos,
            retain,
            topic_name: topic_name.to_owned(),
            packet_identifier,
            properties,
            payload,
        })
    }

    /// An empty topic name refers to a topic alias, which only MQTT 5.0 has
    fn check_topic_name(
        version: ProtocolVersion,
        topic_name: &str,
        properties: &Properties,
    ) -> MResult<()> {
        if topic_name.is_empty() && version.is_v5() && properties.topic_alias().is_some() {
            return Ok(());
        }

        validate_topic_name(topic_name).map_err(MqttCodecError::InvalidTopicName)
    }

    pub fn flags(&self) -> PublishFlags {
        PublishFlags {
            dup: self.dup,
            qos: self.qos,
            retain: self.retain,
        }
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        PublishFlags::from_bits(self.flags().bits())?;
        Self::check_topic_name(self.version, &self.topic_name, &self.properties)?;

        write_string(buffer, &self.topic_name)?;

        match (self.qos, self.packet_identifier) {
            (QualityOfService::AtMostOnce, None) => {}
            (QualityOfService::AtLeastOnce | QualityOfService::ExactlyOnce, Some(id)) => {
                id.write(buffer)?;
            }
            (QualityOfService::AtMostOnce, Some(_)) => {
                return Err(MqttCodecError::MalformedPacket(
                    "a QoS 0 PUBLISH cannot have a packet identifier",
                )
                .into());
            }
            (_, None) => {
                return Err(MqttCodecError::MalformedPacket(
                    "a PUBLISH with QoS 1 or 2 needs a packet identifier",
                )
                .into());
            }
        }

        write_properties(self.version, &self.properties, buffer, PacketKind::Publish)?;
        buffer.write_slice(&self.payload)
    }

    /// How long the message stays valid after it was received
    ///
    /// `None` means the message never expires, which is always the case for MQTT 3.1.1.
    pub fn message_expiry_interval(&self) -> Option<Duration> {
        if !self.version.is_v5() {
            return None;
        }

        self.properties
            .message_expiry_interval()
            .map(|secs| Duration::from_secs(u64::from(secs)))
    }

    /// The instant after which the message must no longer be delivered
    pub fn expires_at(&self, received_at: SystemTime) -> Option<SystemTime> {
        self.message_expiry_interval()
            .and_then(|interval| received_at.checked_add(interval))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::SystemTime;

    use winnow::Bytes;

    use super::MPublish;
    use crate::error::MqttCodecError;
    use crate::level::ProtocolVersion;
    use crate::properties::Properties;
    use crate::properties::PropertyId;
    use crate::properties::PropertyValue;
    use crate::qos::QualityOfService;
    use crate::topic::TopicError;
    use crate::variable_header::PacketIdentifier;

    fn parse_publish(instance: &MPublish, input: &mut &Bytes) -> Result<MPublish, MqttCodecError> {
        MPublish::parse(instance.version, instance.flags().bits(), input)
    }

    #[test]
    fn roundtrip_qos0_publish() {
        crate::test::make_roundtrip_test!(
            MPublish {
                version: ProtocolVersion::V3_1_1,
                dup: false,
                qos: QualityOfService::AtMostOnce,
                retain: true,
                topic_name: String::from("a/b"),
                packet_identifier: None,
                properties: Properties::new(),
                payload: b"hello".to_vec(),
            },
            parse_publish
        );
    }

    #[test]
    fn roundtrip_v5_publish() {
        crate::test::make_roundtrip_test!(
            MPublish {
                version: ProtocolVersion::V5,
                dup: true,
                qos: QualityOfService::ExactlyOnce,
                retain: false,
                topic_name: String::from("a/b"),
                packet_identifier: PacketIdentifier::new(17),
                properties: Properties::new()
                    .with(PropertyId::ContentType, PropertyValue::Str(String::from("json")))
                    .unwrap()
                    .with(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(1))
                    .unwrap()
                    .with(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(300))
                    .unwrap(),
                payload: Vec::new(),
            },
            parse_publish
        );
    }

    #[test]
    fn check_wildcard_topic_name() {
        let input = [0x0u8, 0x5, b'a', b'/', b'+', b'/', b'c'];

        assert!(matches!(
            MPublish::parse(ProtocolVersion::V3_1_1, 0b0000, &mut Bytes::new(&input)),
            Err(MqttCodecError::InvalidTopicName(TopicError::Wildcard))
        ));
    }

    #[test]
    fn check_topic_alias_allows_empty_topic() {
        let input = [0x0u8, 0x0, 0x3, 0x23, 0x0, 0x5, b'x'];
        let publish = MPublish::parse(ProtocolVersion::V5, 0b0000, &mut Bytes::new(&input)).unwrap();
        assert_eq!(publish.topic_name, "");
        assert_eq!(publish.properties.topic_alias(), Some(5));
        assert_eq!(publish.payload, b"x");

        let input = [0x0u8, 0x0, 0x0, b'x'];
        assert!(matches!(
            MPublish::parse(ProtocolVersion::V5, 0b0000, &mut Bytes::new(&input)),
            Err(MqttCodecError::InvalidTopicName(TopicError::Empty))
        ));
    }

    #[test]
    fn check_packet_identifier_presence() {
        let input = [0x0u8, 0x1, b't', 0x0, 0x0];
        assert!(matches!(
            MPublish::parse(ProtocolVersion::V3_1_1, 0b0010, &mut Bytes::new(&input)),
            Err(MqttCodecError::MalformedPacket(_))
        ));

        let publish = MPublish {
            qos: QualityOfService::AtLeastOnce,
            ..MPublish::new(ProtocolVersion::V3_1_1, "t", "p")
        };
        assert!(matches!(
            publish.write(&mut Vec::<u8>::new()),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }

    #[test]
    fn check_message_expiry() {
        let received_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);

        let mut publish = MPublish::new(ProtocolVersion::V5, "t", "p");
        assert_eq!(publish.expires_at(received_at), None);

        publish
            .properties
            .push(PropertyId::MessageExpiryInterval, PropertyValue::Int(60))
            .unwrap();
        assert_eq!(
            publish.expires_at(received_at),
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1060))
        );

        publish.version = ProtocolVersion::V3_1_1;
        assert_eq!(publish.message_expiry_interval(), None);
    }

    #[test]
    fn check_duplicate_content_type() {
        let input = [
            0x0u8, 0x1, b't', 0x8, 0x03, 0x0, 0x1, b'a', 0x03, 0x0, 0x1, b'b',
        ];

        assert!(matches!(
            MPublish::parse(ProtocolVersion::V5, 0b0000, &mut Bytes::new(&input)),
            Err(MqttCodecError::DuplicateProperty(PropertyId::ContentType))
        ));
    }
}
