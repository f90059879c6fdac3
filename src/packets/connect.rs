//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::binary::parse_binary_data;
use crate::binary::write_binary_data;
use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::integers::parse_u16;
use crate::integers::parse_u8;
use crate::integers::write_u16;
use crate::integers::write_u8;
use crate::level::ProtocolVersion;
use crate::packets::parse_properties;
use crate::packets::write_properties;
use crate::properties::Properties;
use crate::properties::PropertyScope;
use crate::qos::QualityOfService;
use crate::strings::parse_string;
use crate::strings::write_string;
use crate::topic::validate_topic_name;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

const PROTOCOL_NAME: &str = "MQTT";

const USER_NAME_FLAG: u8 = 0b1000_0000;
const PASSWORD_FLAG: u8 = 0b0100_0000;
const WILL_RETAIN_FLAG: u8 = 0b0010_0000;
const WILL_QOS_MASK: u8 = 0b0001_1000;
const WILL_FLAG: u8 = 0b0000_0100;
const CLEAN_START_FLAG: u8 = 0b0000_0010;
const RESERVED_FLAG: u8 = 0b0000_0001;

/// Check the client identifier
///
/// Identifiers consist of ASCII letters, digits, `-` and `_`. An empty identifier asks the server
/// to assign one, which MQTT 3.1.1 only permits for clean sessions.
pub fn validate_client_identifier(
    version: ProtocolVersion,
    client_identifier: &str,
    clean_start: bool,
) -> MResult<()> {
    // Servers must accept [0-9a-zA-Z] and MAY allow more characters [MQTT-3.1.3-5]. `-` and `_`
    // are the extra characters accepted here.
    let valid_chars = client_identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid_chars {
        return Err(MqttCodecError::InvalidClientId);
    }

    if client_identifier.is_empty() && version == ProtocolVersion::V3_1_1 && !clean_start {
        return Err(MqttCodecError::InvalidClientId);
    }

    Ok(())
}

/// The message a server publishes when the client goes away without a DISCONNECT
#[doc = crate::util::md_speclink!("_Toc3901060")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MLastWill {
    pub properties: Properties,
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QualityOfService,
    pub retain: bool,
}

impl MLastWill {
    fn parse(version: ProtocolVersion, qos: QualityOfService, retain: bool, input: &mut &Bytes) -> MResult<Self> {
        let properties = parse_properties(version, input, PropertyScope::Will)?;
        let topic = parse_string(input)?;
        validate_topic_name(topic).map_err(MqttCodecError::InvalidTopicName)?;
        let payload = parse_binary_data(input)?;

        Ok(MLastWill {
            properties,
            topic: topic.to_owned(),
            payload: payload.to_vec(),
            qos,
            retain,
        })
    }

    fn write<W: WriteMqttPacket>(&self, version: ProtocolVersion, buffer: &mut W) -> WResult<W> {
        validate_topic_name(&self.topic).map_err(MqttCodecError::InvalidTopicName)?;

        write_properties(version, &self.properties, buffer, PropertyScope::Will)?;
        write_string(buffer, &self.topic)?;
        write_binary_data(buffer, &self.payload)
    }
}

#[doc = crate::util::md_speclink!("_Toc3901033")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MConnect {
    pub version: ProtocolVersion,
    pub client_identifier: String,
    /// Called clean session in MQTT 3.1.1
    pub clean_start: bool,
    pub keep_alive: u16,
    pub properties: Properties,
    pub will: Option<MLastWill>,
    pub username: Option<String>,
    pub password: Option<Vec<u8>>,
}

impl MConnect {
    /// A CONNECT asking for a clean session, without keep alive, will or credentials
    pub fn new(version: ProtocolVersion, client_identifier: impl Into<String>) -> Self {
        MConnect {
            version,
            client_identifier: client_identifier.into(),
            clean_start: true,
            keep_alive: 0,
            properties: Properties::new(),
            will: None,
            username: None,
            password: None,
        }
    }

    /// Parse the body of a CONNECT
    ///
    /// The protocol version is read from the packet itself.
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        let protocol_name = parse_string(input)?;
        if protocol_name != PROTOCOL_NAME {
            return Err(MqttCodecError::UnsupportedProtocolName(
                protocol_name.to_owned(),
            ));
        }

        let version = ProtocolVersion::parse(input)?;

        let flags = parse_u8(input)?;
        if flags & RESERVED_FLAG != 0 {
            return Err(MqttCodecError::MalformedPacket(
                "the reserved CONNECT flag must be zero",
            ));
        }

        let clean_start = flags & CLEAN_START_FLAG != 0;
        let will_flag = flags & WILL_FLAG != 0;
        let will_retain = flags & WILL_RETAIN_FLAG != 0;
        let will_qos_bits = (flags & WILL_QOS_MASK) >> 3;
        let password_flag = flags & PASSWORD_FLAG != 0;
        let user_name_flag = flags & USER_NAME_FLAG != 0;

        if !will_flag && (will_qos_bits != 0 || will_retain) {
            return Err(MqttCodecError::MalformedPacket(
                "will QoS and will retain must be zero without a will",
            ));
        }

        let will_qos = QualityOfService::from_bits(will_qos_bits, "the will QoS must not be 3")?;

        if version == ProtocolVersion::V3_1_1 && password_flag && !user_name_flag {
            return Err(MqttCodecError::MalformedPacket(
                "a password requires a user name in MQTT 3.1.1",
            ));
        }

        let keep_alive = parse_u16(input)?;
        let properties = parse_properties(version, input, PacketKind::Connect)?;

        let client_identifier = parse_string(input)?;
        validate_client_identifier(version, client_identifier, clean_start)?;

        let will = will_flag
            .then(|| MLastWill::parse(version, will_qos, will_retain, input))
            .transpose()?;

        let username = user_name_flag
            .then(|| parse_string(input).map(str::to_owned))
            .transpose()?;

        let password = password_flag
            .then(|| parse_binary_data(input).map(<[u8]>::to_vec))
            .transpose()?;

        Ok(MConnect {
            version,
            client_identifier: client_identifier.to_owned(),
            clean_start,
            keep_alive,
            properties,
            will,
            username,
            password,
        })
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;

        if self.username.is_some() {
            flags |= USER_NAME_FLAG;
        }

        if self.password.is_some() {
            flags |= PASSWORD_FLAG;
        }

        if let Some(will) = &self.will {
            flags |= WILL_FLAG;
            flags |= u8::from(will.qos) << 3;

            if will.retain {
                flags |= WILL_RETAIN_FLAG;
            }
        }

        if self.clean_start {
            flags |= CLEAN_START_FLAG;
        }

        flags
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        if self.version == ProtocolVersion::V3_1_1 && self.password.is_some() && self.username.is_none() {
            return Err(MqttCodecError::MalformedPacket(
                "a password requires a user name in MQTT 3.1.1",
            )
            .into());
        }

        validate_client_identifier(self.version, &self.client_identifier, self.clean_start)?;

        write_string(buffer, PROTOCOL_NAME)?;
        self.version.write(buffer)?;
        write_u8(buffer, self.flags())?;
        write_u16(buffer, self.keep_alive)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::Connect)?;
        write_string(buffer, &self.client_identifier)?;

        if let Some(will) = &self.will {
            will.write(self.version, buffer)?;
        }

        if let Some(username) = &self.username {
            write_string(buffer, username)?;
        }

        if let Some(password) = &self.password {
            write_binary_data(buffer, password)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::MConnect;
    use super::MLastWill;
    use crate::error::MqttCodecError;
    use crate::level::ProtocolVersion;
    use crate::properties::Properties;
    use crate::properties::PropertyId;
    use crate::properties::PropertyValue;
    use crate::qos::QualityOfService;

    fn parse_connect(_: &MConnect, input: &mut &Bytes) -> Result<MConnect, MqttCodecError> {
        MConnect::parse(input)
    }

    #[test]
    fn roundtrip_v3_connect() {
        crate::test::make_roundtrip_test!(
            MConnect {
                version: ProtocolVersion::V3_1_1,
                client_identifier: String::from("dev-01"),
                clean_start: true,
                keep_alive: 60,
                properties: Properties::new(),
                will: None,
                username: None,
                password: None,
            },
            parse_connect
        );
    }

    #[test]
    fn roundtrip_v5_connect_with_everything() {
        crate::test::make_roundtrip_test!(
            MConnect {
                version: ProtocolVersion::V5,
                client_identifier: String::from("sensor_7"),
                clean_start: false,
                keep_alive: 0xFFFF,
                properties: Properties::new()
                    .with(PropertyId::SessionExpiryInterval, PropertyValue::Int(120))
                    .unwrap()
                    .with(PropertyId::ReceiveMaximum, PropertyValue::Short(20))
                    .unwrap(),
                will: Some(MLastWill {
                    properties: Properties::new()
                        .with(PropertyId::WillDelayInterval, PropertyValue::Int(5))
                        .unwrap(),
                    topic: String::from("sensors/7/status"),
                    payload: b"offline".to_vec(),
                    qos: QualityOfService::AtLeastOnce,
                    retain: true,
                }),
                username: Some(String::from("user")),
                password: Some(b"secret".to_vec()),
            },
            parse_connect
        );
    }

    #[test]
    fn check_v3_connect_bytes() {
        let connect = MConnect {
            keep_alive: 60,
            ..MConnect::new(ProtocolVersion::V3_1_1, "dev-01")
        };

        let mut buffer = Vec::new();
        connect.write(&mut buffer).unwrap();

        assert_eq!(
            buffer,
            [
                0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x3C, 0x00, 0x06, b'd', b'e',
                b'v', b'-', b'0', b'1'
            ]
        );
    }

    fn connect_body(version: u8, flags: u8, client_identifier: &[u8], rest: &[u8]) -> Vec<u8> {
        let mut body = vec![0x00, 0x04, b'M', b'Q', b'T', b'T', version, flags, 0x00, 0x0A];
        if version == 5 {
            body.push(0x00);
        }
        body.extend_from_slice(&(client_identifier.len() as u16).to_be_bytes());
        body.extend_from_slice(client_identifier);
        body.extend_from_slice(rest);
        body
    }

    #[test]
    fn check_password_without_username() {
        let password = [0x00, 0x02, b'p', b'w'];

        let v3 = connect_body(4, 0b0100_0010, b"c", &password);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&v3)),
            Err(MqttCodecError::MalformedPacket(_))
        ));

        let v5 = connect_body(5, 0b0100_0010, b"c", &password);
        let connect = MConnect::parse(&mut Bytes::new(&v5)).unwrap();
        assert_eq!(connect.username, None);
        assert_eq!(connect.password, Some(b"pw".to_vec()));
    }

    #[test]
    fn check_empty_client_identifier() {
        let clean = connect_body(4, 0b0000_0010, b"", &[]);
        assert_eq!(
            MConnect::parse(&mut Bytes::new(&clean))
                .unwrap()
                .client_identifier,
            ""
        );

        let persistent = connect_body(4, 0b0000_0000, b"", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&persistent)),
            Err(MqttCodecError::InvalidClientId)
        ));

        let v5 = connect_body(5, 0b0000_0000, b"", &[]);
        assert!(MConnect::parse(&mut Bytes::new(&v5)).is_ok());
    }

    #[test]
    fn check_client_identifier_charset() {
        let body = connect_body(4, 0b0000_0010, b"dev/01", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&body)),
            Err(MqttCodecError::InvalidClientId)
        ));

        let body = connect_body(4, 0b0000_0010, b"dev_01-A", &[]);
        assert!(MConnect::parse(&mut Bytes::new(&body)).is_ok());
    }

    #[test]
    fn check_connect_flags() {
        let reserved = connect_body(4, 0b0000_0011, b"c", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&reserved)),
            Err(MqttCodecError::MalformedPacket(_))
        ));

        let will_qos_without_will = connect_body(4, 0b0000_1010, b"c", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&will_qos_without_will)),
            Err(MqttCodecError::MalformedPacket(_))
        ));

        let will_qos_3 = connect_body(4, 0b0001_1110, b"c", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&will_qos_3)),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }

    #[test]
    fn check_protocol_name_and_level() {
        let mut body = connect_body(4, 0b0000_0010, b"c", &[]);
        body[2] = b'X';
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&body)),
            Err(MqttCodecError::UnsupportedProtocolName(name)) if name == "XQTT"
        ));

        let body = connect_body(3, 0b0000_0010, b"c", &[]);
        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&body)),
            Err(MqttCodecError::UnsupportedProtocolVersion(3))
        ));
    }

    #[test]
    fn check_will_topic_is_validated() {
        let will = [0x00, 0x03, b'a', b'/', b'#', 0x00, 0x00];
        let body = connect_body(4, 0b0000_0110, b"c", &will);

        assert!(matches!(
            MConnect::parse(&mut Bytes::new(&body)),
            Err(MqttCodecError::InvalidTopicName(_))
        ));
    }
}
