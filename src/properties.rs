//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! MQTT 5.0 properties
//!
//! Every property identifier has one fixed wire type and a set of places it may appear in. Both
//! are kept in the single table passed to `define_properties!` below, which generates the
//! lookups used by the decoder and encoder.

use std::collections::BTreeMap;

use winnow::combinator::eof;
use winnow::combinator::repeat_till;
use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::binary::parse_binary_data;
use crate::binary::parse_slice;
use crate::binary::write_binary_data;
use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::integers::parse_u16;
use crate::integers::parse_u32;
use crate::integers::parse_u8;
use crate::integers::parse_variable_u32;
use crate::integers::write_u16;
use crate::integers::write_u32;
use crate::integers::write_u8;
use crate::integers::write_variable_u32;
use crate::strings::parse_string;
use crate::strings::parse_string_pair;
use crate::strings::write_string;
use crate::strings::write_string_pair;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// How the value of a property is encoded
#[doc = crate::util::md_speclink!("_Toc3901006")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Byte,
    TwoByteInteger,
    FourByteInteger,
    VariableByteInteger,
    Utf8String,
    Utf8StringPair,
    BinaryData,
}

/// Where a property block is located
///
/// Besides the packet kinds there is the will properties block inside CONNECT, which has an
/// allow-list of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyScope {
    Connect,
    Will,
    ConnAck,
    Publish,
    PubAck,
    PubRec,
    PubRel,
    PubComp,
    Subscribe,
    SubAck,
    Unsubscribe,
    UnsubAck,
    PingReq,
    PingResp,
    Disconnect,
    Auth,
}

impl From<PacketKind> for PropertyScope {
    fn from(kind: PacketKind) -> Self {
        match kind {
            PacketKind::Connect => PropertyScope::Connect,
            PacketKind::ConnAck => PropertyScope::ConnAck,
            PacketKind::Publish => PropertyScope::Publish,
            PacketKind::PubAck => PropertyScope::PubAck,
            PacketKind::PubRec => PropertyScope::PubRec,
            PacketKind::PubRel => PropertyScope::PubRel,
            PacketKind::PubComp => PropertyScope::PubComp,
            PacketKind::Subscribe => PropertyScope::Subscribe,
            PacketKind::SubAck => PropertyScope::SubAck,
            PacketKind::Unsubscribe => PropertyScope::Unsubscribe,
            PacketKind::UnsubAck => PropertyScope::UnsubAck,
            PacketKind::PingReq => PropertyScope::PingReq,
            PacketKind::PingResp => PropertyScope::PingResp,
            PacketKind::Disconnect => PropertyScope::Disconnect,
            PacketKind::Auth => PropertyScope::Auth,
        }
    }
}

impl core::fmt::Display for PropertyScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PropertyScope::Connect => write!(f, "a {} packet", PacketKind::Connect),
            PropertyScope::Will => f.write_str("the will properties"),
            PropertyScope::ConnAck => write!(f, "a {} packet", PacketKind::ConnAck),
            PropertyScope::Publish => write!(f, "a {} packet", PacketKind::Publish),
            PropertyScope::PubAck => write!(f, "a {} packet", PacketKind::PubAck),
            PropertyScope::PubRec => write!(f, "a {} packet", PacketKind::PubRec),
            PropertyScope::PubRel => write!(f, "a {} packet", PacketKind::PubRel),
            PropertyScope::PubComp => write!(f, "a {} packet", PacketKind::PubComp),
            PropertyScope::Subscribe => write!(f, "a {} packet", PacketKind::Subscribe),
            PropertyScope::SubAck => write!(f, "a {} packet", PacketKind::SubAck),
            PropertyScope::Unsubscribe => write!(f, "an {} packet", PacketKind::Unsubscribe),
            PropertyScope::UnsubAck => write!(f, "an {} packet", PacketKind::UnsubAck),
            PropertyScope::PingReq => write!(f, "a {} packet", PacketKind::PingReq),
            PropertyScope::PingResp => write!(f, "a {} packet", PacketKind::PingResp),
            PropertyScope::Disconnect => write!(f, "a {} packet", PacketKind::Disconnect),
            PropertyScope::Auth => write!(f, "an {} packet", PacketKind::Auth),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repetition {
    Once,
    Many,
}

macro_rules! define_properties {
    ($(
        $(#[$meta:meta])*
        $name:ident = $id:literal => $wire:ident {
            once: [$($once:ident),* $(,)?],
            many: [$($many:ident),* $(,)?] $(,)?
        }
    ),* $(,)?) => {
        #[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum PropertyId {
            $( $(#[$meta])* $name = $id, )*
        }

        impl PropertyId {
            pub const ALL: &'static [PropertyId] = &[ $( PropertyId::$name, )* ];

            /// The wire type values of this property are encoded with
            pub const fn wire_type(self) -> WireType {
                match self {
                    $( PropertyId::$name => WireType::$wire, )*
                }
            }

            fn repetition(self, scope: PropertyScope) -> Option<Repetition> {
                match self {
                    $(
                        PropertyId::$name => match scope {
                            $( PropertyScope::$once => Some(Repetition::Once), )*
                            $( PropertyScope::$many => Some(Repetition::Many), )*
                            #[allow(unreachable_patterns)]
                            _ => None,
                        },
                    )*
                }
            }
        }
    };
}

define_properties! {
    PayloadFormatIndicator = 0x01 => Byte {
        once: [Publish, Will],
        many: [],
    },
    MessageExpiryInterval = 0x02 => FourByteInteger {
        once: [Publish, Will],
        many: [],
    },
    ContentType = 0x03 => Utf8String {
        once: [Publish, Will],
        many: [],
    },
    ResponseTopic = 0x08 => Utf8String {
        once: [Publish, Will],
        many: [],
    },
    CorrelationData = 0x09 => BinaryData {
        once: [Publish, Will],
        many: [],
    },
    SubscriptionIdentifier = 0x0B => VariableByteInteger {
        once: [Subscribe],
        many: [Publish],
    },
    SessionExpiryInterval = 0x11 => FourByteInteger {
        once: [Connect, ConnAck, Disconnect],
        many: [],
    },
    AssignedClientIdentifier = 0x12 => Utf8String {
        once: [ConnAck],
        many: [],
    },
    ServerKeepAlive = 0x13 => TwoByteInteger {
        once: [ConnAck],
        many: [],
    },
    AuthenticationMethod = 0x15 => Utf8String {
        once: [Connect, ConnAck, Auth],
        many: [],
    },
    AuthenticationData = 0x16 => BinaryData {
        once: [Connect, ConnAck, Auth],
        many: [],
    },
    RequestProblemInformation = 0x17 => Byte {
        once: [Connect],
        many: [],
    },
    WillDelayInterval = 0x18 => FourByteInteger {
        once: [Will],
        many: [],
    },
    RequestResponseInformation = 0x19 => Byte {
        once: [Connect],
        many: [],
    },
    ResponseInformation = 0x1A => Utf8String {
        once: [ConnAck],
        many: [],
    },
    ServerReference = 0x1C => Utf8String {
        once: [ConnAck, Disconnect],
        many: [],
    },
    ReasonString = 0x1F => Utf8String {
        once: [ConnAck, PubAck, PubRec, PubRel, PubComp, SubAck, UnsubAck, Disconnect, Auth],
        many: [],
    },
    ReceiveMaximum = 0x21 => TwoByteInteger {
        once: [Connect, ConnAck],
        many: [],
    },
    TopicAliasMaximum = 0x22 => TwoByteInteger {
        once: [Connect, ConnAck],
        many: [],
    },
    TopicAlias = 0x23 => TwoByteInteger {
        once: [Publish],
        many: [],
    },
    MaximumQoS = 0x24 => Byte {
        once: [ConnAck],
        many: [],
    },
    RetainAvailable = 0x25 => Byte {
        once: [ConnAck],
        many: [],
    },
    UserProperty = 0x26 => Utf8StringPair {
        once: [],
        many: [
            Connect, Will, ConnAck, Publish, PubAck, PubRec, PubRel, PubComp, Subscribe, SubAck,
            Unsubscribe, UnsubAck, Disconnect, Auth,
        ],
    },
    MaximumPacketSize = 0x27 => FourByteInteger {
        once: [Connect, ConnAck],
        many: [],
    },
    WildcardSubscriptionAvailable = 0x28 => Byte {
        once: [ConnAck],
        many: [],
    },
    SubscriptionIdentifiersAvailable = 0x29 => Byte {
        once: [ConnAck],
        many: [],
    },
    SharedSubscriptionAvailable = 0x2A => Byte {
        once: [ConnAck],
        many: [],
    },
}

impl PropertyId {
    /// Whether this property may appear in the given place at all
    pub fn is_allowed(self, scope: impl Into<PropertyScope>) -> bool {
        self.repetition(scope.into()).is_some()
    }

    /// Whether this property may appear more than once in the given place
    pub fn allows_duplicates(self, scope: impl Into<PropertyScope>) -> bool {
        self.repetition(scope.into()) == Some(Repetition::Many)
    }

    fn from_raw(id: u32) -> MResult<Self> {
        u8::try_from(id)
            .ok()
            .and_then(|id| PropertyId::try_from(id).ok())
            .ok_or(MqttCodecError::UnknownPropertyId(id))
    }
}

/// Look up the wire type of a raw property identifier
pub fn property_wire_type(id: u32) -> MResult<WireType> {
    PropertyId::from_raw(id).map(PropertyId::wire_type)
}

/// A single property value, tagged with its wire type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Byte(u8),
    Short(u16),
    Int(u32),
    VarInt(u32),
    Str(String),
    StrPair(String, String),
    Bytes(Vec<u8>),
}

impl PropertyValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            PropertyValue::Byte(_) => WireType::Byte,
            PropertyValue::Short(_) => WireType::TwoByteInteger,
            PropertyValue::Int(_) => WireType::FourByteInteger,
            PropertyValue::VarInt(_) => WireType::VariableByteInteger,
            PropertyValue::Str(_) => WireType::Utf8String,
            PropertyValue::StrPair(_, _) => WireType::Utf8StringPair,
            PropertyValue::Bytes(_) => WireType::BinaryData,
        }
    }

    fn parse(wire_type: WireType, input: &mut &Bytes) -> MResult<Self> {
        Ok(match wire_type {
            WireType::Byte => PropertyValue::Byte(parse_u8(input)?),
            WireType::TwoByteInteger => PropertyValue::Short(parse_u16(input)?),
            WireType::FourByteInteger => PropertyValue::Int(parse_u32(input)?),
            WireType::VariableByteInteger => PropertyValue::VarInt(parse_variable_u32(input)?),
            WireType::Utf8String => PropertyValue::Str(parse_string(input)?.to_owned()),
            WireType::Utf8StringPair => {
                let (key, value) = parse_string_pair(input)?;
                PropertyValue::StrPair(key.to_owned(), value.to_owned())
            }
            WireType::BinaryData => PropertyValue::Bytes(parse_binary_data(input)?.to_vec()),
        })
    }

    fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        match self {
            PropertyValue::Byte(b) => write_u8(buffer, *b),
            PropertyValue::Short(s) => write_u16(buffer, *s),
            PropertyValue::Int(i) => write_u32(buffer, *i),
            PropertyValue::VarInt(i) => write_variable_u32(buffer, *i),
            PropertyValue::Str(s) => write_string(buffer, s),
            PropertyValue::StrPair(key, value) => write_string_pair(buffer, key, value),
            PropertyValue::Bytes(data) => write_binary_data(buffer, data),
        }
    }
}

/// The properties of a single packet or will message
///
/// Values of an identifier are kept in the order they were added or decoded.
#[doc = crate::util::md_speclink!("_Toc3901027")]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<PropertyId, Vec<PropertyValue>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a value for `id`
    ///
    /// The value has to carry the wire type of the identifier. Whether the identifier may be
    /// repeated depends on the packet, and is checked when the properties are written.
    pub fn push(&mut self, id: PropertyId, value: PropertyValue) -> MResult<&mut Self> {
        check_value(id, &value)?;

        self.entries.entry(id).or_default().push(value);
        Ok(self)
    }

    /// Like [`Properties::push`], replacing any values already stored for `id`
    pub fn set(&mut self, id: PropertyId, value: PropertyValue) -> MResult<&mut Self> {
        check_value(id, &value)?;
        self.entries.remove(&id);
        self.push(id, value)
    }

    pub fn with(mut self, id: PropertyId, value: PropertyValue) -> MResult<Self> {
        self.push(id, value)?;
        Ok(self)
    }

    pub fn remove(&mut self, id: PropertyId) -> Vec<PropertyValue> {
        self.entries.remove(&id).unwrap_or_default()
    }

    /// The first value stored for `id`
    pub fn get(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.get_all(id).first()
    }

    pub fn get_all(&self, id: PropertyId) -> &[PropertyValue] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue)> {
        self.entries
            .iter()
            .flat_map(|(id, values)| values.iter().map(move |value| (*id, value)))
    }

    fn get_u16(&self, id: PropertyId) -> Option<u16> {
        match self.get(id)? {
            PropertyValue::Short(s) => Some(*s),
            _ => None,
        }
    }

    fn get_u32(&self, id: PropertyId) -> Option<u32> {
        match self.get(id)? {
            PropertyValue::Int(i) | PropertyValue::VarInt(i) => Some(*i),
            _ => None,
        }
    }

    fn get_str(&self, id: PropertyId) -> Option<&str> {
        match self.get(id)? {
            PropertyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    #[doc = crate::util::md_speclink!("_Toc3901112")]
    pub fn message_expiry_interval(&self) -> Option<u32> {
        self.get_u32(PropertyId::MessageExpiryInterval)
    }

    pub fn session_expiry_interval(&self) -> Option<u32> {
        self.get_u32(PropertyId::SessionExpiryInterval)
    }

    pub fn maximum_packet_size(&self) -> Option<u32> {
        self.get_u32(PropertyId::MaximumPacketSize)
    }

    pub fn topic_alias(&self) -> Option<u16> {
        self.get_u16(PropertyId::TopicAlias)
    }

    pub fn receive_maximum(&self) -> Option<u16> {
        self.get_u16(PropertyId::ReceiveMaximum)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_str(PropertyId::ContentType)
    }

    pub fn reason_string(&self) -> Option<&str> {
        self.get_str(PropertyId::ReasonString)
    }

    pub fn authentication_method(&self) -> Option<&str> {
        self.get_str(PropertyId::AuthenticationMethod)
    }

    pub fn subscription_identifiers(&self) -> impl Iterator<Item = u32> + '_ {
        self.get_all(PropertyId::SubscriptionIdentifier)
            .iter()
            .filter_map(|value| match value {
                PropertyValue::VarInt(i) => Some(*i),
                _ => None,
            })
    }

    pub fn user_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.get_all(PropertyId::UserProperty)
            .iter()
            .filter_map(|value| match value {
                PropertyValue::StrPair(key, value) => Some((key.as_str(), value.as_str())),
                _ => None,
            })
    }

    pub fn parse(input: &mut &Bytes, scope: impl Into<PropertyScope>) -> MResult<Self> {
        let scope = scope.into();
        let length = parse_variable_u32(input)?;
        let block = parse_slice(input, length as usize).map_err(|err| match err {
            MqttCodecError::Truncated => MqttCodecError::MalformedProperties,
            err => err,
        })?;

        Self::parse_block(&mut Bytes::new(block), scope).map_err(|err| match err {
            MqttCodecError::Truncated | MqttCodecError::VarintOverflow => {
                MqttCodecError::MalformedProperties
            }
            err => err,
        })
    }

    fn parse_block(block: &mut &Bytes, scope: PropertyScope) -> MResult<Self> {
        trace("Properties", |block: &mut &Bytes| {
            let (entries, _): (Vec<(PropertyId, PropertyValue)>, _) = repeat_till(
                0..,
                |block: &mut &Bytes| Self::parse_property(block, scope),
                eof,
            )
            .parse_next(block)?;

            entries
                .into_iter()
                .try_fold(Properties::new(), |mut properties, (id, value)| {
                    let values = properties.entries.entry(id).or_default();
                    if id.repetition(scope) == Some(Repetition::Once) && !values.is_empty() {
                        return Err(MqttCodecError::DuplicateProperty(id));
                    }

                    values.push(value);
                    Ok(properties)
                })
        })
        .parse_next(block)
    }

    fn parse_property(
        block: &mut &Bytes,
        scope: PropertyScope,
    ) -> MResult<(PropertyId, PropertyValue)> {
        trace("Property", |block: &mut &Bytes| {
            let id = PropertyId::from_raw(parse_variable_u32(block)?)?;
            if id.repetition(scope).is_none() {
                return Err(MqttCodecError::PropertyNotAllowedForKind { id, scope });
            }

            let value = PropertyValue::parse(id.wire_type(), block)?;
            check_value(id, &value)?;

            Ok((id, value))
        })
        .parse_next(block)
    }

    pub fn write<W: WriteMqttPacket>(
        &self,
        buffer: &mut W,
        scope: impl Into<PropertyScope>,
    ) -> WResult<W> {
        let scope = scope.into();
        let mut block = Vec::new();

        for (id, values) in &self.entries {
            let repetition = id.repetition(scope).ok_or(MqttCodecError::PropertyNotAllowedForKind {
                id: *id,
                scope,
            })?;

            if repetition == Repetition::Once && values.len() > 1 {
                return Err(MqttCodecError::DuplicateProperty(*id).into());
            }

            for value in values {
                check_value(*id, value)?;

                write_variable_u32(&mut block, u32::from(u8::from(*id)))?;
                value.write(&mut block)?;
            }
        }

        let length = u32::try_from(block.len()).map_err(|_| MqttCodecError::VarintOverflow)?;
        write_variable_u32(buffer, length)?;
        buffer.write_slice(&block)
    }
}

fn check_value(id: PropertyId, value: &PropertyValue) -> MResult<()> {
    if value.wire_type() != id.wire_type() {
        return Err(MqttCodecError::PropertyTypeMismatch(id));
    }

    if id == PropertyId::SubscriptionIdentifier && *value == PropertyValue::VarInt(0) {
        return Err(MqttCodecError::ProtocolError(
            "subscription identifier must not be zero",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use winnow::Bytes;

    use super::property_wire_type;
    use super::Properties;
    use super::PropertyId;
    use super::PropertyScope;
    use super::PropertyValue;
    use super::WireType;
    use crate::error::MqttCodecError;
    use crate::fixed_header::PacketKind;

    fn parse(input: &[u8], scope: PropertyScope) -> Result<Properties, MqttCodecError> {
        Properties::parse(&mut Bytes::new(input), scope)
    }

    #[test]
    fn check_wire_types() {
        assert_eq!(property_wire_type(0x01).unwrap(), WireType::Byte);
        assert_eq!(property_wire_type(0x0B).unwrap(), WireType::VariableByteInteger);
        assert_eq!(property_wire_type(0x23).unwrap(), WireType::TwoByteInteger);
        assert_eq!(property_wire_type(0x26).unwrap(), WireType::Utf8StringPair);
        assert_eq!(property_wire_type(0x16).unwrap(), WireType::BinaryData);
        assert!(matches!(
            property_wire_type(0x04),
            Err(MqttCodecError::UnknownPropertyId(0x04))
        ));
        assert!(matches!(
            property_wire_type(0x126),
            Err(MqttCodecError::UnknownPropertyId(0x126))
        ));
        assert_eq!(PropertyId::ALL.len(), 27);
    }

    #[test]
    fn check_allow_list() {
        assert!(PropertyId::TopicAlias.is_allowed(PacketKind::Publish));
        assert!(!PropertyId::TopicAlias.is_allowed(PacketKind::Connect));
        assert!(PropertyId::WillDelayInterval.is_allowed(PropertyScope::Will));
        assert!(!PropertyId::WillDelayInterval.is_allowed(PacketKind::Publish));
        assert!(!PropertyId::ReasonString.is_allowed(PacketKind::Publish));

        assert!(PropertyId::UserProperty.allows_duplicates(PacketKind::Auth));
        assert!(PropertyId::SubscriptionIdentifier.allows_duplicates(PacketKind::Publish));
        assert!(!PropertyId::SubscriptionIdentifier.allows_duplicates(PacketKind::Subscribe));
        assert!(!PropertyId::ContentType.allows_duplicates(PacketKind::Publish));

        for id in PropertyId::ALL {
            assert!(!id.is_allowed(PacketKind::PingReq));
            assert!(!id.is_allowed(PacketKind::PingResp));
        }
    }

    #[test]
    fn check_empty_properties() {
        let props = parse(&[0x0], PropertyScope::Publish).unwrap();
        assert!(props.is_empty());

        let mut buffer = Vec::new();
        props.write(&mut buffer, PacketKind::Publish).unwrap();
        assert_eq!(buffer, [0x0]);
    }

    #[test]
    fn check_roundtrip_properties() {
        let props = Properties::new()
            .with(PropertyId::PayloadFormatIndicator, PropertyValue::Byte(1))
            .unwrap()
            .with(PropertyId::MessageExpiryInterval, PropertyValue::Int(3600))
            .unwrap()
            .with(PropertyId::ContentType, PropertyValue::Str("text/plain".into()))
            .unwrap()
            .with(PropertyId::CorrelationData, PropertyValue::Bytes(vec![1, 2, 3]))
            .unwrap()
            .with(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(200))
            .unwrap()
            .with(PropertyId::TopicAlias, PropertyValue::Short(7))
            .unwrap()
            .with(
                PropertyId::UserProperty,
                PropertyValue::StrPair("a".into(), "1".into()),
            )
            .unwrap();

        let mut buffer = Vec::new();
        props.write(&mut buffer, PacketKind::Publish).unwrap();

        let parsed = parse(&buffer, PropertyScope::Publish).unwrap();
        assert_eq!(parsed, props);
        assert_eq!(parsed.message_expiry_interval(), Some(3600));
        assert_eq!(parsed.content_type(), Some("text/plain"));
        assert_eq!(parsed.topic_alias(), Some(7));
        assert_eq!(parsed.subscription_identifiers().collect::<Vec<_>>(), [200]);
    }

    #[test]
    fn check_duplicate_content_type() {
        let input = [
            0x0A, 0x03, 0x0, 0x3, b'a', b'/', b'b', 0x03, 0x0, 0x1, b'c',
        ];

        assert!(matches!(
            parse(&input, PropertyScope::Publish),
            Err(MqttCodecError::DuplicateProperty(PropertyId::ContentType))
        ));
    }

    #[test]
    fn check_repeated_user_properties_keep_order() {
        let input = [
            0x10, 0x26, 0x0, 0x1, b'k', 0x0, 0x2, b'v', b'1', 0x26, 0x0, 0x1, b'k', 0x0, 0x2,
            b'v', b'2',
        ];

        let props = parse(&input, PropertyScope::Publish).unwrap();
        assert_eq!(
            props.user_properties().collect::<Vec<_>>(),
            [("k", "v1"), ("k", "v2")]
        );

        let mut buffer = Vec::new();
        props.write(&mut buffer, PacketKind::Publish).unwrap();
        assert_eq!(buffer, input);
    }

    #[test]
    fn check_not_allowed_property() {
        let input = [0x02, 0x23, 0x0];

        assert!(matches!(
            parse(&[0x03, 0x23, 0x0, 0x1], PropertyScope::Connect),
            Err(MqttCodecError::PropertyNotAllowedForKind {
                id: PropertyId::TopicAlias,
                scope: PropertyScope::Connect,
            })
        ));
        assert!(matches!(
            parse(&input, PropertyScope::Publish),
            Err(MqttCodecError::MalformedProperties)
        ));
    }

    #[test]
    fn check_unknown_property() {
        assert!(matches!(
            parse(&[0x02, 0x04, 0x0], PropertyScope::Publish),
            Err(MqttCodecError::UnknownPropertyId(0x04))
        ));
    }

    #[test]
    fn check_block_length_mismatch() {
        // Declared length runs past the end of the input
        assert!(matches!(
            parse(&[0x05, 0x01, 0x01], PropertyScope::Publish),
            Err(MqttCodecError::MalformedProperties)
        ));

        // Declared length ends inside of a value
        assert!(matches!(
            parse(&[0x03, 0x02, 0x00, 0x00, 0x00, 0x10], PropertyScope::Publish),
            Err(MqttCodecError::MalformedProperties)
        ));
    }

    #[test]
    fn check_zero_subscription_identifier() {
        assert!(matches!(
            parse(&[0x02, 0x0B, 0x00], PropertyScope::Subscribe),
            Err(MqttCodecError::ProtocolError(_))
        ));

        let mut props = Properties::new();
        assert!(matches!(
            props.push(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(0)),
            Err(MqttCodecError::ProtocolError(_))
        ));
        assert!(matches!(
            props.set(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(0)),
            Err(MqttCodecError::ProtocolError(_))
        ));
        assert!(props.is_empty());
    }

    #[test]
    fn check_write_validation() {
        let mut props = Properties::new();
        assert!(matches!(
            props.push(PropertyId::TopicAlias, PropertyValue::Int(5)),
            Err(MqttCodecError::PropertyTypeMismatch(PropertyId::TopicAlias))
        ));

        props
            .push(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(1))
            .unwrap()
            .push(PropertyId::SubscriptionIdentifier, PropertyValue::VarInt(2))
            .unwrap();

        let mut buffer = Vec::new();
        props.write(&mut buffer, PacketKind::Publish).unwrap();

        let mut buffer = Vec::new();
        assert!(matches!(
            props.write(&mut buffer, PacketKind::Subscribe),
            Err(MqttCodecError::DuplicateProperty(
                PropertyId::SubscriptionIdentifier
            ))
        ));
        assert!(matches!(
            props.write(&mut buffer, PacketKind::Connect),
            Err(MqttCodecError::PropertyNotAllowedForKind { .. })
        ));
    }
}
