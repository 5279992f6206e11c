use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Tunnel Endpoint Identifier.  Allocated by the control plane; one per
/// direction of an active user-plane tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Teid(pub u32);

impl std::fmt::Display for Teid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// GTP-U message types - TS29.281, table 6.1-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    EchoRequest = 1,
    EchoResponse = 2,
    ErrorIndication = 26,
    SupportedExtensionHeaders = 31,
    EndMarker = 254,
    GPdu = 255,
}

impl MessageType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::EchoRequest),
            2 => Some(Self::EchoResponse),
            26 => Some(Self::ErrorIndication),
            31 => Some(Self::SupportedExtensionHeaders),
            254 => Some(Self::EndMarker),
            255 => Some(Self::GPdu),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GtpuError {
    #[error("buffer too short for GTP-U header: need {needed} bytes, have {available}")]
    TooShort { needed: usize, available: usize },
    #[error("unsupported GTP version {0}")]
    Version(u8),
    #[error("not a GTP-U packet (GTP' protocol type)")]
    ProtocolType,
    #[error("unknown message type {0}")]
    MessageType(u8),
    #[error("length field declares {declared} bytes, only {available} follow the mandatory header")]
    Length { declared: usize, available: usize },
    #[error("extension header with length 0")]
    ZeroExtensionLength,
    #[error("extension header declares {declared} bytes, only {available} left")]
    TruncatedExtension { declared: usize, available: usize },
}

/// One extension header as carried on the wire: the type octet announced by
/// the previous element of the chain, plus the content between the length
/// octet and the trailing next-type octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeader {
    pub ext_type: u8,
    pub content: Bytes,
}

impl ExtensionHeader {
    /// Build an extension header, zero-padding the content so the wire size
    /// (length octet + content + next-type octet) is a multiple of 4 as
    /// TS29.281 5.2.1 requires.
    pub fn new(ext_type: u8, content: impl Into<Bytes>) -> Self {
        let content: Bytes = content.into();
        let mut padded = BytesMut::from(&content[..]);
        while padded.len() % 4 != 2 {
            padded.put_u8(0);
        }
        Self {
            ext_type,
            content: padded.freeze(),
        }
    }

    fn wire_len(&self) -> usize {
        self.content.len() + 2
    }
}

/// A GTP-U header plus payload.
///
/// The mandatory part is 8 bytes: flags, message type, 16-bit length and the
/// 32-bit TEID.  If any of the E/S/PN flag bits is set, a 4-byte tail
/// follows (sequence number, N-PDU number, first extension type), then the
/// extension header chain.  The length field counts every byte after the
/// mandatory 8, optional fields included - TS29.281, 5.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtpuHeader {
    pub message_type: MessageType,
    pub teid: Teid,
    pub sequence_number: Option<u16>,
    pub n_pdu_number: Option<u8>,
    pub extensions: Vec<ExtensionHeader>,
    pub payload: Bytes,
}

impl GtpuHeader {
    pub const MANDATORY_LEN: usize = 8;

    /// A G-PDU carrying user payload, no optional fields.
    pub fn gpdu(teid: Teid, payload: impl Into<Bytes>) -> Self {
        Self {
            message_type: MessageType::GPdu,
            teid,
            sequence_number: None,
            n_pdu_number: None,
            extensions: Vec::new(),
            payload: payload.into(),
        }
    }

    pub fn with_sequence_number(mut self, seq: u16) -> Self {
        self.sequence_number = Some(seq);
        self
    }

    pub fn with_n_pdu_number(mut self, n_pdu: u8) -> Self {
        self.n_pdu_number = Some(n_pdu);
        self
    }

    pub fn with_extension(mut self, ext: ExtensionHeader) -> Self {
        self.extensions.push(ext);
        self
    }

    fn has_optional_fields(&self) -> bool {
        self.sequence_number.is_some()
            || self.n_pdu_number.is_some()
            || !self.extensions.is_empty()
    }

    /// Number of header bytes actually serialized, i.e. what a decoder
    /// strips before the payload.
    pub fn header_len(&self) -> usize {
        let mut len = Self::MANDATORY_LEN;
        if self.has_optional_fields() {
            len += 4;
            for ext in &self.extensions {
                len += ext.wire_len();
            }
        }
        len
    }

    fn length_field(&self) -> usize {
        self.header_len() - Self::MANDATORY_LEN + self.payload.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.header_len() + self.payload.len());

        let mut flags = 0b001_1_0_0_0_0u8; // version=1, PT=1 (GTP-U)
        if !self.extensions.is_empty() {
            flags |= 0b100;
        }
        if self.sequence_number.is_some() {
            flags |= 0b010;
        }
        if self.n_pdu_number.is_some() {
            flags |= 0b001;
        }
        buf.put_u8(flags);
        buf.put_u8(self.message_type as u8);
        buf.put_u16(self.length_field() as u16);
        buf.put_u32(self.teid.0);

        if self.has_optional_fields() {
            buf.put_u16(self.sequence_number.unwrap_or(0));
            buf.put_u8(self.n_pdu_number.unwrap_or(0));
            buf.put_u8(self.extensions.first().map_or(0, |e| e.ext_type));
            for (i, ext) in self.extensions.iter().enumerate() {
                buf.put_u8((ext.wire_len() / 4) as u8);
                buf.put_slice(&ext.content);
                buf.put_u8(self.extensions.get(i + 1).map_or(0, |e| e.ext_type));
            }
        }

        buf.put_slice(&self.payload);
        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self, GtpuError> {
        if data.len() < Self::MANDATORY_LEN {
            return Err(GtpuError::TooShort {
                needed: Self::MANDATORY_LEN,
                available: data.len(),
            });
        }

        let mut buf = data;
        let flags = buf.get_u8();
        let version = flags >> 5;
        if version != 1 {
            return Err(GtpuError::Version(version));
        }
        if flags & 0b1_0000 == 0 {
            return Err(GtpuError::ProtocolType);
        }
        let raw_type = buf.get_u8();
        let message_type =
            MessageType::from_u8(raw_type).ok_or(GtpuError::MessageType(raw_type))?;
        let length = buf.get_u16() as usize;
        let teid = Teid(buf.get_u32());

        if length > buf.remaining() {
            return Err(GtpuError::Length {
                declared: length,
                available: buf.remaining(),
            });
        }

        let mut sequence_number = None;
        let mut n_pdu_number = None;
        let mut extensions = Vec::new();
        let mut optional_len = 0usize;

        if flags & 0b111 != 0 {
            if buf.remaining() < 4 {
                return Err(GtpuError::TooShort {
                    needed: Self::MANDATORY_LEN + 4,
                    available: data.len(),
                });
            }
            let seq = buf.get_u16();
            let n_pdu = buf.get_u8();
            let mut next_type = buf.get_u8();
            optional_len += 4;

            if flags & 0b010 != 0 {
                sequence_number = Some(seq);
            }
            if flags & 0b001 != 0 {
                n_pdu_number = Some(n_pdu);
            }

            while next_type != 0 {
                if !buf.has_remaining() {
                    return Err(GtpuError::TruncatedExtension {
                        declared: 4,
                        available: 0,
                    });
                }
                let declared = buf[0] as usize * 4;
                if declared == 0 {
                    return Err(GtpuError::ZeroExtensionLength);
                }
                if buf.remaining() < declared {
                    return Err(GtpuError::TruncatedExtension {
                        declared,
                        available: buf.remaining(),
                    });
                }
                let content = Bytes::copy_from_slice(&buf[1..declared - 1]);
                let following = buf[declared - 1];
                buf.advance(declared);
                optional_len += declared;
                extensions.push(ExtensionHeader {
                    ext_type: next_type,
                    content,
                });
                next_type = following;
            }
        }

        let payload_len = length.checked_sub(optional_len).ok_or(GtpuError::Length {
            declared: length,
            available: optional_len,
        })?;
        let payload = Bytes::copy_from_slice(&buf[..payload_len]);

        Ok(Self {
            message_type,
            teid,
            sequence_number,
            n_pdu_number,
            extensions,
            payload,
        })
    }
}
