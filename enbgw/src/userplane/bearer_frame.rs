use crate::FlowKey;
use thiserror::Error;

// RNTI (2 bytes, big endian) + bearer id (1 byte).
const FRAME_HEADER_LEN: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("bearer frame of {0} bytes is too short to carry a flow key")]
pub struct FrameError(pub usize);

/// The envelope exchanged with the radio stack: every user-plane packet
/// crosses the radio-facing endpoint with its flow key in front of the
/// payload bytes.  The radio stack always tags what it sends, so a frame
/// without a parseable flow key is a broken upstream, not bad traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerFrame {
    pub flow: FlowKey,
    pub payload: Vec<u8>,
}

impl BearerFrame {
    pub fn encode(flow: FlowKey, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        frame.extend_from_slice(&flow.rnti.to_be_bytes());
        frame.push(flow.bid);
        frame.extend_from_slice(payload);
        frame
    }

    pub fn decode(frame: &[u8]) -> Result<BearerFrame, FrameError> {
        if frame.len() < FRAME_HEADER_LEN {
            return Err(FrameError(frame.len()));
        }
        Ok(BearerFrame {
            flow: FlowKey {
                rnti: u16::from_be_bytes([frame[0], frame[1]]),
                bid: frame[2],
            },
            payload: frame[FRAME_HEADER_LEN..].to_vec(),
        })
    }
}
