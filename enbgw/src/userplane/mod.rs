mod bearer_frame;
mod downlink_pipeline;
mod packet_processor;
mod uplink_pipeline;

use downlink_pipeline::DownlinkPipeline;
use uplink_pipeline::UplinkPipeline;

pub use bearer_frame::{BearerFrame, FrameError};
pub use packet_processor::PacketProcessor;

const MAX_DATAGRAM: usize = 2000;
