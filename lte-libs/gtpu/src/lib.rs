//! GTP-U header codec for the S1-U reference point - TS29.281.

mod header;

pub use header::{ExtensionHeader, GtpuError, GtpuHeader, MessageType, Teid};

/// UDP port where the GTP-U socket is bound, fixed by the standard.
pub const GTPU_PORT: u16 = 2152; // TS29.281
