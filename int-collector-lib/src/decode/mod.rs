pub mod bits;
pub mod error;
pub mod headers;
pub mod hop;
pub mod report;
pub mod trace;

pub use bits::BitCursor;
pub use error::DecodeError;
pub use headers::{
    EthernetHeader, IntMetaHeader, Ipv4Header, ReportFixedHeader, ShimHeader, UdpHeader,
    WireHeader,
};
pub use hop::{decode_hops, HopRecords, PerHopRecord, RECORD_SIZE, RECORD_WORDS};
pub use report::{HopLayout, IntReport, FIXED_HEADERS_SIZE};
pub use trace::{Traced, TRACE_TARGET};
