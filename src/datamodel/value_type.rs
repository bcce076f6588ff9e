use serde::{Deserialize, Serialize};

/// Semantic classification of a metric's values, used to pick display
/// units and axis formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// A plain counter or gauge, displayed as-is.
    Number,
    /// A rate of events, displayed as `n/s`.
    NumberSecond,
    /// A latency in microseconds.
    Latency,
    /// A byte quantity, displayed with 1024-based units.
    Byte,
    /// A byte rate, displayed as `n unit/s`.
    ByteSecond,
    /// A network byte rate.
    #[serde(rename = "byteSecondNet")]
    ByteSecondNet,
    /// Disk operations per second.
    #[serde(rename = "diskIONet")]
    DiskIoNet,
    /// A 0-100 percentage.
    Percentage,
    /// An online/offline flag encoded as 1/0.
    Status,
}
