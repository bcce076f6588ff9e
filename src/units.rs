//! Human-readable units for chart axes and tooltips.

use crate::datamodel::ValueType;
use serde::Serialize;

/// A magnitude reduced to a display unit, e.g. 1048576 bytes -> 1 MB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ByteDesc {
    pub value: f64,
    pub unit: &'static str,
}

const BYTE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

/// Reduce a byte count to the largest 1024-based unit that keeps the
/// value at or above one. Negative and NaN inputs pass through as bytes.
pub fn proper_byte_desc(bytes: f64) -> ByteDesc {
    if !bytes.is_finite() || bytes < 0.0 {
        return ByteDesc { value: bytes, unit: "B" };
    }
    let mut value = bytes;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }
    ByteDesc {
        value: round2(value),
        unit: BYTE_UNITS[unit_index],
    }
}

/// Format a latency expressed in microseconds with an auto-picked unit.
pub fn auto_latency(microseconds: f64) -> String {
    if !microseconds.is_finite() {
        return format!("{microseconds} µs");
    }
    if microseconds.abs() < 1_000.0 {
        format!("{} µs", trim(round2(microseconds)))
    } else if microseconds.abs() < 1_000_000.0 {
        format!("{} ms", trim(round2(microseconds / 1_000.0)))
    } else {
        format!("{} s", trim(round2(microseconds / 1_000_000.0)))
    }
}

/// Display a value according to its semantic type.
pub fn format_value(value: f64, value_type: ValueType) -> String {
    match value_type {
        ValueType::Number => trim(round2(value)),
        ValueType::NumberSecond => format!("{}/s", trim(round2(value))),
        ValueType::Latency => auto_latency(value),
        ValueType::Byte => {
            let desc = proper_byte_desc(value);
            format!("{} {}", trim(desc.value), desc.unit)
        }
        ValueType::ByteSecond | ValueType::ByteSecondNet => {
            let desc = proper_byte_desc(value);
            format!("{} {}/s", trim(desc.value), desc.unit)
        }
        ValueType::DiskIoNet => format!("{} io/s", trim(round2(value))),
        ValueType::Percentage => format!("{}%", trim(round2(value))),
        ValueType::Status => {
            if value != 0.0 { "online".to_string() } else { "offline".to_string() }
        }
    }
}

/// Convert a user-entered baseline back into the base unit of a value
/// type, so baselines can be compared against raw samples. Unknown units
/// pass through unchanged.
pub fn baseline_to_base_units(value: f64, unit: &str, value_type: ValueType) -> f64 {
    match value_type {
        ValueType::Byte | ValueType::ByteSecond | ValueType::ByteSecondNet => {
            match BYTE_UNITS.iter().position(|&u| u == unit) {
                Some(power) => value * 1024f64.powi(power as i32),
                None => value,
            }
        }
        ValueType::Latency => match unit {
            "µs" | "us" => value,
            "ms" => value * 1_000.0,
            "s" => value * 1_000_000.0,
            _ => value,
        },
        _ => value,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render without trailing zeros: 1.50 -> "1.5", 2.00 -> "2".
fn trim(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proper_byte_desc() {
        assert_eq!(proper_byte_desc(0.0), ByteDesc { value: 0.0, unit: "B" });
        assert_eq!(proper_byte_desc(512.0), ByteDesc { value: 512.0, unit: "B" });
        assert_eq!(proper_byte_desc(1024.0), ByteDesc { value: 1.0, unit: "KB" });
        assert_eq!(proper_byte_desc(1048576.0), ByteDesc { value: 1.0, unit: "MB" });
        assert_eq!(proper_byte_desc(1536.0 * 1024.0), ByteDesc { value: 1.5, unit: "MB" });
        assert_eq!(
            proper_byte_desc(3.0 * 1024.0 * 1024.0 * 1024.0),
            ByteDesc { value: 3.0, unit: "GB" }
        );
    }

    #[test]
    fn test_proper_byte_desc_degrades() {
        assert_eq!(proper_byte_desc(-1.0).unit, "B");
        // Beyond the table it stays in the largest unit.
        assert_eq!(proper_byte_desc(1024f64.powi(7)).unit, "PB");
    }

    #[test]
    fn test_auto_latency() {
        assert_eq!(auto_latency(250.0), "250 µs");
        assert_eq!(auto_latency(1500.0), "1.5 ms");
        assert_eq!(auto_latency(2_000_000.0), "2 s");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1048576.0, ValueType::Byte), "1 MB");
        assert_eq!(format_value(2048.0, ValueType::ByteSecond), "2 KB/s");
        assert_eq!(format_value(42.424, ValueType::Percentage), "42.42%");
        assert_eq!(format_value(3.5, ValueType::DiskIoNet), "3.5 io/s");
        assert_eq!(format_value(7.0, ValueType::NumberSecond), "7/s");
        assert_eq!(format_value(1.0, ValueType::Status), "online");
        assert_eq!(format_value(0.0, ValueType::Status), "offline");
    }

    #[test]
    fn test_baseline_to_base_units() {
        assert_eq!(baseline_to_base_units(1.0, "MB", ValueType::Byte), 1048576.0);
        assert_eq!(baseline_to_base_units(2.0, "ms", ValueType::Latency), 2000.0);
        assert_eq!(baseline_to_base_units(3.0, "%", ValueType::Percentage), 3.0);
        // Unknown unit passes through.
        assert_eq!(baseline_to_base_units(5.0, "parsec", ValueType::Byte), 5.0);
    }
}
