//! Duration and size formatting for display

/// Formatter for human-readable durations and byte sizes
pub struct DisplayFormat;

impl DisplayFormat {
    /// Format seconds as `M:SS` or `H:MM:SS`
    pub fn format_duration(seconds: f64) -> String {
        let total = if seconds.is_finite() && seconds > 0.0 {
            seconds.round() as u64
        } else {
            0
        };
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let secs = total % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, secs)
        } else {
            format!("{}:{:02}", minutes, secs)
        }
    }

    /// Format a byte count with binary units
    pub fn format_size(bytes: u64) -> String {
        const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
        if bytes < 1024 {
            return format!("{} B", bytes);
        }

        let mut value = bytes as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.2} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(DisplayFormat::format_duration(0.0), "0:00");
        assert_eq!(DisplayFormat::format_duration(59.6), "1:00");
        assert_eq!(DisplayFormat::format_duration(300.0), "5:00");
        assert_eq!(DisplayFormat::format_duration(3723.0), "1:02:03");
        assert_eq!(DisplayFormat::format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(DisplayFormat::format_size(512), "512 B");
        assert_eq!(DisplayFormat::format_size(1536), "1.50 KB");
        assert_eq!(DisplayFormat::format_size(50 * 1024 * 1024), "50.00 MB");
        assert_eq!(DisplayFormat::format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }
}
