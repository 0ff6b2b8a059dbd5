//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Per-segment recording limit (60 seconds). Reaching it triggers auto-stop.
pub const SEGMENT_DURATION_SECS: u64 = 60;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// The default per-segment limit (60 seconds)
    pub const fn segment_limit() -> Self {
        Self::from_secs(SEGMENT_DURATION_SECS)
    }

    /// Get duration in seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string like "45s", "1m", or "1m30s".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let input = s.trim().to_lowercase();
        let mut total_secs: u64 = 0;
        let mut digits = String::new();
        let mut matched = false;

        for ch in input.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'm' | 's' if !digits.is_empty() => {
                    let value: u64 = digits.parse().map_err(|_| invalid())?;
                    total_secs += if ch == 'm' { value * 60 } else { value };
                    digits.clear();
                    matched = true;
                }
                _ => return Err(invalid()),
            }
        }

        // Trailing bare number or empty input is invalid
        if !digits.is_empty() || !matched || total_secs == 0 {
            return Err(invalid());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::segment_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "45s".parse().unwrap();
        assert_eq!(d.as_secs(), 45);
        assert_eq!(d.as_millis(), 45000);
    }

    #[test]
    fn parse_minutes_only() {
        let d: Duration = "2m".parse().unwrap();
        assert_eq!(d.as_secs(), 120);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "1m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_case_insensitive_and_trimmed() {
        let d: Duration = "  1M30S ".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_invalid_empty() {
        assert!("".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_zero() {
        assert!("0s".parse::<Duration>().is_err());
        assert!("0m0s".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_invalid_format() {
        assert!("60".parse::<Duration>().is_err());
        assert!("abc".parse::<Duration>().is_err());
        assert!("30x".parse::<Duration>().is_err());
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(Duration::from_secs(45).to_string(), "45s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
    }

    #[test]
    fn segment_limit_is_sixty_seconds() {
        assert_eq!(Duration::segment_limit().as_secs(), 60);
        assert_eq!(Duration::default(), Duration::segment_limit());
    }

    #[test]
    fn as_std_duration() {
        let d = Duration::from_secs(30);
        assert_eq!(d.as_std(), StdDuration::from_secs(30));
    }
}
