use std::fmt;
use std::str::FromStr;

use colored::{ColoredString, Colorize};

use crate::error::SeverityError;

/// Severity of a log record.
///
/// Values are declared in ascending ordinal order, so the emit threshold is a
/// plain integer comparison: a record passes when
/// `record.severity() >= handle.level()`.
///
/// `NoPriority` is the sentinel returned by a failed parse. As a minimum level
/// it only lets `NoPriority` records through.
///
/// # Examples
///
/// ```
/// use chainlog::Severity;
///
/// assert!(Severity::Error > Severity::Info);
/// assert_eq!("proto".parse::<Severity>().unwrap(), Severity::Protocol);
/// assert_eq!(Severity::Info.to_string(), "info");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Protocol = 1,
    Debug,
    #[default]
    Info,
    Error,
    Fatal,
    Panic,
    NoPriority,
}

impl Severity {
    /// All severities, in ordinal order.
    pub const ALL: [Severity; 7] = [
        Severity::Protocol,
        Severity::Debug,
        Severity::Info,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
        Severity::NoPriority,
    ];

    /// Converts a raw ordinal into a severity.
    ///
    /// # Panics
    ///
    /// Panics with `this isn't a priority` when `ordinal` is outside `1..=7`.
    /// An out-of-range ordinal means internal state is corrupt; use
    /// `Severity::try_from` for untrusted input.
    #[track_caller]
    pub fn from_ordinal(ordinal: u8) -> Severity {
        match Severity::try_from(ordinal) {
            Ok(severity) => severity,
            Err(_) => panic!("this isn't a priority"),
        }
    }

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Display name of the severity.
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Protocol => "protocol",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
            Severity::NoPriority => "no priority",
        }
    }

    /// Canonical wire token, the bytes formatters append to a record.
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Parses a severity token, returning `NoPriority` on failure.
    pub fn parse_lossy(token: &str) -> Severity {
        token.parse().unwrap_or_else(|err: SeverityError| err.fallback())
    }

    /// Paints `text` with the terminal style of this severity, if it has one.
    pub fn paint(self, text: &str) -> Option<ColoredString> {
        match self {
            Severity::Protocol => Some(text.cyan()),
            Severity::Debug => Some(text.bold()),
            Severity::Info => Some(text.green()),
            Severity::Error => Some(text.red()),
            Severity::Fatal => Some(text.magenta()),
            Severity::Panic | Severity::NoPriority => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SeverityError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "protocol" | "proto" => Ok(Severity::Protocol),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "panic" => Ok(Severity::Panic),
            "no priority" => Ok(Severity::NoPriority),
            other => Err(SeverityError::InvalidToken(other.to_string())),
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = SeverityError;

    fn try_from(ordinal: u8) -> Result<Self, SeverityError> {
        match ordinal {
            1 => Ok(Severity::Protocol),
            2 => Ok(Severity::Debug),
            3 => Ok(Severity::Info),
            4 => Ok(Severity::Error),
            5 => Ok(Severity::Fatal),
            6 => Ok(Severity::Panic),
            7 => Ok(Severity::NoPriority),
            other => Err(SeverityError::InvalidValue(other)),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => Severity::Error,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Protocol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_declaration_order() {
        for (i, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.ordinal() as usize, i + 1);
            assert_eq!(Severity::from_ordinal(severity.ordinal()), *severity);
        }
    }

    #[test]
    fn test_wire_token_matches_display() {
        for severity in Severity::ALL {
            assert_eq!(severity.as_bytes(), severity.to_string().as_bytes());
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("INFO".parse::<Severity>().is_err());
        assert_eq!(Severity::parse_lossy("Debug"), Severity::NoPriority);
    }
}
