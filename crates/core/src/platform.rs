//! Platform detection
//!
//! Hook scripts receive the OS through the `OS` environment entry using
//! kernel-style names:
//! - macOS → `"darwin"`
//! - Linux → `"linux"`
//! - anything else → `"unknown"`
//!
//! Platform info is cached on first access.

use std::sync::LazyLock;

/// Current platform information (cached)
///
/// # Example
/// ```
/// use dotlayer_core::platform::CURRENT_PLATFORM;
///
/// assert!(["darwin", "linux", "unknown"].contains(&CURRENT_PLATFORM.os));
/// ```
pub static CURRENT_PLATFORM: LazyLock<Platform> = LazyLock::new(Platform::detect);

/// Platform information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// OS: "darwin" (macOS), "linux", "unknown"
    pub os: &'static str,
    /// CPU architecture: "x86_64", "aarch64", etc.
    pub arch: &'static str,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: std::env::consts::ARCH,
        }
    }

    const fn detect_os() -> &'static str {
        #[cfg(target_os = "macos")]
        {
            "darwin"
        }

        #[cfg(target_os = "linux")]
        {
            "linux"
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            "unknown"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_is_cached_value() {
        assert_eq!(Platform::detect(), *CURRENT_PLATFORM);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_name() {
        assert_eq!(CURRENT_PLATFORM.os, "linux");
    }
}
