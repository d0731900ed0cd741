//! Host platform identification.

use std::fmt;
use std::str::FromStr;

/// Operating system family used to select candidate toolchains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformKey {
    Win32,
    Cygwin,
    Darwin,
    Linux,
    Aix,
    SunOs,
    FreeBsd,
    NetBsd,
    OpenBsd,
    /// GNU/Hurd
    Gnu,
    /// JVM-hosted builds
    Java,
    /// Anything else, by name
    Other(String),
}

impl PlatformKey {
    /// Detect the platform of the running process.
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => PlatformKey::Win32,
            "macos" | "ios" => PlatformKey::Darwin,
            "linux" | "android" => PlatformKey::Linux,
            "freebsd" | "dragonfly" => PlatformKey::FreeBsd,
            "netbsd" => PlatformKey::NetBsd,
            "openbsd" => PlatformKey::OpenBsd,
            "solaris" | "illumos" => PlatformKey::SunOs,
            "aix" => PlatformKey::Aix,
            "hurd" => PlatformKey::Gnu,
            other => PlatformKey::Other(other.to_string()),
        }
    }

    /// The lookup name of this platform.
    pub fn as_str(&self) -> &str {
        match self {
            PlatformKey::Win32 => "win32",
            PlatformKey::Cygwin => "cygwin",
            PlatformKey::Darwin => "darwin",
            PlatformKey::Linux => "linux",
            PlatformKey::Aix => "aix",
            PlatformKey::SunOs => "sunos",
            PlatformKey::FreeBsd => "freebsd",
            PlatformKey::NetBsd => "netbsd",
            PlatformKey::OpenBsd => "openbsd",
            PlatformKey::Gnu => "gnu",
            PlatformKey::Java => "java",
            PlatformKey::Other(name) => name,
        }
    }

    /// Whether this is the Windows family, where the install registry is consulted.
    pub fn is_windows(&self) -> bool {
        matches!(self, PlatformKey::Win32)
    }

    /// Value recorded under `DEST_OS`.
    pub fn dest_os(&self) -> &str {
        match self {
            PlatformKey::Win32 => "win32",
            PlatformKey::Darwin => "darwin",
            other => other.as_str(),
        }
    }
}

impl Default for PlatformKey {
    fn default() -> Self {
        PlatformKey::host()
    }
}

impl FromStr for PlatformKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_lowercase().as_str() {
            "win32" | "windows" => PlatformKey::Win32,
            "cygwin" => PlatformKey::Cygwin,
            "darwin" | "macos" => PlatformKey::Darwin,
            "linux" => PlatformKey::Linux,
            "aix" => PlatformKey::Aix,
            "sunos" | "solaris" => PlatformKey::SunOs,
            "freebsd" => PlatformKey::FreeBsd,
            "netbsd" => PlatformKey::NetBsd,
            "openbsd" => PlatformKey::OpenBsd,
            "gnu" => PlatformKey::Gnu,
            "java" => PlatformKey::Java,
            other => PlatformKey::Other(other.to_string()),
        };
        Ok(key)
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("windows".parse::<PlatformKey>().unwrap(), PlatformKey::Win32);
        assert_eq!("macos".parse::<PlatformKey>().unwrap(), PlatformKey::Darwin);
        assert_eq!("Linux".parse::<PlatformKey>().unwrap(), PlatformKey::Linux);
        assert_eq!(
            "haiku".parse::<PlatformKey>().unwrap(),
            PlatformKey::Other("haiku".to_string())
        );
    }

    #[test]
    fn test_only_win32_is_windows() {
        assert!(PlatformKey::Win32.is_windows());
        assert!(!PlatformKey::Cygwin.is_windows());
        assert!(!PlatformKey::Linux.is_windows());
    }

    #[test]
    fn test_host_matches_build_target() {
        let host = PlatformKey::host();
        if cfg!(target_os = "linux") {
            assert_eq!(host, PlatformKey::Linux);
        } else if cfg!(target_os = "windows") {
            assert_eq!(host, PlatformKey::Win32);
        } else if cfg!(target_os = "macos") {
            assert_eq!(host, PlatformKey::Darwin);
        }
    }
}
