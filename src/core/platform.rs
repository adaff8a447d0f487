//! Platform and configuration axes of the build matrix.
//!
//! Every generated project is expanded over `platforms × configurations`.
//! The matrix is always walked platform-major with Release before Debug,
//! which is the order Visual Studio itself writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Win32")]
    Win32,
    #[serde(rename = "x64")]
    X64,
}

impl Platform {
    /// Both platforms, in emission order.
    pub const ALL: [Platform; 2] = [Platform::Win32, Platform::X64];

    /// Name as written in MSBuild conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Win32 => "Win32",
            Platform::X64 => "x64",
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Platform::X64)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Win32" | "win32" | "x86" => Ok(Platform::Win32),
            "x64" | "X64" => Ok(Platform::X64),
            _ => Err(format!("unknown platform: {}", s)),
        }
    }
}

/// Build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Configuration {
    Release,
    Debug,
}

impl Configuration {
    /// Both configurations, in emission order.
    pub const ALL: [Configuration; 2] = [Configuration::Release, Configuration::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Release => "Release",
            Configuration::Debug => "Debug",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, Configuration::Debug)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(platform, configuration)` cell of the build matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub platform: Platform,
    pub configuration: Configuration,
}

impl Cell {
    pub fn new(platform: Platform, configuration: Configuration) -> Self {
        Cell {
            platform,
            configuration,
        }
    }

    /// The `Configuration|Platform` pair used in project and solution files.
    pub fn label(&self) -> String {
        format!("{}|{}", self.configuration, self.platform)
    }

    /// MSBuild condition selecting this cell.
    pub fn condition(&self) -> String {
        format!("'$(Configuration)|$(Platform)'=='{}'", self.label())
    }
}

/// Expand the platform and configuration sets into the full matrix.
pub fn matrix(platforms: &[Platform], configurations: &[Configuration]) -> Vec<Cell> {
    platforms
        .iter()
        .flat_map(|&p| configurations.iter().map(move |&c| Cell::new(p, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_order() {
        let cells = matrix(&Platform::ALL, &Configuration::ALL);
        let labels: Vec<_> = cells.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["Release|Win32", "Debug|Win32", "Release|x64", "Debug|x64"]
        );
    }

    #[test]
    fn test_condition() {
        let cell = Cell::new(Platform::X64, Configuration::Debug);
        assert_eq!(cell.condition(), "'$(Configuration)|$(Platform)'=='Debug|x64'");
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("x64".parse::<Platform>().unwrap(), Platform::X64);
        assert_eq!("Win32".parse::<Platform>().unwrap(), Platform::Win32);
        assert!("arm".parse::<Platform>().is_err());
    }
}
