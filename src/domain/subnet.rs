//! IPv4 subnet value type used by permission rules.

use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing a subnet
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubnetParseError {
    #[error("Subnet cannot be empty")]
    Empty,

    #[error("Invalid subnet address: '{0}'")]
    InvalidAddress(String),

    #[error("Invalid subnet prefix: '{0}'. Expected a number between 0 and 32")]
    InvalidPrefix(String),
}

/// An IPv4 subnet in CIDR form, e.g. `10.0.0.0/8`.
///
/// A bare address parses as a /32 host subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subnet {
    addr: Ipv4Addr,
    prefix: u8,
}

impl Subnet {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, SubnetParseError> {
        if prefix > 32 {
            return Err(SubnetParseError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Self { addr, prefix })
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(&self) -> u32 {
        if self.prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix))
        }
    }

    /// Whether the given address falls inside this subnet
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = self.mask();
        u32::from(self.addr) & mask == u32::from(addr) & mask
    }
}

impl FromStr for Subnet {
    type Err = SubnetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SubnetParseError::Empty);
        }

        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((a, p)) => (a, Some(p)),
            None => (s, None),
        };

        let addr: Ipv4Addr = addr_part
            .parse()
            .map_err(|_| SubnetParseError::InvalidAddress(addr_part.to_string()))?;

        let prefix = match prefix_part {
            Some(p) => p
                .parse::<u8>()
                .ok()
                .filter(|p| *p <= 32)
                .ok_or_else(|| SubnetParseError::InvalidPrefix(p.to_string()))?,
            None => 32,
        };

        Ok(Self { addr, prefix })
    }
}

impl TryFrom<String> for Subnet {
    type Error = SubnetParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Subnet> for String {
    fn from(subnet: Subnet) -> Self {
        subnet.to_string()
    }
}

impl std::fmt::Display for Subnet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cidr() {
        let subnet: Subnet = "192.168.1.0/24".parse().unwrap();
        assert_eq!(subnet.addr(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(subnet.prefix(), 24);
        assert_eq!(subnet.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_parse_bare_address() {
        let subnet: Subnet = "10.0.0.1".parse().unwrap();
        assert_eq!(subnet.prefix(), 32);
        assert!(subnet.contains(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(!subnet.contains(Ipv4Addr::new(10, 0, 0, 2)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Subnet>(), Err(SubnetParseError::Empty));
        assert!(matches!(
            "not-an-ip/8".parse::<Subnet>(),
            Err(SubnetParseError::InvalidAddress(_))
        ));
        assert!(matches!(
            "10.0.0.0/33".parse::<Subnet>(),
            Err(SubnetParseError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_contains() {
        let subnet: Subnet = "10.1.0.0/16".parse().unwrap();
        assert!(subnet.contains(Ipv4Addr::new(10, 1, 200, 7)));
        assert!(!subnet.contains(Ipv4Addr::new(10, 2, 0, 1)));

        let everything: Subnet = "0.0.0.0/0".parse().unwrap();
        assert!(everything.contains(Ipv4Addr::new(203, 0, 113, 99)));
    }

    #[test]
    fn test_serde_as_string() {
        let subnet: Subnet = "172.16.0.0/12".parse().unwrap();
        let json = serde_json::to_string(&subnet).unwrap();
        assert_eq!(json, "\"172.16.0.0/12\"");

        let back: Subnet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subnet);
    }
}
