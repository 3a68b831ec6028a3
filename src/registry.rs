use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use crate::config::Config;
use crate::error::{Error, Result};

/// A robot reachable at a fixed address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RobotTarget {
    pub id: u32,
    pub address: SocketAddr,
}

/// Robot id to address table. Built once at startup, read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    targets: BTreeMap<u32, SocketAddr>,
}

impl Registry {
    pub fn new(targets: impl IntoIterator<Item = RobotTarget>) -> Result<Registry> {
        let mut registry = Registry::default();

        for RobotTarget { id, address } in targets {
            if registry.targets.insert(id, address).is_some() {
                return Err(Error::DuplicateTarget(id));
            }
        }

        Ok(registry)
    }

    /// Resolves every configured host. Hostnames are looked up once here so
    /// that nothing on the send path ever touches DNS.
    pub fn from_config(config: &Config) -> Result<Registry> {
        let targets = config.robots
            .iter()
            .map(|robot| -> Result<RobotTarget> {
                let ip = resolve_host(&robot.host)?;
                Ok(RobotTarget { id: robot.id, address: SocketAddr::new(ip, config.port_of(robot)) })
            })
            .collect::<Result<Vec<_>>>()?;

        Registry::new(targets)
    }

    pub fn resolve(&self, id: u32) -> Result<SocketAddr> {
        self.targets
            .get(&id)
            .copied()
            .ok_or(Error::UnknownTarget(id))
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.keys().copied()
    }
}

fn resolve_host(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let ips = dns_lookup::lookup_host(host).map_err(|_| Error::Resolve { host: host.to_string() })?;

    ips.iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| ips.first())
        .copied()
        .ok_or_else(|| Error::Resolve { host: host.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotEntry;
    use std::net::Ipv4Addr;

    fn target(id: u32, port: u16) -> RobotTarget {
        RobotTarget { id, address: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, id as u8)), port) }
    }

    #[test]
    fn resolves_registered_ids() {
        let registry = Registry::new([target(3, 4210), target(1, 4211)]).unwrap();

        assert_eq!(registry.resolve(3).unwrap(), "10.0.0.3:4210".parse().unwrap());
        assert_eq!(registry.resolve(1).unwrap(), "10.0.0.1:4211".parse().unwrap());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn unknown_id_is_reported() {
        let registry = Registry::new([target(1, 4210)]).unwrap();

        assert!(matches!(registry.resolve(2), Err(Error::UnknownTarget(2))));
    }

    #[test]
    fn duplicates_are_rejected() {
        let result = Registry::new([target(2, 4210), target(2, 4211)]);

        assert!(matches!(result, Err(Error::DuplicateTarget(2))));
    }

    #[test]
    fn builds_from_config_with_default_port() {
        let config = Config {
            robots: vec![
                RobotEntry { id: 1, host: "127.0.0.1".to_string(), port: None },
                RobotEntry { id: 2, host: "10.0.0.5".to_string(), port: Some(9000) },
            ],
            ..Config::default()
        };

        let registry = Registry::from_config(&config).unwrap();

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(registry.resolve(1).unwrap(), "127.0.0.1:4210".parse().unwrap());
        assert_eq!(registry.resolve(2).unwrap(), "10.0.0.5:9000".parse().unwrap());
    }
}
