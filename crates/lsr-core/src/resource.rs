//! The reference singleton resource: a labeled connection handle.
//!
//! [`Connection`] is immutable after construction.  Each constructed value
//! receives a process-unique serial number, which makes a second
//! construction visible even when two connections carry the same label.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::config::RegistryConfig;
use crate::errors::{Error, Result};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Kind of backend a [`Connection`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Backend {
    /// Relational database.
    #[default]
    Sql,
    /// Document store.
    Mongo,
    /// Backend identified only by a numeric type code.
    Numeric(i32),
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql => f.write_str("sql"),
            Self::Mongo => f.write_str("mongo"),
            Self::Numeric(code) => write!(f, "{code}"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "mongo" => Ok(Self::Mongo),
            other => other
                .parse::<i32>()
                .map(Self::Numeric)
                .map_err(|_| Error::InvalidConfig(format!("unknown backend `{s}`"))),
        }
    }
}

/// An immutable, labeled connection handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    tag: String,
    backend: Backend,
    serial: u64,
}

impl Connection {
    /// Open a connection with the given tag and backend.
    pub fn open(tag: impl Into<String>, backend: Backend) -> Self {
        let conn = Self {
            tag: tag.into(),
            backend,
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
        };
        debug!(
            "opened connection tag={} backend={} serial={}",
            conn.tag, conn.backend, conn.serial
        );
        conn
    }

    /// Open a connection described by `config`.
    ///
    /// Sleeps for the configured construction delay first, which stands in
    /// for an expensive connect.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let delay = config.construction_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(Self::open(config.label(), config.backend()))
    }

    /// Identifying tag fixed at construction.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Backend kind.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Process-unique construction serial number.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]#{}", self.tag, self.backend, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_are_unique() {
        let a = Connection::open("primary", Backend::Sql);
        let b = Connection::open("primary", Backend::Sql);
        assert_eq!(a.tag(), b.tag());
        assert_ne!(a.serial(), b.serial());
        assert_ne!(a, b);
    }

    #[test]
    fn backend_parse_and_display() {
        assert_eq!("SQL".parse::<Backend>().unwrap(), Backend::Sql);
        assert_eq!(" mongo ".parse::<Backend>().unwrap(), Backend::Mongo);
        assert_eq!("1".parse::<Backend>().unwrap(), Backend::Numeric(1));
        assert!("oracle".parse::<Backend>().is_err());
        assert_eq!(Backend::Numeric(-3).to_string(), "-3");
    }

    #[test]
    fn from_config_uses_label_and_backend() {
        let cfg = RegistryConfig::default()
            .with_label("replica")
            .with_backend(Backend::Mongo);
        let conn = Connection::from_config(&cfg).unwrap();
        assert_eq!(conn.tag(), "replica");
        assert_eq!(conn.backend(), Backend::Mongo);
        assert_eq!(conn.to_string(), format!("replica[mongo]#{}", conn.serial()));
    }

    #[test]
    fn from_config_rejects_empty_label() {
        let cfg = RegistryConfig::default().with_label("  ");
        assert!(matches!(
            Connection::from_config(&cfg),
            Err(Error::InvalidConfig(_))
        ));
    }
}
