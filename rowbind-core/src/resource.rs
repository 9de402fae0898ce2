use crate::{Error, ErrorKind, GenericSqlWriter, OracleSqlWriter, Result, SqlWriter};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
    time::Duration,
};
use url::Url;

/// Database product a [`Resource`] points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Flavor {
    Oracle,
    MySql,
    Postgres,
    SqlServer,
    Sybase,
    Db2,
}

impl Flavor {
    /// Scheme of the connection URL.
    pub fn scheme(&self) -> &'static str {
        match self {
            Flavor::Oracle => "oracle",
            Flavor::MySql => "mysql",
            Flavor::Postgres => "postgresql",
            Flavor::SqlServer => "sqlserver",
            Flavor::Sybase => "sybase",
            Flavor::Db2 => "db2",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Flavor::Oracle => 1521,
            Flavor::MySql => 3306,
            Flavor::Postgres => 5432,
            Flavor::SqlServer => 1433,
            Flavor::Sybase => 5000,
            Flavor::Db2 => 50000,
        }
    }

    /// Query returning the current time of the database server as a single row.
    pub fn system_time_statement(&self) -> &'static str {
        match self {
            Flavor::Oracle => "SELECT SYSTIMESTAMP FROM dual",
            Flavor::MySql => "SELECT NOW()",
            Flavor::Postgres => "SELECT CURRENT_TIMESTAMP",
            Flavor::SqlServer | Flavor::Sybase => "SELECT GETDATE()",
            Flavor::Db2 => "SELECT CURRENT TIMESTAMP FROM SYSIBM.SYSDUMMY1",
        }
    }

    /// Dialect used to compile the statements.
    pub fn sql_writer(&self) -> Box<dyn SqlWriter + Send + Sync> {
        match self {
            Flavor::Oracle => Box::new(OracleSqlWriter::new()),
            _ => Box::new(GenericSqlWriter::new()),
        }
    }
}

impl Display for Flavor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flavor::Oracle => "oracle",
            Flavor::MySql => "mysql",
            Flavor::Postgres => "postgres",
            Flavor::SqlServer => "sqlserver",
            Flavor::Sybase => "sybase",
            Flavor::Db2 => "db2",
        })
    }
}

impl FromStr for Flavor {
    type Err = Error;
    fn from_str(value: &str) -> Result<Self> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "oracle" => Flavor::Oracle,
            "mysql" => Flavor::MySql,
            "postgres" | "postgresql" | "psql" => Flavor::Postgres,
            "sqlserver" | "mssql" => Flavor::SqlServer,
            "sybase" => Flavor::Sybase,
            "db2" | "udb" => Flavor::Db2,
            _ => return Err(Error::argument_bad_value("flavor", value)),
        })
    }
}

impl TryFrom<String> for Flavor {
    type Error = Error;
    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Flavor> for String {
    fn from(value: Flavor) -> Self {
        value.to_string()
    }
}

fn default_flavor() -> Flavor {
    Flavor::Oracle
}
fn default_connect_timeout_ms() -> u64 {
    1000
}
fn default_retry_count() -> u32 {
    2
}
fn default_retry_interval_ms() -> u64 {
    1000
}
fn default_response_timeout_ms() -> u64 {
    10000
}

/// Where and how to connect, with the timeouts and the retry policy.
///
/// Every field can be omitted in the configuration file and falls back to its default.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default = "default_flavor")]
    pub flavor: Flavor,
    #[serde(default)]
    pub host: String,
    /// Falls back to the default port of the flavor.
    #[serde(default)]
    pub port: Option<u16>,
    /// Catalog selected once connected.
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub principal: String,
    #[serde(default, skip_serializing)]
    pub credential: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for Resource {
    fn default() -> Self {
        Self {
            flavor: default_flavor(),
            host: Default::default(),
            port: None,
            database_name: Default::default(),
            principal: Default::default(),
            credential: Default::default(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retry_count: default_retry_count(),
            retry_interval_ms: default_retry_interval_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl Resource {
    pub fn new(
        flavor: Flavor,
        host: impl Into<String>,
        principal: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            flavor,
            host: host.into(),
            principal: principal.into(),
            credential: credential.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML resource description.
    pub fn from_toml(value: &str) -> Result<Self> {
        let resource: Resource = toml::from_str(value).map_err(|e| {
            Error::with_source(
                ErrorKind::ArgumentBadValue,
                format!("Invalid resource configuration: {}", e.message()),
                e,
            )
        })?;
        resource.validate()?;
        Ok(resource)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::argument_null("host"));
        }
        if self.principal.trim().is_empty() {
            return Err(Error::argument_null("principal"));
        }
        if self.port == Some(0) {
            return Err(Error::argument_bad_value("port", 0));
        }
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.flavor.default_port())
    }

    /// Connection URL, carries the principal but never the credential.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}://{}", self.flavor.scheme(), self.host.trim()))
            .map_err(|e| {
                Error::with_source(
                    ErrorKind::ArgumentBadValue,
                    format!("Invalid host `{}`", self.host),
                    e,
                )
            })?;
        let invalid = |_| Error::argument_bad_value("host", &self.host);
        url.set_port(Some(self.port())).map_err(invalid)?;
        if !self.principal.is_empty() {
            url.set_username(&self.principal).map_err(invalid)?;
        }
        if !self.database_name.is_empty() {
            url.set_path(&self.database_name);
        }
        Ok(url)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Debug for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("flavor", &self.flavor)
            .field("host", &self.host)
            .field("port", &self.port())
            .field("database_name", &self.database_name)
            .field("principal", &self.principal)
            .field("credential", &"***")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("retry_count", &self.retry_count)
            .field("retry_interval_ms", &self.retry_interval_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavor_parse() {
        assert_eq!("PSQL".parse::<Flavor>().unwrap(), Flavor::Postgres);
        assert_eq!("udb".parse::<Flavor>().unwrap(), Flavor::Db2);
        let error = "informix".parse::<Flavor>().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArgumentBadValue);
    }

    #[test]
    fn url_without_credential() {
        let mut resource = Resource::new(Flavor::MySql, "db.local", "scott", "tiger");
        resource.database_name = "hr".into();
        let url = resource.url().unwrap();
        assert_eq!(url.as_str(), "mysql://scott@db.local:3306/hr");
        assert!(!format!("{:?}", resource).contains("tiger"));
    }
}
