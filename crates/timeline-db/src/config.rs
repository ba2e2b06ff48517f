/// Where the database lives.
///
/// Resolution of the URL (flag, `TIMELINE_DATABASE_URL`, config file,
/// [`DbConfig::DEFAULT_URL`]) happens in the CLI.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// Connection URL used when nothing else is configured.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/timeline";

    /// Environment variable holding the connection URL.
    pub const ENV_VAR: &str = "TIMELINE_DATABASE_URL";

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Split the URL into `(server, database, query)`, where `query`
    /// keeps its leading `?`.
    fn parts(&self) -> (&str, &str, &str) {
        let url = self.database_url.as_str();
        let (base, query) = match url.find('?') {
            Some(q) => url.split_at(q),
            None => (url, ""),
        };
        match base.rfind('/') {
            Some(slash) => (&base[..slash], &base[slash + 1..], query),
            None => (base, "", query),
        }
    }

    /// The database named by the URL, if any.
    pub fn database_name(&self) -> Option<&str> {
        let (_, name, _) = self.parts();
        (!name.is_empty()).then_some(name)
    }

    /// The same server's `postgres` database, keeping connection options.
    /// `CREATE DATABASE` is issued from there.
    pub fn maintenance_url(&self) -> String {
        let (server, _, query) = self.parts();
        format!("{server}/postgres{query}")
    }
}
