//! MySQL session backend
//!
//! Every session carries connect, read and write timeouts so a hung node
//! fails its own call instead of stalling the rest of the set. Repoint
//! statements follow the server's version and `sql_mode`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use mysql::prelude::Queryable;
use mysql::{ClientIdentity, Conn, OptsBuilder, SslOpts};

use crate::replica::{
    Connector, GtidSet, NodeEndpoint, NodeRole, NodeSession, PrimaryHandle, ReplicationStatus,
    SessionError, TlsParams,
};

/// Opens MySQL sessions with bounded call durations.
#[derive(Debug, Clone)]
pub struct MysqlConnector {
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl MysqlConnector {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }

    fn options(&self, endpoint: &NodeEndpoint) -> Result<OptsBuilder, SessionError> {
        let defaults = match &endpoint.extra_def_file {
            Some(path) => read_defaults_file(path)
                .map_err(|reason| SessionError::unreachable(&endpoint.name, reason))?,
            None => ClientDefaults::default(),
        };

        // Defaults file password overrides the configured one
        let password = defaults
            .password
            .unwrap_or_else(|| endpoint.sql_pass.clone());

        let mut builder = OptsBuilder::new()
            .ip_or_hostname(Some(endpoint.host.clone()))
            .tcp_port(endpoint.port)
            .user(Some(endpoint.sql_user.clone()))
            .pass(Some(password))
            .tcp_connect_timeout(Some(self.connect_timeout))
            .read_timeout(Some(self.command_timeout))
            .write_timeout(Some(self.command_timeout));

        if let Some(socket) = defaults.socket {
            builder = builder.socket(Some(socket));
        }

        if let Some(ssl) = ssl_opts(&endpoint.tls) {
            builder = builder.ssl_opts(Some(ssl));
        }

        Ok(builder)
    }
}

/// TLS options for a node, or `None` when no TLS session is requested.
fn ssl_opts(tls: &TlsParams) -> Option<SslOpts> {
    if !tls.is_requested() {
        return None;
    }

    let root = tls.ssl_client_ca.as_ref().or(tls.ssl_ca_path.as_ref());
    let identity = match (&tls.ssl_client_cert, &tls.ssl_client_key) {
        (Some(cert), Some(key)) => Some(ClientIdentity::new(cert.clone(), key.clone())),
        _ => None,
    };

    Some(
        SslOpts::default()
            .with_root_cert_path(root.cloned())
            .with_client_identity(identity)
            .with_danger_accept_invalid_certs(!tls.ssl_verify_cert)
            .with_danger_skip_domain_validation(!tls.ssl_verify_id),
    )
}

impl Connector for MysqlConnector {
    fn connect(
        &self,
        endpoint: &NodeEndpoint,
        _role: NodeRole,
    ) -> Result<Box<dyn NodeSession>, SessionError> {
        let opts = self.options(endpoint)?;
        let conn =
            Conn::new(opts).map_err(|e| SessionError::unreachable(&endpoint.name, e.to_string()))?;

        Ok(Box::new(MysqlSession {
            server: endpoint.name.clone(),
            conn: Some(conn),
        }))
    }
}

struct MysqlSession {
    server: String,
    conn: Option<Conn>,
}

impl MysqlSession {
    fn conn(&mut self) -> Result<&mut Conn, SessionError> {
        let server = &self.server;
        self.conn
            .as_mut()
            .ok_or_else(|| SessionError::not_connected(server.clone()))
    }

    fn dialect(&mut self) -> Result<Dialect, SessionError> {
        let server = self.server.clone();
        let conn = self.conn()?;
        let version = conn.server_version();
        let sql_mode: Option<Option<String>> = conn
            .query_first("SELECT @@SESSION.sql_mode")
            .map_err(|e| SessionError::command(&server, e.to_string()))?;

        Ok(Dialect::new(version, sql_mode.flatten().as_deref().unwrap_or("")))
    }

    fn run(&mut self, statement: &str) -> Result<(), SessionError> {
        let server = self.server.clone();
        self.conn()?
            .query_drop(statement)
            .map_err(|e| SessionError::command(server, e.to_string()))
    }
}

impl NodeSession for MysqlSession {
    fn replication_status(&mut self) -> Result<ReplicationStatus, SessionError> {
        let server = self.server.clone();
        let row: Option<(Option<String>, Option<String>)> = self
            .conn()?
            .query_first("SELECT @@GLOBAL.gtid_executed, @@GLOBAL.gtid_mode")
            .map_err(|e| SessionError::command(&server, e.to_string()))?;

        let (executed, mode) = row.ok_or_else(|| {
            SessionError::command(&server, "no row returned for GTID status")
        })?;

        Ok(ReplicationStatus {
            executed_gtid_set: GtidSet::new(executed.unwrap_or_default()),
            gtid_mode: mode.map(|m| m.eq_ignore_ascii_case("ON")).unwrap_or(false),
        })
    }

    fn change_primary(&mut self, primary: &PrimaryHandle) -> Result<(), SessionError> {
        let dialect = self.dialect()?;
        let credentials = primary.credentials();
        let statements = dialect.repoint_statements(
            primary.host(),
            primary.port(),
            &credentials.user,
            &credentials.password,
        );

        for statement in &statements {
            self.run(statement)?;
        }
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the connection sends COM_QUIT
        self.conn.take();
    }
}

/// Statement flavor for one server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dialect {
    /// `REPLICA` / `SOURCE` keywords, available from 8.0.23
    replica_syntax: bool,
    /// False under `NO_BACKSLASH_ESCAPES`
    backslash_escapes: bool,
}

impl Dialect {
    fn new(version: (u16, u16, u16), sql_mode: &str) -> Self {
        Self {
            replica_syntax: version >= (8, 0, 23),
            backslash_escapes: !sql_mode
                .split(',')
                .any(|mode| mode.trim().eq_ignore_ascii_case("NO_BACKSLASH_ESCAPES")),
        }
    }

    /// Quote a string literal for statements that cannot be prepared.
    fn quote(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for c in value.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' if self.backslash_escapes => out.push_str("\\\\"),
                c => out.push(c),
            }
        }
        out.push('\'');
        out
    }

    fn repoint_statements(&self, host: &str, port: u16, user: &str, password: &str) -> [String; 3] {
        let (host, user, password) = (self.quote(host), self.quote(user), self.quote(password));
        if self.replica_syntax {
            [
                "STOP REPLICA".to_string(),
                format!(
                    "CHANGE REPLICATION SOURCE TO SOURCE_HOST={}, SOURCE_PORT={}, \
                     SOURCE_USER={}, SOURCE_PASSWORD={}, SOURCE_AUTO_POSITION=1",
                    host, port, user, password
                ),
                "START REPLICA".to_string(),
            ]
        } else {
            [
                "STOP SLAVE".to_string(),
                format!(
                    "CHANGE MASTER TO MASTER_HOST={}, MASTER_PORT={}, MASTER_USER={}, \
                     MASTER_PASSWORD={}, MASTER_AUTO_POSITION=1",
                    host, port, user, password
                ),
                "START SLAVE".to_string(),
            ]
        }
    }
}

/// `[client]` values read from a defaults-extra-file.
#[derive(Debug, Default, PartialEq, Eq)]
struct ClientDefaults {
    password: Option<String>,
    socket: Option<String>,
}

fn read_defaults_file(path: &Path) -> Result<ClientDefaults, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read defaults file {}: {}", path.display(), e))?;
    Ok(parse_defaults(&content))
}

fn parse_defaults(content: &str) -> ClientDefaults {
    let mut defaults = ClientDefaults::default();
    let mut in_client = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_client = line.eq_ignore_ascii_case("[client]");
            continue;
        }
        if !in_client {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                "password" => defaults.password = Some(value),
                "socket" => defaults.socket = Some(value),
                _ => {}
            }
        }
    }

    defaults
}
