// zerodbtool/src/db/mod.rs
use async_trait::async_trait;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::errors::{AppError, Result};

/// One open connection to the server, in autocommit mode.
#[async_trait]
pub trait SqlSession: Send {
    /// Runs one batch and drains every result set it produces, returning how
    /// many there were. BACKUP and RESTORE report progress through extra
    /// result sets; leaving them unread leaves the connection mid-response.
    async fn execute(&mut self, sql: &str) -> std::result::Result<usize, tiberius::error::Error>;

    async fn close(self) -> std::result::Result<(), tiberius::error::Error>;
}

/// Opens sessions from a connection string.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: SqlSession;

    async fn connect(&self, connection_string: &str) -> Result<Self::Session>;
}

/// SQL Server over TDS. The connection string uses the ADO.NET format, e.g.
/// `server=tcp:localhost,1433;user=sa;password=...;TrustServerCertificate=true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TdsConnector;

pub struct TdsSession {
    client: Client<Compat<TcpStream>>,
}

#[async_trait]
impl Connector for TdsConnector {
    type Session = TdsSession;

    async fn connect(&self, connection_string: &str) -> Result<TdsSession> {
        let config = Config::from_ado_string(connection_string)
            .map_err(|e| AppError::database("parsing CONNECTION_STRING", e))?;

        let addr = config.get_addr();
        let tcp = TcpStream::connect(&addr)
            .await
            .map_err(|source| AppError::Connect { addr: addr.clone(), source })?;
        tcp.set_nodelay(true)
            .map_err(|source| AppError::Connect { addr, source })?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| AppError::database("connecting to the database server", e))?;

        tracing::debug!("Opened database connection");
        Ok(TdsSession { client })
    }
}

#[async_trait]
impl SqlSession for TdsSession {
    async fn execute(&mut self, sql: &str) -> std::result::Result<usize, tiberius::error::Error> {
        tracing::debug!(sql, "Executing batch");
        let results = self.client.simple_query(sql).await?.into_results().await?;
        Ok(results.len())
    }

    async fn close(self) -> std::result::Result<(), tiberius::error::Error> {
        tracing::debug!("Closing database connection");
        self.client.close().await
    }
}
