// In-memory SqlSession/Connector double that records every statement it is asked to run.
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::db::{Connector, SqlSession};
use crate::errors::{AppError, Result};

#[derive(Debug, Default)]
struct RecorderState {
    statements: Vec<String>,
    fail_markers: Vec<String>,
    opened: usize,
    closed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    state: Arc<Mutex<RecorderState>>,
}

impl Recorder {
    /// Any statement containing `marker` fails (it is still recorded).
    pub fn fail_when_contains(&self, marker: &str) {
        self.state.lock().unwrap().fail_markers.push(marker.to_string());
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn session(&self) -> RecordingSession {
        self.state.lock().unwrap().opened += 1;
        RecordingSession { recorder: self.clone() }
    }
}

pub struct RecordingSession {
    recorder: Recorder,
}

#[async_trait]
impl SqlSession for RecordingSession {
    async fn execute(&mut self, sql: &str) -> std::result::Result<usize, tiberius::error::Error> {
        let mut state = self.recorder.state.lock().unwrap();
        state.statements.push(sql.to_string());
        if let Some(marker) = state.fail_markers.iter().find(|m| sql.contains(m.as_str())) {
            return Err(tiberius::error::Error::Protocol(
                format!("simulated failure on '{}'", marker).into(),
            ));
        }
        Ok(1)
    }

    async fn close(self) -> std::result::Result<(), tiberius::error::Error> {
        self.recorder.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    pub recorder: Recorder,
    pub refuse_connections: bool,
}

#[async_trait]
impl Connector for RecordingConnector {
    type Session = RecordingSession;

    async fn connect(&self, _connection_string: &str) -> Result<RecordingSession> {
        if self.refuse_connections {
            return Err(AppError::database(
                "connecting to the database server",
                tiberius::error::Error::Protocol("connection refused".into()),
            ));
        }
        Ok(self.recorder.session())
    }
}
