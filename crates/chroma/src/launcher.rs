//! Local Chroma server launcher
//!
//! Runs `chromadb.app:app` under uvicorn in the foreground with a persistent
//! data directory.

use callnotes_common::{AppConfig, CallNotesError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Printed when the server cannot be started
pub const INSTALL_HINTS: &str = "Trying alternative: install chromadb with server extras:
  pip3 install 'chromadb[server]'

Or use Docker:
  docker run -d -p 8000:8000 -v $(pwd)/chroma_db:/chroma/chroma chromadb/chroma";

/// Foreground launcher for a local Chroma server
#[derive(Debug, Clone)]
pub struct ServerLauncher {
    python_bin: String,
    bind_host: String,
    port: u16,
    db_path: PathBuf,
    shutdown_grace: Duration,
}

impl ServerLauncher {
    pub fn new(
        python_bin: impl Into<String>,
        bind_host: impl Into<String>,
        port: u16,
        db_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            python_bin: python_bin.into(),
            bind_host: bind_host.into(),
            port,
            db_path: db_path.into(),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    /// How long the child may take to exit after Ctrl+C before it is killed
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.python_bin,
            &config.server_bind_host,
            config.chroma_port,
            &config.chroma_db_path,
        )
    }

    /// Create the persist directory if needed and return its absolute path
    pub fn prepare(&self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.db_path).map_err(|e| {
            CallNotesError::config(format!(
                "Failed to create database directory {}: {}",
                self.db_path.display(),
                e
            ))
        })?;

        if self.db_path.is_absolute() {
            Ok(self.db_path.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.db_path))
        }
    }

    /// Build the uvicorn command for the given persist directory
    pub fn command(&self, persist_dir: &Path) -> Command {
        let mut command = Command::new(&self.python_bin);
        command
            .args(["-m", "uvicorn", "chromadb.app:app"])
            .arg("--host")
            .arg(&self.bind_host)
            .arg("--port")
            .arg(self.port.to_string())
            .args(["--log-level", "info"])
            // Keeps chromadb from reading a .env in the working directory
            .env("CHROMA_SERVER_NOFILE", "1")
            .env("IS_PERSISTENT", "TRUE")
            .env("PERSIST_DIRECTORY", persist_dir)
            .env("ANONYMIZED_TELEMETRY", "FALSE")
            .kill_on_drop(true);
        command
    }

    /// Startup banner lines
    pub fn banner(&self, persist_dir: &Path) -> Vec<String> {
        vec![
            format!("Starting ChromaDB server on http://localhost:{}", self.port),
            format!("Database path: {}", persist_dir.display()),
            "Press Ctrl+C to stop the server".to_string(),
        ]
    }

    /// Run the server until it exits or Ctrl+C is pressed
    pub async fn run(&self) -> Result<()> {
        let persist_dir = self.prepare()?;

        for line in self.banner(&persist_dir) {
            println!("{}", line);
        }
        println!();

        info!(
            "Launching {} -m uvicorn chromadb.app:app on {}:{}",
            self.python_bin, self.bind_host, self.port
        );

        // Registered before the spawn so an early Ctrl+C is not lost
        let interrupted = interrupt_listener()?;
        tokio::pin!(interrupted);

        let mut child = self.command(&persist_dir).spawn().map_err(|e| {
            CallNotesError::process(format!("Failed to start {}: {}", self.python_bin, e))
        })?;

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = &mut interrupted => {
                println!("\nStopping ChromaDB server...");
                // The child shares our process group and got the same SIGINT
                match tokio::time::timeout(self.shutdown_grace, child.wait()).await {
                    Ok(status) => {
                        debug!("Server stopped: {:?}", status);
                    }
                    Err(_) => {
                        warn!("Server did not stop within {:?}, killing it", self.shutdown_grace);
                        child.kill().await?;
                    }
                }
                return Ok(());
            }
        };

        check_exit(status)
    }
}

/// Install the Ctrl+C handler now; the returned future resolves on the next interrupt
#[cfg(unix)]
fn interrupt_listener() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(async move {
        interrupts.recv().await;
    })
}

#[cfg(windows)]
fn interrupt_listener() -> Result<impl Future<Output = ()>> {
    let mut interrupts = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        interrupts.recv().await;
    })
}

fn check_exit(status: ExitStatus) -> Result<()> {
    if status.success() {
        info!("Server exited");
        Ok(())
    } else {
        Err(CallNotesError::process(format!("Server exited with {}", status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn launcher(python_bin: &str, db_path: &Path) -> ServerLauncher {
        ServerLauncher::new(python_bin, "0.0.0.0", 8123, db_path)
    }

    #[test]
    fn test_prepare_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("chroma_db");

        let persist_dir = launcher("python3", &db_path).prepare().unwrap();

        assert!(db_path.is_dir());
        assert_eq!(persist_dir, db_path);
    }

    #[test]
    fn test_prepare_resolves_relative_path() {
        let persist_dir = launcher("python3", Path::new("target/test_chroma_db"))
            .prepare()
            .unwrap();

        assert!(persist_dir.is_absolute());
        assert!(persist_dir.ends_with("target/test_chroma_db"));
        std::fs::remove_dir_all(&persist_dir).ok();
    }

    #[test]
    fn test_command_arguments_and_environment() {
        let persist_dir = Path::new("/data/chroma");
        let command = launcher("python3", persist_dir).command(persist_dir);
        let command = command.as_std();

        assert_eq!(command.get_program(), "python3");
        let args: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(
            args,
            [
                "-m", "uvicorn", "chromadb.app:app", "--host", "0.0.0.0", "--port", "8123",
                "--log-level", "info",
            ]
        );

        let envs: Vec<(&OsStr, Option<&OsStr>)> = command.get_envs().collect();
        assert!(envs.contains(&(OsStr::new("IS_PERSISTENT"), Some(OsStr::new("TRUE")))));
        assert!(envs.contains(&(OsStr::new("CHROMA_SERVER_NOFILE"), Some(OsStr::new("1")))));
        assert!(envs.contains(&(OsStr::new("ANONYMIZED_TELEMETRY"), Some(OsStr::new("FALSE")))));
        assert!(envs.contains(&(
            OsStr::new("PERSIST_DIRECTORY"),
            Some(OsStr::new("/data/chroma"))
        )));
    }

    #[test]
    fn test_banner() {
        let persist_dir = Path::new("/data/chroma");
        let banner = launcher("python3", persist_dir).banner(persist_dir);

        assert_eq!(banner[0], "Starting ChromaDB server on http://localhost:8123");
        assert_eq!(banner[1], "Database path: /data/chroma");
    }

    #[tokio::test]
    async fn test_run_missing_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let result = launcher("callnotes-no-such-python", tmp.path()).run().await;

        assert!(matches!(result, Err(CallNotesError::Process(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let tmp = tempfile::tempdir().unwrap();

        let result = launcher("false", tmp.path()).run().await;
        assert!(matches!(result, Err(CallNotesError::Process(_))));

        let result = launcher("true", tmp.path()).run().await;
        assert!(result.is_ok());
    }
}
