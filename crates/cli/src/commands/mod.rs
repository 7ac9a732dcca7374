// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod init;
pub mod plan;
pub mod quarantine;
pub mod queue;
pub mod run;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::config::{self, find_work_dir, Config, RemoteConfig};
use crate::error::{Error, Result};
use crate::hydrate::{hydrate_or_cached, HydratedSession, SessionCache, SessionHydrator};
use crate::sync::{
    DurableQueue, ReachabilityMonitor, RemoteDataService, WebSocketTransport, WsRemote,
};

/// An initialized `.rep/` directory and its loaded config.
pub struct Workspace {
    pub work_dir: PathBuf,
    pub config: Config,
    pub state_dir: PathBuf,
}

impl Workspace {
    /// Finds the workspace from the current directory.
    pub fn open() -> Result<Self> {
        Self::at(&find_work_dir()?)
    }

    pub fn at(work_dir: &Path) -> Result<Self> {
        let config = Config::load(work_dir)?;
        Ok(Workspace {
            work_dir: work_dir.to_path_buf(),
            state_dir: config::state_dir(work_dir),
            config,
        })
    }

    pub fn open_queue(&self) -> Result<Arc<DurableQueue>> {
        std::fs::create_dir_all(&self.state_dir)?;
        Ok(Arc::new(DurableQueue::open(&self.state_dir)?))
    }

    /// The remote endpoint, or [`Error::NoRemote`].
    pub fn require_remote(&self) -> Result<RemoteConfig> {
        self.config.effective_remote().ok_or(Error::NoRemote)
    }

    /// A WebSocket client for `remote`, reporting into `monitor`.
    pub fn connect_remote(&self, remote: &RemoteConfig, monitor: ReachabilityMonitor) -> WsRemote {
        let transport =
            WebSocketTransport::new(Duration::from_secs(remote.connect_timeout_secs));
        WsRemote::new(
            remote.url.as_str(),
            self.config.client_id.as_str(),
            transport,
            monitor,
        )
    }
}

/// Loads a session through the remote when there is one, otherwise from
/// the device cache.
pub async fn load_session<R: RemoteDataService>(
    remote: Option<R>,
    cache: &SessionCache,
    session_id: &str,
) -> Result<HydratedSession> {
    match remote {
        Some(remote) => hydrate_or_cached(&SessionHydrator::new(remote), cache, session_id).await,
        None => cache.load(session_id)?.ok_or(Error::NoRemote),
    }
}

/// Single-threaded runtime for commands that talk to the remote.
pub fn runtime() -> Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub(crate) mod testing;
