//! Reload coordination
//!
//! Clangd reads its configuration (compilation database, `.clangd`, …)
//! at startup; servers without `compilationDatabase.automaticReload` must
//! be restarted by the client when those files change. The coordinator
//! owns the session lifecycle as a small state machine:
//!
//! ```text
//! Inactive -> Negotiating -> Active -> Reloading -> Negotiating -> ...
//! ```
//!
//! A reload fully tears the session down before the new negotiation
//! begins, so no two `Active` phases can overlap and the host never sees
//! duplicate command/provider registrations. A failed teardown or restart
//! leaves the coordinator in a degraded `Inactive` state; retrying is the
//! host's decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ExtensionOptions;
use crate::error::{ExtensionError, LspError, TeardownError};
use crate::features::FeatureKind;
use crate::infra::protocol::ServerCapabilities;
use crate::infra::transport::LspTransport;
use crate::session::ClangdSession;

/// Config files whose change or creation restarts the server. Matched by
/// file name anywhere under the workspace.
pub const WATCHED_CONFIG_FILES: [&str; 4] = [
    "compile_commands.json",
    "compile_flags.txt",
    ".clangd",
    ".clang-tidy",
];

/// Client-side config watching. Active only when the server does not
/// advertise `compilationDatabase.automaticReload`; modern clangd reloads
/// config itself and never needs this.
#[derive(Debug, Default)]
pub struct ConfigReloadFeature {
    disposed: bool,
}

impl ConfigReloadFeature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a changed path should restart the server.
    pub fn is_reload_trigger(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| WATCHED_CONFIG_FILES.contains(&name))
    }

    pub(crate) fn dispose(&mut self) -> Result<(), TeardownError> {
        if self.disposed {
            return Err(TeardownError::new(FeatureKind::ConfigReload, "already disposed"));
        }
        self.disposed = true;
        Ok(())
    }
}

/// The host side of the client handshake: starting the underlying LSP
/// client (resolving once server capabilities are received) and stopping
/// it again.
#[async_trait]
pub trait SessionHost: Send {
    type Transport: LspTransport + 'static;

    async fn start(&mut self) -> Result<(ServerCapabilities, Arc<Self::Transport>), LspError>;

    async fn stop(&mut self) -> Result<(), LspError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Negotiating,
    Active,
    Reloading,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Negotiating => "Negotiating",
            Self::Active => "Active",
            Self::Reloading => "Reloading",
        }
    }
}

/// Why a reload was requested.
#[derive(Debug, Clone)]
pub enum ReloadReason {
    ServerStopped,
    ConfigFileChanged(PathBuf),
}

pub struct ReloadCoordinator<H: SessionHost> {
    host: H,
    options: ExtensionOptions,
    state: SessionState,
    session: Option<ClangdSession<H::Transport>>,
}

impl<H: SessionHost> ReloadCoordinator<H> {
    pub fn new(host: H, options: ExtensionOptions) -> Self {
        Self {
            host,
            options,
            state: SessionState::Inactive,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&ClangdSession<H::Transport>> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ClangdSession<H::Transport>> {
        self.session.as_mut()
    }

    /// Start the first session. Only valid from `Inactive`.
    pub async fn start(&mut self) -> Result<(), ExtensionError> {
        if self.state != SessionState::Inactive {
            return Err(ExtensionError::Reload {
                state: self.state.name(),
                message: "start is only valid from Inactive".to_string(),
            });
        }
        self.state = SessionState::Negotiating;
        match self.negotiate().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!("session start failed: {e}");
                self.state = SessionState::Inactive;
                Err(e)
            }
        }
    }

    async fn negotiate(&mut self) -> Result<(), ExtensionError> {
        let (capabilities, transport) = self.host.start().await?;
        let session = ClangdSession::negotiate(capabilities, transport, &self.options);
        tracing::debug!(features = ?session_kinds(&session), "session negotiated");
        self.session = Some(session);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Tear the current session down and negotiate a fresh one. Only valid
    /// from `Active`; failure leaves the coordinator degraded `Inactive`
    /// with no implicit retry.
    pub async fn reload(&mut self, reason: ReloadReason) -> Result<(), ExtensionError> {
        if self.state != SessionState::Active {
            return Err(ExtensionError::Reload {
                state: self.state.name(),
                message: "reload is only valid from Active".to_string(),
            });
        }
        tracing::info!(?reason, "reloading clangd session");
        self.state = SessionState::Reloading;

        // Full teardown before any restart: overlapping Active phases
        // would register duplicate providers with the host.
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
        if let Err(e) = self.host.stop().await {
            tracing::error!("session teardown failed: {e}");
            self.state = SessionState::Inactive;
            return Err(e.into());
        }

        self.state = SessionState::Negotiating;
        match self.negotiate().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!("session restart failed: {e}");
                self.state = SessionState::Inactive;
                Err(e)
            }
        }
    }

    /// File-watcher entry point. Reloads when the session watches config
    /// changes client-side and the path is a watched config file; returns
    /// whether a reload ran.
    pub async fn on_config_file_event(&mut self, path: &Path) -> Result<bool, ExtensionError> {
        let watching = self
            .session
            .as_ref()
            .is_some_and(|s| s.config_reload().is_some());
        if self.state != SessionState::Active
            || !watching
            || !ConfigReloadFeature::is_reload_trigger(path)
        {
            return Ok(false);
        }
        self.reload(ReloadReason::ConfigFileChanged(path.to_path_buf()))
            .await?;
        Ok(true)
    }

    /// Signal that the server process stopped unexpectedly.
    pub async fn on_server_stopped(&mut self) -> Result<(), ExtensionError> {
        self.reload(ReloadReason::ServerStopped).await
    }
}

fn session_kinds<T: LspTransport + ?Sized>(session: &ClangdSession<T>) -> Vec<FeatureKind> {
    FeatureKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            FeatureKind::Ast => session.ast().is_some(),
            FeatureKind::InlayHints => session.inlay_hints().is_some(),
            FeatureKind::MemoryUsage => session.memory_usage().is_some(),
            FeatureKind::SemanticHighlighting => session.semantic_highlighting().is_some(),
            FeatureKind::ConfigReload => session.config_reload().is_some(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;
    use crate::infra::transport::mock::MockTransport;

    struct ScriptedHost {
        capabilities: VecDeque<serde_json::Value>,
        starts: usize,
        stops: usize,
        fail_next_start: bool,
        fail_next_stop: bool,
    }

    impl ScriptedHost {
        fn new(capabilities: Vec<serde_json::Value>) -> Self {
            Self {
                capabilities: capabilities.into(),
                starts: 0,
                stops: 0,
                fail_next_start: false,
                fail_next_stop: false,
            }
        }
    }

    #[async_trait]
    impl SessionHost for ScriptedHost {
        type Transport = MockTransport;

        async fn start(&mut self) -> Result<(ServerCapabilities, Arc<MockTransport>), LspError> {
            if self.fail_next_start {
                self.fail_next_start = false;
                return Err(LspError::NotConnected);
            }
            self.starts += 1;
            let caps = self
                .capabilities
                .pop_front()
                .ok_or(LspError::NotConnected)?;
            Ok((ServerCapabilities::new(caps), Arc::new(MockTransport::new())))
        }

        async fn stop(&mut self) -> Result<(), LspError> {
            if self.fail_next_stop {
                self.fail_next_stop = false;
                return Err(LspError::Protocol("stop failed".to_string()));
            }
            self.stops += 1;
            Ok(())
        }
    }

    #[test]
    fn test_trigger_matching() {
        assert!(ConfigReloadFeature::is_reload_trigger(Path::new(
            "/ws/build/compile_commands.json"
        )));
        assert!(ConfigReloadFeature::is_reload_trigger(Path::new(
            "/ws/sub/dir/.clangd"
        )));
        assert!(ConfigReloadFeature::is_reload_trigger(Path::new(".clang-tidy")));
        assert!(!ConfigReloadFeature::is_reload_trigger(Path::new(
            "/ws/src/main.cpp"
        )));
        assert!(!ConfigReloadFeature::is_reload_trigger(Path::new(
            "/ws/compile_commands.json.bak"
        )));
    }

    #[tokio::test]
    async fn test_start_negotiates_once() {
        let host = ScriptedHost::new(vec![json!({ "astProvider": true })]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        assert_eq!(coordinator.state(), SessionState::Inactive);

        coordinator.start().await.unwrap();
        assert_eq!(coordinator.state(), SessionState::Active);
        assert!(coordinator.session().unwrap().ast().is_some());

        // A second start would overlap the active session.
        assert!(coordinator.start().await.is_err());
        assert_eq!(coordinator.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_reload_renegotiates_without_overlap() {
        let host = ScriptedHost::new(vec![
            json!({ "astProvider": true }),
            json!({ "memoryUsageProvider": true }),
        ]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        coordinator.start().await.unwrap();

        coordinator
            .reload(ReloadReason::ServerStopped)
            .await
            .unwrap();
        assert_eq!(coordinator.state(), SessionState::Active);
        assert_eq!(coordinator.host.starts, 2);
        assert_eq!(coordinator.host.stops, 1);

        // The new session reflects the new capabilities, not the old ones.
        let session = coordinator.session().unwrap();
        assert!(session.ast().is_none());
        assert!(session.memory_usage().is_some());
    }

    #[tokio::test]
    async fn test_reload_only_valid_from_active() {
        let host = ScriptedHost::new(vec![]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        let err = coordinator.reload(ReloadReason::ServerStopped).await;
        assert!(matches!(err, Err(ExtensionError::Reload { .. })));
        assert_eq!(coordinator.state(), SessionState::Inactive);
    }

    #[tokio::test]
    async fn test_failed_restart_degrades_to_inactive() {
        let mut host = ScriptedHost::new(vec![json!({})]);
        host.fail_next_start = false;
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        coordinator.start().await.unwrap();

        coordinator.host.fail_next_start = true;
        let err = coordinator.reload(ReloadReason::ServerStopped).await;
        assert!(err.is_err());
        assert_eq!(coordinator.state(), SessionState::Inactive);
        assert!(coordinator.session().is_none());
    }

    #[tokio::test]
    async fn test_failed_teardown_degrades_to_inactive() {
        let host = ScriptedHost::new(vec![json!({}), json!({})]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        coordinator.start().await.unwrap();

        coordinator.host.fail_next_stop = true;
        let err = coordinator.on_server_stopped().await;
        assert!(err.is_err());
        assert_eq!(coordinator.state(), SessionState::Inactive);
        // No restart was attempted after the failed teardown.
        assert_eq!(coordinator.host.starts, 1);
    }

    #[tokio::test]
    async fn test_config_file_event_triggers_reload() {
        let host = ScriptedHost::new(vec![json!({}), json!({})]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        coordinator.start().await.unwrap();

        let ran = coordinator
            .on_config_file_event(Path::new("/ws/compile_flags.txt"))
            .await
            .unwrap();
        assert!(ran);
        assert_eq!(coordinator.host.starts, 2);

        // Unwatched files never restart the server.
        let ran = coordinator
            .on_config_file_event(Path::new("/ws/src/main.cpp"))
            .await
            .unwrap();
        assert!(!ran);
        assert_eq!(coordinator.host.starts, 2);
    }

    #[tokio::test]
    async fn test_automatic_reload_suppresses_watching() {
        let host = ScriptedHost::new(vec![json!({
            "compilationDatabase": { "automaticReload": true }
        })]);
        let mut coordinator = ReloadCoordinator::new(host, ExtensionOptions::default());
        coordinator.start().await.unwrap();
        assert!(coordinator.session().unwrap().config_reload().is_none());

        let ran = coordinator
            .on_config_file_event(Path::new("/ws/compile_commands.json"))
            .await
            .unwrap();
        assert!(!ran);
        assert_eq!(coordinator.host.starts, 1);
    }
}
