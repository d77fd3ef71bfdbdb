//! Server lifecycle: resolve configuration, freeze the registry, run one
//! transport, and stop on a shutdown signal or when the transport ends.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::config::{RunConfig, ServeSettings, TransportKind};
use crate::protocol::ProtocolHandler;
use crate::registry::{FrozenRegistry, HandlerRegistry};
use crate::transport::StdioTransport;
use crate::types::{McpError, McpResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    Stopped,
    Failed,
}

/// Why a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The shutdown future fired.
    Signal,
    /// The transport finished on its own, e.g. end of input.
    TransportClosed,
}

/// Extra time granted past the drain timeout before a runner is abandoned.
const WIND_DOWN_GRACE: Duration = Duration::from_secs(1);

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct Coordinator {
    settings: ServeSettings,
    registry: Option<HandlerRegistry>,
    stdio: Option<(BoxedReader, BoxedWriter)>,
    state: watch::Sender<LifecycleState>,
}

impl Coordinator {
    /// Coordinator serving the default OOSA tools and resources.
    pub fn new(settings: ServeSettings) -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            settings,
            registry: None,
            stdio: None,
            state,
        }
    }

    /// Serve `registry` instead of the default handler set.
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Run the stdio transport on these streams instead of stdin/stdout.
    pub fn with_stdio_streams<R, W>(mut self, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.stdio = Some((Box::new(reader), Box::new(writer)));
        self
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Run until `shutdown` resolves or the transport stops.
    pub async fn run<F>(mut self, shutdown: F) -> McpResult<ShutdownReason>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = self.run_inner(shutdown).await;
        let final_state = match result {
            Ok(_) => LifecycleState::Stopped,
            Err(_) => LifecycleState::Failed,
        };
        self.state.send_replace(final_state);
        result
    }

    async fn run_inner<F>(&mut self, shutdown: F) -> McpResult<ShutdownReason>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let config = self.settings.clone().resolve()?;
        let registry = self.build_registry(&config)?.freeze();

        let ct = CancellationToken::new();
        let mut runner = self.spawn_runner(&config, registry, ct.clone())?;
        tracing::info!(transport = %config.transport, "Server running");

        let signal = tokio::spawn({
            let ct = ct.clone();
            async move {
                shutdown.await;
                ct.cancel();
            }
        });
        self.state.send_replace(LifecycleState::Running);

        let outcome = tokio::select! {
            () = ct.cancelled() => {
                tracing::info!("shutting down server");
                wind_down(runner, &config).await;
                Ok(ShutdownReason::Signal)
            }
            joined = &mut runner => match joined {
                Ok(Ok(())) => {
                    tracing::info!("Transport closed");
                    Ok(ShutdownReason::TransportClosed)
                }
                Ok(Err(e)) => {
                    tracing::error!("Transport failed: {e}");
                    Err(McpError::Transport(format!("transport failed: {e}")))
                }
                Err(e) => Err(McpError::InternalError(format!("transport task failed: {e}"))),
            },
        };

        signal.abort();
        outcome
    }

    fn build_registry(&mut self, config: &RunConfig) -> McpResult<HandlerRegistry> {
        match self.registry.take() {
            Some(registry) => Ok(registry),
            None => {
                let backend = Backend::open(config.attractions.as_deref())?;
                HandlerRegistry::with_defaults(Arc::new(backend))
            }
        }
    }

    fn spawn_runner(
        &mut self,
        config: &RunConfig,
        registry: FrozenRegistry,
        ct: CancellationToken,
    ) -> McpResult<JoinHandle<McpResult<()>>> {
        match config.transport {
            TransportKind::Stdio => {
                let transport = StdioTransport::new(ProtocolHandler::new(registry))
                    .with_command_logging(config.log_commands);
                let streams = self.stdio.take();
                Ok(tokio::spawn(async move {
                    match streams {
                        Some((reader, writer)) => transport.run_on(reader, writer, ct).await,
                        None => transport.run(ct).await,
                    }
                }))
            }
            #[cfg(feature = "sse")]
            TransportKind::Sse => {
                let transport =
                    crate::transport::SseTransport::new(registry, config.base_url.clone())
                        .with_drain_timeout(config.drain_timeout);
                let addr = config.addr.clone();
                Ok(tokio::spawn(async move { transport.run(&addr, ct).await }))
            }
            #[cfg(not(feature = "sse"))]
            TransportKind::Sse => Err(McpError::Config(
                "transport 'sse' is not compiled into this build".to_string(),
            )),
        }
    }
}

/// Give a cancelled runner a bounded chance to finish.
async fn wind_down(runner: JoinHandle<McpResult<()>>, config: &RunConfig) {
    let limit = config.drain_timeout + WIND_DOWN_GRACE;
    match tokio::time::timeout(limit, runner).await {
        Ok(Ok(Ok(()))) => tracing::debug!("Transport stopped"),
        Ok(Ok(Err(e))) => tracing::warn!("Transport stopped with error: {e}"),
        Ok(Err(e)) => tracing::warn!("Transport task failed: {e}"),
        Err(_) => tracing::warn!("Transport did not stop within {limit:?}"),
    }
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}
