//! The application handle.
//!
//! [`KritorApp`] ties the pieces together: configuration, a handler
//! registry, the engine, and the auth and message collaborators. It is an
//! explicit value; nothing in the crate reaches for a global "current app".
//!
//! ```rust,ignore
//! let transport = LoopbackTransport::new();
//! let app = KritorApp::builder()
//!     .event_service(transport.events.clone())
//!     .message_service(transport.messages.clone())
//!     .build()?;
//!
//! app.on_message(|event| async move {
//!     println!("{}", event.event_name());
//!     Ok(())
//! });
//!
//! app.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use kritor_core::{Category, Contact, DomainEvent, MessageChain};
use kritor_framework::{HandlerId, HandlerRegistry, HandlerResult, HandlerTarget, SharedEvent};
use kritor_protocol::model::{
    AddTicketRequest, AuthenticateRequest, AuthenticationStateRequest, DeleteTicketRequest,
    GetTicketRequest, SendMessageRequest, SendMessageResponse, TicketResponse,
};
use kritor_protocol::{AuthService, EventService, MessageService, PushServer, encode_chain, encode_contact};
use tracing::{debug, error, info};

use crate::config::{ConfigError, ConfigLoader, KritorConfig, Mode, validate_config};
use crate::engine::{Engine, EngineOptions, EngineState, ShutdownReport, Topology};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::signal::wait_for_shutdown_signal;

/// A configured Kritor application.
pub struct KritorApp {
    config: KritorConfig,
    registry: Arc<HandlerRegistry>,
    engine: Engine,
    auth: Option<Arc<dyn AuthService>>,
    messages: Option<Arc<dyn MessageService>>,
}

impl KritorApp {
    pub fn builder() -> KritorAppBuilder {
        KritorAppBuilder::new()
    }

    pub fn config(&self) -> &KritorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    // =========================================================================
    // Handler Registration
    // =========================================================================

    /// Registers a handler target under `category`.
    pub fn on(&self, category: Category, target: HandlerTarget) -> HandlerId {
        self.registry.register(category, target)
    }

    pub fn on_core<F, Fut>(&self, f: F) -> HandlerId
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register_suspending(Category::Core, f)
    }

    pub fn on_message<F, Fut>(&self, f: F) -> HandlerId
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register_suspending(Category::Message, f)
    }

    pub fn on_notice<F, Fut>(&self, f: F) -> HandlerId
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register_suspending(Category::Notice, f)
    }

    pub fn on_request<F, Fut>(&self, f: F) -> HandlerId
    where
        F: Fn(SharedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register_suspending(Category::Request, f)
    }

    pub fn on_core_blocking<F>(&self, f: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_blocking(Category::Core, f)
    }

    pub fn on_message_blocking<F>(&self, f: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_blocking(Category::Message, f)
    }

    pub fn on_notice_blocking<F>(&self, f: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_blocking(Category::Notice, f)
    }

    pub fn on_request_blocking<F>(&self, f: F) -> HandlerId
    where
        F: Fn(&DomainEvent) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry.register_blocking(Category::Request, f)
    }

    /// Unregisters a handler. Returns `false` if it was not registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.registry.remove(id)
    }

    /// Unregisters every handler in `category`.
    pub fn clear_handlers(&self, category: Category) -> usize {
        self.registry.clear(category)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    fn auth_service(&self) -> RuntimeResult<&Arc<dyn AuthService>> {
        self.auth
            .as_ref()
            .ok_or(RuntimeError::MissingCollaborator("auth service"))
    }

    fn account(&self) -> RuntimeResult<String> {
        self.config
            .account
            .clone()
            .ok_or_else(|| ConfigError::missing_field("account").into())
    }

    fn ticket(&self) -> RuntimeResult<String> {
        self.config
            .ticket
            .clone()
            .ok_or_else(|| ConfigError::missing_field("ticket").into())
    }

    /// Authenticates the configured account if the remote requires it.
    ///
    /// Returns whether an authenticate call was made.
    pub async fn authenticate(&self) -> RuntimeResult<bool> {
        let auth = self.auth_service()?;
        let account = self.account()?;

        let state = auth
            .get_authentication_state(AuthenticationStateRequest {
                account: account.clone(),
            })
            .await?;
        if !state.is_required {
            debug!(account = %account, "Authentication not required");
            return Ok(false);
        }

        let response = auth
            .authenticate(AuthenticateRequest {
                account: account.clone(),
                ticket: self.ticket()?,
            })
            .await?;
        if !response.is_ok() {
            error!(account = %account, code = response.code, "Authentication rejected");
            return Err(RuntimeError::Auth {
                code: response.code,
                message: response.msg,
            });
        }

        info!(account = %account, "Authenticated");
        Ok(true)
    }

    /// Lists the tickets of the configured account.
    pub async fn get_ticket(&self) -> RuntimeResult<TicketResponse> {
        let request = GetTicketRequest {
            account: self.account()?,
            ticket: self.ticket()?,
        };
        Ok(self.auth_service()?.get_ticket(request).await?)
    }

    pub async fn add_ticket(&self, new_ticket: impl Into<String>) -> RuntimeResult<TicketResponse> {
        let request = AddTicketRequest {
            account: self.account()?,
            ticket: self.ticket()?,
            new_ticket: new_ticket.into(),
        };
        Ok(self.auth_service()?.add_ticket(request).await?)
    }

    pub async fn delete_ticket(
        &self,
        delete_ticket: impl Into<String>,
    ) -> RuntimeResult<TicketResponse> {
        let request = DeleteTicketRequest {
            account: self.account()?,
            ticket: self.ticket()?,
            delete_ticket: delete_ticket.into(),
        };
        Ok(self.auth_service()?.delete_ticket(request).await?)
    }

    // =========================================================================
    // Messaging
    // =========================================================================

    /// Sends a message to a friend, a group or any [`Contact`].
    ///
    /// `retry_count` is handed to the collaborator as is.
    pub async fn send_message(
        &self,
        target: impl Into<Contact>,
        message: impl Into<MessageChain>,
        retry_count: Option<u32>,
    ) -> RuntimeResult<SendMessageResponse> {
        let messages = self
            .messages
            .as_ref()
            .ok_or(RuntimeError::MissingCollaborator("message service"))?;

        let contact = target.into();
        let chain = message.into();
        debug!(contact = %contact, elements = chain.len(), "Sending message");

        let response = messages
            .send_message(SendMessageRequest {
                contact: encode_contact(&contact),
                elements: encode_chain(&chain),
                retry_count,
            })
            .await?;
        Ok(response)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts the engine and logs the run banner.
    pub async fn start(&self) -> RuntimeResult<()> {
        info!(
            event = "ApplicationLaunch",
            account = self.config.account.as_deref().unwrap_or("-"),
            mode = %self.config.mode,
            endpoint = %self.config.endpoint(),
            handlers = Category::ALL.iter().map(|&c| self.registry.len(c)).sum::<usize>(),
            "Kritor app launching: {}",
            self.engine.topology()
        );
        self.engine.start().await
    }

    /// Stops the engine.
    pub async fn stop(&self) -> ShutdownReport {
        let report = self.engine.stop().await;
        info!(
            event = "ApplicationShutdown",
            timed_out = report.timed_out.len(),
            "Kritor app shut down"
        );
        report
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<ShutdownReport> {
        self.start().await?;
        info!("Kritor app is running. Press Ctrl+C to stop.");

        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Failed to listen for shutdown signals");
        }

        Ok(self.stop().await)
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<ShutdownReport>
    where
        F: Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        Ok(self.stop().await)
    }
}

// =============================================================================
// KritorAppBuilder
// =============================================================================

/// Builder for [`KritorApp`].
pub struct KritorAppBuilder {
    config_loader: ConfigLoader,
    config: Option<KritorConfig>,
    registry: Option<Arc<HandlerRegistry>>,
    events: Option<Arc<dyn EventService>>,
    push_server: Option<Arc<dyn PushServer>>,
    auth: Option<Arc<dyn AuthService>>,
    messages: Option<Arc<dyn MessageService>>,
    init_logging: bool,
}

impl KritorAppBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            registry: None,
            events: None,
            push_server: None,
            auth: None,
            messages: None,
            init_logging: true,
        }
    }

    /// Uses `config` as is instead of loading one.
    pub fn config(mut self, config: KritorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: KritorConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Shares an existing registry instead of creating one.
    pub fn registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Event service used in passive mode.
    pub fn event_service(mut self, events: Arc<dyn EventService>) -> Self {
        self.events = Some(events);
        self
    }

    /// Push server used in active mode.
    pub fn push_server(mut self, server: Arc<dyn PushServer>) -> Self {
        self.push_server = Some(server);
        self
    }

    pub fn auth_service(mut self, auth: Arc<dyn AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn message_service(mut self, messages: Arc<dyn MessageService>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Leaves the global subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<KritorApp> {
        let config = match self.config {
            Some(config) => {
                validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let topology = match config.mode {
            Mode::Passive => Topology::Passive {
                events: self
                    .events
                    .ok_or(RuntimeError::MissingCollaborator("event service"))?,
                endpoint: config.client.addr(),
            },
            Mode::Active => Topology::Active {
                server: self
                    .push_server
                    .ok_or(RuntimeError::MissingCollaborator("push server"))?,
                addr: config.server.addr(),
                max_workers: config.server.max_workers,
            },
        };

        let registry = self.registry.unwrap_or_default();
        let engine = Engine::new(
            topology,
            registry.clone(),
            EngineOptions::from(&config.engine),
        );

        debug!(mode = %config.mode, "Kritor app built");

        Ok(KritorApp {
            config,
            registry,
            engine,
            auth: self.auth,
            messages: self.messages,
        })
    }
}

impl Default for KritorAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
