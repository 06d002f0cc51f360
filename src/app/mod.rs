use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::{AppConfig, Environment, NetConfig},
    database::DbManager,
    templ_manager::TemplateManager,
    web::rate_limit::FixedWindowLimiter,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Connects to the database, prepares the templates and rate limiters and binds the listener.
    /// Binding port 0 lets the OS pick a free port, see `App::local_addr`.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let dm = DbManager::init(&config).await?;
        let tm = TemplateManager::init();

        let window = config.rate_limit.window();
        let global_limiter = FixedWindowLimiter::new(
            "global",
            "Too many requests, please try again later.",
            config.rate_limit.global_max,
            window,
        );
        let subscribe_limiter = FixedWindowLimiter::new(
            "subscribe",
            "Too many subscription attempts, please try again later.",
            config.rate_limit.subscribe_max,
            window,
        );

        let app_state = AppState::new(
            dm,
            tm,
            global_limiter,
            subscribe_limiter,
            config.environment,
            config.net_config.clone(),
        );

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub database_mgr: DbManager,
    pub templ_mgr: TemplateManager,
    pub global_limiter: FixedWindowLimiter,
    pub subscribe_limiter: FixedWindowLimiter,
    pub environment: Environment,
    pub net_config: NetConfig,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        database_mgr: DbManager,
        templ_mgr: TemplateManager,
        global_limiter: FixedWindowLimiter,
        subscribe_limiter: FixedWindowLimiter,
        environment: Environment,
        net_config: NetConfig,
    ) -> Self {
        AppState(Arc::new(InternalState {
            database_mgr,
            templ_mgr,
            global_limiter,
            subscribe_limiter,
            environment,
            net_config,
        }))
    }
}
