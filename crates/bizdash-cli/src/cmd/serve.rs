use crate::context::Context;
use anyhow::Context as _;
use bizdash_core::config::{BackendConfig, WarnLevel};
use bizdash_core::store::open_store;
use bizdash_server::state::AppState;

pub fn run(ctx: Context, port: Option<u16>, no_open: bool, memory: bool) -> anyhow::Result<()> {
    let mut config = ctx.config;
    if memory {
        config.backend = BackendConfig::Memory;
    }

    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
        }
    }

    let port = port.unwrap_or(config.server.port);
    let open_browser = config.server.open_browser && !no_open;

    // The blocking HTTP client may not be dropped inside the runtime; this
    // handle outlives it.
    let store = open_store(&config.backend).context("failed to open backend")?;
    let backend = store.name();
    let state = AppState::new(store.clone(), config);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("bizdash ({backend}) → http://localhost:{actual_port}");

        tokio::select! {
            res = bizdash_server::serve_on(state, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    });
    drop(rt);
    drop(store);
    result
}
