use std::{path::Path, sync::Arc};

use anyhow::{anyhow, Context as _};
use log::{error, info, warn, LevelFilter};
use tokio::{signal, sync::broadcast};

use crate::{
    config::{Config, ConfigError},
    context::Context,
    font::FontWidths,
    shutdown::Shutdown,
};

mod client;
mod config;
mod connection;
mod context;
mod font;
mod listener;
mod logging;
mod response;
mod shutdown;

const CONFIG_PATH: &str = "config/config.toml";
const FONT_WIDTHS_PATH: &str = "data/fontWidths.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "console")]
    console_subscriber::init();

    let config = load_config(Path::new(CONFIG_PATH))?;
    let font_widths = FontWidths::load(Path::new(FONT_WIDTHS_PATH));

    let (host, port) = (config.server.host.clone(), config.server.port);
    let listener = match listener::bind(&host, port).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("port {} may already be in use or another error occurred", port);
            return Err(err).with_context(|| format!("failed to listen on {}:{}", host, port));
        }
    };
    info!("listening on {}:{} for new connections", host, port);

    let context = Arc::new(Context::new(config, font_widths));

    let (notify_shutdown, _) = broadcast::channel::<()>(1);
    let acceptor = tokio::spawn(listener::serve(
        listener,
        context,
        Shutdown::new(notify_shutdown.subscribe()),
    ));

    if let Err(err) = signal::ctrl_c().await {
        error!("failed to listen for interrupt: {:#}", anyhow!(err));
    }

    info!("shutting down");

    drop(notify_shutdown);
    acceptor.await?;

    Ok(())
}

/// Reads the configuration, falling back to the defaults when the file is
/// missing or broken. Also initializes logging at the configured level.
fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = match config::read(path) {
        Ok(config) => {
            logging::init(config.server.log_level)?;
            info!("configuration loaded from {}", path.display());
            config
        }
        Err(err) => {
            logging::init(LevelFilter::Info)?;

            let not_found = matches!(err, ConfigError::NotFound);
            warn!("failed to read config file: {:#}", anyhow!(err));
            warn!("using default configuration");

            let config = Config::default();
            if not_found {
                if let Err(err) = config.write(path) {
                    warn!("failed to create new config file: {:#}", anyhow!(err));
                } else {
                    info!("initialized default config file ({})", path.display());
                }
            }

            config
        }
    };

    Ok(config)
}
