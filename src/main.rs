use std::sync::Arc;

use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use romfetch::app::App;
use romfetch::config::{Config, REMOTE_ROOT};
use romfetch::notify::NotificationBus;
use romfetch::remote::{RemoteFs, RemoteSession};
use romfetch::term::TermUi;

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Last-resort diagnostics for anything the orchestrator did not contain.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        eprintln!("[{}] Fatal error: {}", ts, info);
        default_hook(info);
    }));
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();
    install_panic_hook();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    std::process::exit(run(config).await);
}

async fn run(config: Config) -> i32 {
    let bus = NotificationBus::new();

    let session = match RemoteSession::connect(&config.connection).await {
        Ok(session) => Arc::new(session),
        Err(e) => {
            bus.error(format!("SFTP connection failed: {}", e));
            return 1;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.dest_root).await {
        error!("Cannot create {}: {}", config.dest_root.display(), e);
        session.close().await;
        return 1;
    }

    let mut ui = match TermUi::new() {
        Ok(ui) => ui,
        Err(e) => {
            error!("Cannot initialize terminal: {}", e);
            session.close().await;
            return 1;
        }
    };

    let fs: Arc<dyn RemoteFs> = session.clone();
    let mut app = App::new(fs, bus, config.dest_root, REMOTE_ROOT);
    let code = match app.run(&mut ui).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    drop(ui);
    session.close().await;
    code
}
