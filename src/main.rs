use clap::Parser;
use farmabot::catalog::Catalog;
use farmabot::{Config, Robot};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "farmabot-host", about = "Navigation host for the FarmaBot shelf robot")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "farmabot.toml")]
    config: String,

    /// Select a target at startup (medication name or <row>-<level> code)
    #[arg(short, long)]
    target: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    tracing::info!("Starting farmabot-host");
    let config = Config::load(&args.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", args.config, e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Device: {}", config.device.base_url);

    let catalog = match &config.catalog.path {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("Catalog unavailable ({}); selections must be raw codes", e);
                Catalog::default()
            }
        },
        None => Catalog::default(),
    };

    let mut robot = Robot::new(&config)?;
    robot.start();

    // relay worker notifications to the log; a real surface would subscribe
    // the same way
    let mut events = robot.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!("{}", event.status_text());
        }
    });

    if let Some(target) = &args.target {
        select_target(&robot, &catalog, target).await;
    }

    // stdin stands in for the excluded presentation layer: one selection per
    // line, medication name or raw location code
    tracing::info!("Type a medication name or location code and press enter");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        select_target(&robot, &catalog, line).await;
    }

    robot.shutdown().await;
    Ok(())
}

async fn select_target(robot: &Robot, catalog: &Catalog, input: &str) {
    let code = match catalog.lookup(input) {
        Some(location) => {
            tracing::info!("'{}' is stored at {}", input, location);
            location.to_string()
        }
        None => input.to_string(),
    };
    if let Err(e) = robot.select(code).await {
        tracing::error!("Failed to queue selection: {}", e);
    }
}
