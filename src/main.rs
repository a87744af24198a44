use color_eyre::{eyre::eyre, Result};
use ps4_input::controller::{discover_with, watch_with, ControllerEvent, DeviceRole, EvdevSource};
use ps4_input::Settings;
use std::ops::RangeInclusive;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Stick readings inside this band are the resting position
const STICK_REST: RangeInclusive<i32> = 120..=134;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let settings = Settings::load_or_default()?;
    debug!("Using settings: {:?}", settings);

    let source = EvdevSource::new(settings.discovery.clone());
    let inputs = discover_with(&source)?;
    info!("Discovered {} controller inputs", inputs.len());

    let input = inputs
        .into_iter()
        .find(|input| input.role == DeviceRole::Controller)
        .ok_or_else(|| eyre!("No {} input among the discovered devices", DeviceRole::Controller))?;
    info!("Found device: {:?}", input);

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, stopping watcher"),
            Err(e) => error!("Unable to listen for Ctrl-C: {}", e),
        }
        ctrl_c_token.cancel();
    });

    let mut events = watch_with(token, input, &settings.watcher)?;
    info!("Watching...");

    while let Some(event) = events.recv().await {
        if is_resting_stick(&event) {
            continue;
        }
        println!("{}", event);
    }

    if events.dropped_events() > 0 || events.read_failures() > 0 {
        warn!(
            "Watcher dropped {} events and saw {} read failures",
            events.dropped_events(),
            events.read_failures()
        );
    }

    Ok(())
}

// Only the four stick axes; trigger depth and d-pad reports always print
fn is_resting_stick(event: &ControllerEvent) -> bool {
    match event {
        ControllerEvent::Abs(abs) => abs.button.is_stick_axis() && STICK_REST.contains(&abs.value),
        ControllerEvent::Key(_) => false,
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
