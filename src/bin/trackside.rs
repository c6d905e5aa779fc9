//! Minimal console front end.
//!
//! Usage: `trackside [CONFIG.yaml]`. The config path may also come from
//! `TRACKSIDE_CONFIG`. Setting `TRACKSIDE_REPLAY` to a capture file replays it
//! instead of listening.

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context;
use futures::{Stream, StreamExt};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trackside::connection::{ReplayConnection, UdpConnection};
use trackside::{
    DashboardView, LapRecord, PlayerLapHistory, Trackside, TracksideConfig, UpdateRate,
};

type Views = Pin<Box<dyn Stream<Item = DashboardView> + Send>>;
type Laps = Pin<Box<dyn Stream<Item = Arc<PlayerLapHistory>> + Send>>;

/// Connections stop their driver when dropped, so `main` keeps this alive.
enum Source {
    Live(UdpConnection),
    Replay(ReplayConnection),
}

impl Source {
    fn streams(&self, rate: UpdateRate) -> (Views, Laps) {
        match self {
            Source::Live(c) => (Box::pin(c.subscribe::<DashboardView>(rate)), Box::pin(c.lap_updates())),
            Source::Replay(c) => (Box::pin(c.subscribe::<DashboardView>(rate)), Box::pin(c.lap_updates())),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;

    let source = match std::env::var_os("TRACKSIDE_REPLAY") {
        Some(capture) => {
            let capture = PathBuf::from(capture);
            let connection = Trackside::replay_with(&capture, &config.replay)
                .await
                .with_context(|| format!("opening capture {}", capture.display()))?;
            Source::Replay(connection)
        }
        None => {
            let connection = match &config.record_to {
                Some(path) => UdpConnection::bind_recording(&config.listener, path).await,
                None => Trackside::listen(&config.listener).await,
            }
            .context("starting listener")?;
            info!(addr = %connection.local_addr(), "Waiting for the game");
            Source::Live(connection)
        }
    };

    let (views, laps) = source.streams(UpdateRate::Max(10));
    run(views, laps).await;
    Ok(())
}

fn load_config() -> anyhow::Result<TracksideConfig> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("TRACKSIDE_CONFIG"))
        .map(PathBuf::from);

    let config = match path {
        Some(path) => TracksideConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TracksideConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

async fn run(mut views: Views, mut laps: Laps) {
    let mut completed = 0;
    let mut views_open = true;
    let mut laps_open = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    while views_open || laps_open {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
            view = views.next(), if views_open => match view {
                Some(view) => print_view(&view),
                None => views_open = false,
            },
            history = laps.next(), if laps_open => match history {
                Some(history) => {
                    for (idx, lap) in history.completed().iter().enumerate().skip(completed) {
                        println!("lap {:>3}  {}", idx + 1, format_lap(lap));
                    }
                    completed = completed.max(history.completed().len());
                }
                None => laps_open = false,
            },
        }
    }
}

fn print_view(view: &DashboardView) {
    let (throttle, brake) = view.pedals_percent();
    let position = view.player().map(|car| car.car_position).unwrap_or_default();
    let current = view.laps.in_progress().map(format_lap).unwrap_or_default();
    println!(
        "P{position:<2} {:>6.1} m/s  thr {throttle:>3}%  brk {brake:>3}%  {current}",
        view.speed()
    );
}

fn format_lap(lap: &LapRecord) -> String {
    format!(
        "{:>8.3} {:>8.3} {:>8.3} | {:>8.3}",
        lap.sector1(),
        lap.sector2(),
        lap.sector3(),
        lap.total()
    )
}
