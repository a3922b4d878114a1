use std::{io::ErrorKind, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::{Duration as ChronoDuration, Timelike, Utc};
use chrono_tz::Tz;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{info, warn};

use loadshed_common::{ControllerConfig, DayPlan, Decision, LoadKind, RelayDecisionEngine};

use crate::{
    fetch::{PriceClient, WeatherClient, DEFAULT_PRICE_BASE_URL, DEFAULT_WEATHER_BASE_URL},
    notify::Notifier,
    relay::RelayClient,
};

#[derive(Clone)]
struct AppState {
    config: Arc<ControllerConfig>,
    tz: Tz,
    engine: Arc<Mutex<RelayDecisionEngine>>,
    prices: PriceClient,
    weather: WeatherClient,
    relay: RelayClient,
    notifier: Notifier,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = load_config()?;
    config.sanitize();

    let tz: Tz = config
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone {:?}", config.timezone))?;

    let engine = RelayDecisionEngine::new(
        config.load,
        config.temp_high_threshold,
        config.temp_hysteresis,
    );

    info!("starting load shedding controller for {}", config.load.label());

    let config = Arc::new(config);
    let state = AppState {
        tz,
        engine: Arc::new(Mutex::new(engine)),
        prices: PriceClient::new(DEFAULT_PRICE_BASE_URL),
        weather: WeatherClient::new(DEFAULT_WEATHER_BASE_URL),
        relay: RelayClient::new(config.relay_host.clone()),
        notifier: Notifier::new(&config.webhook_url),
        config,
    };

    if state.config.load == LoadKind::HeatingCable {
        spawn_forecast_loop(state.clone());
    }
    spawn_plan_loop(state.clone());
    spawn_decision_loop(state.clone());

    let app = Router::new()
        .route("/api/status", get(handle_get_status))
        .route("/api/plan", get(handle_get_plan))
        .with_state(state.clone());

    let addr: SocketAddr = format!("0.0.0.0:{}", state.config.http_port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind status server at {addr}"))?;

    info!("controller listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn load_config() -> anyhow::Result<ControllerConfig> {
    let path = std::env::var("LOADSHED_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./loadshed.json"));

    match std::fs::read(&path) {
        Ok(raw) => serde_json::from_slice(&raw)
            .with_context(|| format!("invalid config at {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ControllerConfig::default()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn spawn_plan_loop(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            refresh_plans(&state).await;
        }
    });
}

fn spawn_decision_loop(state: AppState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_millis(state.config.decision_interval_ms));
        loop {
            interval.tick().await;
            decision_tick(&state).await;
        }
    });
}

fn spawn_forecast_loop(state: AppState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_millis(state.config.temp_refresh_interval_ms));
        loop {
            interval.tick().await;
            refresh_forecast(&state).await;
        }
    });
}

/// Fetches today's prices (and tomorrow's, late in the day), rebuilds
/// the blackout plans, and broadcasts the schedule. A failed fetch is
/// logged and skipped; the previous plan stays in force. The loop body
/// runs fetches one at a time, so a stale result can never overwrite a
/// newer accepted one.
async fn refresh_plans(state: &AppState) {
    let now = Utc::now().with_timezone(&state.tz);
    let today = now.date_naive();

    match state
        .prices
        .fetch_day(today, &state.config.price_region)
        .await
    {
        Ok(table) => {
            let plan = DayPlan::build(
                table,
                state.config.price_floor,
                state.config.shed_hours,
                state.config.load.policy(),
            );
            let report = plan.blackout.plan_report(
                "Today",
                &plan.table,
                state.config.price_floor,
                state.config.load.policy(),
            );
            state.engine.lock().await.set_today(plan);
            info!("today's blackout plan updated");
            state.notifier.notify(&report).await;
        }
        Err(err) => warn!("today's price refresh failed: {err}"),
    }

    if now.hour() >= u32::from(state.config.next_day_fetch_hour) {
        let tomorrow = today + ChronoDuration::days(1);
        match state
            .prices
            .fetch_day(tomorrow, &state.config.price_region)
            .await
        {
            Ok(table) => {
                let plan = DayPlan::build(
                    table,
                    state.config.price_floor,
                    state.config.shed_hours,
                    state.config.load.policy(),
                );
                let report = plan.blackout.plan_report(
                    "Tomorrow",
                    &plan.table,
                    state.config.price_floor,
                    state.config.load.policy(),
                );
                state.engine.lock().await.set_tomorrow(plan);
                info!("tomorrow's blackout plan updated");
                state.notifier.notify(&report).await;
            }
            Err(err) => warn!("tomorrow's price refresh failed: {err}"),
        }
    }
}

async fn decision_tick(state: &AppState) {
    let now = Utc::now().with_timezone(&state.tz);
    let hour = now.hour() as u8;
    let minute = now.minute() as u8;

    let decision = {
        let mut engine = state.engine.lock().await;
        engine.decide(hour, minute)
    };

    match decision {
        Decision::Switch { on, transition } => {
            if let Some(message) = transition {
                info!("{message}");
                state.notifier.notify(&message).await;
            }
            // Re-asserted every tick; tolerates manual overrides and
            // device reboots.
            state.relay.set(state.config.relay_id, on).await;
        }
        Decision::Deferred => {
            warn!("no forecast for hour {hour}, refreshing out of band");
            refresh_forecast(state).await;
        }
    }
}

async fn refresh_forecast(state: &AppState) {
    match state
        .weather
        .fetch_forecast(&state.config.latitude, &state.config.longitude)
        .await
    {
        Ok(forecast) => {
            state.engine.lock().await.set_forecast(forecast);
            info!("temperature forecast updated");
        }
        Err(err) => warn!("forecast refresh failed: {err}"),
    }
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now().with_timezone(&state.tz);
    let status = state.engine.lock().await.status(now.hour() as u8);
    Json(status)
}

async fn handle_get_plan(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.engine.lock().await.plan_view();
    Json(view)
}
