use std::{io, net::SocketAddr, sync::Arc, thread};

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use control::ControlState;
use server_api::{primary_service, secondary_service, ApiContext};
use shared::protocol::{ServiceReply, SERVICE1_ROUTE, SERVICE2_ROUTE};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod console;

use app_state::AppState;
use config::{load_settings, Settings};
use console::{ConsoleExit, ControlConsole};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = load_settings();
    info!(?settings, "loaded settings");

    let control = Arc::new(ControlState::with_delay(settings.initial_delay_ms));
    let state = AppState {
        api: ApiContext::new(Arc::clone(&control)),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    if settings.console {
        spawn_console(control, &settings)?;
    } else {
        info!("operator console disabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Runs the operator console on its own OS thread, blocked on stdin between
/// commands. Exit from the console halts the whole process without draining
/// in-flight requests.
fn spawn_console(control: Arc<ControlState>, settings: &Settings) -> anyhow::Result<()> {
    let console = ControlConsole::new(control, settings.delay_step_ms);
    thread::Builder::new()
        .name("control-console".into())
        .spawn(move || {
            let stdin = io::stdin();
            let stdout = io::stdout();
            if let Some(code) = console_outcome(console.run(stdin.lock(), stdout.lock())) {
                std::process::exit(code);
            }
        })
        .context("failed to start console thread")?;
    Ok(())
}

/// Exit code the process should halt with once the console stops, or `None`
/// to keep serving without it.
fn console_outcome(result: io::Result<ConsoleExit>) -> Option<i32> {
    match result {
        Ok(ConsoleExit::Requested) => {
            info!("exit requested from console");
            Some(0)
        }
        Ok(ConsoleExit::InputClosed) => {
            warn!("console input closed; serving without operator console");
            None
        }
        Err(error) => {
            error!(%error, "console failed; serving without operator console");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for ctrl-c; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(SERVICE1_ROUTE, any(service1))
        .route(SERVICE2_ROUTE, any(service2))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn service1(State(state): State<Arc<AppState>>) -> Response {
    reply_response(primary_service(&state.api).await)
}

async fn service2() -> Response {
    reply_response(secondary_service().await)
}

async fn not_found() -> Response {
    reply_response(ServiceReply::not_found())
}

fn reply_response(reply: ServiceReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        reply.body,
    )
        .into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
