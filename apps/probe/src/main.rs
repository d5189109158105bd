use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use futures::{stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use shared::protocol::{classify_reply, ReplyKind, SERVICE1_ROUTE};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Send requests to the fault-injection server and summarize the replies")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8082")]
    base_url: String,
    #[arg(long, default_value = SERVICE1_ROUTE)]
    path: String,
    #[arg(long, default_value_t = 10)]
    requests: usize,
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Client-side timeout per request; unset waits indefinitely.
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observation {
    Reply {
        status: u16,
        kind: ReplyKind,
        latency: Duration,
    },
    Failed {
        latency: Duration,
    },
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct LatencySummary {
    min_ms: u64,
    max_ms: u64,
    mean_ms: f64,
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct Summary {
    total: usize,
    delayed: usize,
    simulated_errors: usize,
    control_group: usize,
    other: usize,
    transport_errors: usize,
    by_status: BTreeMap<u16, usize>,
    latency: Option<LatencySummary>,
}

impl Summary {
    fn from_observations(observations: &[Observation]) -> Self {
        let mut summary = Summary {
            total: observations.len(),
            ..Summary::default()
        };
        let mut latencies = Vec::with_capacity(observations.len());

        for observation in observations {
            match *observation {
                Observation::Reply {
                    status,
                    kind,
                    latency,
                } => {
                    *summary.by_status.entry(status).or_default() += 1;
                    match kind {
                        ReplyKind::Delayed { .. } => summary.delayed += 1,
                        ReplyKind::SimulatedError { .. } => summary.simulated_errors += 1,
                        ReplyKind::ControlGroup => summary.control_group += 1,
                        ReplyKind::Other { .. } => summary.other += 1,
                    }
                    latencies.push(latency);
                }
                Observation::Failed { latency } => {
                    summary.transport_errors += 1;
                    latencies.push(latency);
                }
            }
        }

        if let (Some(min), Some(max)) = (latencies.iter().min(), latencies.iter().max()) {
            let total_ms: f64 = latencies.iter().map(|l| l.as_secs_f64() * 1000.0).sum();
            summary.latency = Some(LatencySummary {
                min_ms: whole_millis(*min),
                max_ms: whole_millis(*max),
                mean_ms: total_ms / latencies.len() as f64,
            });
        }
        summary
    }

    fn render(&self) -> String {
        let mut out = format!(
            "requests: {}\n  delayed: {}\n  simulated errors: {}\n  control group: {}\n  other: {}\n  transport errors: {}\n",
            self.total,
            self.delayed,
            self.simulated_errors,
            self.control_group,
            self.other,
            self.transport_errors
        );
        for (status, count) in &self.by_status {
            out.push_str(&format!("  status {status}: {count}\n"));
        }
        if let Some(latency) = &self.latency {
            out.push_str(&format!(
                "latency: min {}ms, max {}ms, mean {:.1}ms\n",
                latency.min_ms, latency.max_ms, latency.mean_ms
            ));
        }
        out
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut builder = Client::builder();
    if let Some(ms) = args.timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    let client = builder.build().context("failed to build http client")?;

    let url = target_url(&args.base_url, &args.path);
    let observations = run_probe(&client, &url, args.requests, args.concurrency).await;
    let summary = Summary::from_observations(&observations);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("target: {url}");
        print!("{}", summary.render());
    }
    Ok(())
}

fn whole_millis(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

fn target_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn run_probe(
    client: &Client,
    url: &str,
    requests: usize,
    concurrency: usize,
) -> Vec<Observation> {
    stream::iter(0..requests)
        .map(|_| probe_once(client, url))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn probe_once(client: &Client, url: &str) -> Observation {
    let started = Instant::now();
    let result = async {
        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>((status, body))
    }
    .await;
    let latency = started.elapsed();

    match result {
        Ok((status, body)) => {
            let kind = classify_reply(status, &body);
            debug!(status, ?kind, ?latency, "reply");
            Observation::Reply {
                status,
                kind,
                latency,
            }
        }
        Err(error) => {
            warn!(%error, ?latency, "request failed");
            Observation::Failed { latency }
        }
    }
}
