use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use std::{path::Path, time::Duration};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const SERVICE_NAME: &str = "trip_planner";

/// Keeps the log writer and span exporter alive. Flushes both when dropped.
pub struct TelemetryGuard {
    _file_log: WorkerGuard,
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("error shutting down the span exporter: {e}");
            }
        }
    }
}

/// Logs go to a daily rolling file in `log_dir` so they don't mix with the
/// interactive output. Spans are also exported when `otlp_endpoint` is set.
pub fn init(log_dir: &Path, otlp_endpoint: Option<&str>) -> anyhow::Result<TelemetryGuard> {
    let provider = otlp_endpoint.map(tracer_provider).transpose()?;

    let telemetry_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(SERVICE_NAME)));

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let appender = tracing_appender::rolling::daily(log_dir, "trip_planner.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // A layer that logs events to rolling files.
    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_ansi(false)
        .pretty();

    Registry::default()
        .with(telemetry_layer)
        .with(file_log)
        .with(env_filter)
        .try_init()
        .context("couldn't install the tracing subscriber")?;

    Ok(TelemetryGuard {
        _file_log: guard,
        provider,
    })
}

fn tracer_provider(endpoint: &str) -> anyhow::Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_timeout(Duration::from_millis(1000))
        .with_endpoint(endpoint)
        .with_protocol(opentelemetry_otlp::Protocol::Grpc)
        .build()
        .context("couldn't build the OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
