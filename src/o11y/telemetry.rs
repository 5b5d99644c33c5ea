use anyhow::Result;
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    logs::SdkLoggerProvider,
    resource::Resource,
    trace::{SdkTracerProvider, Tracer},
};
use opentelemetry_semantic_conventions::attribute::DEPLOYMENT_ENVIRONMENT_NAME;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Keeps the OTLP providers alive for the process lifetime and flushes them
/// on drop. Hold the guard in `main` until shutdown.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl TelemetryGuard {
    /// Install the global tracing subscriber: env-filtered JSON logs on
    /// stdout, plus OTLP trace/log export when an endpoint is configured.
    pub fn init(config: &AppConfig) -> Result<Self> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let endpoint = config
            .otel
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty());

        let Some(endpoint) = endpoint else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer())
                .try_init()?;
            return Ok(Self {
                tracer_provider: None,
                logger_provider: None,
            });
        };

        let resource = Resource::builder()
            .with_service_name(config.otel.service_name.clone())
            .with_attribute(KeyValue::new(
                DEPLOYMENT_ENVIRONMENT_NAME,
                config.environment.clone(),
            ))
            .build();

        let (trace_layer, tracer_provider) = if config.otel.disable_traces {
            (None, None)
        } else {
            let (layer, provider) = build_trace_export(config, endpoint, resource.clone())?;
            (Some(layer), Some(provider))
        };

        let (log_layer, logger_provider) = if config.otel.disable_logs {
            (None, None)
        } else {
            let (layer, provider) = build_log_export(endpoint, resource)?;
            (Some(layer), Some(provider))
        };

        tracing_subscriber::registry()
            .with(trace_layer)
            .with(log_layer)
            .with(env_filter)
            .with(stdout_layer())
            .try_init()?;

        info!(
            endpoint,
            traces = tracer_provider.is_some(),
            logs = logger_provider.is_some(),
            "OpenTelemetry export enabled (json stdout retained)"
        );

        Ok(Self {
            tracer_provider,
            logger_provider,
        })
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(err) = provider.shutdown() {
                warn!(error = ?err, "failed to shutdown tracer provider cleanly");
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(err) = provider.shutdown() {
                warn!(error = ?err, "failed to shutdown logger provider cleanly");
            }
        }
    }
}

fn stdout_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .json()
}

fn build_trace_export<S>(
    config: &AppConfig,
    endpoint: &str,
    resource: Resource,
) -> Result<(tracing_opentelemetry::OpenTelemetryLayer<S, Tracer>, SdkTracerProvider)>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    let tracer = provider.tracer(config.otel.service_name.clone());
    global::set_tracer_provider(provider.clone());

    Ok((tracing_opentelemetry::layer().with_tracer(tracer), provider))
}

fn build_log_export(
    endpoint: &str,
    resource: Resource,
) -> Result<(
    OpenTelemetryTracingBridge<SdkLoggerProvider, opentelemetry_sdk::logs::SdkLogger>,
    SdkLoggerProvider,
)> {
    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkLoggerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build();

    let layer = OpenTelemetryTracingBridge::new(&provider);

    Ok((layer, provider))
}
