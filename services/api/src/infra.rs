use metrics_exporter_prometheus::PrometheusHandle;
use mvp_planner::catalog::{Catalog, CatalogLoader};
use mvp_planner::config::PlannerConfig;
use mvp_planner::planning::MvpPlanner;
use mvp_planner::scoring::{clamp_rate, parse_rate};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One planning session shared by every request.
pub(crate) type SharedPlanner = Arc<Mutex<MvpPlanner>>;

pub(crate) fn shared_planner(catalog: Catalog) -> SharedPlanner {
    Arc::new(Mutex::new(MvpPlanner::in_memory(Arc::new(catalog))))
}

/// Load the configured feeds, or the demo dataset when no directory is set or
/// the feeds cannot be read.
pub(crate) fn load_catalog(config: &PlannerConfig) -> Catalog {
    match &config.data_dir {
        Some(dir) => CatalogLoader::from_dir(dir)
            .with_benchmark_year(config.benchmark_year)
            .load_or_demo(),
        None => {
            info!("MVP_DATA_DIR not set; using demo dataset");
            Catalog::demo()
        }
    }
}

fn rate_from_value(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map(clamp_rate)
            .ok_or_else(|| format!("rate {number} is not representable")),
        Value::String(text) => Ok(clamp_rate(parse_rate(text))),
        other => Err(format!("rate must be a number or text, got {other}")),
    }
}

/// Accepts `72.5` or `"72.5%"`; unparseable text is 0.
pub(crate) fn deserialize_rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    rate_from_value(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<Value>::deserialize(deserializer)?;
    opt.map(|value| rate_from_value(&value).map_err(serde::de::Error::custom))
        .transpose()
}
