// ============================================================
// Layer 6 — MLflow File Store
// ============================================================
// Persists runs exactly where and how MLflow's local file store
// does, so `mlflow ui --backend-store-uri mlruns` shows them.
//
// Layout written (experiment "Default", id 0):
//
//   mlruns/
//     .trash/
//     0/
//       meta.yaml                   ← experiment metadata
//       <run_id>/
//         meta.yaml                 ← status, start/end time, name
//         params/<key>              ← raw value, no newline
//         metrics/<key>             ← "<ts_ms> <value> <step>\n" per log
//         tags/mlflow.runName       ← human-readable run name
//         artifacts/                ← e.g. model_config.json
//
// Runs are write-once: params cannot change value and nothing
// can be logged after end_run().
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::run::RunStatus;
use crate::domain::traits::RunTracker;

const DEFAULT_EXPERIMENT_ID:   &str = "0";
const DEFAULT_EXPERIMENT_NAME: &str = "Default";
const SOURCE_TYPE_LOCAL:       u8   = 4;
const REMOTE_STORES:           [&str; 3] = ["databricks", "databricks-uc", "uc"];

/// Turn a tracking URI (`mlruns`, `file:mlruns`, `file:///abs/mlruns`)
/// into a local directory. Remote schemes (`http://…`, `databricks`)
/// are rejected: only the local file store is written.
pub fn tracking_dir_from_uri(uri: &str) -> Result<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://").or_else(|| uri.strip_prefix("file:")) {
        ensure!(!path.is_empty(), "tracking URI '{uri}' has no path");
        return Ok(PathBuf::from(path));
    }
    if REMOTE_STORES.contains(&uri) {
        bail!("tracking URI '{uri}' names a remote store; only local file stores are supported");
    }
    if let Some((scheme, _)) = uri.split_once(':') {
        // a single letter is a Windows drive (`C:\mlruns`), not a scheme
        let looks_like_scheme = scheme.len() > 1
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if looks_like_scheme || uri.contains("://") {
            bail!("unsupported tracking URI scheme '{scheme}' in '{uri}'; use a local path or file: URI");
        }
    }
    ensure!(!uri.is_empty(), "tracking URI is empty");
    Ok(PathBuf::from(uri))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

#[derive(Debug, Serialize, Deserialize)]
struct ExperimentMeta {
    artifact_location: String,
    creation_time:     i64,
    experiment_id:     String,
    last_update_time:  i64,
    lifecycle_stage:   String,
    name:              String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RunMeta {
    artifact_uri:     String,
    end_time:         Option<i64>,
    entry_point_name: String,
    experiment_id:    String,
    lifecycle_stage:  String,
    run_id:           String,
    run_name:         String,
    run_uuid:         String,
    source_name:      String,
    source_type:      u8,
    source_version:   String,
    start_time:       i64,
    status:           u8,
    tags:             Vec<String>,
    user_id:          String,
}

/// Run tracker backed by MLflow's on-disk format.
pub struct MlflowFileStore {
    root:          PathBuf,
    experiment_id: String,
    user:          String,
    open_runs:     HashSet<String>,
}

impl MlflowFileStore {
    /// Open (or create) a store rooted at `root` and make sure the
    /// default experiment exists.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(".trash"))
            .with_context(|| format!("Cannot create tracking directory '{}'", root.display()))?;
        let root = fs::canonicalize(&root)
            .with_context(|| format!("Cannot resolve tracking directory '{}'", root.display()))?;

        let store = Self {
            root,
            experiment_id: DEFAULT_EXPERIMENT_ID.to_string(),
            user:          std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            open_runs:     HashSet::new(),
        };
        store.ensure_experiment()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn experiment_dir(&self) -> PathBuf {
        self.root.join(&self.experiment_id)
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.experiment_dir().join(run_id)
    }

    fn ensure_experiment(&self) -> Result<()> {
        let dir  = self.experiment_dir();
        let path = dir.join("meta.yaml");
        if path.exists() {
            return Ok(());
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create experiment directory '{}'", dir.display()))?;

        let now  = now_millis();
        let meta = ExperimentMeta {
            artifact_location: file_uri(&dir),
            creation_time:     now,
            experiment_id:     self.experiment_id.clone(),
            last_update_time:  now,
            lifecycle_stage:   "active".to_string(),
            name:              DEFAULT_EXPERIMENT_NAME.to_string(),
        };
        write_yaml(&path, &meta)?;
        tracing::debug!("Created experiment '{}' in '{}'", DEFAULT_EXPERIMENT_NAME, dir.display());
        Ok(())
    }

    fn ensure_open(&self, run_id: &str) -> Result<()> {
        ensure!(self.open_runs.contains(run_id), "run '{run_id}' is not open");
        Ok(())
    }

    fn write_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let path = self.run_dir(run_id).join("tags").join(key);
        fs::write(&path, value)
            .with_context(|| format!("Cannot write tag '{}'", path.display()))
    }
}

impl RunTracker for MlflowFileStore {
    fn start_run(&mut self, run_name: &str) -> Result<String> {
        let run_id  = uuid::Uuid::new_v4().simple().to_string();
        let run_dir = self.run_dir(&run_id);

        for sub in ["params", "metrics", "tags", "artifacts"] {
            let dir = run_dir.join(sub);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create run directory '{}'", dir.display()))?;
        }

        let meta = RunMeta {
            artifact_uri:     file_uri(&run_dir.join("artifacts")),
            end_time:         None,
            entry_point_name: String::new(),
            experiment_id:    self.experiment_id.clone(),
            lifecycle_stage:  "active".to_string(),
            run_id:           run_id.clone(),
            run_name:         run_name.to_string(),
            run_uuid:         run_id.clone(),
            source_name:      String::new(),
            source_type:      SOURCE_TYPE_LOCAL,
            source_version:   String::new(),
            start_time:       now_millis(),
            status:           RunStatus::Running.code(),
            tags:             Vec::new(),
            user_id:          self.user.clone(),
        };
        write_yaml(&run_dir.join("meta.yaml"), &meta)?;

        self.open_runs.insert(run_id.clone());
        self.write_tag(&run_id, "mlflow.runName", run_name)?;
        self.write_tag(&run_id, "mlflow.user", &self.user)?;
        self.write_tag(&run_id, "mlflow.source.type", "LOCAL")?;

        tracing::debug!("Started run '{}' ({})", run_name, run_id);
        Ok(run_id)
    }

    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.ensure_open(run_id)?;
        let path = self.run_dir(run_id).join("params").join(key);

        if path.exists() {
            let existing = fs::read_to_string(&path)
                .with_context(|| format!("Cannot read param '{}'", path.display()))?;
            if existing != value {
                bail!("param '{key}' already logged as '{existing}', refusing to change it to '{value}'");
            }
            return Ok(());
        }

        fs::write(&path, value)
            .with_context(|| format!("Cannot write param '{}'", path.display()))?;
        tracing::debug!("Logged param {}={} for run {}", key, value, run_id);
        Ok(())
    }

    fn log_metric(&mut self, run_id: &str, key: &str, value: f64) -> Result<()> {
        self.ensure_open(run_id)?;
        let path = self.run_dir(run_id).join("metrics").join(key);

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open metric file '{}'", path.display()))?;
        writeln!(f, "{} {} {}", now_millis(), value, 0)?;

        tracing::debug!("Logged metric {}={} for run {}", key, value, run_id);
        Ok(())
    }

    fn log_text(&mut self, run_id: &str, file_name: &str, text: &str) -> Result<()> {
        self.ensure_open(run_id)?;
        let path = self.run_dir(run_id).join("artifacts").join(file_name);
        fs::write(&path, text)
            .with_context(|| format!("Cannot write artifact '{}'", path.display()))?;
        tracing::debug!("Wrote artifact '{}'", path.display());
        Ok(())
    }

    fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        self.ensure_open(run_id)?;
        ensure!(status.is_terminal(), "a run must end as finished or failed");

        let path = self.run_dir(run_id).join("meta.yaml");
        let yaml = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read run metadata '{}'", path.display()))?;
        let mut meta: RunMeta = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Malformed run metadata '{}'", path.display()))?;

        meta.status   = status.code();
        meta.end_time = Some(now_millis());
        write_yaml(&path, &meta)?;

        self.open_runs.remove(run_id);
        tracing::debug!("Ended run {} with status {:?}", run_id, status);
        Ok(())
    }
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value)?;
    fs::write(path, yaml).with_context(|| format!("Cannot write '{}'", path.display()))
}

// ─── In-memory tracker ────────────────────────────────────────────────────────
#[cfg(test)]
pub use memory::InMemoryTracker;


// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_dir_from_uri() {
        assert_eq!(tracking_dir_from_uri("mlruns").unwrap(), PathBuf::from("mlruns"));
        assert_eq!(tracking_dir_from_uri("file:mlruns").unwrap(), PathBuf::from("mlruns"));
        assert_eq!(tracking_dir_from_uri("file:///tmp/mlruns").unwrap(), PathBuf::from("/tmp/mlruns"));
        assert_eq!(tracking_dir_from_uri("./runs/a").unwrap(), PathBuf::from("./runs/a"));
        assert_eq!(tracking_dir_from_uri(r"C:\mlruns").unwrap(), PathBuf::from(r"C:\mlruns"));
    }

    #[test]
    fn test_remote_tracking_uri_is_rejected() {
        for uri in ["http://localhost:5000", "https://mlflow.example.com", "databricks", "databricks://profile", "uc", "sqlite:///mlflow.db"] {
            let err = tracking_dir_from_uri(uri).unwrap_err();
            assert!(err.to_string().contains(uri), "{uri}: {err}");
        }
    }

    #[test]
    fn test_empty_tracking_uri_is_rejected() {
        assert!(tracking_dir_from_uri("").is_err());
        assert!(tracking_dir_from_uri("file://").is_err());
    }

    #[test]
    fn test_open_creates_default_experiment() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = MlflowFileStore::open(tmp.path().join("mlruns")).unwrap();

        let yaml = fs::read_to_string(store.experiment_dir().join("meta.yaml")).unwrap();
        let meta: ExperimentMeta = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(meta.experiment_id, "0");
        assert_eq!(meta.name, "Default");
        assert_eq!(meta.lifecycle_stage, "active");
        assert!(store.root().join(".trash").is_dir());
    }

    #[test]
    fn test_run_lifecycle_on_disk() {
        let tmp       = tempfile::tempdir().unwrap();
        let mut store = MlflowFileStore::open(tmp.path()).unwrap();

        let run_id = store.start_run("Regularized_Model").unwrap();
        assert_eq!(run_id.len(), 32);

        store.log_param(&run_id, "regularization", "L2+Dropout").unwrap();
        store.log_metric(&run_id, "test_accuracy", 0.9781).unwrap();
        store.log_text(&run_id, "model_config.json", "{}").unwrap();

        let dir = store.run_dir(&run_id);
        assert_eq!(fs::read_to_string(dir.join("params/regularization")).unwrap(), "L2+Dropout");
        assert_eq!(fs::read_to_string(dir.join("tags/mlflow.runName")).unwrap(), "Regularized_Model");
        assert!(dir.join("artifacts/model_config.json").is_file());

        let metric = fs::read_to_string(dir.join("metrics/test_accuracy")).unwrap();
        let fields: Vec<&str> = metric.trim_end().split(' ').collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], "0.9781");
        assert_eq!(fields[2], "0");

        let running: RunMeta = serde_yaml::from_str(&fs::read_to_string(dir.join("meta.yaml")).unwrap()).unwrap();
        assert_eq!(running.status, 1);
        assert_eq!(running.end_time, None);
        assert_eq!(running.run_name, "Regularized_Model");

        store.end_run(&run_id, RunStatus::Finished).unwrap();

        let done: RunMeta = serde_yaml::from_str(&fs::read_to_string(dir.join("meta.yaml")).unwrap()).unwrap();
        assert_eq!(done.status, 3);
        assert!(done.end_time.is_some());
    }

    #[test]
    fn test_closed_run_rejects_writes() {
        let tmp       = tempfile::tempdir().unwrap();
        let mut store = MlflowFileStore::open(tmp.path()).unwrap();

        let run_id = store.start_run("Base_Model_Bias_Variance").unwrap();
        store.end_run(&run_id, RunStatus::Failed).unwrap();

        assert!(store.log_metric(&run_id, "test_accuracy", 0.5).is_err());
        assert!(store.log_param(&run_id, "optimizer", "adam").is_err());
        assert!(store.end_run(&run_id, RunStatus::Finished).is_err());
    }

    #[test]
    fn test_params_cannot_change_value() {
        let tmp       = tempfile::tempdir().unwrap();
        let mut store = MlflowFileStore::open(tmp.path()).unwrap();

        let run_id = store.start_run("Model_With_Batch_Norm").unwrap();
        store.log_param(&run_id, "batch_norm", "True").unwrap();
        store.log_param(&run_id, "batch_norm", "True").unwrap();
        assert!(store.log_param(&run_id, "batch_norm", "False").is_err());
    }

    #[test]
    fn test_reopening_keeps_existing_experiment() {
        let tmp = tempfile::tempdir().unwrap();
        let first = MlflowFileStore::open(tmp.path()).unwrap();
        let meta_path = first.experiment_dir().join("meta.yaml");
        let before = fs::read_to_string(&meta_path).unwrap();

        let _second = MlflowFileStore::open(tmp.path()).unwrap();
        assert_eq!(fs::read_to_string(&meta_path).unwrap(), before);
    }

    #[test]
    fn test_in_memory_tracker_records_runs() {
        let mut tracker = InMemoryTracker::new();
        let run_id = tracker.start_run("Optimizer_Comparison_Adam").unwrap();
        tracker.log_param(&run_id, "optimizer", "Adam").unwrap();
        tracker.log_metric(&run_id, "test_accuracy", 0.97).unwrap();
        tracker.end_run(&run_id, RunStatus::Finished).unwrap();

        let run = &tracker.runs()[0];
        assert_eq!(run.run_name, "Optimizer_Comparison_Adam");
        assert_eq!(run.params["optimizer"], "Adam");
        assert_eq!(run.metrics["test_accuracy"], 0.97);
        assert_eq!(run.status, RunStatus::Finished);
        assert!(tracker.log_metric(&run_id, "test_accuracy", 0.1).is_err());
    }
}
