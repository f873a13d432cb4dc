//! The benchmark-collection layer: stored benchmark records → queries.
//!
//! A stored record pairs one analyzed plan with its repeated runtime
//! measurements. Reads are memoized per directory through a bounded FIFO
//! cache so repeated model-evaluation passes over the same database do not
//! re-parse everything.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use planlat_core::{EstimatorConfig, FifoCache, Schema};
use planlat_pipeline::build_pipelines;
use planlat_plan::{PlanTelemetry, QueryPlan};
use serde::Deserialize;

use crate::category::QueryCategory;
use crate::error::{Error, Result};
use crate::query::BenchmarkedQuery;

#[derive(Debug, Deserialize)]
struct BenchmarkRun {
    #[serde(rename = "executionTime")]
    execution_time: f64,
}

#[derive(Debug, Deserialize)]
struct AnalyzedQuery {
    plan: PlanTelemetry,
    #[serde(default)]
    query_text: String,
}

/// On-disk layout of one stored benchmark record.
#[derive(Debug, Deserialize)]
struct BenchmarkFile {
    plan: AnalyzedQuery,
    benchmarks: Vec<BenchmarkRun>,
}

/// Read one stored benchmark record. The parent directory names the query
/// category.
pub fn read_analyzed_plan(
    path: &Path,
    schema: &Schema,
    predicted_cardinalities: bool,
) -> Result<BenchmarkedQuery> {
    let text = std::fs::read_to_string(path)?;
    let record: BenchmarkFile = serde_json::from_str(&text)?;

    let plan = QueryPlan::parse(&record.plan.plan, schema, predicted_cardinalities)?;
    let pipelines = build_pipelines(&plan, &record.plan.plan.analyze_plan_pipelines)?;
    let runtimes: Vec<f64> = record
        .benchmarks
        .iter()
        .map(|b| b.execution_time)
        .collect();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let category = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|dir| QueryCategory::from_dir_name(&dir.to_string_lossy()))
        .ok_or_else(|| Error::Category(name.clone()))?;

    Ok(BenchmarkedQuery::new(
        plan,
        pipelines,
        runtimes,
        name,
        record.plan.query_text,
        category,
    ))
}

fn json_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Collects stored benchmark runs, memoized per (directory, cardinality
/// mode). The cache is explicit and bounded; it is owned by the collector,
/// not module-global.
pub struct DataCollector {
    cache: FifoCache<(PathBuf, bool), Arc<Vec<BenchmarkedQuery>>>,
}

impl DataCollector {
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            cache: FifoCache::new(config.cache_capacity),
        }
    }

    /// Read every benchmark record below `dir`, sorted by path. A record
    /// that fails to parse is logged and skipped; one bad query must not
    /// sink the batch.
    pub fn collect_dir(
        &mut self,
        dir: &Path,
        schema: &Schema,
        predicted_cardinalities: bool,
    ) -> Result<Arc<Vec<BenchmarkedQuery>>> {
        let key = (dir.to_path_buf(), predicted_cardinalities);
        let collected = self.cache.get_or_insert_with(key, || -> Result<_> {
            let mut files = Vec::new();
            json_files(dir, &mut files)?;
            files.sort();
            let mut queries = Vec::with_capacity(files.len());
            for file in &files {
                match read_analyzed_plan(file, schema, predicted_cardinalities) {
                    Ok(query) => queries.push(query),
                    Err(error) => {
                        tracing::warn!(file = %file.display(), %error, "skipping benchmark record");
                    }
                }
            }
            Ok(Arc::new(queries))
        })?;
        Ok(Arc::clone(collected))
    }
}
