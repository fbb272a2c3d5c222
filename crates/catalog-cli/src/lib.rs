//! Commands behind the `catalog` binary.
//!
//! Each command returns its result instead of printing it, so the binary
//! decides on output format and exit status.

use anyhow::{anyhow, bail, Context};
use catalog_query::{FilterRequest, Page};
use catalog_schema::{Manifest, ReconcileDialect, ReconcilePlan, SchemaDiff, TableSpec};
use catalog_store::{JsonRow, Store};
use tracing::info;

/// Parses one `key=value` listing parameter.
///
/// # Errors
///
/// Returns a message when `raw` has no `=` or an empty key.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn select_tables<'m>(
    manifest: &'m Manifest,
    only: Option<&str>,
) -> anyhow::Result<Vec<&'m TableSpec>> {
    only.map_or_else(
        || Ok(manifest.tables.iter().collect()),
        |name| {
            manifest
                .table(name)
                .map(|table| vec![table])
                .ok_or_else(|| anyhow!("table '{name}' is not declared in the manifest"))
        },
    )
}

/// Plans every selected table without issuing any statement.
///
/// # Errors
///
/// Returns an error if `only` names an undeclared table or a table cannot
/// be planned.
pub async fn plan(
    store: &Store,
    manifest: &Manifest,
    only: Option<&str>,
    dialect: &dyn ReconcileDialect,
) -> anyhow::Result<Vec<ReconcilePlan>> {
    let mut plans = Vec::new();
    for table in select_tables(manifest, only)? {
        let plan = store
            .plan_table(&table.name, &table.columns, dialect)
            .await
            .with_context(|| format!("planning table '{}'", table.name))?;
        plans.push(plan);
    }
    Ok(plans)
}

/// Reconciles every selected table in manifest order.
///
/// Column failures are reported in the diffs; a table that cannot be
/// introspected stops the run.
///
/// # Errors
///
/// Returns an error if `only` names an undeclared table or a table cannot
/// be introspected.
pub async fn reconcile(
    store: &Store,
    manifest: &Manifest,
    only: Option<&str>,
    dialect: &dyn ReconcileDialect,
) -> anyhow::Result<Vec<SchemaDiff>> {
    let tables = select_tables(manifest, only)?;
    info!(tables = tables.len(), dialect = dialect.name(), "Reconciling schema");

    let mut diffs = Vec::with_capacity(tables.len());
    for table in tables {
        let diff = store
            .reconcile_table(&table.name, &table.columns, dialect)
            .await
            .with_context(|| format!("reconciling table '{}'", table.name))?;
        diffs.push(diff);
    }
    Ok(diffs)
}

/// Fails if any column in any diff could not be added.
///
/// # Errors
///
/// Returns the first incomplete diff as an error.
pub fn ensure_complete(diffs: Vec<SchemaDiff>) -> anyhow::Result<()> {
    for diff in diffs {
        diff.ensure_complete()?;
    }
    Ok(())
}

/// Returns the live column names of `table`, sorted.
///
/// # Errors
///
/// Returns an error if `table` does not exist or cannot be read.
pub async fn inspect(store: &Store, table: &str) -> anyhow::Result<Vec<String>> {
    let mut columns: Vec<String> = store.columns(table).await?.into_iter().collect();
    columns.sort();
    Ok(columns)
}

/// Runs a listing resource with the given parameters.
///
/// # Errors
///
/// Returns an error if `resource` is not declared or the store fails.
pub async fn list(
    store: &Store,
    manifest: &Manifest,
    resource: &str,
    params: &[(String, String)],
) -> anyhow::Result<Page<JsonRow>> {
    let Some(spec) = manifest.resource(resource) else {
        bail!("resource '{resource}' is not declared in the manifest");
    };
    let request =
        FilterRequest::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let built = spec.build(&request);
    Ok(store.fetch_json_page(&built).await?)
}
