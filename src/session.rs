//! Session context and the question round trip.
//!
//! A [`Session`] owns everything one interactive run needs: the dataset
//! store, the model client, and the configured limits. It is created at
//! startup, passed explicitly to whoever needs it, and dropped at exit —
//! there is no ambient global state.
//!
//! One call to [`Session::answer`] drives a full round trip:
//! synthesize → gate + execute → chart. Each stage logs its outcome and
//! elapsed time. A chart-stage failure degrades to "no chart" and the
//! result table is still returned; any other stage failure aborts only
//! that round trip and leaves the dataset intact for the next question.

use std::{path::Path, time::Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    chart::{self, Chart},
    config::LimitsConfig,
    error::AppResult,
    gate,
    llm::LlmClient,
    loader,
    planner,
    schema::TableSchema,
    store::{ResultTable, Store, TableDiagnostics}
};

/// Everything produced by one successful round trip
#[derive(Debug, Serialize)]
pub struct Answer {
    pub question: String,
    /// The gated statement that was executed
    pub sql:      String,
    pub table:    ResultTable,
    /// Chart, when the model proposed one and it was buildable
    pub chart:    Option<Chart>
}

/// Per-run context: store, model client, limits
pub struct Session {
    store:  Store,
    llm:    LlmClient,
    limits: LimitsConfig
}

impl Session {
    pub fn new(store: Store, llm: LlmClient, limits: LimitsConfig) -> Self {
        Self { store, llm, limits }
    }

    /// Load a CSV file into the store, replacing any previous dataset
    pub fn load_dataset(&mut self, path: &Path) -> AppResult<TableSchema> {
        let started = Instant::now();
        let dataset = loader::load_csv_file(path)?;
        let rows = dataset.row_count();
        let cols = dataset.columns.len();
        self.store.replace_table(&dataset.columns, &dataset.rows)?;
        let schema = self.store.schema()?;
        info!(
            rows,
            cols,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset loaded"
        );
        Ok(schema)
    }

    /// Current dataset schema, regenerated from the store
    pub fn schema(&self) -> AppResult<TableSchema> {
        self.store.schema()
    }

    /// First rows of the dataset for display
    pub fn preview(&self) -> AppResult<ResultTable> {
        self.store.select(&format!(
            "SELECT * FROM {} LIMIT {}",
            crate::store::TABLE_NAME,
            self.limits.preview_rows
        ))
    }

    /// Per-column dataset diagnostics
    pub fn diagnostics(&self) -> AppResult<TableDiagnostics> {
        self.store.diagnostics(self.limits.preview_rows)
    }

    /// Rows currently stored
    pub fn row_count(&self) -> AppResult<usize> {
        self.store.row_count()
    }

    /// Synthesize one SQL statement for `question`
    pub async fn synthesize(&self, question: &str) -> AppResult<String> {
        let started = Instant::now();
        let schema = self.store.schema()?;
        let sql =
            planner::synthesize_query(&self.llm, &schema, question, self.limits.max_result_rows)
                .await?;
        info!(
            sql = %sql,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query synthesized"
        );
        Ok(sql)
    }

    /// Gate and execute a candidate statement
    pub fn execute(&self, sql: &str) -> AppResult<(gate::ValidatedQuery, ResultTable)> {
        let started = Instant::now();
        let validated = gate::validate(sql)?;
        let table = self.store.select(&validated.sql)?;
        info!(
            rows = table.len(),
            cols = table.columns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query executed"
        );
        Ok((validated, table))
    }

    /// Ask the model for a chart over an executed result
    pub async fn chart(&self, question: &str, table: &ResultTable) -> AppResult<Option<Chart>> {
        let started = Instant::now();
        let chart =
            chart::synthesize_chart(&self.llm, question, table, self.limits.chart_sample_rows)
                .await?;
        match &chart {
            Some(c) => info!(
                kind = %c.kind(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "chart built"
            ),
            None => info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "no chart proposed"
            )
        }
        Ok(chart)
    }

    /// Run one full round trip for `question`
    ///
    /// Chart failures are logged and degrade to a table-only answer; every
    /// other stage failure propagates to the caller.
    pub async fn answer(&self, question: &str) -> AppResult<Answer> {
        let sql = self.synthesize(question).await?;
        let (validated, table) = self.execute(&sql)?;
        let chart = match self.chart(question, &table).await {
            Ok(chart) => chart,
            Err(e) => {
                warn!(error = %e, "charting failed, showing table only");
                None
            }
        };
        Ok(Answer {
            question: question.to_string(),
            sql: validated.sql,
            table,
            chart
        })
    }
}
