//! Read-only gate for model-synthesized SQL.
//!
//! The model is untrusted input and this gate is the only boundary between
//! its output and the dataset store, so it fails closed: anything that is not
//! exactly one read-only retrieval statement is rejected before execution.
//! Classification is a real statement-kind parse, not keyword matching.
//!
//! Rejected shapes:
//!
//! | Shape | Example |
//! |-------|---------|
//! | Mutation statements | `INSERT`, `UPDATE`, `DELETE`, `TRUNCATE` |
//! | Schema/admin statements | `DROP`, `ALTER`, `CREATE`, `ATTACH`, `PRAGMA` |
//! | Transaction control | `BEGIN`, `COMMIT`, `ROLLBACK` |
//! | Multi-statement batches | `SELECT 1; DELETE FROM data` |
//! | Writes inside a query body | `SELECT * INTO copy FROM data` |
//! | Unparseable or empty input | |
//!
//! The query body is walked recursively (CTEs, derived tables, set
//! operations included), so a data-modifying expression cannot hide behind
//! an outer `SELECT`.

use compact_str::CompactString;
use indexmap::IndexSet;
use smallvec::SmallVec;
use sqlparser::{ast, dialect::SQLiteDialect, parser::Parser};

use crate::error::{AppResult, rejected_query_error};

/// Type alias for small column vectors (typically < 8 elements)
pub type ColumnVec = SmallVec<[CompactString; 8]>;

/// A statement that passed the gate.
#[derive(Debug, Clone)]
pub struct ValidatedQuery {
    /// Canonical text of the single retrieval statement
    pub sql:          String,
    /// Tables referenced anywhere in the query
    pub tables:       Vec<CompactString>,
    /// Projected column names, where derivable from the statement
    pub projection:   ColumnVec,
    /// Whether the projection contains a `*` wildcard
    pub has_wildcard: bool
}

/// Validate a candidate query string
///
/// # Errors
///
/// Returns a rejection error if the input does not parse, holds more than
/// one statement, or is anything other than a read-only retrieval statement.
pub fn validate(sql: &str) -> AppResult<ValidatedQuery> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(rejected_query_error("empty statement"));
    }

    let statements = Parser::parse_sql(&SQLiteDialect {}, trimmed)
        .map_err(|e| rejected_query_error(e.to_string()))?;
    match statements.len() {
        0 => return Err(rejected_query_error("no statement found")),
        1 => {}
        n => {
            return Err(rejected_query_error(format!(
                "expected a single statement, found {}",
                n
            )));
        }
    }

    let stmt = &statements[0];
    let ast::Statement::Query(query) = stmt else {
        return Err(rejected_query_error(format!(
            "{} is not a read-only retrieval statement",
            statement_kind(stmt)
        )));
    };

    let mut tables = IndexSet::new();
    check_query(query, &mut tables)?;

    let mut projection = IndexSet::new();
    let mut has_wildcard = false;
    extract_projection(&query.body, &mut projection, &mut has_wildcard);

    Ok(ValidatedQuery {
        sql: stmt.to_string(),
        tables: tables.into_iter().collect(),
        projection: projection.into_iter().collect(),
        has_wildcard
    })
}

/// Name the operation kind of a non-retrieval statement for the rejection
fn statement_kind(stmt: &ast::Statement) -> &'static str {
    use sqlparser::ast::Statement;
    match stmt {
        Statement::Query(_) => "SELECT",
        Statement::Insert(_) => "INSERT",
        Statement::Update {
            ..
        } => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::Truncate {
            ..
        } => "TRUNCATE",
        Statement::Drop {
            ..
        } => "DROP",
        Statement::AlterTable {
            ..
        } => "ALTER TABLE",
        Statement::CreateTable(_) => "CREATE TABLE",
        Statement::CreateIndex(_) => "CREATE INDEX",
        Statement::CreateView {
            ..
        } => "CREATE VIEW",
        Statement::AttachDatabase {
            ..
        } => "ATTACH",
        Statement::Pragma {
            ..
        } => "PRAGMA",
        Statement::StartTransaction {
            ..
        }
        | Statement::Commit {
            ..
        }
        | Statement::Rollback {
            ..
        } => "transaction control",
        _ => "a non-retrieval statement"
    }
}

fn check_query(query: &ast::Query, tables: &mut IndexSet<CompactString>) -> AppResult<()> {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            check_query(&cte.query, tables)?;
        }
    }
    check_set_expr(&query.body, tables)
}

fn check_set_expr(
    set_expr: &ast::SetExpr,
    tables: &mut IndexSet<CompactString>
) -> AppResult<()> {
    use sqlparser::ast::SetExpr;
    match set_expr {
        SetExpr::Select(select) => {
            if select.into.is_some() {
                return Err(rejected_query_error("SELECT INTO writes a new table"));
            }
            for table in &select.from {
                check_table_factor(&table.relation, tables)?;
                for join in &table.joins {
                    check_table_factor(&join.relation, tables)?;
                }
            }
            Ok(())
        }
        SetExpr::Query(query) => check_query(query, tables),
        SetExpr::SetOperation {
            left,
            right,
            ..
        } => {
            check_set_expr(left, tables)?;
            check_set_expr(right, tables)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => Ok(()),
        SetExpr::Insert(_) | SetExpr::Update(_) | SetExpr::Delete(_) | SetExpr::Merge(_) => Err(
            rejected_query_error("data-modifying expression inside query body")
        )
    }
}

fn check_table_factor(
    table_factor: &ast::TableFactor,
    tables: &mut IndexSet<CompactString>
) -> AppResult<()> {
    use sqlparser::ast::TableFactor;
    match table_factor {
        TableFactor::Table {
            name,
            args,
            ..
        } => {
            if args.is_some() {
                return Err(rejected_query_error("table functions are not allowed"));
            }
            tables.insert(name.to_string().into());
            Ok(())
        }
        TableFactor::Derived {
            subquery, ..
        } => check_query(subquery, tables),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            check_table_factor(&table_with_joins.relation, tables)?;
            for join in &table_with_joins.joins {
                check_table_factor(&join.relation, tables)?;
            }
            Ok(())
        }
        TableFactor::TableFunction {
            ..
        } => Err(rejected_query_error("table functions are not allowed")),
        _ => Err(rejected_query_error("unsupported table expression"))
    }
}

/// Collect projected column names from the outermost select
fn extract_projection(
    set_expr: &ast::SetExpr,
    columns: &mut IndexSet<CompactString>,
    has_wildcard: &mut bool
) {
    use sqlparser::ast::{SelectItem, SetExpr};
    match set_expr {
        SetExpr::Select(select) => {
            for item in &select.projection {
                match item {
                    SelectItem::UnnamedExpr(expr) => {
                        columns.insert(projection_name(expr));
                    }
                    SelectItem::ExprWithAlias {
                        alias, ..
                    } => {
                        columns.insert(alias.value.as_str().into());
                    }
                    SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => {
                        *has_wildcard = true;
                    }
                }
            }
        }
        SetExpr::Query(query) => extract_projection(&query.body, columns, has_wildcard),
        // Set operations share the left arm's column names
        SetExpr::SetOperation {
            left, ..
        } => extract_projection(left, columns, has_wildcard),
        _ => {}
    }
}

fn projection_name(expr: &ast::Expr) -> CompactString {
    use sqlparser::ast::Expr;
    match expr {
        Expr::Identifier(ident) => ident.value.as_str().into(),
        Expr::CompoundIdentifier(idents) => idents
            .last()
            .map(|i| i.value.as_str().into())
            .unwrap_or_default(),
        other => other.to_string().into()
    }
}
