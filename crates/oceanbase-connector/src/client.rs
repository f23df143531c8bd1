//! Connector facade.
//!
//! [`OceanBaseClient`] binds the compatible mode once, at construction, and
//! answers every lookup the query engine makes: column mappings, write
//! mappings, DDL statements, pushdown rewrites and metadata listings.
//!
//! Mapping and SQL generation are pure. Operations that touch the backend take
//! a [`MetadataConnection`] per call, run one statement per await and never
//! retry.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use crate::config::{ConnectorConfig, SessionSettings};
use crate::core::identifier::escape_name_pattern;
use crate::core::traits::{Dialect, MetadataConnection, SortItem, TableFilter, TableRow};
use crate::core::types::{BackendTypeDescriptor, LogicalType};
use crate::core::CompatibleMode;
use crate::drivers::DialectImpl;
use crate::error::{ConnectorError, Result};
use crate::pushdown::{
    self, AggregateCall, AggregateExpression, ColumnRef, Expression, ParameterizedExpression,
};
use crate::typemap::{self, ColumnMapping, WriteMapping};

/// Cells buffered per fetch.
const FETCH_CELLS: usize = 100_000;

/// Lower bound on rows per fetch.
const MIN_FETCH_SIZE: usize = 1_000;

/// Table name as stored by the backend.
///
/// MySQL mode reports databases as catalogs, so `schema` is usually empty
/// there and `catalog` carries the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteTableName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: String,
}

impl RemoteTableName {
    pub fn new(catalog: Option<&str>, schema: Option<&str>, table: impl Into<String>) -> Self {
        Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            table: table.into(),
        }
    }

    /// The namespace holding the table: the schema, else the catalog.
    fn namespace(&self) -> Option<&str> {
        self.schema
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.catalog.as_deref().filter(|c| !c.is_empty()))
    }
}

/// Column of a CREATE TABLE request.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub comment: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, logical_type: LogicalType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            logical_type,
            nullable,
            comment: None,
        }
    }
}

/// CREATE TABLE request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDefinition {
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub comment: Option<String>,
    /// Engine table properties. None are supported.
    pub properties: BTreeMap<String, String>,
}

/// Connector facade for one compatible mode.
#[derive(Debug, Clone)]
pub struct OceanBaseClient {
    dialect: DialectImpl,
    session: SessionSettings,
    forced_varchar: HashSet<i32>,
}

impl OceanBaseClient {
    /// Create a client from validated configuration.
    pub fn new(config: &ConnectorConfig) -> Result<Self> {
        config.validate()?;
        let client = Self {
            dialect: DialectImpl::from_mode(config.compatible_mode),
            session: config.session,
            forced_varchar: config.forced_varchar_types()?,
        };
        info!(
            "OceanBase connector in {} mode ({} forced varchar type codes)",
            client.mode(),
            client.forced_varchar.len()
        );
        Ok(client)
    }

    /// Client with default session settings and no forced varchar types.
    pub fn for_mode(mode: CompatibleMode) -> Self {
        Self {
            dialect: DialectImpl::from_mode(mode),
            session: SessionSettings::default(),
            forced_varchar: HashSet::new(),
        }
    }

    pub fn with_session(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    pub fn with_forced_varchar(mut self, type_codes: impl IntoIterator<Item = i32>) -> Self {
        self.forced_varchar = type_codes.into_iter().collect();
        self
    }

    pub fn mode(&self) -> CompatibleMode {
        self.dialect.mode()
    }

    pub fn dialect(&self) -> &DialectImpl {
        &self.dialect
    }

    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    /// Rows per fetch for a result with `column_count` columns.
    pub fn fetch_size(&self, column_count: usize) -> usize {
        if column_count == 0 {
            return MIN_FETCH_SIZE;
        }
        (FETCH_CELLS / column_count).max(MIN_FETCH_SIZE)
    }

    // ===== Type mapping =====

    /// Column mapping under the client's session settings.
    pub fn to_column_mapping(
        &self,
        descriptor: &BackendTypeDescriptor,
    ) -> Result<Option<ColumnMapping>> {
        self.to_column_mapping_in_session(&self.session, descriptor)
    }

    /// Column mapping under settings supplied by the calling session.
    pub fn to_column_mapping_in_session(
        &self,
        session: &SessionSettings,
        descriptor: &BackendTypeDescriptor,
    ) -> Result<Option<ColumnMapping>> {
        typemap::to_column_mapping(self.mode(), session, &self.forced_varchar, descriptor)
    }

    pub fn to_logical_type(&self, descriptor: &BackendTypeDescriptor) -> Result<Option<LogicalType>> {
        Ok(self
            .to_column_mapping(descriptor)?
            .map(|mapping| mapping.logical_type))
    }

    pub fn to_write_mapping(&self, logical_type: &LogicalType) -> Result<WriteMapping> {
        typemap::to_write_mapping(self.mode(), logical_type)
    }

    // ===== SQL generation =====

    /// Quote an engine-side table name, converting each part to its remote form.
    pub fn quoted(&self, catalog: Option<&str>, schema: Option<&str>, table: &str) -> Result<String> {
        let remote = |name: &str| self.dialect.to_remote_identifier(name);
        let catalog = catalog.map(remote);
        let schema = schema.map(remote);
        self.dialect
            .quoted_table(catalog.as_deref(), schema.as_deref(), &remote(table))
    }

    fn quoted_remote(&self, table: &RemoteTableName) -> Result<String> {
        self.dialect.quoted_table(
            table.catalog.as_deref(),
            table.schema.as_deref(),
            &table.table,
        )
    }

    /// `<name> <type> <null clause>` for CREATE TABLE.
    pub fn column_definition_sql(&self, column: &ColumnDefinition) -> Result<String> {
        if column.comment.is_some() {
            return Err(ConnectorError::not_supported(
                "This connector does not support creating tables with column comment",
            ));
        }
        let name = self
            .dialect
            .quote_ident(&self.dialect.to_remote_identifier(&column.name))?;
        let data_type = self.to_write_mapping(&column.logical_type)?.data_type;
        let null_clause = self.dialect.null_clause(column.nullable);
        if null_clause.is_empty() {
            Ok(format!("{} {}", name, data_type))
        } else {
            Ok(format!("{} {} {}", name, data_type, null_clause))
        }
    }

    /// CREATE TABLE, followed by the comment statement when one is set.
    pub fn create_table_sqls(&self, table: &TableDefinition) -> Result<Vec<String>> {
        if !table.properties.is_empty() {
            let names: Vec<&str> = table.properties.keys().map(String::as_str).collect();
            return Err(ConnectorError::not_supported(format!(
                "Unsupported table properties: {}",
                names.join(", ")
            )));
        }
        if table.columns.is_empty() {
            return Err(ConnectorError::invalid_value(format!(
                "Table {} has no columns",
                table.name
            )));
        }

        let quoted = self.quoted(None, table.schema.as_deref(), &table.name)?;
        let columns = table
            .columns
            .iter()
            .map(|c| self.column_definition_sql(c))
            .collect::<Result<Vec<_>>>()?;

        let mut sqls = vec![format!("CREATE TABLE {} ({})", quoted, columns.join(", "))];
        if let Some(comment) = &table.comment {
            sqls.push(self.dialect.table_comment_sql(&quoted, Some(comment.as_str())));
        }
        Ok(sqls)
    }

    /// Restrict `sql` to `limit` rows.
    pub fn limit(&self, sql: &str, limit: u64) -> String {
        self.dialect.limit_sql(sql, limit)
    }

    pub fn is_limit_guaranteed(&self) -> bool {
        self.dialect.is_limit_guaranteed()
    }

    pub fn supports_top_n(&self, sort_items: &[SortItem]) -> bool {
        self.dialect.supports_top_n(sort_items)
    }

    /// ORDER BY plus LIMIT. Fails when the mode or the sort keys rule it out.
    pub fn top_n(&self, sql: &str, sort_items: &[SortItem], limit: u64) -> Result<String> {
        if self.mode().is_mysql_compatible() && !self.supports_top_n(sort_items) {
            return Err(ConnectorError::not_supported(
                "This connector does not support Top-N pushdown on char or varchar columns",
            ));
        }
        self.dialect.top_n_sql(sql, sort_items, limit)
    }

    pub fn is_top_n_guaranteed(&self) -> Result<bool> {
        self.dialect.is_top_n_guaranteed()
    }

    pub fn is_supported_join_condition(&self, left: &LogicalType, right: &LogicalType) -> bool {
        self.dialect.is_supported_join_condition(left, right)
    }

    // ===== Pushdown =====

    pub fn convert_predicate(&self, expression: &Expression) -> Result<Option<ParameterizedExpression>> {
        pushdown::convert_predicate(&self.dialect, expression)
    }

    pub fn implement_aggregation(&self, call: &AggregateCall) -> Result<Option<AggregateExpression>> {
        pushdown::implement_aggregation(&self.dialect, call)
    }

    pub fn supports_aggregation_pushdown(&self, grouping_sets: &[Vec<ColumnRef>]) -> bool {
        pushdown::supports_aggregation_pushdown(grouping_sets)
    }

    // ===== Metadata =====

    /// Visible schema names: catalogs in MySQL mode, schemas in Oracle mode.
    pub async fn list_schemas<C>(&self, conn: &C) -> Result<Vec<String>>
    where
        C: MetadataConnection + ?Sized,
    {
        let names = if self.mode().is_mysql_compatible() {
            conn.list_catalogs()
                .await
                .map_err(|e| e.in_context("list catalogs"))?
        } else {
            conn.list_schemas()
                .await
                .map_err(|e| e.in_context("list schemas"))?
        };

        let mut seen = HashSet::new();
        Ok(names
            .into_iter()
            .filter(|name| self.dialect.filter_schema(name))
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }

    /// Tables in a schema, optionally narrowed to one table name.
    pub async fn get_tables<C>(
        &self,
        conn: &C,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Result<Vec<TableRow>>
    where
        C: MetadataConnection + ?Sized,
    {
        let escape = conn.search_string_escape();
        let schema = schema.map(|s| escape_name_pattern(s, escape));
        let filter = TableFilter {
            catalog: if self.mode().is_mysql_compatible() {
                schema.clone()
            } else {
                None
            },
            schema_pattern: if self.mode().is_mysql_compatible() {
                None
            } else {
                schema
            },
            table_pattern: table.map(|t| escape_name_pattern(t, escape)),
        };
        debug!("Listing tables with {:?}", filter);
        conn.get_tables(&filter)
            .await
            .map_err(|e| e.in_context("list tables"))
    }

    /// Schema column of a table row.
    pub fn table_schema_name<'a>(&self, row: &'a TableRow) -> Option<&'a str> {
        row.column(self.dialect.table_schema_column())
    }

    /// Table comment of a row. Blank remarks mean no comment.
    pub fn table_comment(&self, row: &TableRow) -> Option<String> {
        row.column("REMARKS")
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }

    // ===== DDL =====

    pub async fn create_schema<C>(&self, conn: &C, schema: &str) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        if !self.dialect.supports_schema_ddl() {
            return Err(ConnectorError::not_supported(
                "This connector does not support creating schemas on Oracle mode",
            ));
        }
        let sql = format!(
            "CREATE SCHEMA {}",
            self.dialect.quote_ident(&self.dialect.to_remote_identifier(schema))?
        );
        self.execute(conn, &sql).await
    }

    /// Drop a schema. Without `cascade`, a schema holding tables is refused.
    pub async fn drop_schema<C>(&self, conn: &C, schema: &str, cascade: bool) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        if !self.dialect.supports_schema_ddl() {
            return Err(ConnectorError::not_supported(
                "This connector does not support dropping schemas on Oracle mode",
            ));
        }
        let remote = self.dialect.to_remote_identifier(schema);
        if !cascade {
            let tables = self.get_tables(conn, Some(&remote), None).await?;
            if !tables.is_empty() {
                return Err(ConnectorError::SchemaNotEmpty(remote));
            }
        }
        let sql = format!("DROP SCHEMA {}", self.dialect.quote_ident(&remote)?);
        self.execute(conn, &sql).await
    }

    pub fn rename_schema(&self, _schema: &str, _new_schema: &str) -> Result<()> {
        Err(ConnectorError::not_supported(
            "This connector does not support renaming schemas",
        ))
    }

    /// Set or, with `None`, clear a table comment.
    pub async fn set_table_comment<C>(
        &self,
        conn: &C,
        table: &RemoteTableName,
        comment: Option<&str>,
    ) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        let sql = self
            .dialect
            .table_comment_sql(&self.quoted_remote(table)?, comment);
        self.execute(conn, &sql).await
    }

    /// Rename a table within its namespace. `new_schema` of `None` keeps the current one.
    pub async fn rename_table<C>(
        &self,
        conn: &C,
        table: &RemoteTableName,
        new_schema: Option<&str>,
        new_name: &str,
    ) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        let new_schema = new_schema.map(|s| self.dialect.to_remote_identifier(s));
        if new_schema.is_some() && new_schema.as_deref() != table.namespace() {
            return Err(ConnectorError::not_supported(
                "This connector does not support renaming tables across schemas",
            ));
        }
        let sql = format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quoted_remote(table)?,
            self.dialect
                .quote_ident(&self.dialect.to_remote_identifier(new_name))?
        );
        self.execute(conn, &sql).await
    }

    pub async fn rename_column<C>(
        &self,
        conn: &C,
        table: &RemoteTableName,
        column: &str,
        new_name: &str,
    ) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quoted_remote(table)?,
            self.dialect.quote_ident(column)?,
            self.dialect.quote_ident(new_name)?
        );
        self.execute(conn, &sql).await
    }

    pub fn set_column_type(
        &self,
        _table: &RemoteTableName,
        _column: &str,
        _logical_type: &LogicalType,
    ) -> Result<()> {
        Err(ConnectorError::not_supported(
            "This connector does not support setting column types",
        ))
    }

    async fn execute<C>(&self, conn: &C, sql: &str) -> Result<()>
    where
        C: MetadataConnection + ?Sized,
    {
        debug!("Executing: {}", sql);
        let affected = conn.execute(sql).await.map_err(|e| e.in_context(sql))?;
        debug!("{} rows affected", affected);
        Ok(())
    }
}
