//! [`QueryBuilder`] definitions.

use std::{borrow::Cow, fmt, fmt::Write as _};

use tokio_postgres::types::ToSql;

use super::Param;

/// Piece of SQL text with [`Param`]s bound in between.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fragment {
    /// Chunks of this [`Fragment`] in their textual order.
    chunks: Vec<Chunk>,
}

/// Single chunk of a [`Fragment`].
#[derive(Clone, Debug, PartialEq)]
enum Chunk {
    /// Raw SQL text.
    Text(Cow<'static, str>),

    /// Bound [`Param`] rendered as a positional placeholder.
    Param(Param),
}

impl Fragment {
    /// Creates a new [`Fragment`] of raw SQL `text`.
    ///
    /// The `text` is rendered verbatim, so it must never carry a user input.
    #[must_use]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::default().text(text)
    }

    /// Creates a new [`Fragment`] consisting of a single bound [`Param`].
    #[must_use]
    pub fn param(param: impl Into<Param>) -> Self {
        Self::default().bind(param)
    }

    /// Appends raw SQL `text` to this [`Fragment`].
    #[must_use]
    pub fn text(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.chunks.push(Chunk::Text(text));
        }
        self
    }

    /// Appends a bound [`Param`] to this [`Fragment`].
    #[must_use]
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.chunks.push(Chunk::Param(param.into()));
        self
    }

    /// Appends another [`Fragment`] to this one.
    #[must_use]
    pub fn append(mut self, other: impl Into<Self>) -> Self {
        self.chunks.extend(other.into().chunks);
        self
    }

    /// Joins the provided [`Fragment`]s with the `separator` in between.
    #[must_use]
    pub fn join<I>(fragments: I, separator: &'static str) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        fragments
            .into_iter()
            .enumerate()
            .fold(Self::default(), |acc, (i, f)| {
                if i == 0 { acc } else { acc.text(separator) }.append(f)
            })
    }

    /// Indicates whether this [`Fragment`] renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Renders this [`Fragment`] into the provided `sql` text, numbering its
    /// placeholders after the already collected `params`.
    fn render_into(&self, sql: &mut String, params: &mut Vec<Param>) {
        for chunk in &self.chunks {
            match chunk {
                Chunk::Text(t) => sql.push_str(t),
                Chunk::Param(p) => {
                    params.push(*p);
                    // Writing into a `String` never fails.
                    _ = write!(sql, "${}::{}", params.len(), p.sql_type());
                }
            }
        }
    }

    /// Renders this [`Fragment`] into a standalone [`Query`].
    #[must_use]
    pub fn render(&self) -> Query {
        let mut query = Query::default();
        self.render_into(&mut query.sql, &mut query.params);
        query
    }
}

impl From<&'static str> for Fragment {
    fn from(text: &'static str) -> Self {
        Self::raw(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::raw(text)
    }
}

impl From<Param> for Fragment {
    fn from(param: Param) -> Self {
        Self::param(param)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render().sql())
    }
}

/// Rendered SQL statement along with its bound [`Param`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// SQL text with `$n` positional placeholders.
    sql: String,

    /// [`Param`]s in the order of their placeholders.
    params: Vec<Param>,
}

impl Query {
    /// Returns the SQL text of this [`Query`].
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the [`Param`]s bound to this [`Query`].
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Returns the [`Param`]s of this [`Query`] in the form accepted by a
    /// [`tokio_postgres::Client`].
    #[must_use]
    pub fn bindings(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| -> &(dyn ToSql + Sync) { p })
            .collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Builder of a single SQL statement.
///
/// Renders as:
/// ```sql
/// SELECT <columns> FROM <target>
///   [JOIN <join> ...]
///   [WHERE <condition> AND ...]
///   [ORDER BY <expr>] [LIMIT <n>] [OFFSET <n>]
/// ```
///
/// The builder only accumulates syntax and validates nothing: whatever is
/// passed as raw text ends up in the statement as is. Values are passed as
/// [`Param`]s, so they are always bound rather than spliced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuilder {
    /// Indicator whether the statement is a `SELECT` one.
    select: bool,

    /// Target the rows are selected `FROM`.
    target: Option<Fragment>,

    /// `JOIN` clauses in their order.
    joins: Vec<Fragment>,

    /// Selected columns in their order.
    columns: Vec<Fragment>,

    /// `WHERE` conditions, combined with `AND`.
    conditions: Vec<Fragment>,

    /// `ORDER BY` expression.
    order_by: Option<Fragment>,

    /// `LIMIT` value.
    limit: Option<u32>,

    /// `OFFSET` value.
    offset: Option<u32>,
}

impl QueryBuilder {
    /// Creates a new empty [`QueryBuilder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the statement as a `SELECT` one.
    #[must_use]
    pub fn select(mut self) -> Self {
        self.select = true;
        self
    }

    /// Sets the `table` to select `FROM`, replacing any previous target.
    #[must_use]
    pub fn from(mut self, table: impl Into<Fragment>) -> Self {
        self.target = Some(table.into());
        self
    }

    /// Sets the provided `subquery` under the `alias` as the target to select
    /// `FROM`, replacing any previous target.
    ///
    /// [`Param`]s of the `subquery` are carried over.
    #[must_use]
    pub fn from_subquery(
        mut self,
        subquery: Self,
        alias: &'static str,
    ) -> Self {
        self.target = Some(
            Fragment::raw("(")
                .append(subquery.to_fragment())
                .text(") ")
                .text(alias),
        );
        self
    }

    /// Appends `JOIN` clauses.
    #[must_use]
    pub fn join<I>(mut self, joins: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.joins.extend(joins.into_iter().map(Into::into));
        self
    }

    /// Appends selected columns.
    #[must_use]
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Appends a `WHERE` condition.
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<Fragment>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Sets the `ORDER BY` expression, replacing any previous one.
    #[must_use]
    pub fn order_by(mut self, expr: impl Into<Fragment>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    /// Sets the `LIMIT`, replacing any previous one.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the `OFFSET`, replacing any previous one.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Assembles the statement into a single [`Fragment`].
    #[must_use]
    pub fn to_fragment(&self) -> Fragment {
        let mut sql = Fragment::default();
        if self.select {
            sql = sql.text("SELECT ");
        }
        sql = sql.append(Fragment::join(self.columns.iter().cloned(), ", "));
        if let Some(target) = &self.target {
            sql = sql.text(" FROM ").append(target.clone());
        }
        for join in &self.joins {
            sql = sql.text(" JOIN ").append(join.clone());
        }
        if !self.conditions.is_empty() {
            sql = sql.text(" WHERE ").append(Fragment::join(
                self.conditions.iter().cloned(),
                " AND ",
            ));
        }
        if let Some(expr) = &self.order_by {
            sql = sql.text(" ORDER BY ").append(expr.clone());
        }
        if let Some(limit) = self.limit {
            sql = sql.text(" LIMIT ").bind(i64::from(limit));
        }
        if let Some(offset) = self.offset {
            sql = sql.text(" OFFSET ").bind(i64::from(offset));
        }
        sql
    }

    /// Renders the statement into a [`Query`].
    #[must_use]
    pub fn render(&self) -> Query {
        self.to_fragment().render()
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.render(), f)
    }
}
