//! SQLite-backed [`ModelSource`] for table-mapped models.
//!
//! Queries are assembled as a single SELECT with one `OR` clause per
//! predicate. Related paths become LEFT JOINs; a join is added once per
//! relation no matter how many predicates traverse it. SQLite's `LIKE` is
//! case-insensitive for ASCII, which gives containment matching the
//! case-insensitivity the admin search promises.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::source::{MatchOp, ModelSource, ObjectHit, ObjectQuery, SourceError};

/// How a named relation reaches its target table.
#[derive(Debug, Clone)]
pub enum RelationKind {
    /// Foreign key column on this model's table
    ManyToOne { fk_column: String },
    /// Link table between this model and the target
    ManyToMany {
        link_table: String,
        source_fk: String,
        target_fk: String,
    },
}

/// A relation that delegated search fields may traverse.
#[derive(Debug, Clone)]
pub struct RelationDef {
    /// Name used in dotted search-field paths, e.g. "players"
    pub name: String,
    pub target_table: String,
    /// Primary key column of the target table
    pub target_pk: String,
    pub kind: RelationKind,
}

impl RelationDef {
    pub fn many_to_one(name: &str, fk_column: &str, target_table: &str, target_pk: &str) -> Self {
        Self {
            name: name.to_string(),
            target_table: target_table.to_string(),
            target_pk: target_pk.to_string(),
            kind: RelationKind::ManyToOne {
                fk_column: fk_column.to_string(),
            },
        }
    }

    pub fn many_to_many(
        name: &str,
        link_table: &str,
        source_fk: &str,
        target_fk: &str,
        target_table: &str,
        target_pk: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            target_table: target_table.to_string(),
            target_pk: target_pk.to_string(),
            kind: RelationKind::ManyToMany {
                link_table: link_table.to_string(),
                source_fk: source_fk.to_string(),
                target_fk: target_fk.to_string(),
            },
        }
    }
}

/// [`ModelSource`] over one SQLite table.
///
/// The base table is always aliased `m`; the label expression is raw SQL
/// over that alias, e.g. `"m.name"`.
pub struct SqlModelSource {
    pool: SqlitePool,
    /// Class name, used in error messages
    model: String,
    table: String,
    pk_column: String,
    label_expr: String,
    /// Local columns predicates may reference
    columns: Vec<String>,
    relations: Vec<RelationDef>,
}

impl SqlModelSource {
    pub fn new(pool: SqlitePool, model: &str, table: &str) -> Self {
        Self {
            pool,
            model: model.to_string(),
            table: table.to_string(),
            pk_column: "id".to_string(),
            label_expr: "m.name".to_string(),
            columns: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn pk_column(mut self, column: &str) -> Self {
        self.pk_column = column.to_string();
        self
    }

    pub fn label_expr(mut self, expr: &str) -> Self {
        self.label_expr = expr.to_string();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    fn build_sql(&self, query: &ObjectQuery) -> Result<(String, Vec<String>), SourceError> {
        let mut joins: Vec<String> = Vec::new();
        let mut joined: HashSet<String> = HashSet::new();
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        for predicate in &query.predicates {
            let column_ref = match &predicate.path.relation {
                None => {
                    let field = &predicate.path.field;
                    if !self.columns.iter().any(|c| c == field) {
                        return Err(SourceError::UnknownField {
                            model: self.model.clone(),
                            field: field.clone(),
                        });
                    }
                    format!("m.{}", field)
                }
                Some(name) => {
                    let relation = self
                        .relations
                        .iter()
                        .find(|r| &r.name == name)
                        .ok_or_else(|| SourceError::UnknownRelation {
                            model: self.model.clone(),
                            relation: name.clone(),
                        })?;
                    let alias = format!("r_{}", relation.name);
                    if joined.insert(relation.name.clone()) {
                        match &relation.kind {
                            RelationKind::ManyToOne { fk_column } => {
                                joins.push(format!(
                                    "LEFT JOIN {} AS {} ON {}.{} = m.{}",
                                    relation.target_table,
                                    alias,
                                    alias,
                                    relation.target_pk,
                                    fk_column
                                ));
                            }
                            RelationKind::ManyToMany {
                                link_table,
                                source_fk,
                                target_fk,
                            } => {
                                let link_alias = format!("l_{}", relation.name);
                                joins.push(format!(
                                    "LEFT JOIN {} AS {} ON {}.{} = m.{}",
                                    link_table, link_alias, link_alias, source_fk, self.pk_column
                                ));
                                joins.push(format!(
                                    "LEFT JOIN {} AS {} ON {}.{} = {}.{}",
                                    relation.target_table,
                                    alias,
                                    alias,
                                    relation.target_pk,
                                    link_alias,
                                    target_fk
                                ));
                            }
                        }
                    }
                    format!("{}.{}", alias, predicate.path.field)
                }
            };

            match predicate.op {
                MatchOp::Contains => {
                    clauses.push(format!("{} LIKE ? ESCAPE '\\'", column_ref));
                    binds.push(like_pattern(&predicate.value));
                }
                MatchOp::Exact => {
                    clauses.push(format!("{} = ? COLLATE NOCASE", column_ref));
                    binds.push(predicate.value.clone());
                }
            }
        }

        let select = if query.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        };
        let mut sql = format!(
            "{} CAST(m.{} AS TEXT) AS pk, {} AS label FROM {} AS m",
            select, self.pk_column, self.label_expr, self.table
        );
        for join in &joins {
            sql.push(' ');
            sql.push_str(join);
        }
        sql.push_str(&format!(
            " WHERE {} LIMIT {}",
            clauses.join(" OR "),
            query.limit
        ));

        Ok((sql, binds))
    }
}

#[async_trait]
impl ModelSource for SqlModelSource {
    async fn find_matching(&self, query: &ObjectQuery) -> Result<Vec<ObjectHit>, SourceError> {
        if query.predicates.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, binds) = self.build_sql(query)?;
        let mut db_query = sqlx::query(&sql);
        for bind in &binds {
            db_query = db_query.bind(bind);
        }

        let rows = db_query.fetch_all(&self.pool).await?;
        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            hits.push(ObjectHit {
                pk: row.try_get("pk")?,
                label: row.try_get("label")?,
            });
        }
        Ok(hits)
    }
}

/// Wrap the query text in `%...%`, escaping LIKE wildcards so user input
/// always matches literally.
pub fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("%{}%", escaped)
}
