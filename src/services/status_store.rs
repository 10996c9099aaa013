use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, OnConflict, Query, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde_json::value::RawValue;

const FOLDER_NAME: &str = "folder_name";
const RECORD: &str = "record";

/// Processing status records keyed by folder name. The payload is opaque to
/// this service: the stored JSON text comes back byte for byte.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, folder_name: &str) -> Result<Option<Box<RawValue>>>;

    async fn put(&self, folder_name: &str, record: &RawValue) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

/// `StatusStore` over any SeaORM connection. The table name is configurable,
/// so statements are built with sea-query instead of a derived entity.
pub struct SqlStatusStore {
    db: DatabaseConnection,
    table: String,
}

impl SqlStatusStore {
    pub fn new(db: DatabaseConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub async fn ensure_table(&self) -> Result<()> {
        let builder = self.db.get_database_backend();
        let stmt = Table::create()
            .table(Alias::new(&self.table))
            .if_not_exists()
            .col(
                ColumnDef::new(Alias::new(FOLDER_NAME))
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Alias::new(RECORD)).text().not_null())
            .to_owned();

        self.db
            .execute(builder.build(&stmt))
            .await
            .with_context(|| format!("Failed to create status table '{}'", self.table))?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for SqlStatusStore {
    async fn get(&self, folder_name: &str) -> Result<Option<Box<RawValue>>> {
        let builder = self.db.get_database_backend();
        let stmt = Query::select()
            .column(Alias::new(RECORD))
            .from(Alias::new(&self.table))
            .and_where(Expr::col(Alias::new(FOLDER_NAME)).eq(folder_name))
            .to_owned();

        let Some(row) = self.db.query_one(builder.build(&stmt)).await? else {
            return Ok(None);
        };

        let raw: String = row.try_get("", RECORD)?;
        let record = RawValue::from_string(raw)
            .with_context(|| format!("Corrupt status record for '{}'", folder_name))?;
        Ok(Some(record))
    }

    async fn put(&self, folder_name: &str, record: &RawValue) -> Result<()> {
        let builder = self.db.get_database_backend();
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(&self.table))
            .columns([Alias::new(FOLDER_NAME), Alias::new(RECORD)])
            .values([folder_name.into(), record.get().into()])?
            .on_conflict(
                OnConflict::column(Alias::new(FOLDER_NAME))
                    .update_column(Alias::new(RECORD))
                    .to_owned(),
            );

        self.db.execute(builder.build(&stmt)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}
