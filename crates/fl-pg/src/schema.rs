use tokio_postgres::Client;

/// Schema metadata for PostgreSQL tables.
///
/// All methods return `&'static str` so DDL can be assembled at compile time
/// (implementors concatenate over the table name constants).
///
/// This trait contains no I/O — it purely describes table structure. Apply a
/// schema with [`create`].
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}

/// Applies a schema: creates the table, then its indices.
pub async fn create<S: Schema>(client: &Client) -> Result<(), super::PgErr> {
    log::debug!("ensuring table {}", S::name());
    client.batch_execute(S::creates()).await?;
    client.batch_execute(S::indices()).await?;
    Ok(())
}
