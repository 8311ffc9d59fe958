use anyhow::{Context, Error, ensure};
use rusqlite::Connection;
use std::path::Path;

/// Schema step, `schema[n]` moves the database from `user_version` `n` to `n + 1`.
pub type Migration = &'static str;

const PRAGMA_USER_VERSION: &str = "user_version";

pub fn open(path: &Path) -> Result<Connection, Error> {
    let connection = Connection::open(path).context("open")?;
    connection
        .execute_batch(
            "PRAGMA auto_vacuum = INCREMENTAL; \
            PRAGMA foreign_keys = ON; \
            PRAGMA synchronous = NORMAL;",
        )
        .context("execute_batch")?;
    // journal_mode reports the resulting mode as a row
    let journal_mode = connection
        .query_row("PRAGMA journal_mode = WAL", (), |row| row.get::<_, String>(0))
        .context("journal_mode")?;
    log::debug!(
        "opened database {} (journal_mode = {journal_mode})",
        path.display()
    );
    Ok(connection)
}
pub fn open_in_memory() -> Result<Connection, Error> {
    let connection = Connection::open_in_memory().context("open_in_memory")?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .context("execute_batch")?;
    Ok(connection)
}

/// Applies the steps of `schema` the database has not seen yet, in one transaction.
///
/// A database written by a newer schema is refused and left untouched.
pub fn migrate(
    connection: &mut Connection,
    schema: &[Migration],
) -> Result<(), Error> {
    let transaction = connection.transaction().context("transaction")?;

    let current = transaction
        .pragma_query_value(None, PRAGMA_USER_VERSION, |row| row.get::<_, u32>(0))
        .context("pragma_query_value")?;
    let current = usize::try_from(current).context("current")?;
    let target = schema.len();
    ensure!(
        current <= target,
        "database schema version {current} is newer than supported version {target}"
    );

    if current == target {
        return Ok(());
    }

    for (version, migration) in schema.iter().enumerate().skip(current) {
        transaction
            .execute_batch(migration)
            .with_context(|| format!("migration {version} -> {}", version + 1))?;
        log::trace!("schema migration {version} -> {} applied", version + 1);
    }

    transaction
        .pragma_update(None, PRAGMA_USER_VERSION, u32::try_from(target).context("target")?)
        .context("pragma_update")?;
    transaction.commit().context("commit")?;

    log::debug!("schema migrated from version {current} to {target}");
    Ok(())
}
