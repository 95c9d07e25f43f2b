//! T-SQL text for backup, restore and user re-mapping.
//!
//! Values are substituted verbatim. Database names, paths and user names come
//! from the configuration file and are trusted; nothing here escapes or
//! validates them. If untrusted text can ever reach these functions, validate
//! it as an identifier first.

use std::path::Path;

/// Login re-mapped after every restore from the Zero DB repository.
pub const REPORTS_USER: &str = "reports";

pub const CONNECTION_TEST_SQL: &str = "SELECT GETDATE()";

/// Full backup of `database_name` to `backup_path`, overwriting any media set at that path.
pub fn backup_sql(database_name: &str, backup_path: &Path) -> String {
    format!(
        "USE master;
BACKUP DATABASE {db}
    TO DISK = '{path}'
    WITH FORMAT,
    MEDIANAME = 'FULL BACKUP BY DB FACTORY',
    NAME = 'FULL BK OF {db}';",
        db = database_name,
        path = backup_path.display(),
    )
}

/// Takes the database offline (rolling back open transactions) when it exists,
/// then restores it from `backup_path` with REPLACE and RECOVERY.
pub fn restore_sql(database_name: &str, backup_path: &Path) -> String {
    format!(
        "USE master;
IF EXISTS(SELECT * FROM master.dbo.sysdatabases WHERE name = '{db}')
BEGIN
    ALTER DATABASE {db} SET OFFLINE WITH ROLLBACK IMMEDIATE;
END

RESTORE DATABASE {db}
    FROM DISK = '{path}'
    WITH REPLACE, RECOVERY;",
        db = database_name,
        path = backup_path.display(),
    )
}

// A restored database keeps the user SIDs of the server it was backed up on;
// recreating the user binds it to this server's login. The login must exist.
pub fn login_remap_sql(database_name: &str, user_name: &str) -> String {
    format!(
        "USE {db};
DROP USER {user};
CREATE USER {user}
    FROM LOGIN {user}
    WITH DEFAULT_SCHEMA = dbo;",
        db = database_name,
        user = user_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_sql_targets_path_and_names_media_after_database() {
        let sql = backup_sql("Inventory", Path::new(r"D:\backups\inv.bak"));
        assert!(sql.contains("BACKUP DATABASE Inventory"));
        assert!(sql.contains(r"TO DISK = 'D:\backups\inv.bak'"));
        assert!(sql.contains("WITH FORMAT"));
        assert!(sql.contains("NAME = 'FULL BK OF Inventory'"));
    }

    #[test]
    fn restore_sql_goes_offline_before_restoring() {
        let sql = restore_sql("Inventory", Path::new("/zero/2.0.bak"));
        let offline = sql.find("SET OFFLINE WITH ROLLBACK IMMEDIATE").expect("offline clause");
        let restore = sql.find("RESTORE DATABASE Inventory").expect("restore clause");
        assert!(offline < restore);
        assert!(sql.contains("WHERE name = 'Inventory'"));
        assert!(sql.contains("FROM DISK = '/zero/2.0.bak'"));
        assert!(sql.contains("WITH REPLACE, RECOVERY"));
    }

    #[test]
    fn login_remap_sql_drops_then_recreates_user() {
        let sql = login_remap_sql("Inventory", REPORTS_USER);
        assert!(sql.starts_with("USE Inventory;"));
        let drop = sql.find("DROP USER reports").expect("drop");
        let create = sql.find("CREATE USER reports").expect("create");
        assert!(drop < create);
        assert!(sql.contains("FROM LOGIN reports"));
        assert!(sql.contains("DEFAULT_SCHEMA = dbo"));
    }
}
