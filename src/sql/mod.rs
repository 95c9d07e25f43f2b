pub(crate) mod batch;
pub(crate) mod templates;

pub use batch::{is_blank_batch, split_batches};
pub use templates::{CONNECTION_TEST_SQL, REPORTS_USER, backup_sql, login_remap_sql, restore_sql};
