//! Lead persistence — trait, migrations, and the libSQL backend.

mod libsql_backend;
mod migrations;
mod traits;

pub use libsql_backend::LibSqlLeadStore;
pub use traits::{LeadStore, StoredLead};
