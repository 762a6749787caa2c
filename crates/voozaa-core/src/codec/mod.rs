//! Snapshot codec
//!
//! Converts the tracker state to and from its portable forms:
//!
//! - **Snapshot**: the whole state as pretty-printed JSON, used for
//!   persistence, backups and imports
//! - **Tabular**: flattened comma-separated exports of leads and customers

pub mod snapshot;
pub mod tabular;

pub use snapshot::{apply_import, deserialize, serialize, SnapshotPatch};
pub use tabular::{customers_csv, escape_field, leads_csv, parse_rows, CUSTOMER_HEADERS, LEAD_HEADERS};
