//! Label Scan Common Library
//!
//! CLIと他のフロントエンドで共有される成分リストと照合ロジック

pub mod error;
pub mod substances;
pub mod matcher;
pub mod highlight;

pub use error::{Error, Result};
pub use substances::{SubstanceList, DEFAULT_SUBSTANCES};
pub use matcher::{find_substances, Occurrence, SubstanceMatcher};
pub use highlight::highlight;
