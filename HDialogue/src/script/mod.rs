//! Lua script data loading
//!
//! The game keeps its character, enemy and loot definitions in Lua source
//! files that are almost pure data. This module reads them into generic
//! ordered tables ([`RawTable`]) without attaching any meaning; the
//! [`catalog`](crate::catalog) module interprets the result.
//!
//! # Usage
//!
//! ```
//! use hdialogue::script::{parse, LuaValue};
//!
//! let raw = parse(r#"LootData = { ZeusUpgrade = { Icon = "Boon_Zeus" } }"#)?;
//! let zeus = raw.get_table("LootData").and_then(|t| t.get_table("ZeusUpgrade"));
//! assert_eq!(zeus.and_then(|t| t.get_str("Icon")), Some("Boon_Zeus"));
//! # Ok::<(), hdialogue::Error>(())
//! ```

mod lexer;
mod parser;
mod value;

use std::fs;
use std::path::Path;

pub use parser::parse;
pub use value::{LuaTable, LuaValue, RawTable, TableKey};

use crate::error::Result;

/// Read and parse a script file.
///
/// # Errors
/// Returns an error if the file cannot be read or does not parse; parse
/// errors carry the file path.
pub fn read_script<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse(&text).map_err(|e| e.with_path(path))
}
