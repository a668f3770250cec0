//! Startup validation of the allow/block list arguments.
//!
//! The two list arguments are mutually exclusive: presence is what counts,
//! so supplying both (even as empty strings) is rejected before anything is
//! parsed. Splitting keeps the raw segments untouched; trimming happens when
//! the address pool is built.

use thiserror::Error;

pub const LIST_SEPARATOR: char = ',';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("only one of allow-list and block-list can be specified")]
    MutuallyExclusiveLists,
}

/// Splits the allow/block arguments into ordered address lists, enforcing
/// that at most one of them was supplied. An absent argument yields an empty
/// list.
pub fn split_address_args(
    allow: Option<&str>,
    block: Option<&str>,
) -> Result<(Vec<String>, Vec<String>), ConfigError> {
    if allow.is_some() && block.is_some() {
        return Err(ConfigError::MutuallyExclusiveLists);
    }
    Ok((split_list(allow), split_list(block)))
}

fn split_list(arg: Option<&str>) -> Vec<String> {
    match arg {
        Some(raw) => raw.split(LIST_SEPARATOR).map(str::to_string).collect(),
        None => Vec::new(),
    }
}
