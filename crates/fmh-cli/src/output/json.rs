use fmh_core::error::LogbookError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), LogbookError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
