//! git credential helper line protocol
//!
//! Input is `key=value` lines ended by a blank line or EOF. Output is the
//! same format.

use std::io::{BufRead, Write};

use tracing::debug;
use zeroize::Zeroizing;

use super::record::CredentialRecord;
use crate::crypto::SecretString;
use crate::error::{CryptStoreError, Result};

/// Read one credential description
///
/// Unknown keys are ignored. A `url` line is parsed and overrides the
/// discrete fields it carries.
pub fn parse_credential<R: BufRead>(mut reader: R) -> Result<CredentialRecord> {
    let mut record = CredentialRecord::default();
    // lines may hold a password
    let mut buffer = Zeroizing::new(String::new());
    let mut number = 0;

    loop {
        buffer.clear();
        if reader.read_line(&mut buffer)? == 0 {
            break;
        }
        number += 1;

        let line = buffer.strip_suffix('\n').unwrap_or(buffer.as_str());
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        // never echoed back
        let (key, value) = line.split_once('=').ok_or_else(|| {
            CryptStoreError::Input(format!("line {} is not a key=value pair", number))
        })?;

        match key {
            "username" => record.username = value.to_string(),
            "password" => record.password = SecretString::from(value),
            "protocol" => record.protocol = value.to_string(),
            "host" => record.host = value.to_string(),
            "path" => record.path = value.to_string(),
            "url" => record.apply_url(value)?,
            "quit" => record.quit = parse_quit(value)?,
            other => debug!("Ignoring unknown attribute '{}'", other),
        }
    }

    Ok(record)
}

/// Write the username and password of `record`
pub fn write_credential<W: Write>(mut writer: W, record: &CredentialRecord) -> Result<()> {
    writeln!(writer, "username={}", record.username)?;
    writeln!(writer, "password={}", record.password.expose())?;
    if record.quit {
        writeln!(writer, "quit=1")?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_quit(value: &str) -> Result<bool> {
    if let Ok(number) = value.parse::<i64>() {
        return Ok(number != 0);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        _ => Err(CryptStoreError::Input(format!(
            "invalid quit value '{}'",
            value
        ))),
    }
}
