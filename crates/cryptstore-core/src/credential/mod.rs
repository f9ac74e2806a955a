//! Credential records and the git helper protocol

mod protocol;
mod record;

pub use protocol::{parse_credential, write_credential};
pub use record::CredentialRecord;
