//! Credential record, URL form and identity matching

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::crypto::SecretString;
use crate::error::{CryptStoreError, Result};

/// Characters escaped in the path segment
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in the username and password
const USERINFO: &AsciiSet = &PATH
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'|');

/// One credential as exchanged with git
///
/// `password` is plaintext when read from git and holds the framed ciphertext
/// once the record is prepared for storage. Identity is
/// (`protocol`, `host`, `path`, `username`); the password is never part of it.
#[derive(Debug, Clone, Default)]
pub struct CredentialRecord {
    pub username: String,
    pub password: SecretString,
    pub protocol: String,
    pub host: String,
    /// Stored without a leading `/`
    pub path: String,
    /// Raw URL this record was populated from; authoritative when set.
    /// May embed the plaintext password.
    pub url: Option<SecretString>,
    pub quit: bool,
}

impl CredentialRecord {
    /// Build a record from a URL
    pub fn from_url(raw: &str) -> Result<Self> {
        let mut record = Self::default();
        record.apply_url(raw)?;
        Ok(record)
    }

    /// Populate fields from `raw`, overriding what the URL carries
    ///
    /// The username is only taken when non-empty; the password whenever the
    /// URL spells one, so `user:@host` sets an empty password. Host and path
    /// are always replaced.
    pub fn apply_url(&mut self, raw: &str) -> Result<()> {
        let parsed = Url::parse(raw)?;

        self.url = Some(SecretString::from(raw));
        if !parsed.scheme().is_empty() {
            self.protocol = parsed.scheme().to_string();
        }

        let username = decode(parsed.username())?;
        if !username.is_empty() {
            self.username = username;
        }
        match parsed.password() {
            Some(password) => self.password = SecretString::new(decode(password)?),
            // the parser folds `user:@host` into `user@host`
            None if has_password_separator(raw) => self.password = SecretString::default(),
            None => {}
        }

        self.host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let path = decode(parsed.path())?;
        self.path = match path.strip_prefix('/') {
            Some(stripped) => stripped.to_string(),
            None => path,
        };

        Ok(())
    }

    /// Serialize to URL form
    ///
    /// A raw `url` is returned verbatim once it parses. Otherwise the URL is
    /// assembled from whichever fields are set; userinfo carries
    /// `user:password` when both are present and `user` alone otherwise.
    pub fn to_url(&self) -> Result<String> {
        if let Some(raw) = &self.url {
            Url::parse(raw.expose())?;
            return Ok(raw.expose().to_string());
        }

        let mut url = String::new();
        if !self.protocol.is_empty() {
            url.push_str(&self.protocol);
            url.push(':');
        }

        let has_authority = !self.host.is_empty() || !self.username.is_empty();
        if has_authority || !self.protocol.is_empty() {
            url.push_str("//");
        }
        if !self.username.is_empty() {
            url.extend(utf8_percent_encode(&self.username, USERINFO));
            if !self.password.is_empty() {
                url.push(':');
                url.extend(utf8_percent_encode(self.password.expose(), USERINFO));
            }
            url.push('@');
        }
        url.push_str(&self.host);

        if !self.path.is_empty() {
            if !url.is_empty() && !self.path.starts_with('/') {
                url.push('/');
            }
            url.extend(utf8_percent_encode(&self.path, PATH));
        }

        Ok(url)
    }

    /// Identity fields as they read back from the URL form
    fn url_identity(&self) -> Result<Self> {
        let identity = Self {
            protocol: self.protocol.clone(),
            host: self.host.clone(),
            path: self.path.clone(),
            username: self.username.clone(),
            ..Default::default()
        };
        Self::from_url(&identity.to_url()?)
    }

    /// This record as a query, compared the way stored entries read back
    ///
    /// Stored entries go through the URL parser, which lowercases special
    /// hosts, drops default ports and resolves dot segments. A query with a
    /// protocol and a host takes the same trip so equal identities match.
    /// Empty fields stay empty.
    pub fn normalized(&self) -> Result<Self> {
        if self.protocol.is_empty() || self.host.is_empty() {
            return Ok(self.clone());
        }

        let identity = self.url_identity()?;
        Ok(Self {
            password: self.password.clone(),
            url: self.url.clone(),
            quit: self.quit,
            ..identity
        })
    }

    /// This record with its identity in stored form and the raw URL dropped
    ///
    /// Fails with `CryptStoreError::Url` when the identity has no URL form
    /// that parses back, such as a username without a host.
    pub fn stored_form(&self) -> Result<Self> {
        let identity = self.url_identity()?;
        Ok(Self {
            password: self.password.clone(),
            url: None,
            quit: self.quit,
            ..identity
        })
    }

    /// Whether `self`, used as a query, matches the stored record `have`
    ///
    /// Compares protocol, host, path and username. A field that is empty on
    /// either side matches anything, so an all-empty query matches every record.
    pub fn matches(&self, have: &CredentialRecord) -> bool {
        field_matches(&self.protocol, &have.protocol)
            && field_matches(&self.host, &have.host)
            && field_matches(&self.path, &have.path)
            && field_matches(&self.username, &have.username)
    }

    /// Check the record has everything needed to be stored
    pub fn validate_for_store(&self) -> Result<()> {
        if self.protocol.is_empty() {
            return Err(CryptStoreError::Validation("protocol is required".to_string()));
        }
        if self.host.is_empty() && self.path.is_empty() {
            return Err(CryptStoreError::Validation(
                "host or path is required".to_string(),
            ));
        }
        if self.username.is_empty() {
            return Err(CryptStoreError::Validation("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(CryptStoreError::Validation("password is required".to_string()));
        }
        Ok(())
    }

    pub fn is_valid_to_store(&self) -> bool {
        self.validate_for_store().is_ok()
    }
}

/// Identity only, safe for logs
impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.protocol)?;
        if !self.username.is_empty() {
            write!(f, "{}@", self.username)?;
        }
        write!(f, "{}/{}", self.host, self.path)
    }
}

fn field_matches(want: &str, have: &str) -> bool {
    want.is_empty() || have.is_empty() || want == have
}

/// Whether the userinfo of `raw` holds a `:`, even with nothing after it
fn has_password_separator(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    authority
        .rsplit_once('@')
        .map_or(false, |(userinfo, _)| userinfo.contains(':'))
}

fn decode(component: &str) -> Result<String> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CryptStoreError::Url(format!("invalid percent-encoding: {}", e)))
}
