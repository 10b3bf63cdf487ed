//! Sign-in message encoding
//!
//! Deterministic, human-readable sign-in message (EIP-4361 profile). The text
//! the wallet signs is exactly what `Display` produces, and `FromStr` accepts
//! exactly that shape back.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

const ACCOUNT_PREAMBLE: &str = " wants you to sign in with your Ethereum account:";

/// Message parse errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing line: {0}")]
    MissingLine(&'static str),

    #[error("Malformed line: {0}")]
    MalformedLine(&'static str),

    #[error("Invalid field value: {0}")]
    InvalidField(&'static str),
}

/// A sign-in message, immutable once constructed.
///
/// Every field the wallet owner signs over is visible in the rendered text;
/// there are no hidden fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInMessage {
    pub domain: String,
    pub address: String,
    pub statement: String,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
}

impl fmt::Display for SignInMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{domain}{preamble}\n\
             {address}\n\
             \n\
             {statement}\n\
             \n\
             URI: {uri}\n\
             Version: {version}\n\
             Chain ID: {chain_id}\n\
             Nonce: {nonce}\n\
             Issued At: {issued_at}",
            domain = self.domain,
            preamble = ACCOUNT_PREAMBLE,
            address = self.address,
            statement = self.statement,
            uri = self.uri,
            version = self.version,
            chain_id = self.chain_id,
            nonce = self.nonce,
            issued_at = self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}

impl FromStr for SignInMessage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();

        let header = lines.next().ok_or(ParseError::MissingLine("header"))?;
        let domain = header
            .strip_suffix(ACCOUNT_PREAMBLE)
            .ok_or(ParseError::MalformedLine("header"))?;
        if domain.is_empty() {
            return Err(ParseError::InvalidField("domain"));
        }

        let address = lines.next().ok_or(ParseError::MissingLine("address"))?;

        expect_blank(lines.next())?;
        let statement = lines.next().ok_or(ParseError::MissingLine("statement"))?;
        expect_blank(lines.next())?;

        let uri = field(lines.next(), "URI: ", "uri")?;
        let version = field(lines.next(), "Version: ", "version")?;
        let chain_id = field(lines.next(), "Chain ID: ", "chain id")?
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidField("chain id"))?;
        let nonce = field(lines.next(), "Nonce: ", "nonce")?;
        let issued_at = field(lines.next(), "Issued At: ", "issued at")?;
        let issued_at = DateTime::parse_from_rfc3339(&issued_at)
            .map_err(|_| ParseError::InvalidField("issued at"))?
            .with_timezone(&Utc);

        if lines.next().is_some() {
            return Err(ParseError::MalformedLine("trailing content"));
        }

        Ok(SignInMessage {
            domain: domain.to_string(),
            address: address.to_string(),
            statement: statement.to_string(),
            uri,
            version,
            chain_id,
            nonce,
            issued_at,
        })
    }
}

fn expect_blank(line: Option<&str>) -> Result<(), ParseError> {
    match line {
        Some("") => Ok(()),
        Some(_) => Err(ParseError::MalformedLine("expected blank line")),
        None => Err(ParseError::MissingLine("blank line")),
    }
}

fn field(line: Option<&str>, prefix: &str, name: &'static str) -> Result<String, ParseError> {
    let line = line.ok_or(ParseError::MissingLine(name))?;
    line.strip_prefix(prefix)
        .map(str::to_string)
        .ok_or(ParseError::MalformedLine(name))
}
