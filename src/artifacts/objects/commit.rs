//! Git commit object
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Commits written by other tools may carry extra headers (`encoding`,
//! `gpgsig`, `mergetag`, ...), possibly spanning several lines with
//! space-prefixed continuations. The decoder skips those. Identities and
//! message are not required to be UTF-8 (`encoding` names a legacy charset).

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};

/// Author or committer identity with timestamp and timezone
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Identity stamped at the Unix epoch in UTC (`0 +0000`)
    pub fn at_epoch(name: String, email: String) -> Self {
        Self::new_with_timestamp(name, email, DateTime::<Utc>::UNIX_EPOCH.fixed_offset())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Format as it appears in a commit: `Name <email> timestamp timezone`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            anyhow::bail!("Invalid author format: {}", value);
        }

        let offset = parse_offset(parts[0])?;
        let timestamp = parts[1]
            .parse::<i64>()
            .with_context(|| format!("Invalid timestamp: {}", parts[1]))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .context("Invalid author format: missing '<'")?;
        let email_end = name_email_part
            .rfind('>')
            .context("Invalid author format: missing '>'")?;
        if email_end < email_start {
            anyhow::bail!("Invalid author format: {}", value);
        }

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .with_context(|| format!("Timestamp out of range: {}", timestamp))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Parse a `+hhmm` / `-hhmm` timezone
fn parse_offset(value: &str) -> anyhow::Result<FixedOffset> {
    let invalid = || anyhow::anyhow!("Invalid timezone: {}", value);

    let (sign, digits) = match value.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours = digits[..2].parse::<i32>()?;
    let minutes = digits[2..].parse::<i32>()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Git commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for a root commit)
    parents: Vec<ObjectId>,
    /// Tree snapshot
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// Create a commit whose committer is the author
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parents,
            tree_oid,
            author: author.clone(),
            committer: author,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid));
        for parent in &self.parents {
            lines.push(format!("parent {}", parent));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        Ok(Bytes::from(lines.join("\n")))
    }
}

impl Unpackable for Commit {
    fn deserialize(content: &[u8]) -> anyhow::Result<Self> {
        let SlimCommit { tree_oid, parents } = SlimCommit::deserialize(content)?;
        let (headers, message) = split_headers(content);

        let mut author = None;
        let mut committer = None;
        for (key, value) in header_fields(headers) {
            match key {
                b"author" => author = Some(decode_author(value)?),
                b"committer" => committer = Some(decode_author(value)?),
                _ => {}
            }
        }

        let author = author.context("Invalid commit object: missing author line")?;
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Commit {
            parents,
            tree_oid,
            author,
            committer,
            message: String::from_utf8_lossy(message).into_owned(),
        })
    }
}

/// Tree and parents of a commit, nothing else
///
/// Identities and message are left undecoded, so commits in a legacy
/// encoding or with odd author lines still yield their tree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub tree_oid: ObjectId,
    pub parents: Vec<ObjectId>,
}

impl Unpackable for SlimCommit {
    fn deserialize(content: &[u8]) -> anyhow::Result<Self> {
        let (headers, _) = split_headers(content);

        let mut tree_oid = None;
        let mut parents = Vec::new();
        for (key, value) in header_fields(headers) {
            match key {
                b"tree" => {
                    if tree_oid.is_some() {
                        anyhow::bail!("Invalid commit object: duplicate tree line");
                    }
                    tree_oid = Some(parse_header_oid(value, "tree")?);
                }
                b"parent" => parents.push(parse_header_oid(value, "parent")?),
                _ => {}
            }
        }

        let tree_oid = tree_oid.context("Invalid commit object: missing tree line")?;
        Ok(SlimCommit { tree_oid, parents })
    }
}

/// Headers end at the first empty line, the message is everything after it
fn split_headers(content: &[u8]) -> (&[u8], &[u8]) {
    match content.windows(2).position(|pair| pair == b"\n\n") {
        Some(end) => (&content[..end], &content[end + 2..]),
        None => (content, &content[content.len()..]),
    }
}

/// `(key, value)` of every header line; continuation lines of multi-line
/// headers start with a space and are skipped
fn header_fields(headers: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    headers
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty() && !line.starts_with(b" "))
        .map(|line| match line.iter().position(|&b| b == b' ') {
            Some(space) => (&line[..space], &line[space + 1..]),
            None => (line, &line[line.len()..]),
        })
}

fn parse_header_oid(value: &[u8], field: &str) -> anyhow::Result<ObjectId> {
    std::str::from_utf8(value)
        .map_err(anyhow::Error::from)
        .and_then(ObjectId::try_parse)
        .with_context(|| format!("Invalid commit object: bad {} line", field))
}

/// Identities may be in any encoding; undecodable bytes become U+FFFD
fn decode_author(value: &[u8]) -> anyhow::Result<Author> {
    Author::try_from(String::from_utf8_lossy(value).as_ref())
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
