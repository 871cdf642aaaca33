//! File upload rules: counts, sizes and MIME types
//!
//! Count rules always run. Size and MIME rules check every supplied file
//! and pass trivially when there is none; `required` covers that case.

use super::{plural, Bound, FileRule, RuleSpec, Verdict};
use crate::error::Result;
use crate::schema::RuleKey;
use crate::size::ByteSize;
use crate::value::FileSet;

/// `numOfFiles`, `minNumOfFiles`, `maxNumOfFiles`
#[derive(Debug, Clone, Copy)]
pub struct FileCountRule {
    bound: Bound,
    target: usize,
}

impl FileCountRule {
    pub fn new(bound: Bound, target: usize) -> Self {
        Self { bound, target }
    }
}

impl FileRule for FileCountRule {
    fn key(&self) -> RuleKey {
        match self.bound {
            Bound::Exact => RuleKey::NumOfFiles,
            Bound::Min => RuleKey::MinNumOfFiles,
            Bound::Max => RuleKey::MaxNumOfFiles,
        }
    }

    fn evaluate(&self, files: &FileSet) -> Verdict {
        let count = files.count();
        Verdict::check(self.bound.check(count, self.target), || {
            format!(
                "Please upload {} {}, {} provided",
                self.bound.describe(),
                plural(self.target, "file"),
                plural(count, "file")
            )
        })
    }
}

/// `fileSize`, `minFileSize`, `maxFileSize`
///
/// A file whose descriptor carries no readable size fails.
#[derive(Debug, Clone)]
pub struct FileSizeRule {
    bound: Bound,
    limit: ByteSize,
}

impl FileSizeRule {
    pub fn new(bound: Bound, limit: ByteSize) -> Self {
        Self { bound, limit }
    }
}

impl FileRule for FileSizeRule {
    fn key(&self) -> RuleKey {
        match self.bound {
            Bound::Exact => RuleKey::FileSize,
            Bound::Min => RuleKey::MinFileSize,
            Bound::Max => RuleKey::MaxFileSize,
        }
    }

    fn evaluate(&self, files: &FileSet) -> Verdict {
        let within = files.iter().all(|file| {
            file.size
                .is_some_and(|size| self.bound.check(size, self.limit.bytes()))
        });
        Verdict::check(within, || match self.bound {
            Bound::Exact => format!("File size must be exactly {}", self.limit),
            Bound::Min => format!("File size must be at least {}", self.limit),
            Bound::Max => format!("File size must not exceed {}", self.limit),
        })
    }
}

/// `mimeType`: exact types or `major/*` wildcards, case-insensitive
#[derive(Debug, Clone)]
pub struct MimeTypeRule {
    accepted: Vec<String>,
}

impl MimeTypeRule {
    /// Parse a comma-separated list of MIME types
    pub fn parse(list: &str) -> Option<Self> {
        let accepted: Vec<String> = list
            .split(',')
            .map(|entry| {
                entry
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|entry| !entry.is_empty())
            .collect();

        if accepted.is_empty() || accepted.iter().any(|entry| !entry.contains('/')) {
            return None;
        }
        Some(Self { accepted })
    }

    fn accepts(&self, mimetype: &str) -> bool {
        let mimetype = mimetype.trim().to_lowercase();
        let wildcard = mimetype
            .split_once('/')
            .map(|(major, _)| format!("{}/*", major));

        self.accepted.iter().any(|entry| {
            *entry == mimetype || wildcard.as_deref().is_some_and(|w| w == entry)
        })
    }
}

impl FileRule for MimeTypeRule {
    fn key(&self) -> RuleKey {
        RuleKey::MimeType
    }

    fn evaluate(&self, files: &FileSet) -> Verdict {
        let accepted = files.iter().all(|file| {
            file.mimetype
                .as_deref()
                .is_some_and(|mimetype| self.accepts(mimetype))
        });
        Verdict::check(accepted, || {
            format!(
                "File type is not allowed, accepted types are {}",
                self.accepted.join(", ")
            )
        })
    }
}

/// `type: "file"` only classifies the field
pub fn build_type(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>> {
    match spec.as_str()? {
        "file" => Ok(None),
        _ => Err(spec.invalid("\"file\" on a file field")),
    }
}

pub fn build_count(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>> {
    let target = spec.as_count()?;
    let bound = match spec.key {
        RuleKey::MinNumOfFiles => Bound::Min,
        RuleKey::MaxNumOfFiles => Bound::Max,
        _ => Bound::Exact,
    };
    Ok(Some(Box::new(FileCountRule::new(bound, target))))
}

pub fn build_size(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>> {
    let limit = spec.as_size()?;
    let bound = match spec.key {
        RuleKey::MinFileSize => Bound::Min,
        RuleKey::MaxFileSize => Bound::Max,
        _ => Bound::Exact,
    };
    Ok(Some(Box::new(FileSizeRule::new(bound, limit))))
}

pub fn build_mime_type(spec: &RuleSpec<'_>) -> Result<Option<Box<dyn FileRule>>> {
    let rule = MimeTypeRule::parse(spec.as_str()?)
        .ok_or_else(|| spec.invalid("a comma-separated list of MIME types"))?;
    Ok(Some(Box::new(rule)))
}
