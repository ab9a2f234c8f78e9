//! Expansion limits: path patterns and depth caps.

use thiserror::Error;

use crate::node::NodePath;

/// Errors from building [`Limits`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LimitsError {
    /// A path pattern contained an empty segment.
    #[error("path pattern '{pattern}' contains an empty segment")]
    EmptySegment {
        /// The offending pattern text.
        pattern: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Wildcard,
}

/// One parsed path pattern, e.g. `/contracts/*/price`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPattern {
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    fn parse(text: &str) -> Result<Self, LimitsError> {
        let trimmed = text.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self {
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            match part {
                "" => {
                    return Err(LimitsError::EmptySegment {
                        pattern: text.to_owned(),
                    })
                },
                "*" => segments.push(PatternSegment::Wildcard),
                literal => segments.push(PatternSegment::Literal(literal.to_owned())),
            }
        }
        Ok(Self { segments })
    }

    /// Whether `path` lies on or above this pattern.
    ///
    /// The pattern covers every prefix of itself: a pattern of length n
    /// admits paths of up to n segments whose segments all match.
    fn covers(&self, path: &NodePath) -> bool {
        let segments = path.segments();
        segments.len() <= self.segments.len()
            && segments
                .iter()
                .zip(&self.segments)
                .all(|(segment, pattern)| match pattern {
                    PatternSegment::Wildcard => true,
                    PatternSegment::Literal(literal) => literal == segment,
                })
    }
}

/// Bounds on how far reference expansion reaches into a document.
///
/// A reference is only expanded when its path satisfies every configured
/// bound: within the depth cap, and covered by at least one path pattern
/// when patterns are set. The default is unrestricted.
///
/// Patterns use `/`-separated segments with `*` matching exactly one
/// segment of any name. List positions appear as their index. A pattern
/// admits its own prefixes, so `/a/b` also admits expansion at `/a`; the
/// chain must be expandable for the nested target to be reachable at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Limits {
    patterns: Option<Vec<PathPattern>>,
    max_depth: Option<usize>,
}

impl Limits {
    /// No bounds; every reference in reach is expanded.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Bounds expansion to `max_depth` segments below the root.
    ///
    /// Depth 0 admits only the root itself.
    #[must_use]
    pub fn depth(max_depth: usize) -> Self {
        Self {
            patterns: None,
            max_depth: Some(max_depth),
        }
    }

    /// Bounds expansion to paths covered by at least one pattern.
    ///
    /// An empty pattern list admits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LimitsError`] if a pattern contains an empty segment.
    pub fn paths<I, S>(patterns: I) -> Result<Self, LimitsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = patterns
            .into_iter()
            .map(|pattern| PathPattern::parse(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns: Some(parsed),
            max_depth: None,
        })
    }

    /// Bounds expansion to a single pattern.
    ///
    /// # Errors
    ///
    /// Returns [`LimitsError`] if the pattern contains an empty segment.
    pub fn path(pattern: &str) -> Result<Self, LimitsError> {
        Self::paths([pattern])
    }

    /// Adds a depth cap on top of the existing bounds.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Whether a reference at `path` may be expanded.
    #[must_use]
    pub fn allows(&self, path: &NodePath) -> bool {
        if let Some(max_depth) = self.max_depth {
            if path.depth() > max_depth {
                return false;
            }
        }
        match &self.patterns {
            None => true,
            Some(patterns) => patterns.iter().any(|pattern| pattern.covers(path)),
        }
    }
}
