use core::fmt;

/// A start/end marker comment pair delimiting an injection span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
    start: String,
    end: String,
}

impl MarkerPair {
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Markers for the top-N ranking table, parameterized by the configured
    /// row count (`<!-- TOP100:START -->` / `<!-- TOP100:END -->`).
    #[must_use]
    pub fn ranking(top_n: usize) -> Self {
        Self::new(format!("<!-- TOP{top_n}:START -->"), format!("<!-- TOP{top_n}:END -->"))
    }

    /// Markers for the optional category navigation block.
    #[must_use]
    pub fn category_nav() -> Self {
        Self::new("<!-- CATEGORY:START -->", "<!-- CATEGORY:END -->")
    }

    #[must_use]
    pub fn start(&self) -> &str {
        &self.start
    }

    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }
}

/// A marker could not be located in the target document.
///
/// Callers branch on this: write mode treats it as fatal, check mode reports
/// it and moves on with a non-zero exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    StartMissing(String),
    EndMissing(String),
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartMissing(marker) => write!(f, "start marker '{marker}' not found in document"),
            Self::EndMissing(marker) => write!(f, "end marker '{marker}' not found after start marker in document"),
        }
    }
}

impl core::error::Error for MarkerError {}

/// Replace the content between the first start marker and the first end
/// marker after it with `content`, preserving the markers themselves and
/// every byte outside the span.
///
/// The injected span is fully determined by `content`, which makes the
/// operation idempotent: applying it to its own output is a no-op.
///
/// # Errors
///
/// Returns [`MarkerError`] when either marker cannot be located.
pub fn build_document(source: &str, content: &str, markers: &MarkerPair) -> Result<String, MarkerError> {
    let start_idx = source
        .find(markers.start())
        .ok_or_else(|| MarkerError::StartMissing(markers.start().to_string()))?;
    let after_start = start_idx + markers.start().len();

    let end_idx = source[after_start..]
        .find(markers.end())
        .map(|rel| after_start + rel)
        .ok_or_else(|| MarkerError::EndMissing(markers.end().to_string()))?;

    let mut out = String::with_capacity(source.len() + content.len());
    out.push_str(&source[..after_start]);
    out.push('\n');
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&source[end_idx..]);
    Ok(out)
}
