use std::fmt;

/// Separator between segments of a category path
pub const PATH_SEPARATOR: &str = " > ";

/// Ordered names from a top-level category down to a node
///
/// Displayed (and parsed) as the names joined with `" > "`, e.g.
/// `Electronics > Audio > Headphones`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryPath {
    segments: Vec<String>,
}

impl CategoryPath {
    /// Path of a top-level category
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a path joined with [`PATH_SEPARATOR`]
    pub fn parse(joined: &str) -> Self {
        Self::from_segments(joined.split(PATH_SEPARATOR))
    }

    /// Path of the direct child `name`
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of levels below the top-level category
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(PATH_SEPARATOR))
    }
}
