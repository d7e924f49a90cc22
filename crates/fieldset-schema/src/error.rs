use serde::Serialize;
use std::fmt;

///
/// ErrorTree
///
/// Path-keyed validation issue aggregation. Traversal never fails fast;
/// every issue is collected and returned to the caller, which decides how
/// to interpret the set.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct ErrorTree {
    issues: Vec<Issue>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self { issues: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Add an issue with no path context.
    pub fn add(&mut self, err: impl fmt::Display) {
        self.add_at("", err);
    }

    /// Add an issue anchored to a node path.
    pub fn add_at(&mut self, path: impl Into<String>, err: impl fmt::Display) {
        self.issues.push(Issue {
            path: path.into(),
            message: err.to_string(),
        });
    }

    /// Fold another tree into this one, prefixing its paths.
    pub fn merge(&mut self, prefix: &str, other: Self) {
        for issue in other.issues {
            let path = if issue.path.is_empty() {
                prefix.to_string()
            } else if prefix.is_empty() {
                issue.path
            } else {
                format!("{prefix}.{}", issue.path)
            };
            self.issues.push(Issue {
                path,
                message: issue.message,
            });
        }
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<&Issue> = self.issues.iter().collect();
        sorted.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));

        for (idx, issue) in sorted.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            if issue.path.is_empty() {
                write!(f, "{}", issue.message)?;
            } else {
                write!(f, "{}: {}", issue.path, issue.message)?;
            }
        }

        Ok(())
    }
}

///
/// Issue
///

#[derive(Clone, Debug, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

/// Append a formatted issue to an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

///
/// TESTS
///
