use std::fmt;

/// Visibility of an error recorded on a request.
///
/// `Private` errors are meant for operators (they show up in the access log);
/// `Public` errors may be echoed back to clients by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Private,
    Public,
    /// Matches every type when filtering.
    Any,
}

impl ErrorType {
    fn matches(self, other: ErrorType) -> bool {
        self == ErrorType::Any || other == ErrorType::Any || self == other
    }
}

/// One error recorded during request handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextError {
    pub message: String,
    pub kind: ErrorType,
    pub meta: Option<String>,
}

impl ContextError {
    pub fn new<T: fmt::Display>(err: T, kind: ErrorType) -> Self {
        Self {
            message: err.to_string(),
            kind,
            meta: None,
        }
    }

    pub fn private<T: fmt::Display>(err: T) -> Self {
        Self::new(err, ErrorType::Private)
    }

    pub fn with_meta<T: fmt::Display>(mut self, meta: T) -> Self {
        self.meta = Some(meta.to_string());
        self
    }
}

/// Ordered list of errors recorded on a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorChain(Vec<ContextError>);

impl ErrorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ContextError) {
        self.0.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContextError> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&ContextError> {
        self.0.last()
    }

    pub fn by_type(&self, kind: ErrorType) -> ErrorChain {
        ErrorChain(
            self.0
                .iter()
                .filter(|e| kind.matches(e.kind))
                .cloned()
                .collect(),
        )
    }
}

/// Renders each entry as `Error #NN: <message>` followed by an optional
/// `Meta:` line. An empty chain renders as the empty string.
impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            writeln!(f, "Error #{:02}: {}", i + 1, err.message)?;
            if let Some(meta) = &err.meta {
                writeln!(f, "     Meta: {}", meta)?;
            }
        }
        Ok(())
    }
}
