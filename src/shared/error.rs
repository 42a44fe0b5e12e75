
use std::{error, fmt};
use std::fmt::{Debug, Display, Formatter};

/// Recoverable error carrying a module specific `kind` and an optional cause.
///
/// Invariant violations inside the compiler are not reported through this type,
/// see `crate::diag` for those. `Display` shows only the kind; walk `source()` for the causes.
#[derive(Debug)]
pub struct Error<K: Debug + Display> {
    pub kind: K,
    source: Option<Box<dyn error::Error + Send + Sync + 'static>>,
}

impl<K: Debug + Display> Display for Error<K> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl<K: Debug + Display> error::Error for Error<K> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

impl<K: Debug + Display> From<K> for Error<K> {
    fn from(kind: K) -> Self {
        Error::new(kind)
    }
}

impl<K: Debug + Display> Error<K> {
    pub fn new(kind: K) -> Error<K> {
        Error {
            kind,
            source: None,
        }
    }

    pub fn with_source<E: error::Error + Send + Sync + 'static>(kind: K, source: E) -> Error<K> {
        Error {
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }
}

/// Render `err` followed by every cause in its `source()` chain.
pub fn report(err: &dyn error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text
}
