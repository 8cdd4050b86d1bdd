use tracing::Level;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, ScoutError};
use crate::provider::Provider;
use crate::schema::{CimClass, Namespace};

/// Which classes to retrieve from a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSelector {
    Named(String),
    All,
}

impl ClassSelector {
    /// Build a selector from the raw class-name / all-classes arguments.
    /// Exactly one of the two must be given.
    pub fn from_args(class_name: Option<String>, all: bool) -> Result<Self> {
        match (class_name, all) {
            (Some(_), true) => Err(ScoutError::ConflictingSelector),
            (Some(name), false) if name.trim().is_empty() => Err(ScoutError::NoSelector),
            (Some(name), false) => Ok(Self::Named(name.trim().to_string())),
            (None, true) => Ok(Self::All),
            (None, false) => Err(ScoutError::NoSelector),
        }
    }
}

impl std::fmt::Display for ClassSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => write!(f, "class {name}"),
            Self::All => write!(f, "all classes"),
        }
    }
}

/// Resolves a namespace and selector into class definitions.
///
/// Provider failures surface as `ScoutError::Retrieval` carrying the
/// provider's own message. There is no retry and no partial result.
pub struct ClassRetriever<'a, P: Provider + ?Sized> {
    provider: &'a P,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a, P: Provider + ?Sized> ClassRetriever<'a, P> {
    pub fn new(provider: &'a P, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            provider,
            diagnostics,
        }
    }

    pub fn retrieve(&self, namespace: &Namespace, selector: &ClassSelector) -> Result<Vec<CimClass>> {
        self.diagnostics.emit(
            Level::DEBUG,
            &format!(
                "Retrieving {selector} from {namespace} via {}",
                self.provider.describe()
            ),
        );

        let classes = match selector {
            ClassSelector::Named(name) => self
                .provider
                .get_class(namespace, name)
                .map(|class| vec![class])
                .map_err(|e| ScoutError::retrieval(Some(name.as_str()), e))?,
            ClassSelector::All => self
                .provider
                .list_classes(namespace)
                .map_err(|e| ScoutError::retrieval(None, e))?,
        };

        self.diagnostics.emit(
            Level::DEBUG,
            &format!("Retrieved {} class(es) from {namespace}", classes.len()),
        );
        Ok(classes)
    }
}
