//! Eager construction and configuration checks.
//!
//! Validation builds every provider flagged `non_lazy`, in declaration order,
//! and gathers what went wrong into a [`ValidationReport`]. Eager providers are
//! built through the same path as [`Container::resolve_all`], so a contract
//! with several providers is not an error here even though a later
//! [`Container::resolve_one`] on it will fail; such contracts are reported as
//! warnings instead.

use std::fmt;
use std::sync::atomic::Ordering;

use ahash::RandomState;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::descriptors::BindingDescriptor;
use crate::error::DiError;
use crate::key::ContractId;
use crate::provider::{Container, ContainerInner};

/// One eager provider that failed to construct.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub provider: BindingDescriptor,
    pub error: DiError,
}

/// Non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Several providers serve the contract; `resolve_one` on it fails.
    AmbiguousContract { contract: ContractId, providers: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::AmbiguousContract { contract, providers } => {
                write!(f, "{} has {} providers", contract, providers)
            }
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
    warnings: Vec<ValidationWarning>,
    constructed: usize,
}

impl ValidationReport {
    /// No eager provider failed. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// The errors alone, in declaration order of the failing providers.
    pub fn errors(&self) -> impl Iterator<Item = &DiError> {
        self.failures.iter().map(|failure| &failure.error)
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Eager providers that constructed successfully.
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation {}: {} constructed, {} failed, {} warning(s)",
            if self.is_ok() { "passed" } else { "failed" },
            self.constructed,
            self.failures.len(),
            self.warnings.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  error: {}: {}", failure.provider.concrete, failure.error)?;
        }
        for warning in &self.warnings {
            write!(f, "\n  warning: {}", warning)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl Container {
    /// Constructs every eager provider and fails if any of them cannot be
    /// built.
    ///
    /// Every failure is collected unless
    /// [`fail_fast`](crate::ContainerSettings::fail_fast) is set, in which
    /// case the pass stops at the first one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindweave::{BindingEntry, ContainerBuilder, DiError, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Repo;
    /// struct Service { repo: Arc<Repo> }
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder.concrete::<Service, _>(|ctx| Ok(Service { repo: ctx.get::<Repo>()? }));
    /// builder.register(BindingEntry::bind::<Service>().as_single().non_lazy());
    ///
    /// let report = builder.build().validate().unwrap_err();
    /// assert_eq!(report.failures().len(), 1);
    /// assert!(matches!(report.failures()[0].error, DiError::NoBindingFound(_)));
    /// ```
    pub fn validate(&self) -> Result<(), ValidationReport> {
        self.check().into_result()
    }

    /// Runs the validation pass and returns the report whatever it says.
    pub fn check(&self) -> ValidationReport {
        let report = run(self.inner());
        if report.is_ok() {
            self.inner().validated.store(true, Ordering::Release);
        }
        report
    }
}

fn run(inner: &ContainerInner) -> ValidationReport {
    let mut report = ValidationReport::default();

    for provider in inner.registry.providers().iter().filter(|p| p.eager) {
        match inner.construct(provider, None) {
            Ok(_) => report.constructed += 1,
            Err(error) => {
                warn!(concrete = %provider.concrete, %error, "eager provider failed");
                report.failures.push(ValidationFailure {
                    provider: BindingDescriptor::from_provider(provider),
                    error,
                });
                if inner.settings.fail_fast {
                    break;
                }
            }
        }
    }

    if inner.settings.warn_on_ambiguous {
        let mut seen: HashSet<&ContractId, RandomState> = HashSet::default();
        for provider in inner.registry.providers() {
            for contract in &provider.contracts {
                if !seen.insert(contract) {
                    continue;
                }
                let providers = inner.registry.count(contract);
                if providers > 1 {
                    report.warnings.push(ValidationWarning::AmbiguousContract {
                        contract: contract.clone(),
                        providers,
                    });
                }
            }
        }
    }

    info!(
        constructed = report.constructed,
        failed = report.failures.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    report
}
