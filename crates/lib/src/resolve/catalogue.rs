//! Cross-checking components against their packaged default parameters.
//!
//! Each component ships a catalogue at `<dir>/<ComponentName>/defaults.json`:
//! a commented JSON map from environment variable to default value, where
//! `null` marks a variable that has no default and must be set. Comparing a
//! component's `EnvironmentVariables` against it yields [`Finding`]s. None of
//! them abort resolution; they are logged and collected in the
//! [`super::ResolveReport`].

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    Result,
    constants::CATALOGUE_FILE,
    tree::{self, Map, TreeError, Value},
};

/// How serious a [`Finding`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// What a [`Finding`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    /// No catalogue file for the component
    CatalogueMissing,
    /// The catalogue exists but could not be read or parsed
    CatalogueUnreadable,
    /// A variable with a default is not set; the default applies
    DefaultUnset,
    /// A variable is set to exactly its default
    EqualsDefault,
    /// A variable the catalogue does not know
    UnexpectedVariable,
    /// A variable without a default is not set
    RequiredMissing,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::RequiredMissing => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// One result of the default-parameter cross-check.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Deployment id of the component, e.g. `node1/svc/web`
    pub component: String,
    pub variable: Option<String>,
    pub detail: String,
}

impl Finding {
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    fn log(&self) {
        let variable = self.variable.as_deref().unwrap_or("-");
        match self.severity() {
            Severity::Warning => {
                tracing::warn!(component = %self.component, variable, "{}", self.detail)
            }
            Severity::Error => {
                tracing::error!(component = %self.component, variable, "{}", self.detail)
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variable {
            Some(variable) => write!(f, "{} {}: {}", self.component, variable, self.detail),
            None => write!(f, "{}: {}", self.component, self.detail),
        }
    }
}

/// Default parameters of one packaged component.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    defaults: Map,
}

impl Catalogue {
    /// Location of the catalogue for `component_name` under `dir`.
    pub fn path(dir: &Path, component_name: &str) -> PathBuf {
        dir.join(component_name).join(CATALOGUE_FILE)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        match tree::load(path)? {
            Value::Map(defaults) => Ok(Self { defaults }),
            other => Err(TreeError::RootNotMap {
                found: other.type_name(),
            }
            .into()),
        }
    }

    pub fn from_map(defaults: Map) -> Self {
        Self { defaults }
    }

    /// Compares `environment` against the catalogue.
    pub fn check(&self, component: &str, environment: &Map) -> Vec<Finding> {
        let finding = |kind, variable: &str, detail: String| Finding {
            kind,
            component: component.to_string(),
            variable: Some(variable.to_string()),
            detail,
        };
        let mut findings = Vec::new();

        for (variable, default) in self.defaults.iter() {
            match (environment.get(variable), default) {
                (None, Value::Null) => findings.push(finding(
                    FindingKind::RequiredMissing,
                    variable,
                    "required variable has no default and is not set".to_string(),
                )),
                (None, default) => findings.push(finding(
                    FindingKind::DefaultUnset,
                    variable,
                    format!("not set, default {} applies", default.to_json_string()),
                )),
                (Some(value), default) if same_setting(value, default) => {
                    findings.push(finding(
                        FindingKind::EqualsDefault,
                        variable,
                        format!("set to its default {}", default.to_json_string()),
                    ))
                }
                (Some(_), _) => {}
            }
        }

        for variable in environment.keys() {
            if !self.defaults.contains_key(variable) {
                findings.push(finding(
                    FindingKind::UnexpectedVariable,
                    variable,
                    "not a parameter of this component".to_string(),
                ));
            }
        }
        findings
    }
}

/// `8080` and `"8080"` configure the same thing.
fn same_setting(value: &Value, default: &Value) -> bool {
    !default.is_branch()
        && (value == default || value.to_display_string() == default.to_display_string())
}

/// Runs the cross-check for one component, logging every finding.
pub(crate) fn cross_check(
    dir: &Path,
    component: &str,
    component_name: &str,
    environment: &Map,
) -> Vec<Finding> {
    let path = Catalogue::path(dir, component_name);
    let findings = match Catalogue::load(&path) {
        Ok(catalogue) => catalogue.check(component, environment),
        Err(err) => {
            let kind = if err.is_io_error() && !path.exists() {
                FindingKind::CatalogueMissing
            } else {
                FindingKind::CatalogueUnreadable
            };
            vec![Finding {
                kind,
                component: component.to_string(),
                variable: None,
                detail: format!("cannot use catalogue {}: {err}", path.display()),
            }]
        }
    };
    for finding in &findings {
        finding.log();
    }
    findings
}
