//! Descriptions of programs to locate.

use super::key::Key;

/// Whether a missing tool aborts configuration or only disables a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// A registry record naming a vendor's install location.
///
/// Keys are tried in order; the first one that exists wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryQuery {
    /// Registry key paths under `HKEY_LOCAL_MACHINE`
    pub keys: Vec<String>,
    /// Value name (empty for the default value)
    pub value: String,
    /// Sub-directory appended to the install location (e.g. `bin`)
    pub subdir: Option<String>,
}

impl RegistryQuery {
    /// The LLVM install record.
    pub fn llvm() -> Self {
        RegistryQuery {
            keys: vec![
                "SOFTWARE\\Wow6432Node\\LLVM\\LLVM".to_string(),
                "SOFTWARE\\LLVM\\LLVM".to_string(),
            ],
            value: String::new(),
            subdir: Some("bin".to_string()),
        }
    }
}

/// Where to look for a program, consulted in a fixed precedence:
/// overrides, cached keys, the system path, then the install registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSources {
    /// Override variables (e.g. `CC`, `LLVM_PATH`)
    pub overrides: Vec<String>,
    /// Environment keys holding a previously found path or directory
    pub cached: Vec<Key>,
    /// Whether to search the system path
    pub system_path: bool,
    /// Install registry record, consulted on Windows only
    pub registry: Option<RegistryQuery>,
}

impl SearchSources {
    /// Search the system path only.
    pub fn system() -> Self {
        SearchSources {
            system_path: true,
            ..Default::default()
        }
    }

    /// Add an override variable.
    pub fn with_override(mut self, var: impl Into<String>) -> Self {
        self.overrides.push(var.into());
        self
    }

    /// Add a cached key.
    pub fn with_cached(mut self, key: Key) -> Self {
        self.cached.push(key);
        self
    }

    /// Consult an install registry record as a last resort.
    pub fn with_registry(mut self, query: RegistryQuery) -> Self {
        self.registry = Some(query);
        self
    }
}

/// An auxiliary program the configuration depends on.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Program names, in preference order
    pub programs: Vec<String>,
    /// Key the resolved path is stored under
    pub key: Key,
    /// Whether absence is fatal
    pub requirement: Requirement,
    /// Feature flag set to true when found and false when missing
    pub feature: Option<Key>,
    /// Default flags stored when the flag key is unset
    pub flags: Option<(Key, Vec<String>)>,
    /// Where to look
    pub sources: SearchSources,
    /// Message shown when an optional tool is missing
    pub warning: Option<String>,
}

impl ToolDescriptor {
    /// A required tool.
    pub fn required(program: impl Into<String>, key: Key) -> Self {
        ToolDescriptor {
            programs: vec![program.into()],
            key,
            requirement: Requirement::Required,
            feature: None,
            flags: None,
            sources: SearchSources::system()
                .with_override(key.as_str())
                .with_cached(key),
            warning: None,
        }
    }

    /// An optional tool.
    pub fn optional(program: impl Into<String>, key: Key) -> Self {
        ToolDescriptor {
            requirement: Requirement::Optional,
            ..ToolDescriptor::required(program, key)
        }
    }

    /// Accept another program name if the preferred ones are missing.
    pub fn or_program(mut self, program: impl Into<String>) -> Self {
        self.programs.push(program.into());
        self
    }

    /// Toggle a feature key depending on whether the tool is found.
    pub fn with_feature(mut self, feature: Key) -> Self {
        self.feature = Some(feature);
        self
    }

    /// Default flags for the tool.
    pub fn with_flags(mut self, key: Key, flags: &[&str]) -> Self {
        self.flags = Some((key, flags.iter().map(|f| f.to_string()).collect()));
        self
    }

    /// Message to warn with when the tool is missing.
    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }

    /// Replace the search sources.
    pub fn with_sources(mut self, sources: SearchSources) -> Self {
        self.sources = sources;
        self
    }

    /// The canonical program name.
    pub fn name(&self) -> &str {
        self.programs.first().map(String::as_str).unwrap_or_default()
    }

    /// Whether absence aborts configuration.
    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_tool_defaults() {
        let ar = ToolDescriptor::required("ar", Key::Ar);
        assert!(ar.is_required());
        assert_eq!(ar.name(), "ar");
        assert_eq!(ar.sources.overrides, vec!["AR".to_string()]);
        assert_eq!(ar.sources.cached, vec![Key::Ar]);
        assert!(ar.sources.system_path);
        assert!(ar.sources.registry.is_none());
    }

    #[test]
    fn test_optional_tool_builder() {
        let mt = ToolDescriptor::optional("mt", Key::Mt)
            .or_program("llvm-mt")
            .with_feature(Key::MsvcManifest)
            .with_flags(Key::MtFlags, &["/nologo"]);
        assert!(!mt.is_required());
        assert_eq!(mt.programs, vec!["mt", "llvm-mt"]);
        assert_eq!(mt.feature, Some(Key::MsvcManifest));
        assert_eq!(mt.flags, Some((Key::MtFlags, vec!["/nologo".to_string()])));
    }
}
