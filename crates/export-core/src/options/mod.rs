//! Export options: raw (as read from dialogs, flags, or config files) and
//! validated (what the generator receives)
//!
//! Every raw field is optional. Validation fills in defaults, rejects a
//! record that lacks a required field, and checks names and versions, so
//! the generator never sees a partially populated record.

pub mod version;

use crate::error::OptionsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use version::{parse_version, validate_package_name, validate_version};

pub const DEFAULT_REACT_APP_NAME: &str = "tsx-components-app";
pub const DEFAULT_FRAMEWORK_APP_NAME: &str = "nextjs-components-app";
pub const DEFAULT_FRAMEWORK_VERSION: &str = "13.4.12";
pub const DEFAULT_PACKAGE_VERSION: &str = "0.1.0";

/// The three export shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    ReactApp,
    FrameworkApp,
    Library,
}

impl Variant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Variant::ReactApp => "React app",
            Variant::FrameworkApp => "Next.js app",
            Variant::Library => "component library",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Next.js routing convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
    #[default]
    App,
    Pages,
}

impl FromStr for RouterMode {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "app" => Ok(RouterMode::App),
            "pages" => Ok(RouterMode::Pages),
            _ => Err(OptionsError::UnknownValue {
                field: "router_mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Bundler used to build a component library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bundler {
    #[default]
    Rollup,
    Webpack,
}

impl FromStr for Bundler {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rollup" => Ok(Bundler::Rollup),
            "webpack" => Ok(Bundler::Webpack),
            _ => Err(OptionsError::UnknownValue {
                field: "bundler",
                value: s.to_string(),
            }),
        }
    }
}

/// Optional UI kit pre-installed in a React app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiLibrary {
    #[default]
    None,
    Mui,
    Chakra,
}

impl FromStr for UiLibrary {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(UiLibrary::None),
            "mui" => Ok(UiLibrary::Mui),
            "chakra" => Ok(UiLibrary::Chakra),
            _ => Err(OptionsError::UnknownValue {
                field: "ui_library",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactAppOptions {
    pub run_after_export: bool,
    pub app_name: String,
    pub tailwind: bool,
    pub ui_library: UiLibrary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkAppOptions {
    pub app_name: String,
    pub framework_version: String,
    pub router_mode: RouterMode,
    pub use_typescript: bool,
    pub include_linter: bool,
    pub include_styling: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    pub package_name: String,
    pub package_version: String,
    pub use_typescript: bool,
    pub bundler: Bundler,
    pub include_storybook: bool,
}

/// A complete, validated options record; the variant is the tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOptions {
    ReactApp(ReactAppOptions),
    FrameworkApp(FrameworkAppOptions),
    Library(LibraryOptions),
}

impl ExportOptions {
    pub fn variant(&self) -> Variant {
        match self {
            ExportOptions::ReactApp(_) => Variant::ReactApp,
            ExportOptions::FrameworkApp(_) => Variant::FrameworkApp,
            ExportOptions::Library(_) => Variant::Library,
        }
    }

    /// Name of the generated project (package.json `name`)
    pub fn project_name(&self) -> &str {
        match self {
            ExportOptions::ReactApp(o) => &o.app_name,
            ExportOptions::FrameworkApp(o) => &o.app_name,
            ExportOptions::Library(o) => &o.package_name,
        }
    }

    /// Whether the options themselves ask for "export and run"
    pub fn requests_run(&self) -> bool {
        matches!(self, ExportOptions::ReactApp(o) if o.run_after_export)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawReactAppOptions {
    pub run_after_export: Option<bool>,
    pub app_name: Option<String>,
    pub tailwind: Option<bool>,
    pub ui_library: Option<UiLibrary>,
}

impl RawReactAppOptions {
    /// Overlay `other` on top of `self`; set fields in `other` win
    pub fn merge(&mut self, other: RawReactAppOptions) {
        self.run_after_export = other.run_after_export.or(self.run_after_export);
        self.app_name = other.app_name.or(self.app_name.take());
        self.tailwind = other.tailwind.or(self.tailwind);
        self.ui_library = other.ui_library.or(self.ui_library);
    }

    pub fn validate(self) -> Result<ReactAppOptions, OptionsError> {
        let app_name = self
            .app_name
            .unwrap_or_else(|| DEFAULT_REACT_APP_NAME.to_string());
        validate_package_name(&app_name)?;

        Ok(ReactAppOptions {
            run_after_export: self.run_after_export.unwrap_or(false),
            app_name,
            tailwind: self.tailwind.unwrap_or(true),
            ui_library: self.ui_library.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFrameworkAppOptions {
    pub app_name: Option<String>,
    pub framework_version: Option<String>,
    pub router_mode: Option<RouterMode>,
    pub use_typescript: Option<bool>,
    pub include_linter: Option<bool>,
    pub include_styling: Option<bool>,
}

impl RawFrameworkAppOptions {
    pub fn merge(&mut self, other: RawFrameworkAppOptions) {
        self.app_name = other.app_name.or(self.app_name.take());
        self.framework_version = other.framework_version.or(self.framework_version.take());
        self.router_mode = other.router_mode.or(self.router_mode);
        self.use_typescript = other.use_typescript.or(self.use_typescript);
        self.include_linter = other.include_linter.or(self.include_linter);
        self.include_styling = other.include_styling.or(self.include_styling);
    }

    pub fn validate(self) -> Result<FrameworkAppOptions, OptionsError> {
        let app_name = self
            .app_name
            .unwrap_or_else(|| DEFAULT_FRAMEWORK_APP_NAME.to_string());
        validate_package_name(&app_name)?;

        let framework_version = validate_version(
            "framework_version",
            self.framework_version
                .as_deref()
                .unwrap_or(DEFAULT_FRAMEWORK_VERSION),
        )?;

        Ok(FrameworkAppOptions {
            app_name,
            framework_version,
            router_mode: self.router_mode.unwrap_or_default(),
            use_typescript: self.use_typescript.unwrap_or(true),
            include_linter: self.include_linter.unwrap_or(true),
            include_styling: self.include_styling.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawLibraryOptions {
    pub package_name: Option<String>,
    pub package_version: Option<String>,
    pub use_typescript: Option<bool>,
    pub bundler: Option<Bundler>,
    pub include_storybook: Option<bool>,
}

impl RawLibraryOptions {
    pub fn merge(&mut self, other: RawLibraryOptions) {
        self.package_name = other.package_name.or(self.package_name.take());
        self.package_version = other.package_version.or(self.package_version.take());
        self.use_typescript = other.use_typescript.or(self.use_typescript);
        self.bundler = other.bundler.or(self.bundler);
        self.include_storybook = other.include_storybook.or(self.include_storybook);
    }

    pub fn validate(self) -> Result<LibraryOptions, OptionsError> {
        let package_name = self.package_name.ok_or(OptionsError::MissingField {
            variant: "library",
            field: "package_name",
        })?;
        validate_package_name(&package_name)?;

        let package_version = validate_version(
            "package_version",
            self.package_version
                .as_deref()
                .unwrap_or(DEFAULT_PACKAGE_VERSION),
        )?;

        Ok(LibraryOptions {
            package_name,
            package_version,
            use_typescript: self.use_typescript.unwrap_or(true),
            bundler: self.bundler.unwrap_or_default(),
            include_storybook: self.include_storybook.unwrap_or(true),
        })
    }
}

/// Raw options for whichever variant the caller picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOptions {
    ReactApp(RawReactAppOptions),
    FrameworkApp(RawFrameworkAppOptions),
    Library(RawLibraryOptions),
}

impl RawOptions {
    pub fn validate(self) -> Result<ExportOptions, OptionsError> {
        Ok(match self {
            RawOptions::ReactApp(raw) => ExportOptions::ReactApp(raw.validate()?),
            RawOptions::FrameworkApp(raw) => ExportOptions::FrameworkApp(raw.validate()?),
            RawOptions::Library(raw) => ExportOptions::Library(raw.validate()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_defaults() {
        let opts = RawReactAppOptions::default().validate().unwrap();
        assert_eq!(opts.app_name, DEFAULT_REACT_APP_NAME);
        assert!(!opts.run_after_export);
        assert!(opts.tailwind);
        assert_eq!(opts.ui_library, UiLibrary::None);
    }

    #[test]
    fn test_framework_defaults() {
        let opts = RawFrameworkAppOptions::default().validate().unwrap();
        assert_eq!(opts.framework_version, DEFAULT_FRAMEWORK_VERSION);
        assert_eq!(opts.router_mode, RouterMode::App);
        assert!(opts.use_typescript && opts.include_linter && opts.include_styling);
    }

    #[test]
    fn test_library_requires_package_name() {
        let err = RawLibraryOptions::default().validate().unwrap_err();
        assert_eq!(
            err,
            OptionsError::MissingField {
                variant: "library",
                field: "package_name"
            }
        );
    }

    #[test]
    fn test_library_rejects_bad_version() {
        let raw = RawLibraryOptions {
            package_name: Some("ui-kit".to_string()),
            package_version: Some("one".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            raw.validate(),
            Err(OptionsError::InvalidVersion { field: "package_version", .. })
        ));
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = RawFrameworkAppOptions {
            app_name: Some("from-file".to_string()),
            use_typescript: Some(false),
            ..Default::default()
        };
        base.merge(RawFrameworkAppOptions {
            use_typescript: Some(true),
            router_mode: Some(RouterMode::Pages),
            ..Default::default()
        });
        assert_eq!(base.app_name.as_deref(), Some("from-file"));
        assert_eq!(base.use_typescript, Some(true));
        assert_eq!(base.router_mode, Some(RouterMode::Pages));
    }

    #[test]
    fn test_raw_options_from_yaml() {
        let raw: RawLibraryOptions = serde_yaml::from_str(
            "package_name: \"@acme/ui\"\nbundler: webpack\ninclude_storybook: false\n",
        )
        .unwrap();
        let opts = raw.validate().unwrap();
        assert_eq!(opts.package_name, "@acme/ui");
        assert_eq!(opts.bundler, Bundler::Webpack);
        assert!(!opts.include_storybook);
        assert_eq!(opts.package_version, DEFAULT_PACKAGE_VERSION);
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("Pages".parse::<RouterMode>().unwrap(), RouterMode::Pages);
        assert_eq!("webpack".parse::<Bundler>().unwrap(), Bundler::Webpack);
        assert_eq!("mui".parse::<UiLibrary>().unwrap(), UiLibrary::Mui);
        assert!("vite".parse::<Bundler>().is_err());
    }

    #[test]
    fn test_requests_run() {
        let opts = ExportOptions::ReactApp(
            RawReactAppOptions {
                run_after_export: Some(true),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        );
        assert!(opts.requests_run());
        assert_eq!(opts.variant(), Variant::ReactApp);
        assert_eq!(opts.project_name(), DEFAULT_REACT_APP_NAME);
    }
}
