//! Version and package-name checks for user supplied options

use crate::error::OptionsError;
use semver::Version;

/// Longest name the npm registry accepts
const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Parse version string, allowing a leading 'v'
pub fn parse_version(version_str: &str) -> Result<Version, semver::Error> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned)
}

/// Validate a version option and return it in canonical form (no 'v')
pub fn validate_version(field: &'static str, version_str: &str) -> Result<String, OptionsError> {
    parse_version(version_str)
        .map(|v| v.to_string())
        .map_err(|e| OptionsError::InvalidVersion {
            field,
            version: version_str.to_string(),
            reason: e.to_string(),
        })
}

/// Check a package name against the npm naming rules
pub fn validate_package_name(name: &str) -> Result<(), OptionsError> {
    let invalid = |reason| OptionsError::InvalidPackageName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(invalid("name is longer than 214 characters"));
    }
    if name.starts_with('.') || name.starts_with('_') {
        return Err(invalid("name cannot start with '.' or '_'"));
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("name must be lower-case"));
    }

    let bare = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) if !scope.is_empty() && !pkg.is_empty() => {
                if !is_url_safe(scope) {
                    return Err(invalid("scope contains characters that are not URL-safe"));
                }
                pkg
            }
            _ => return Err(invalid("scoped names must look like @scope/name")),
        },
        None => name,
    };

    if !is_url_safe(bare) {
        return Err(invalid("name contains characters that are not URL-safe"));
    }

    Ok(())
}

fn is_url_safe(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_' | '~'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_version_strips_prefix() {
        assert_eq!(validate_version("package_version", "v1.2.3").unwrap(), "1.2.3");
        assert_eq!(validate_version("package_version", "0.1.0").unwrap(), "0.1.0");
    }

    #[test]
    fn test_invalid_versions() {
        let err = validate_version("framework_version", "latest").unwrap_err();
        assert!(matches!(
            err,
            OptionsError::InvalidVersion { field: "framework_version", .. }
        ));
        assert!(validate_version("package_version", "1.2").is_err());
    }

    #[test]
    fn test_package_names() {
        assert!(validate_package_name("my-ui-kit").is_ok());
        assert!(validate_package_name("@acme/ui").is_ok());
        assert!(validate_package_name("").is_err());
        assert!(validate_package_name("My-Kit").is_err());
        assert!(validate_package_name("my kit").is_err());
        assert!(validate_package_name("_private").is_err());
        assert!(validate_package_name("@acme").is_err());
        assert!(validate_package_name("@/ui").is_err());
    }
}
