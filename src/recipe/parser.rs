// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::recipe::format::{DependencyPhase, Recipe};
use std::path::Path;
use url::Url;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Hard problems are returned as errors; soft ones come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    check_layout(recipe)?;

    if recipe.source.archive.is_none() && recipe.source.head.is_none() {
        return Err(Error::UnresolvableSource(
            "Recipe declares neither a versioned archive nor a head".to_string(),
        ));
    }

    if let Some(url) = recipe.archive_url() {
        check_url(&url, "archive")?;

        let raw = recipe.source.checksum.as_deref().unwrap_or_default();
        Hash::parse_prefixed(raw).map_err(|e| Error::InvalidChecksum {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    } else if recipe.source.checksum.is_some() {
        warnings.push("Checksum declared without an archive; it will never be used".to_string());
    }

    if let Some(head) = &recipe.source.head {
        if head.repository.is_empty() {
            return Err(Error::ParseError("Head repository cannot be empty".to_string()));
        }
        warnings.push("Head builds are not integrity-checked".to_string());
    }

    // The backend program must come from a declared build dependency
    let program = recipe.build.backend.program();
    let build_deps = recipe.dependencies_for(DependencyPhase::Build);
    if !build_deps.iter().any(|d| d.provides(program)) {
        warnings.push(format!(
            "No build dependency provides `{}`; it will be looked up directly",
            program
        ));
    }

    if recipe.package.description.is_empty() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if let Some(homepage) = &recipe.package.homepage
        && Url::parse(homepage).is_err()
    {
        warnings.push(format!("Homepage is not a valid URL: {}", homepage));
    }

    if recipe.expected_help().is_empty() {
        warnings.push("Help check has no expected text and will match anything".to_string());
    }
    Ok(warnings)
}

/// Check the fields that name paths the Kitchen writes to or executes
///
/// Runs before every install and test, independent of which source is
/// selected.
pub fn check_layout(recipe: &Recipe) -> Result<()> {
    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ParseError("Recipe package version cannot be empty".to_string()));
    }
    if !is_plain_file_name(recipe.binary_name()) {
        return Err(Error::ParseError(format!(
            "Invalid binary name: {:?}",
            recipe.binary_name()
        )));
    }
    if !is_plain_file_name(&recipe.test.render.fixture) {
        return Err(Error::ParseError(format!(
            "Render fixture must be a plain file name: {}",
            recipe.test.render.fixture
        )));
    }
    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

fn check_url(raw: &str, what: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| Error::ParseError(format!("Invalid {} URL {}: {}", what, raw, e)))?;

    match url.scheme() {
        "http" | "https" | "file" => Ok(()),
        other => Err(Error::ParseError(format!(
            "Unsupported {} URL scheme {:?} (expected http, https or file)",
            what, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f";

    #[test]
    fn test_parse_valid_recipe() {
        let content = format!(
            r#"
[package]
name = "test"
version = "1.0"

[source]
archive = "https://example.com/test-1.0.tar.gz"
checksum = "sha256:{}"
"#,
            DIGEST
        );

        let recipe = parse_recipe(&content).unwrap();
        assert_eq!(recipe.package.name, "test");
    }

    #[test]
    fn test_parse_invalid_recipe() {
        let content = "this is not valid toml at all {}";
        assert!(matches!(parse_recipe(content), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_validate_empty_name() {
        let content = format!(
            r#"
[package]
name = ""
version = "1.0"

[source]
archive = "https://example.com/test.tar.gz"
checksum = "{}"
"#,
            DIGEST
        );

        let recipe = parse_recipe(&content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_placeholder_checksum() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
archive = "https://example.com/test.tar.gz"
checksum = "REPLACE_WITH_ACTUAL_SHA256"
"#;

        let recipe = parse_recipe(content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(matches!(err, Error::InvalidChecksum { .. }));
    }

    #[test]
    fn test_validate_no_source() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source]
"#;
        let recipe = parse_recipe(content).unwrap();
        let err = validate_recipe(&recipe).unwrap_err();
        assert!(matches!(err, Error::UnresolvableSource(_)));
    }

    #[test]
    fn test_validate_bad_scheme() {
        let content = format!(
            r#"
[package]
name = "test"
version = "1.0"

[source]
archive = "ftp://example.com/test.tar.gz"
checksum = "{}"
"#,
            DIGEST
        );
        let recipe = parse_recipe(&content).unwrap();
        assert!(matches!(validate_recipe(&recipe), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_validate_warnings() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source.head]
repository = "https://example.com/test.git"
"#;

        let recipe = parse_recipe(content).unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("description")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("integrity")));
        assert!(warnings.iter().any(|w| w.contains("`cargo`")));
    }

    #[test]
    fn test_validate_fixture_name() {
        let content = r#"
[package]
name = "test"
version = "1.0"

[source.head]
repository = "https://example.com/test.git"

[test.render]
fixture = "../escape.md"
"#;
        let recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
        assert!(check_layout(&recipe).is_err());
    }

    #[test]
    fn test_check_layout_ignores_checksum() {
        let content = r#"
[package]
name = "lala"
version = "0.1.0"

[source]
archive = "https://example.com/lala-%(version)s.tar.gz"
checksum = "REPLACE_WITH_ACTUAL_SHA256"

[source.head]
repository = "https://example.com/lala.git"
"#;
        let mut recipe = parse_recipe(content).unwrap();
        assert!(validate_recipe(&recipe).is_err());
        assert!(check_layout(&recipe).is_ok());

        for binary in ["", "..", "bin/lala"] {
            recipe.package.binary = Some(binary.to_string());
            assert!(matches!(check_layout(&recipe), Err(Error::ParseError(_))));
        }
    }
}
