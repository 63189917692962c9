use crate::error::{FleetError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "devfleet.yaml";

pub const COMPOSE_DEFAULT: &str = "docker-compose.yml";
pub const COMPOSE_DEVELOP: &str = "docker-compose-develop.yml";
pub const COMPOSE_STAGE: &str = "docker-compose-stage.yml";
pub const COMPOSE_PRODUCTION: &str = "docker-compose-production.yml";

pub const COMPOSE_TEMPLATE: &str = "templates/docker-compose-template.yml";
pub const DOCKERFILE_TEMPLATE: &str = "templates/template.Dockerfile";

pub const REPOS_DIR: &str = "repos";

pub const EXAMPLE_ENV_FILE: &str = "example.env";
pub const ENV_FILE: &str = ".env";
pub const DOCKERFILE: &str = "Dockerfile";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static REPO_URL_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

fn repo_url_re() -> &'static Regex {
    // Matches the remote forms git accepts for hosted repositories:
    // http(s)/git/ssh URLs and scp-like git@host:path, ending in .git.
    REPO_URL_RE.get_or_init(|| {
        Regex::new(r"^(?:(?:https?|git|ssh)://[^\s/]+/\S+?|git@[\w.\-]+:\S+?)\.git(?:#[\w.\-/]+)?$")
            .unwrap()
    })
}

/// Service names are dash-case: lowercase alphanumeric with interior hyphens.
pub fn validate_service_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 || !name_re().is_match(name) {
        return Err(FleetError::InvalidServiceName(name.to_string()));
    }
    Ok(())
}

pub fn validate_repo_url(url: &str) -> Result<()> {
    if !repo_url_re().is_match(url) {
        return Err(FleetError::InvalidRepoUrl(url.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_service_names() {
        for name in ["auth-service", "a", "api-gateway-2", "x1"] {
            validate_service_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_service_names() {
        for name in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_service_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn valid_repo_urls() {
        for url in [
            "https://github.com/acme/auth-service.git",
            "http://git.internal/acme/api.git",
            "git://github.com/acme/api.git",
            "ssh://git.internal/acme/api.git",
            "git@github.com:acme/auth-service.git",
            "https://github.com/acme/auth-service.git#develop",
        ] {
            validate_repo_url(url).unwrap_or_else(|_| panic!("expected valid: {url}"));
        }
    }

    #[test]
    fn invalid_repo_urls() {
        for url in [
            "",
            "github.com/acme/auth-service",
            "https://github.com/acme/auth-service",
            "ftp://github.com/acme/auth-service.git",
            "not a url",
        ] {
            assert!(validate_repo_url(url).is_err(), "expected invalid: {url}");
        }
    }

    #[test]
    fn config_path_joins_root() {
        let root = Path::new("/tmp/proj");
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/devfleet.yaml"));
    }
}
