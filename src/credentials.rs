use std::path::PathBuf;

use serde::Deserialize;

#[cfg(target_os = "macos")]
const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

const CREDENTIALS_FILE: &str = ".credentials.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeCredentials {
    claude_ai_oauth: Option<OAuthCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthCredentials {
    access_token: Option<String>,
}

/// Look up the Claude Code OAuth access token.
///
/// Tries the macOS Keychain first, then the credentials file Claude Code
/// writes on other platforms. Failures are logged and collapse to `None`.
pub fn read_access_token() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        match read_keychain_secret().and_then(|secret| parse_credentials_json(&secret)) {
            Ok(token) => return Some(token),
            Err(e) => tracing::debug!(error = %e, "keychain lookup failed"),
        }
    }

    match read_credentials_file().and_then(|content| parse_credentials_json(&content)) {
        Ok(token) => Some(token),
        Err(e) => {
            tracing::debug!(error = %e, "credentials file lookup failed");
            None
        }
    }
}

#[cfg(target_os = "macos")]
fn read_keychain_secret() -> Result<String, String> {
    let output = std::process::Command::new("security")
        .args(["find-generic-password", "-s", KEYCHAIN_SERVICE, "-w"])
        .output()
        .map_err(|e| format!("failed to run security: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("keychain item not found: {}", stderr.trim()));
    }

    String::from_utf8(output.stdout).map_err(|e| format!("invalid UTF-8 in keychain data: {e}"))
}

fn read_credentials_file() -> Result<String, String> {
    let path = credentials_file_path().ok_or("could not determine home directory")?;
    std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))
}

/// `$CLAUDE_CONFIG_DIR/.credentials.json`, or `~/.claude/.credentials.json`.
fn credentials_file_path() -> Option<PathBuf> {
    let config_dir = match std::env::var_os("CLAUDE_CONFIG_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()?.join(".claude"),
    };
    Some(config_dir.join(CREDENTIALS_FILE))
}

fn parse_credentials_json(secret: &str) -> Result<String, String> {
    let creds: ClaudeCredentials = serde_json::from_str(secret.trim())
        .map_err(|e| format!("malformed credentials JSON: {e}"))?;

    creds
        .claude_ai_oauth
        .and_then(|oauth| oauth.access_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| "no claudeAiOauth.accessToken in credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials_json() {
        let json = r#"
            {"claudeAiOauth": {"accessToken": "sk-ant-oat01-abc", "refreshToken": "r", "expiresAt": 1}}
        "#;
        assert_eq!(parse_credentials_json(json).unwrap(), "sk-ant-oat01-abc");
    }

    #[test]
    fn test_parse_credentials_missing_field() {
        assert!(parse_credentials_json("{}").is_err());
        assert!(parse_credentials_json(r#"{"claudeAiOauth": {}}"#).is_err());
        assert!(parse_credentials_json(r#"{"claudeAiOauth": {"accessToken": ""}}"#).is_err());
    }

    #[test]
    fn test_parse_credentials_malformed() {
        let err = parse_credentials_json("not json").unwrap_err();
        assert!(err.contains("malformed"));
    }

    #[test]
    fn test_credentials_file_path() {
        let path = credentials_file_path().unwrap();
        assert!(path.ends_with(CREDENTIALS_FILE));
    }
}
