//! The single administrator credential pair.

/// Configured admin username and password.
///
/// `password` is `None` when no password was configured; login is then
/// refused for everyone.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: Option<String>,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// Check a login attempt. Both fields are always compared so the timing
    /// does not reveal which one was wrong.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(expected) = &self.password else {
            return false;
        };
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(expected.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // Length is not secret; content is.
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_exact_pair() {
        let creds = AdminCredentials::new("admin", Some("s3cret".to_string()));
        assert!(creds.verify("admin", "s3cret"));
        assert!(!creds.verify("admin", "s3cret "));
        assert!(!creds.verify("Admin", "s3cret"));
        assert!(!creds.verify("admin", ""));
    }

    #[test]
    fn missing_password_disables_login() {
        let creds = AdminCredentials::new("admin", None);
        assert!(!creds.is_enabled());
        assert!(!creds.verify("admin", ""));

        let empty = AdminCredentials::new("admin", Some(String::new()));
        assert!(!empty.is_enabled());
    }

    #[test]
    fn debug_redacts_password() {
        let creds = AdminCredentials::new("admin", Some("s3cret".to_string()));
        let shown = format!("{creds:?}");
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("<redacted>"));
    }
}
