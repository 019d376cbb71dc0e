use std::fmt;

/// Admission control for self-provisioned accounts.
///
/// Both predicates are pure and total. The count check is advisory: it is
/// evaluated against a count read before account creation, so concurrent
/// sign-ups near the limit can admit more than `max_accounts`.
#[derive(Clone)]
pub struct SignUpGate {
    code: String,
    max_accounts: u64,
}

impl SignUpGate {
    pub fn new(code: impl Into<String>, max_accounts: u64) -> Self {
        Self {
            code: code.into(),
            max_accounts,
        }
    }

    /// True iff `current_count` is below the configured maximum.
    pub fn can_sign_up(&self, current_count: u64) -> bool {
        current_count < self.max_accounts
    }

    /// True iff `code` matches the configured sign-up code exactly.
    pub fn is_valid_code(&self, code: &str) -> bool {
        code == self.code
    }

    pub fn max_accounts(&self) -> u64 {
        self.max_accounts
    }
}

// The code is a shared secret; keep it out of logs.
impl fmt::Debug for SignUpGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpGate")
            .field("code", &"<redacted>")
            .field("max_accounts", &self.max_accounts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn limit_is_exclusive() {
        let gate = SignUpGate::new("letmein", 10);
        assert!(gate.can_sign_up(5));
        assert!(gate.can_sign_up(9));
        assert!(!gate.can_sign_up(10));
        assert!(!gate.can_sign_up(11));
    }

    #[test]
    fn zero_limit_admits_nobody() {
        let gate = SignUpGate::new("letmein", 0);
        assert!(!gate.can_sign_up(0));
    }

    #[test]
    fn code_must_match_exactly() {
        let gate = SignUpGate::new("letmein", 10);
        assert!(gate.is_valid_code("letmein"));
        assert!(!gate.is_valid_code("LETMEIN"));
        assert!(!gate.is_valid_code(" letmein"));
        assert!(!gate.is_valid_code(""));
    }

    #[test]
    fn debug_hides_code() {
        let gate = SignUpGate::new("letmein", 3);
        let rendered = format!("{gate:?}");
        assert!(!rendered.contains("letmein"));
        assert!(rendered.contains("max_accounts: 3"));
    }

    proptest! {
        #[test]
        fn admits_iff_below_max(count in 0u64..1_000, max in 0u64..1_000) {
            let gate = SignUpGate::new("code", max);
            prop_assert_eq!(gate.can_sign_up(count), count < max);
        }

        #[test]
        fn only_the_configured_code_is_valid(configured in "[a-z0-9]{4,12}", submitted in "[a-z0-9]{4,12}") {
            let gate = SignUpGate::new(configured.clone(), 1);
            prop_assert_eq!(gate.is_valid_code(&submitted), submitted == configured);
        }
    }
}
