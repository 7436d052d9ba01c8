//! Credential Verification
//!
//! Holds the set of login-capable principals and verifies submitted
//! credentials against them. Passwords are bcrypt-hashed at registration;
//! plaintext never outlives the verification call.
//!
//! The directory is a plain injected value. Handlers receive it through
//! application state, so tests can construct one with whatever principals
//! (and bcrypt cost) they need.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::crypto::constant_time_str_eq;

/// An authenticated subject: who logged in and what they may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: String,
}

/// One registered account.
struct Account {
    username: String,
    password_hash: String,
    role: String,
}

/// In-memory credential store with bcrypt password verification.
pub struct CredentialDirectory {
    accounts: Vec<Account>,
    cost: u32,
    /// Hash verified for unknown usernames so lookup misses cost the same
    /// as password mismatches.
    decoy_hash: String,
}

impl CredentialDirectory {
    /// Create an empty directory using the default bcrypt cost.
    pub fn new() -> Result<Self, bcrypt::BcryptError> {
        Self::with_cost(DEFAULT_COST)
    }

    /// Create an empty directory with an explicit bcrypt cost.
    ///
    /// Tests use a low cost to keep hashing fast; production callers should
    /// stay at [`DEFAULT_COST`].
    pub fn with_cost(cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let decoy_hash = hash("decoy-credential-padding", cost)?;
        Ok(Self {
            accounts: Vec::new(),
            cost,
            decoy_hash,
        })
    }

    /// Register an account, hashing the password immediately.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<(), bcrypt::BcryptError> {
        let password_hash = hash(password, self.cost)?;
        self.accounts.push(Account {
            username: username.to_string(),
            password_hash,
            role: role.to_string(),
        });
        Ok(())
    }

    /// Verify a username/password pair.
    ///
    /// Returns the matching [`Principal`] or `None`. Unknown usernames and
    /// wrong passwords are indistinguishable to the caller, and both paths
    /// perform one bcrypt verification.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Option<Principal> {
        let mut matched: Option<&Account> = None;
        for account in &self.accounts {
            if constant_time_str_eq(&account.username, username) {
                matched = Some(account);
            }
        }

        match matched {
            Some(account) => {
                let ok = verify(password, &account.password_hash).unwrap_or(false);
                if ok {
                    Some(Principal {
                        username: account.username.clone(),
                        role: account.role.clone(),
                    })
                } else {
                    None
                }
            }
            None => {
                // Burn the same work as a real verification.
                let _ = verify(password, &self.decoy_hash);
                None
            }
        }
    }

    /// Look up a principal by username without checking a password.
    ///
    /// Used when re-establishing identity from a validated token subject.
    pub fn find(&self, username: &str) -> Option<Principal> {
        self.accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| Principal {
                username: a.username.clone(),
                role: a.role.clone(),
            })
    }
}
