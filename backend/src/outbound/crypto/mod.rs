//! Argon2id password hashing adapter.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash as PhcString, PasswordHasher as _,
    PasswordVerifier as _, Version,
};

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// [`PasswordHasher`] producing Argon2id PHC strings.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Build a hasher with the given cost.
    ///
    /// # Errors
    /// Returns [`PasswordHasherError::Hashing`] when Argon2 rejects the
    /// parameters.
    ///
    /// # Examples
    /// ```
    /// use postnest::outbound::crypto::{Argon2PasswordHasher, HashCost};
    ///
    /// assert!(Argon2PasswordHasher::new(HashCost::default()).is_ok());
    /// ```
    pub fn new(cost: HashCost) -> Result<Self, PasswordHasherError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(digest.to_string()))
    }

    fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self
            .argon2
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hashing(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap cost is valid")
    }

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("password")
    }

    #[rstest]
    fn digest_verifies_only_its_password(hasher: Argon2PasswordHasher) {
        let digest = hasher.hash(&password("pw1")).expect("hash");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&password("pw1"), &digest).expect("verify"));
        assert!(!hasher.verify(&password("pw2"), &digest).expect("verify"));
    }

    #[rstest]
    fn hashing_is_salted(hasher: Argon2PasswordHasher) {
        let first = hasher.hash(&password("pw1")).expect("hash");
        let second = hasher.hash(&password("pw1")).expect("hash");

        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn malformed_digest_is_reported(hasher: Argon2PasswordHasher) {
        let error = hasher
            .verify(&password("pw1"), &PasswordHash::new("plaintext"))
            .expect_err("malformed");

        assert!(matches!(error, PasswordHasherError::MalformedHash { .. }));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let cost = HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };

        assert!(Argon2PasswordHasher::new(cost).is_err());
    }
}
