use crate::error::{other_error, Error, PrepResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Claims carried by the OAuth `state` parameter
#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    /// Random nonce so every login gets a distinct state
    nonce: String,
    /// Expiration time (as UTC timestamp)
    exp: usize,
    /// Issued at (as UTC timestamp)
    iat: usize,
}

/// Issues and checks signed, short-lived OAuth state values.
///
/// The state is a JWT, so no server-side session is needed to tie the
/// callback back to a login we started.
#[derive(Clone)]
pub struct StateSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl StateSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(10),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Create a new state value
    pub fn issue(&self) -> PrepResult<String> {
        let now = Utc::now();
        let claims = StateClaims {
            nonce: uuid::Uuid::new_v4().to_string(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| other_error(&format!("Failed to sign OAuth state: {}", e)))
    }

    /// Check that a state value was issued by us and has not expired
    pub fn verify(&self, state: &str) -> PrepResult<()> {
        decode::<StateClaims>(state, &self.decoding, &Validation::default())
            .map(|_| ())
            .map_err(|e| {
                warn!("Rejected OAuth state: {:?}", e);
                Error::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_verifies() {
        let signer = StateSigner::new("secret");
        let state = signer.issue().unwrap();
        assert!(signer.verify(&state).is_ok());
    }

    #[test]
    fn states_are_unique() {
        let signer = StateSigner::new("secret");
        assert_ne!(signer.issue().unwrap(), signer.issue().unwrap());
    }

    #[test]
    fn state_from_another_secret_is_rejected() {
        let state = StateSigner::new("one").issue().unwrap();
        assert!(matches!(
            StateSigner::new("two").verify(&state),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn expired_or_garbage_state_is_rejected() {
        let signer = StateSigner::new("secret").with_ttl(Duration::minutes(-10));
        let state = signer.issue().unwrap();
        assert!(signer.verify(&state).is_err());
        assert!(signer.verify("not-a-jwt").is_err());
    }
}
