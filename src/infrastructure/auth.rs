use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::domain::auth::{AuthService, Claims};
use crate::domain::users::{User, UserAccess};

/// JWT signer/verifier using HS256 with a shared secret.
pub struct JwtAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: i64,
}

impl JwtAuthService {
    pub fn new(secret: &str, access_token_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_ttl,
        }
    }
}

impl AuthService for JwtAuthService {
    fn generate_access_token(&self, user: &User, access: &UserAccess) -> Result<String> {
        let claims = Claims::new(user, access, self.access_token_ttl);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("failed to sign access token: {}", e))
    }

    fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| anyhow::anyhow!("invalid token: {}", e))?;

        Ok(token_data.claims)
    }
}
