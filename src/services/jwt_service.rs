use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::StaffRole;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,     // Subject (staff_id)
    pub username: String,
    pub role: StaffRole,
    pub tenant: String,  // Routing key for the tenant database
    pub exp: i64,        // Expiration time
    pub iat: i64,        // Issued at
    pub iss: String,     // Issuer
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            issuer: "coopcredit".to_string(),
        }
    }

    pub fn generate_token(
        &self,
        staff_id: i64,
        username: &str,
        role: StaffRole,
        tenant: &str,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(8); // Back-office shift length

        let claims = Claims {
            sub: staff_id.to_string(),
            username: username.to_string(),
            role,
            tenant: tenant.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to encode JWT: {}", e))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| anyhow!("Failed to decode JWT: {}", e))?;

        Ok(token_data.claims)
    }

    pub fn refresh_token(&self, token: &str) -> Result<String> {
        let claims = self.verify_token(token)?;

        // Same claims, fresh expiration
        self.generate_token(
            claims.sub.parse()?,
            &claims.username,
            claims.role,
            &claims.tenant,
        )
    }

}
