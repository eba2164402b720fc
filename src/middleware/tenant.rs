//! Extracción del contexto de tenant
//!
//! Cada petición a `/api` lleva un `Authorization: Bearer <JWT>` firmado con el
//! secreto configurado. El tenant se pasa explícitamente a todos los repositorios.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::TenantContext;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub tenant_id: Uuid,
    pub exp: usize,
}

/// Valida el token y construye el contexto de tenant
pub fn decode_tenant_token(token: &str, secret: &str) -> Result<TenantContext, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Token invalide: {}", e)))?;

    let claims = token_data.claims;
    Ok(match Uuid::parse_str(&claims.sub) {
        Ok(user_id) => TenantContext::with_user(claims.tenant_id, user_id),
        Err(_) => TenantContext::new(claims.tenant_id),
    })
}

/// Emite un token de tenant válido durante `ttl_seconds`
pub fn encode_tenant_token(
    tenant: &TenantContext,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: tenant.user_id.map(|id| id.to_string()).unwrap_or_default(),
        tenant_id: tenant.tenant_id,
        exp: (chrono::Utc::now().timestamp() + ttl_seconds).max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))
}

#[async_trait]
impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Token d'autorisation requis".to_string()))?;

        decode_tenant_token(token, &state.config.jwt_secret)
    }
}
