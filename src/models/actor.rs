use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

/// The verified "current user" of a request, threaded into every operation
/// as an explicit argument. Supplied by the upstream auth layer through the
/// `x-user-id` / `x-user-role` headers it injects after credential checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer { id: Uuid },
    Seller { id: Uuid },
    DeliveryPartner { id: Uuid },
    Admin { id: Uuid },
}

impl Actor {
    pub fn id(&self) -> Uuid {
        match *self {
            Actor::Customer { id }
            | Actor::Seller { id }
            | Actor::DeliveryPartner { id }
            | Actor::Admin { id } => id,
        }
    }

    pub fn as_customer(&self) -> Result<Uuid, AppError> {
        match *self {
            Actor::Customer { id } => Ok(id),
            _ => Err(AppError::Authorization(
                "customer role required".to_string(),
            )),
        }
    }

    pub fn as_seller(&self) -> Result<Uuid, AppError> {
        match *self {
            Actor::Seller { id } => Ok(id),
            _ => Err(AppError::Authorization("seller role required".to_string())),
        }
    }

    pub fn as_delivery_partner(&self) -> Result<Uuid, AppError> {
        match *self {
            Actor::DeliveryPartner { id } => Ok(id),
            _ => Err(AppError::Authorization(
                "delivery partner role required".to_string(),
            )),
        }
    }

    pub fn as_admin(&self) -> Result<Uuid, AppError> {
        match *self {
            Actor::Admin { id } => Ok(id),
            _ => Err(AppError::Authorization("admin role required".to_string())),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| -> Result<&str, AppError> {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| AppError::Authorization(format!("missing {name} header")))
        };

        let id = header("x-user-id")?
            .parse::<Uuid>()
            .map_err(|_| AppError::Authorization("invalid x-user-id header".to_string()))?;

        match header("x-user-role")? {
            "customer" => Ok(Actor::Customer { id }),
            "seller" => Ok(Actor::Seller { id }),
            "delivery_partner" => Ok(Actor::DeliveryPartner { id }),
            "admin" => Ok(Actor::Admin { id }),
            other => Err(AppError::Authorization(format!(
                "unknown role: {other}"
            ))),
        }
    }
}
