//! Caller identity.
//!
//! Every mutating operation takes an [`AuthContext`] argument. Nothing is read
//! from ambient request state: whoever builds the context (the HTTP layer, a test,
//! a seeding script) decides who the caller is.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ServiceError, ServiceResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Kitchen,
    Inventory,
    Server,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Kitchen => "kitchen",
            Self::Inventory => "inventory",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(Self::Manager),
            "kitchen" => Ok(Self::Kitchen),
            "inventory" => Ok(Self::Inventory),
            "server" => Ok(Self::Server),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Actions that need more than anonymous read access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    WriteRecipes,
    WriteIngredients,
}

impl Action {
    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Self::WriteRecipes => &[Role::Manager],
            Self::WriteIngredients => &[Role::Manager, Role::Inventory],
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::WriteRecipes => "modify recipes",
            Self::WriteIngredients => "modify ingredients",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i32,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can(&self, action: Action) -> bool {
        action.allowed_roles().contains(&self.role)
    }

    /// Fails with [`ServiceError::Forbidden`] unless the caller's role allows `action`.
    pub fn authorize(&self, action: Action) -> ServiceResult<()> {
        if self.can(action) {
            Ok(())
        } else {
            warn!(
                user_id = self.user_id,
                role = self.role.as_str(),
                ?action,
                "access denied"
            );
            Err(ServiceError::Forbidden {
                role: self.role,
                action: action.describe(),
            })
        }
    }
}
