//! Closed role vocabularies.
//!
//! Every role-ish value in the system is a closed enum rather than an opaque
//! string: serde rejects anything outside the vocabulary at the data layer,
//! and dispatch over roles is a `match` the compiler checks for exhaustiveness.

use serde::{Deserialize, Serialize};

macro_rules! impl_str_enum {
    ($t:ty, $name:literal, { $( $variant:ident => $s:literal ),+ $(,)? }) => {
        impl $t {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $s, )+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $t {
            type Err = salespoint_core::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $s => Ok(Self::$variant), )+
                    other => Err(salespoint_core::DomainError::validation(format!(
                        "invalid {}: '{}'", $name, other
                    ))),
                }
            }
        }
    };
}

pub(crate) use impl_str_enum;

/// Role claim carried in a bearer token.
///
/// This is the dispatch key of the authentication gate: it selects which
/// credential store resolves the principal and which extra checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenRole {
    User,
    Vendor,
    Client,
    Employee,
    Admin,
}

impl_str_enum!(TokenRole, "token role", {
    User => "user",
    Vendor => "vendor",
    Client => "client",
    Employee => "employee",
    Admin => "admin",
});

/// Role of an end-user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Vendor,
}

impl_str_enum!(UserRole, "user role", {
    User => "user",
    Vendor => "vendor",
});

impl UserRole {
    /// The token role a user account authenticates as.
    pub fn token_role(self) -> TokenRole {
        match self {
            UserRole::User => TokenRole::User,
            UserRole::Vendor => TokenRole::Vendor,
        }
    }
}

/// Employee role tier. Determines the default permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    #[default]
    Employee,
    Supervisor,
    Manager,
    Admin,
}

impl_str_enum!(EmployeeRole, "employee role", {
    Employee => "employee",
    Supervisor => "supervisor",
    Manager => "manager",
    Admin => "admin",
});

/// Admin capability tier (permission breadth).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Manager,
    #[default]
    Admin,
    SuperAdmin,
}

impl_str_enum!(AdminLevel, "admin level", {
    Manager => "manager",
    Admin => "admin",
    SuperAdmin => "super_admin",
});

/// Admin UI/module reach. Orthogonal to [`AdminLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    ReadOnly,
    #[default]
    LimitedAccess,
    FullAccess,
}

impl_str_enum!(AccessLevel, "access level", {
    ReadOnly => "read_only",
    LimitedAccess => "limited_access",
    FullAccess => "full_access",
});

/// Client subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Basic,
    Premium,
    Enterprise,
}

impl_str_enum!(SubscriptionPlan, "subscription plan", {
    Basic => "basic",
    Premium => "premium",
    Enterprise => "enterprise",
});

/// Client subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Cancelled,
}

impl_str_enum!(SubscriptionStatus, "subscription status", {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
    Cancelled => "cancelled",
});

/// Feature flag attached to a client subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionFeature {
    BasicFeatures,
    AdvancedAnalytics,
    CustomBranding,
    PrioritySupport,
    ApiAccess,
}

impl_str_enum!(SubscriptionFeature, "subscription feature", {
    BasicFeatures => "basic_features",
    AdvancedAnalytics => "advanced_analytics",
    CustomBranding => "custom_branding",
    PrioritySupport => "priority_support",
    ApiAccess => "api_access",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        assert_eq!(TokenRole::Vendor.as_str(), "vendor");
        assert_eq!("super_admin".parse::<AdminLevel>().unwrap(), AdminLevel::SuperAdmin);
        assert_eq!("read_only".parse::<AccessLevel>().unwrap(), AccessLevel::ReadOnly);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("root".parse::<TokenRole>().is_err());
        assert!("owner".parse::<EmployeeRole>().is_err());
        assert!(serde_json::from_str::<AdminLevel>("\"god_mode\"").is_err());
    }
}
