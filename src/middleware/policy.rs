//! Route authorization decisions.
//!
//! Pure functions over the resolved identity, so every rule can be checked
//! without a request or a database.

use uuid::Uuid;

use crate::models::Role;

pub const ACCOUNT_NOT_APPROVED: &str = "account not approved";

/// Who is making the request, as read from the user row behind the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
}

/// What a route needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub role: Option<Role>,
    pub approved: bool,
}

impl Requirement {
    /// Any signed-in, approved account.
    pub const AUTHENTICATED: Requirement = Requirement {
        role: None,
        approved: true,
    };

    pub const fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            approved: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyRedirect(String),
    DenyUnauthorized(&'static str),
}

pub fn role_home(role: Role) -> &'static str {
    match role {
        Role::Customer => "/",
        Role::Seller => "/seller",
        Role::Admin => "/admin",
    }
}

pub fn login_redirect(path: &str) -> String {
    format!("/login?redirectTo={path}")
}

pub fn authorize(identity: Option<&Identity>, requirement: Requirement, path: &str) -> Decision {
    let Some(identity) = identity else {
        return Decision::DenyRedirect(login_redirect(path));
    };

    if let Some(required) = requirement.role {
        if identity.role != required {
            return Decision::DenyRedirect(role_home(identity.role).to_string());
        }
    }

    if requirement.approved && !identity.approved {
        return Decision::DenyUnauthorized(ACCOUNT_NOT_APPROVED);
    }

    Decision::Allow
}

/// Login and registration are only for visitors without a session.
pub fn guest_only(identity: Option<&Identity>) -> Decision {
    match identity {
        Some(identity) => Decision::DenyRedirect(role_home(identity.role).to_string()),
        None => Decision::Allow,
    }
}

/// Accept only local absolute paths as post-login destinations.
pub fn safe_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, approved: bool) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@campus.edu".into(),
            role,
            approved,
        }
    }

    #[test]
    fn anonymous_requests_go_to_login_with_return_path() {
        assert_eq!(
            authorize(None, Requirement::role(Role::Seller), "/seller/orders"),
            Decision::DenyRedirect("/login?redirectTo=/seller/orders".into())
        );
        assert_eq!(
            authorize(None, Requirement::AUTHENTICATED, "/api/me"),
            Decision::DenyRedirect("/login?redirectTo=/api/me".into())
        );
    }

    #[test]
    fn wrong_role_goes_to_own_home() {
        let customer = identity(Role::Customer, true);
        assert_eq!(
            authorize(Some(&customer), Requirement::role(Role::Admin), "/admin/products"),
            Decision::DenyRedirect("/".into())
        );

        let seller = identity(Role::Seller, true);
        assert_eq!(
            authorize(Some(&seller), Requirement::role(Role::Admin), "/admin/sellers"),
            Decision::DenyRedirect("/seller".into())
        );

        let admin = identity(Role::Admin, true);
        assert_eq!(
            authorize(Some(&admin), Requirement::role(Role::Seller), "/seller/orders"),
            Decision::DenyRedirect("/admin".into())
        );
    }

    #[test]
    fn unapproved_seller_is_denied_not_redirected() {
        let seller = identity(Role::Seller, false);
        assert_eq!(
            authorize(Some(&seller), Requirement::role(Role::Seller), "/seller/orders"),
            Decision::DenyUnauthorized(ACCOUNT_NOT_APPROVED)
        );
        // Role mismatch is checked before approval.
        assert_eq!(
            authorize(Some(&seller), Requirement::role(Role::Admin), "/admin"),
            Decision::DenyRedirect("/seller".into())
        );
    }

    #[test]
    fn matching_approved_role_is_allowed() {
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            let user = identity(role, true);
            assert_eq!(
                authorize(Some(&user), Requirement::role(role), "/x"),
                Decision::Allow
            );
            assert_eq!(
                authorize(Some(&user), Requirement::AUTHENTICATED, "/x"),
                Decision::Allow
            );
        }
    }

    #[test]
    fn signed_in_users_never_see_auth_pages() {
        assert_eq!(guest_only(None), Decision::Allow);
        for role in [Role::Customer, Role::Seller, Role::Admin] {
            assert_eq!(
                guest_only(Some(&identity(role, false))),
                Decision::DenyRedirect(role_home(role).into())
            );
        }
    }

    #[test]
    fn redirect_targets_stay_local() {
        assert_eq!(safe_redirect(Some("/seller/orders")), "/seller/orders");
        assert_eq!(safe_redirect(None), "/");
        assert_eq!(safe_redirect(Some("")), "/");
        assert_eq!(safe_redirect(Some("https://evil.example")), "/");
        assert_eq!(safe_redirect(Some("//evil.example")), "/");
    }
}
