//! Sign-in, sign-out and the current user.

use showroom_client::AppContext;
use showroom_core::UserProfile;
use tracing::info;

use super::signed_in;
use crate::error::CommandResult;

pub async fn login(ctx: &AppContext, username: &str, password: &str) -> CommandResult<Vec<String>> {
    let profile = ctx.api.login(username, password).await?;
    info!(user_id = profile.id, "Session stored");
    Ok(vec![
        format!("Signed in as {} ({})", profile.display_name(), profile.user_role),
        format!("Start at {}", profile.user_role.landing_route()),
    ])
}

pub async fn logout(ctx: &AppContext) -> CommandResult<Vec<String>> {
    ctx.api.logout().await;
    Ok(vec!["Signed out".to_string()])
}

pub async fn whoami(ctx: &AppContext) -> CommandResult<Vec<String>> {
    let profile = signed_in(ctx).await?;
    Ok(render_profile(&profile))
}

pub fn render_profile(profile: &UserProfile) -> Vec<String> {
    let permissions = profile.user_role.permissions();
    let navigation = profile
        .user_role
        .navigation()
        .iter()
        .map(|item| item.label())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        format!("{} <{}>", profile.display_name(), profile.email),
        format!("Role: {}", profile.user_role),
        format!("Navigation: {}", navigation),
        format!("Sales page size: {}", permissions.sales_page_limit),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_core::UserRole;

    fn profile(role: UserRole) -> UserProfile {
        UserProfile {
            id: 1,
            email: "asha@example.com".to_string(),
            username: "asha".to_string(),
            user_role: role,
            is_active: true,
            full_name: Some("Asha Rao".to_string()),
            phone_number: None,
        }
    }

    #[test]
    fn test_salesman_profile_hides_admin_navigation() {
        let lines = render_profile(&profile(UserRole::Salesman));
        assert_eq!(lines[0], "Asha Rao <asha@example.com>");
        assert_eq!(lines[1], "Role: SALESMAN");
        assert!(!lines[2].contains("Imports"));
        assert_eq!(lines[3], "Sales page size: 100");
    }

    #[test]
    fn test_admin_profile() {
        let lines = render_profile(&profile(UserRole::Admin));
        assert!(lines[2].contains("Imports"));
        assert_eq!(lines[3], "Sales page size: 200");
    }
}
