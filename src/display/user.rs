//! User display formatting

use crate::models::User;

pub fn format_user_list(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }

    let name_width = users
        .iter()
        .map(|u| u.username.len())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<8}  {:<name_width$}  {:<5}  {}\n",
        "ID",
        "Username",
        "Role",
        "Name",
        name_width = name_width
    ));
    output.push_str(&format!(
        "{:-<8}  {:-<name_width$}  {:-<5}  {:-<20}\n",
        "",
        "",
        "",
        "",
        name_width = name_width
    ));
    for user in users {
        output.push_str(&format!(
            "{:<8}  {:<name_width$}  {:<5}  {}\n",
            user.id.to_string(),
            user.username,
            user.role.to_string(),
            user.display_name(),
            name_width = name_width
        ));
    }
    output
}

/// Never includes credentials
pub fn format_user_details(user: &User) -> String {
    let mut output = String::new();
    output.push_str(&format!("User: {}\n", user.username));
    output.push_str(&format!("  ID:       {}\n", user.id));
    output.push_str(&format!("  Name:     {}\n", user.display_name()));
    output.push_str(&format!(
        "  Email:    {}\n",
        user.email.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("  Role:     {}\n", user.role));
    if user.is_temp {
        output.push_str("  Password: temporary (must be changed)\n");
    }
    output.push_str(&format!(
        "  Created:  {}\n",
        user.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output
}
