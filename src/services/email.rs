// src/services/email.rs
//! HTML bodies for account emails

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #E11D48; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #E11D48; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{}</h1>
        </div>
        <div class="content">
            {}
        </div>
        <div class="footer">
            <p>AndAction &middot; This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        heading, body
    )
}

pub fn verification_email(name: Option<&str>, link: &str) -> String {
    layout(
        "Verify your email",
        &format!(
            r#"<p>Hi {},</p>
            <p>Welcome to AndAction! Confirm your email address to finish setting up your account.</p>
            <p><a class="button" href="{}">Verify email</a></p>
            <p>This link expires in 24 hours.</p>"#,
            name.unwrap_or("there"),
            link
        ),
    )
}

pub fn password_reset_email(name: Option<&str>, link: &str) -> String {
    layout(
        "Reset your password",
        &format!(
            r#"<p>Hi {},</p>
            <p>We received a request to reset your AndAction password.</p>
            <p><a class="button" href="{}">Choose a new password</a></p>
            <p>This link expires in 1 hour. If you did not ask for a reset you can ignore this email.</p>"#,
            name.unwrap_or("there"),
            link
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_embed_link_and_name() {
        let html = verification_email(Some("Asha"), "https://andaction.in/verify?token=abc");
        assert!(html.contains("Hi Asha"));
        assert!(html.contains("https://andaction.in/verify?token=abc"));

        let html = password_reset_email(None, "https://andaction.in/reset?token=xyz");
        assert!(html.contains("Hi there"));
        assert!(html.contains("1 hour"));
    }
}
