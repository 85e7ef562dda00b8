//! Post-purchase email templates.

use ona_shared::OutgoingEmail;

use super::types::{License, User};

/// Email for a customer whose account was created by this purchase.
#[must_use]
pub fn welcome_email(user: &User, license: &License, magic_link: &str) -> OutgoingEmail {
    let name = escape_html(&user.name);
    let tier = license.tier.display_name();
    let key = escape_html(&license.license_key);
    let link = escape_html(magic_link);

    let html_content = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; color: #111827;">
  <h1>Welcome to Ona UI, {name}!</h1>
  <p>Thanks for purchasing an <strong>Ona UI {tier}</strong> lifetime license. Your account is ready.</p>
  <p>Your license key:</p>
  <p style="font-family: monospace; font-size: 18px; background: #f3f4f6; padding: 12px;">{key}</p>
  <p><a href="{link}" style="display: inline-block; background: #111827; color: #ffffff; padding: 12px 20px; text-decoration: none; border-radius: 6px;">Sign in to Ona UI</a></p>
  <p style="color: #6b7280; font-size: 13px;">This sign-in link can be used once. If it expires, request a new one from the sign-in page.</p>
</body>
</html>"#
    );

    let text_content = format!(
        "Welcome to Ona UI, {name}!\n\n\
         Thanks for purchasing an Ona UI {tier} lifetime license. Your account is ready.\n\n\
         License key: {key}\n\n\
         Sign in: {magic_link}\n\n\
         This sign-in link can be used once. If it expires, request a new one from the sign-in page.\n",
        name = user.name,
        key = license.license_key,
    );

    OutgoingEmail {
        to: user.email.clone(),
        to_name: Some(user.name.clone()),
        subject: format!("Welcome to Ona UI {tier}"),
        html_content,
        text_content,
    }
}

/// Email for an existing customer who bought another license.
#[must_use]
pub fn purchase_confirmation_email(
    user: &User,
    license: &License,
    magic_link: &str,
) -> OutgoingEmail {
    let name = escape_html(&user.name);
    let tier = license.tier.display_name();
    let key = escape_html(&license.license_key);
    let link = escape_html(magic_link);

    let html_content = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; color: #111827;">
  <h1>Thanks for your purchase, {name}!</h1>
  <p>Your <strong>Ona UI {tier}</strong> lifetime license has been added to your account.</p>
  <p>License key:</p>
  <p style="font-family: monospace; font-size: 18px; background: #f3f4f6; padding: 12px;">{key}</p>
  <p><a href="{link}" style="display: inline-block; background: #111827; color: #ffffff; padding: 12px 20px; text-decoration: none; border-radius: 6px;">Open Ona UI</a></p>
</body>
</html>"#
    );

    let text_content = format!(
        "Thanks for your purchase, {name}!\n\n\
         Your Ona UI {tier} lifetime license has been added to your account.\n\n\
         License key: {key}\n\n\
         Open Ona UI: {magic_link}\n",
        name = user.name,
        key = license.license_key,
    );

    OutgoingEmail {
        to: user.email.clone(),
        to_name: Some(user.name.clone()),
        subject: format!("Your Ona UI {tier} license"),
        html_content,
        text_content,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
