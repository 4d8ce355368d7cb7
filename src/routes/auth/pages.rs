//! HTML surfaces for the two endpoints opened from email clients. Everything
//! else in the API speaks JSON.

const GREEN: &str = "#4CAF50";
const AMBER: &str = "#f59e0b";
const RED: &str = "#ef4444";
const BLUE: &str = "#2563eb";

fn page(email_name: &str, title: &str, header_color: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title} - {email_name}</title>
  <style>
    body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 0; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; display: flex; align-items: center; justify-content: center; }}
    .container {{ max-width: 500px; background: white; border-radius: 10px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); overflow: hidden; text-align: center; }}
    .header {{ background: {header_color}; color: white; padding: 30px; }}
    .header h1 {{ margin: 0; font-size: 28px; font-weight: 300; }}
    .content {{ padding: 40px; }}
    .content h2 {{ color: #333; margin-bottom: 20px; }}
    .content p {{ color: #666; margin-bottom: 20px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1>{email_name}</h1></div>
    <div class="content">{content}</div>
  </div>
</body>
</html>"#
    )
}

pub fn invalid_verification_page(email_name: &str) -> String {
    page(
        email_name,
        "Invalid Verification Link",
        RED,
        "<h2>Invalid Verification Link</h2>\
         <p>This verification link is invalid or malformed. Please check your email for the correct link or request a new verification email.</p>",
    )
}

pub fn expired_verification_page(email_name: &str) -> String {
    page(
        email_name,
        "Verification Link Expired",
        AMBER,
        "<h2>Verification Link Expired</h2>\
         <p>This verification link has expired or has already been used. Please request a new verification email from the app.</p>",
    )
}

pub fn verification_success_page(email_name: &str) -> String {
    let content = format!(
        "<h2>Email Verified Successfully!</h2>\
         <p>Your email address has been verified. You can now log in to your account and enjoy all the features of {email_name}.</p>\
         <p>You can close this window and return to the app.</p>"
    );
    page(email_name, "Email Verified", GREEN, &content)
}

pub fn verification_error_page(email_name: &str) -> String {
    page(
        email_name,
        "Verification Error",
        RED,
        "<h2>Verification Error</h2>\
         <p>An error occurred while verifying your email. Please try again or contact support.</p>",
    )
}

pub fn invalid_reset_page(email_name: &str) -> String {
    page(
        email_name,
        "Invalid Reset Link",
        RED,
        "<h2>Invalid Reset Link</h2>\
         <p>This password reset link is invalid or malformed. Please request a new password reset.</p>",
    )
}

pub fn expired_reset_page(email_name: &str) -> String {
    page(
        email_name,
        "Reset Link Expired",
        AMBER,
        "<h2>Reset Link Expired</h2>\
         <p>This password reset link has expired or has already been used. Please request a new password reset.</p>",
    )
}

pub fn reset_error_page(email_name: &str) -> String {
    page(
        email_name,
        "Reset Error",
        RED,
        "<h2>Reset Error</h2>\
         <p>An error occurred while loading the password reset form. Please try again or request a new password reset.</p>",
    )
}

/// Interactive form posting back to `POST /api/auth/reset-password`. The
/// token is only ever embedded after it has passed the format pre-check and
/// a storage lookup, so it is plain prefixed hex.
pub fn reset_form_page(email_name: &str, token: &str) -> String {
    let content = format!(
        r#"<h2>Reset Your Password</h2>
<div id="message" style="display: none; padding: 10px; border-radius: 5px; margin-bottom: 20px;"></div>
<form id="resetForm" action="javascript:void(0)">
  <input type="hidden" name="token" value="{token}">
  <div style="margin-bottom: 20px; text-align: left;">
    <label for="new_password" style="display: block; margin-bottom: 5px; color: #333;">New Password</label>
    <input type="password" id="new_password" required minlength="8" style="width: 100%; padding: 12px; border: 2px solid #e5e7eb; border-radius: 5px; box-sizing: border-box;">
    <div style="font-size: 14px; color: #666; margin-top: 5px;">Minimum 8 characters required</div>
  </div>
  <div style="margin-bottom: 20px; text-align: left;">
    <label for="confirm_password" style="display: block; margin-bottom: 5px; color: #333;">Confirm New Password</label>
    <input type="password" id="confirm_password" required minlength="8" style="width: 100%; padding: 12px; border: 2px solid #e5e7eb; border-radius: 5px; box-sizing: border-box;">
  </div>
  <button type="submit" id="submitBtn" style="width: 100%; background: {BLUE}; color: white; padding: 12px; border: none; border-radius: 5px; font-size: 16px; font-weight: bold; cursor: pointer;">Reset Password</button>
</form>
<script>
  function showMessage(text, ok) {{
    var el = document.getElementById('message');
    el.textContent = text;
    el.style.display = 'block';
    el.style.background = ok ? '#d1fae5' : '#fee2e2';
    el.style.color = ok ? '#065f46' : '#991b1b';
  }}
  document.getElementById('resetForm').addEventListener('submit', async function (e) {{
    e.preventDefault();
    var newPassword = document.getElementById('new_password').value;
    var confirmPassword = document.getElementById('confirm_password').value;
    if (newPassword.length < 8) {{ showMessage('Password must be at least 8 characters long', false); return; }}
    if (newPassword !== confirmPassword) {{ showMessage('Passwords do not match', false); return; }}
    var btn = document.getElementById('submitBtn');
    btn.disabled = true;
    try {{
      var response = await fetch('/api/auth/reset-password', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ token: '{token}', new_password: newPassword }})
      }});
      var data = await response.json();
      if (data.return_code === 'SUCCESS') {{
        showMessage('Password reset successfully! You can now log in with your new password.', true);
        document.getElementById('resetForm').style.display = 'none';
      }} else {{
        showMessage(data.message || 'Password reset failed', false);
      }}
    }} catch (err) {{
      showMessage('Network error. Please try again.', false);
    }}
    btn.disabled = false;
  }});
</script>"#
    );
    page(email_name, "Reset Password", BLUE, &content)
}
