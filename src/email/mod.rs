use reqwest::Client;
use serde::Serialize;

use crate::config::Config;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Outbound transactional mail. Every caller treats delivery failure as
/// non-fatal: the triggering operation logs and carries on.
#[derive(Clone)]
pub struct EmailService {
    http: Client,
    config: Config,
}

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: String,
    to: &'a str,
    subject: String,
    html: String,
    text: String,
}

/// Data rendered into the order confirmation and business notification.
#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub order_number: String,
    pub total_amount: f64,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub phone_number: String,
    pub requested_date: String,
    pub requested_time: String,
    pub estimated_time: String,
    pub lines: Vec<OrderNotificationLine>,
}

#[derive(Debug, Clone)]
pub struct OrderNotificationLine {
    pub category_name: String,
    pub quantity: i32,
    pub total_price: f64,
}

impl EmailService {
    pub fn new(config: Config) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    async fn deliver(
        &self,
        to: &str,
        subject: String,
        html: String,
        text: String,
    ) -> Result<(), reqwest::Error> {
        let payload = OutboundEmail {
            from: format!("{} <{}>", self.config.email_name, self.config.email_from),
            to,
            subject,
            html,
            text,
        };

        self.http
            .post(RESEND_API_URL)
            .bearer_auth(&self.config.resend_api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    pub async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!(
            "{}/api/auth/verify-email?token={}",
            self.config.public_base_url, token
        );
        let name = &self.config.email_name;

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Verify Your Email - {name}</title></head>
<body style="font-family: 'Segoe UI', Tahoma, sans-serif; background: #f4f4f7; padding: 40px 0;">
  <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 10px; overflow: hidden;">
    <div style="background: #4CAF50; color: white; padding: 30px; text-align: center;"><h1 style="margin: 0; font-weight: 300;">{name}</h1></div>
    <div style="padding: 40px; text-align: center;">
      <h2>Verify Your Email Address</h2>
      <p>Welcome to {name}! Please click the button below to verify your email address and complete your registration.</p>
      <a href="{url}" style="display: inline-block; background: #4CAF50; color: white; padding: 15px 30px; text-decoration: none; border-radius: 25px; font-weight: bold;">Verify Email Address</a>
      <p style="background: #fff3cd; color: #856404; padding: 15px; border-radius: 5px; font-size: 14px;">This verification link will expire in 24 hours.</p>
      <p style="font-size: 14px; color: #888;">If the button doesn't work, copy and paste this link into your browser:<br><a href="{url}">{url}</a></p>
    </div>
    <div style="background: #f8f9fa; padding: 20px; text-align: center; color: #888; font-size: 14px;">
      <p>If you didn't create an account with {name}, you can safely ignore this email.</p>
    </div>
  </div>
</body>
</html>"#
        );

        let text = format!(
            "Welcome to {name}!\n\nPlease verify your email address by clicking the link below:\n{url}\n\nThis link will expire in 24 hours.\n\nIf you didn't create an account with {name}, you can safely ignore this email."
        );

        self.deliver(
            to,
            format!("Verify your email address - {name}"),
            html,
            text,
        )
        .await
    }

    pub async fn send_password_reset_email(
        &self,
        to: &str,
        token: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!(
            "{}/api/auth/reset-password?token={}",
            self.config.public_base_url, token
        );
        let name = &self.config.email_name;

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Reset Your Password - {name}</title></head>
<body style="font-family: 'Segoe UI', Tahoma, sans-serif; background: #f4f4f7; padding: 40px 0;">
  <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 10px; overflow: hidden;">
    <div style="background: #2563eb; color: white; padding: 30px; text-align: center;"><h1 style="margin: 0; font-weight: 300;">{name}</h1></div>
    <div style="padding: 40px; text-align: center;">
      <h2>Reset Your Password</h2>
      <p>We received a request to reset the password for your {name} account. Click the button below to choose a new password.</p>
      <a href="{url}" style="display: inline-block; background: #2563eb; color: white; padding: 15px 30px; text-decoration: none; border-radius: 25px; font-weight: bold;">Reset Password</a>
      <p style="background: #fff3cd; color: #856404; padding: 15px; border-radius: 5px; font-size: 14px;">This reset link will expire in 1 hour.</p>
      <p style="font-size: 14px; color: #888;">If the button doesn't work, copy and paste this link into your browser:<br><a href="{url}">{url}</a></p>
    </div>
    <div style="background: #f8f9fa; padding: 20px; text-align: center; color: #888; font-size: 14px;">
      <p>If you didn't request a password reset, you can safely ignore this email.</p>
    </div>
  </div>
</body>
</html>"#
        );

        let text = format!(
            "We received a request to reset the password for your {name} account.\n\nReset it here:\n{url}\n\nThis link will expire in 1 hour.\n\nIf you didn't request a password reset, you can safely ignore this email."
        );

        self.deliver(to, format!("Reset your password - {name}"), html, text)
            .await
    }

    pub async fn send_order_confirmation_email(
        &self,
        to: &str,
        order: &OrderNotification,
    ) -> Result<(), reqwest::Error> {
        let name = &self.config.email_name;
        let fulfilment = order_fulfilment_line(order);
        let lines_html = order_lines_html(order);
        let lines_text = order_lines_text(order);

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Order Confirmation - {name}</title></head>
<body style="font-family: 'Segoe UI', Tahoma, sans-serif; background: #f4f4f7; padding: 40px 0;">
  <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 10px; overflow: hidden;">
    <div style="background: #4CAF50; color: white; padding: 30px; text-align: center;"><h1 style="margin: 0; font-weight: 300;">{name}</h1></div>
    <div style="padding: 40px;">
      <h2>Thank you for your order!</h2>
      <p>Your order <strong>{order_number}</strong> has been received.</p>
      <ul>{lines_html}</ul>
      <p><strong>Total: &pound;{total:.2}</strong></p>
      <p>{fulfilment}</p>
      <p>Requested for {date} at {time}. Estimated preparation time: {estimated}.</p>
      <p>We will contact you on {phone} if anything needs clarifying.</p>
    </div>
  </div>
</body>
</html>"#,
            order_number = order.order_number,
            total = order.total_amount,
            date = order.requested_date,
            time = order.requested_time,
            estimated = order.estimated_time,
            phone = order.phone_number,
        );

        let text = format!(
            "Thank you for your order!\n\nOrder {}\n{}\nTotal: GBP {:.2}\n{}\nRequested for {} at {}. Estimated preparation time: {}.",
            order.order_number,
            lines_text,
            order.total_amount,
            fulfilment,
            order.requested_date,
            order.requested_time,
            order.estimated_time,
        );

        self.deliver(
            to,
            format!("Order confirmation {} - {name}", order.order_number),
            html,
            text,
        )
        .await
    }

    /// Heads-up to the business inbox so the kitchen sees new orders without
    /// polling the database.
    pub async fn send_business_notification_email(
        &self,
        order: &OrderNotification,
        customer_email: &str,
    ) -> Result<(), reqwest::Error> {
        let name = &self.config.email_name;
        let fulfilment = order_fulfilment_line(order);
        let lines_html = order_lines_html(order);
        let lines_text = order_lines_text(order);

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>New Order {order_number}</title></head>
<body style="font-family: 'Segoe UI', Tahoma, sans-serif; padding: 20px;">
  <h2>New order {order_number}</h2>
  <ul>{lines_html}</ul>
  <p><strong>Total: &pound;{total:.2}</strong></p>
  <p>{fulfilment}</p>
  <p>Requested for {date} at {time}.</p>
  <p>Customer: {customer_email}, phone {phone}</p>
</body>
</html>"#,
            order_number = order.order_number,
            total = order.total_amount,
            date = order.requested_date,
            time = order.requested_time,
            phone = order.phone_number,
        );

        let text = format!(
            "New order {}\n{}\nTotal: GBP {:.2}\n{}\nRequested for {} at {}.\nCustomer: {}, phone {}",
            order.order_number,
            lines_text,
            order.total_amount,
            fulfilment,
            order.requested_date,
            order.requested_time,
            customer_email,
            order.phone_number,
        );

        let to = self.config.business_notification_email.clone();
        self.deliver(
            &to,
            format!("New order {} - {name}", order.order_number),
            html,
            text,
        )
        .await
    }
}

fn order_fulfilment_line(order: &OrderNotification) -> String {
    match (order.delivery_type.as_str(), order.delivery_address.as_deref()) {
        ("delivery", Some(address)) => format!("Delivery to: {}", address),
        ("delivery", None) => "Delivery".to_string(),
        _ => "Collection from the store".to_string(),
    }
}

fn order_lines_html(order: &OrderNotification) -> String {
    order
        .lines
        .iter()
        .map(|line| {
            format!(
                "<li>{} x {} &mdash; &pound;{:.2}</li>",
                line.quantity, line.category_name, line.total_price
            )
        })
        .collect()
}

fn order_lines_text(order: &OrderNotification) -> String {
    order
        .lines
        .iter()
        .map(|line| {
            format!(
                "{} x {} - GBP {:.2}",
                line.quantity, line.category_name, line.total_price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
