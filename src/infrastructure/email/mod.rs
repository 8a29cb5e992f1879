//! Outbound email
//!
//! A `Mailer` trait in front of a Resend-style HTTP API, plus the rendered
//! message bodies for the verification and change-email flows.

pub mod resend;

use async_trait::async_trait;

use crate::domain::{DomainResult, User};

pub use resend::ResendMailer;

/// A rendered outbound email.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> DomainResult<()>;
}

/// Verification email sent right after signup and after an applied email
/// change. The link embeds the email-confirmation token.
pub fn verification_email(user: &User, token: &str, dns: &str) -> EmailMessage {
    let subject = format!(
        "Welcome @{}! Verify your account to start using Platzigram",
        user.username
    );
    let html = format!(
        "<p>Hi {} {},</p>\
         <p>Verify your account by posting this token to \
         <a href=\"https://{dns}/users/verify\">https://{dns}/users/verify</a>:</p>\
         <pre>{token}</pre>\
         <p>The token expires in 3 days.</p>",
        user.first_name, user.last_name,
    );

    EmailMessage {
        to: user.email.clone(),
        subject,
        html,
    }
}

/// Email carrying a change-email token back to the account's current address.
pub fn change_email_email(user: &User, token: &str, dns: &str) -> EmailMessage {
    let subject = format!("@{}: confirm your email change on Platzigram", user.username);
    let html = format!(
        "<p>Hi {} {},</p>\
         <p>Use this token together with your new address at \
         <a href=\"https://{dns}/users/{}/change-email\">https://{dns}/users/{}/change-email</a>:</p>\
         <pre>{token}</pre>\
         <p>The token expires in 3 days. If you did not request this, ignore this email.</p>",
        user.first_name, user.last_name, user.username, user.username,
    );

    EmailMessage {
        to: user.email.clone(),
        subject,
        html,
    }
}
