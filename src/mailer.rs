use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rand::Rng;
use std::error::Error;

use crate::config::CONFIG;

/// SMTP mailer for password-reset delivery.
pub struct Mailer {
    smtp: SmtpTransport,
}

impl Mailer {
    /// Build a transport from the configured SMTP relay and credentials.
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let creds = Credentials::new(CONFIG.smtp_user.clone(), CONFIG.smtp_pass.clone());

        let smtp = SmtpTransport::relay(&CONFIG.smtp_host)?
            .credentials(creds)
            .build();

        Ok(Mailer { smtp })
    }

    /// Send a reset code to `to_email`.
    pub fn send_password_reset(
        &self,
        to_email: &str,
        reset_code: &str,
    ) -> Result<(), Box<dyn Error>> {
        let email = Message::builder()
            .from(CONFIG.smtp_from.parse()?)
            .to(to_email.parse()?)
            .subject("Password Reset Request")
            .body(format!(
                "Your password reset code is: {}\nThis code will expire in 1 hour.",
                reset_code
            ))?;

        self.smtp.send(&email)?;
        Ok(())
    }
}

/// Generate an 8-character reset code from uppercase letters and digits.
pub fn generate_reset_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();

    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
