use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

use super::{Notifier, NotifyError};

/// Notifier backed by an async SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        use_tls: bool,
        from: String,
    ) -> Result<Self, NotifyError> {
        let mut builder = if use_tls {
            let tls_params = TlsParameters::new(host.to_string())
                .map_err(|e| NotifyError::InvalidConfig(format!("TLS setup: {e}")))?;

            // Port 465 is implicit TLS, everything else negotiates STARTTLS
            if port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                    .map_err(|e| NotifyError::InvalidConfig(format!("SMTP relay: {e}")))?
                    .port(port)
                    .tls(Tls::Wrapper(tls_params))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| NotifyError::InvalidConfig(format!("SMTP relay: {e}")))?
                    .port(port)
                    .tls(Tls::Required(tls_params))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port)
        };

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::InvalidConfig(format!("from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::InvalidConfig(format!("recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::SendFailed(format!("message build: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_welcome(
        &self,
        email: &str,
        display_name: &str,
        temp_credential: Option<&str>,
        group_title: &str,
    ) -> Result<(), NotifyError> {
        let mut body = format!(
            "Hi {display_name},\n\n\
             Good news — your LifeLine \"{group_title}\" has been approved. It is now \
             set up as a draft group and the parish team will be in touch about \
             publishing it.\n"
        );
        if let Some(credential) = temp_credential {
            body.push_str(&format!(
                "\nA leader account has been created for {email}.\n\
                 Temporary password: {credential}\n\
                 Please sign in and change it right away.\n"
            ));
        }
        body.push_str("\nThe LifeLine Team\n");

        self.send(
            email,
            &format!("Your LifeLine \"{group_title}\" was approved"),
            body,
        )
        .await
    }

    async fn send_rejection(
        &self,
        email: &str,
        display_name: &str,
        group_title: &str,
        reason: Option<&str>,
    ) -> Result<(), NotifyError> {
        let mut body = format!(
            "Hi {display_name},\n\n\
             Thank you for proposing the LifeLine \"{group_title}\". After review, the \
             team has decided not to go ahead with it at this time.\n"
        );
        if let Some(reason) = reason {
            body.push_str(&format!("\nReason: {reason}\n"));
        }
        body.push_str("\nYou are welcome to submit a revised proposal.\n\nThe LifeLine Team\n");

        self.send(
            email,
            &format!("Update on your LifeLine proposal \"{group_title}\""),
            body,
        )
        .await
    }
}
