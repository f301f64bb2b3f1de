//! Log-only mailer. Delivery is best-effort and out of scope; the port keeps
//! the seam so a real transport can be dropped in.

use async_trait::async_trait;

use quill_core::error::Result;
use quill_core::traits::Mailer;

#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(to, subject, body, "outbound mail");
        Ok(())
    }
}
