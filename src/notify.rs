//! Price-drop alerts over Telegram.
//!
//! Fire-and-forget from the orchestrator's point of view: one send call,
//! no retries, and a delivery failure never blocks the ledger write.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::NotifyError;

/// A fare decrease worth announcing. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub old_fare: Option<f64>,
    pub new_fare: f64,
    /// Reusable search link — identical to the URL the fare came from.
    pub link: String,
}

impl AlertEvent {
    pub fn savings(&self) -> Option<f64> {
        self.old_fare.map(|old| old - self.new_fare)
    }
}

/// Formats the alert message. The savings line only appears when the
/// previous fare is known.
pub fn format_alert(event: &AlertEvent) -> String {
    let mut message = String::from("\u{1F6A8} **BAIXOU O PREÇO!** \u{1F6A8}\n\n");

    if let Some(old) = event.old_fare {
        message.push_str(&format!("De: R$ {:.2}\n", old));
    }
    message.push_str(&format!("Para: R$ {:.2}\n", event.new_fare));

    if let Some(savings) = event.savings() {
        message.push_str(&format!("\n\u{1F4C9} Economia de: R$ {:.2}\n", savings));
    }

    message.push_str(&format!("\nCorre para comprar: {}", event.link));
    message
}

pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Sends the alert with Markdown emphasis enabled. A non-2xx answer
    /// from the Bot API is surfaced with its status and body.
    pub async fn send_alert(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = json!({
            "chat_id": self.chat_id,
            "text": format_alert(event),
            "parse_mode": "Markdown",
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(NotifyError::Api { status, body });
        }

        info!("price-drop alert delivered");
        Ok(())
    }
}
