use reqwest::Client;
use serde_json::json;
use url::Url;

use crate::settle::Settlement;

/// Fire-and-forget webhook alerts. Does not block the run.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    url: Url,
}

impl Notifier {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    pub fn send_alert(&self, content: String) {
        let client = self.client.clone();
        let url = self.url.clone();
        tokio::spawn(async move {
            let payload = json!({ "content": content });
            if let Err(e) = client.post(url).json(&payload).send().await {
                eprintln!("Failed to send webhook alert: {}", e);
            }
        });
    }
}

pub fn format_summary_alert(operation: &str, settlement: &Settlement, ignored: Option<usize>) -> String {
    let mut msg = format!(
        "**{}** complete\n**Successful**: `{}`\n**Unsuccessful**: `{}`",
        operation, settlement.success, settlement.fail
    );
    if let Some(ignored) = ignored {
        msg.push_str(&format!("\n**Ignored**: `{}`", ignored));
    }
    msg
}
