use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CallSender, DeliveryError, check_status};

#[derive(Deserialize, Debug, Clone)]
pub struct TwilioSettings {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    #[serde(default)]
    sid: Option<String>,
}

/// Places voice calls that read the message out with Twilio's `<Say>` verb.
pub struct TwilioCallSender {
    client: Client,
    settings: TwilioSettings,
}

impl TwilioCallSender {
    pub fn new(settings: TwilioSettings) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, settings })
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.account_sid
        )
    }
}

#[async_trait]
impl CallSender for TwilioCallSender {
    async fn place_call(&self, to_phone: &str, spoken_message: &str) -> Result<(), DeliveryError> {
        let twiml = twiml_say(spoken_message);
        let form = [
            ("To", to_phone),
            ("From", self.settings.from_number.as_str()),
            ("Twiml", twiml.as_str()),
        ];

        let response = self
            .client
            .post(self.calls_url())
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&form)
            .send()
            .await?;
        let response = check_status(response).await?;

        let sid = response
            .json::<CallResponse>()
            .await
            .ok()
            .and_then(|r| r.sid)
            .unwrap_or_default();
        log::info!("Call placed to {to_phone} [call_sid = {sid}]");

        Ok(())
    }
}

fn twiml_say(message: &str) -> String {
    format!("<Response><Say>{}</Say></Response>", escape_xml(message))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_wrapped_in_say_verb() {
        assert_eq!(
            twiml_say("Hi Alice, it is time to take your medicines: Paracetamol (500mg)"),
            "<Response><Say>Hi Alice, it is time to take your medicines: Paracetamol (500mg)</Say></Response>"
        );
    }

    #[test]
    fn markup_in_message_is_escaped() {
        assert_eq!(
            twiml_say("Tom & Jerry <3"),
            "<Response><Say>Tom &amp; Jerry &lt;3</Say></Response>"
        );
    }

    #[test]
    fn calls_url_contains_account() {
        let sender = TwilioCallSender::new(TwilioSettings {
            base_url: "https://api.twilio.com/".to_owned(),
            account_sid: "AC123".to_owned(),
            auth_token: "secret".to_owned(),
            from_number: "+10000000000".to_owned(),
        })
        .unwrap();

        assert_eq!(
            sender.calls_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Calls.json"
        );
    }
}
