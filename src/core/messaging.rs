use crate::core::notifications::Notifier;
use crate::domain::document::{Document, ElementSpec, NodeId};
use crate::domain::model::{
    ApiAck, AvailabilityRequest, MessageKind, MessageRequest, RecipientId, RequestKind,
    RequestRecord, RequestState, Severity,
};
use crate::domain::ports::MarketplaceApi;
use crate::utils::error::{PageError, Result};
use chrono::NaiveDate;

pub const CHAT_MESSAGES_CLASS: &str = "chat-messages";

pub const SEND_FAILED: &str = "Failed to send message";
pub const AVAILABILITY_UPDATED: &str = "Availability updated";
pub const AVAILABILITY_FAILED: &str = "Failed to update availability";

/// Appends a transcript entry to `.chat-messages` and scrolls to it.
pub fn append_message(doc: &mut Document, text: &str, kind: MessageKind) -> Result<NodeId> {
    let chat = doc.require_by_class(CHAT_MESSAGES_CLASS)?;
    let entry = doc.append_new(
        chat,
        ElementSpec::new("div")
            .class("message")
            .class(kind.as_class())
            .text(text),
    )?;
    doc.scroll_to_bottom(chat)?;
    Ok(entry)
}

/// Lifecycle of every backend request issued by the page.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    next_id: u64,
    records: Vec<RequestRecord>,
}

impl Outbox {
    pub fn begin(&mut self, kind: RequestKind) -> u64 {
        self.next_id += 1;
        self.records.push(RequestRecord {
            id: self.next_id,
            kind,
            state: RequestState::Pending,
        });
        self.next_id
    }

    pub fn finish(&mut self, id: u64, state: RequestState) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            record.state = state;
        }
    }

    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    pub fn pending_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state == RequestState::Pending)
            .count()
    }
}

/// A transport error or an explicit `success: false` both count as failure.
fn outcome(endpoint: &str, result: Result<ApiAck>) -> Result<()> {
    match result {
        Ok(ApiAck { success: true }) => Ok(()),
        Ok(ApiAck { success: false }) => Err(PageError::RequestRejected {
            endpoint: endpoint.to_string(),
            reason: "response reported success=false".to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Sends chat messages and availability changes, rendering the result on the
/// page. Backend failures never escape: they end up as an error notification
/// and a failed [`RequestRecord`].
pub struct MessagingClient<A: MarketplaceApi> {
    api: A,
    outbox: Outbox,
}

impl<A: MarketplaceApi> MessagingClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            outbox: Outbox::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Returns whether the backend accepted the message.
    pub async fn send_message(
        &mut self,
        doc: &mut Document,
        notifier: &mut Notifier,
        recipient_id: RecipientId,
        message: &str,
    ) -> Result<bool> {
        let request = MessageRequest {
            recipient_id,
            message: message.to_string(),
        };
        let id = self.outbox.begin(RequestKind::SendMessage);
        let result = outcome("messages", self.api.post_message(&request).await);

        match result {
            Ok(()) => {
                self.outbox.finish(id, RequestState::Succeeded);
                append_message(doc, message, MessageKind::Sent)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Sending message to {} failed: {}", request.recipient_id, e);
                self.outbox.finish(
                    id,
                    RequestState::Failed {
                        reason: e.to_string(),
                    },
                );
                notifier.show(doc, SEND_FAILED, Severity::Error)?;
                Ok(false)
            }
        }
    }

    pub async fn update_availability(
        &mut self,
        doc: &mut Document,
        notifier: &mut Notifier,
        date: NaiveDate,
        time_slot: &str,
        available: bool,
    ) -> Result<bool> {
        let request = AvailabilityRequest {
            date,
            time_slot: time_slot.to_string(),
            available,
        };
        let id = self.outbox.begin(RequestKind::UpdateAvailability);
        let result = outcome("availability", self.api.post_availability(&request).await);

        match result {
            Ok(()) => {
                self.outbox.finish(id, RequestState::Succeeded);
                notifier.show(doc, AVAILABILITY_UPDATED, Severity::Success)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Updating availability for {} {} failed: {}", date, time_slot, e);
                self.outbox.finish(
                    id,
                    RequestState::Failed {
                        reason: e.to_string(),
                    },
                );
                notifier.show(doc, AVAILABILITY_FAILED, Severity::Error)?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend double that answers every call with a fixed result.
    struct ScriptedApi {
        reply: Option<bool>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn new(reply: Option<bool>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn answer(&self) -> Result<ApiAck> {
            match self.reply {
                Some(success) => Ok(ApiAck { success }),
                None => Err(PageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    #[async_trait]
    impl MarketplaceApi for ScriptedApi {
        async fn post_message(&self, request: &MessageRequest) -> Result<ApiAck> {
            self.seen.lock().unwrap().push(request.message.clone());
            self.answer()
        }

        async fn post_availability(&self, request: &AvailabilityRequest) -> Result<ApiAck> {
            self.seen.lock().unwrap().push(request.time_slot.clone());
            self.answer()
        }
    }

    fn chat_doc() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let chat = doc
            .append_new(body, ElementSpec::new("div").class(CHAT_MESSAGES_CLASS))
            .unwrap();
        (doc, chat)
    }

    fn notifications(doc: &Document, severity: Severity) -> usize {
        doc.query_class("notification")
            .into_iter()
            .filter(|n| doc.element(*n).unwrap().has_class(severity.as_class()))
            .count()
    }

    #[test]
    fn test_append_message_scrolls_to_bottom() {
        let (mut doc, chat) = chat_doc();
        append_message(&mut doc, "hi", MessageKind::Received).unwrap();
        let entry = append_message(&mut doc, "hello", MessageKind::Sent).unwrap();

        let el = doc.element(entry).unwrap();
        assert!(el.has_class("message"));
        assert!(el.has_class("sent"));
        assert_eq!(el.text(), "hello");
        assert_eq!(doc.element(chat).unwrap().scroll_top(), 2);
    }

    #[test]
    fn test_append_message_without_chat_panel_fails() {
        let mut doc = Document::new();
        assert!(append_message(&mut doc, "x", MessageKind::Sent).is_err());
    }

    #[tokio::test]
    async fn test_send_message_success_appends_one_entry() {
        let (mut doc, chat) = chat_doc();
        let mut notifier = Notifier::default();
        let mut client = MessagingClient::new(ScriptedApi::new(Some(true)));

        let sent = client
            .send_message(&mut doc, &mut notifier, RecipientId::Number(3), "On my way")
            .await
            .unwrap();

        assert!(sent);
        let entries = doc.children(chat).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(doc.element(entries[0]).unwrap().has_class("sent"));
        assert_eq!(notifications(&doc, Severity::Error), 0);
        assert_eq!(client.outbox().records()[0].state, RequestState::Succeeded);
    }

    #[tokio::test]
    async fn test_send_message_transport_failure_notifies_once() {
        let (mut doc, chat) = chat_doc();
        let mut notifier = Notifier::default();
        let mut client = MessagingClient::new(ScriptedApi::new(None));

        let sent = client
            .send_message(&mut doc, &mut notifier, RecipientId::Number(3), "hello")
            .await
            .unwrap();

        assert!(!sent);
        assert!(doc.children(chat).unwrap().is_empty());
        assert_eq!(notifications(&doc, Severity::Error), 1);
        assert!(matches!(
            client.outbox().records()[0].state,
            RequestState::Failed { .. }
        ));
        assert_eq!(client.outbox().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_message_rejected_by_backend() {
        let (mut doc, chat) = chat_doc();
        let mut notifier = Notifier::default();
        let mut client = MessagingClient::new(ScriptedApi::new(Some(false)));

        assert!(!client
            .send_message(&mut doc, &mut notifier, "abc".into(), "hello")
            .await
            .unwrap());
        assert!(doc.children(chat).unwrap().is_empty());
        assert_eq!(notifications(&doc, Severity::Error), 1);
    }

    #[tokio::test]
    async fn test_update_availability_notifies_success_and_failure() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let mut doc = Document::new();
        let mut notifier = Notifier::default();

        let mut ok_client = MessagingClient::new(ScriptedApi::new(Some(true)));
        assert!(ok_client
            .update_availability(&mut doc, &mut notifier, date, "morning", true)
            .await
            .unwrap());
        assert_eq!(notifications(&doc, Severity::Success), 1);

        let mut failing_client = MessagingClient::new(ScriptedApi::new(None));
        assert!(!failing_client
            .update_availability(&mut doc, &mut notifier, date, "evening", false)
            .await
            .unwrap());
        assert_eq!(notifications(&doc, Severity::Error), 1);
        assert_eq!(
            *failing_client.api().seen.lock().unwrap(),
            vec!["evening".to_string()]
        );

        let texts: Vec<String> = doc
            .query_class("notification")
            .into_iter()
            .map(|n| doc.element(n).unwrap().text().to_string())
            .collect();
        assert_eq!(texts, vec![AVAILABILITY_UPDATED, AVAILABILITY_FAILED]);
    }
}
