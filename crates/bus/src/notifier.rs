//! Reference notifier: renders outcomes as text and logs them per channel

use async_trait::async_trait;
use roster_core::{format_day, LinkedIdentity};
use tracing::{debug, info};

use crate::error::BusError;
use crate::event::{ModerationEvent, Outcome};
use crate::routing::LogChannels;
use crate::subscriber::EventSubscriber;

/// Notifier that emits rendered log messages through `tracing`
///
/// Stands in for chat-channel delivery: each message is logged with the
/// channel it would be posted to.
pub struct TracingNotifier {
    channels: LogChannels,
}

impl TracingNotifier {
    pub fn new(channels: LogChannels) -> Self {
        Self { channels }
    }
}

/// Render the log-channel message for an event
pub fn render(event: &ModerationEvent) -> String {
    let by = &event.actor_id;
    match &event.outcome {
        Outcome::Added(o) => {
            let mut text = format!(
                "Member added by {by}\nDate: {}\nRank: {}\n",
                format_day(o.joined_at),
                o.rank
            );
            for m in &o.members {
                text.push_str(&format!("\n- {}{}", m.game_id, identity_suffix(&m.linked_identity)));
            }
            push_note(&mut text, o.note.as_deref());
            text
        }
        Outcome::Removed(o) => {
            let mut text = format!(
                "Member removed by {by}\nDate: {}\n",
                format_day(o.effective_at)
            );
            for r in &o.ids {
                let missing = if r.existed { "" } else { " (not found)" };
                text.push_str(&format!("\n- {}{missing}", r.game_id));
            }
            push_note(&mut text, o.note.as_deref());
            text
        }
        Outcome::Warned(o) => {
            let mut text = format!(
                "Member warned by {by}\nGame id: {}\nWarnings: {}/{}\nReason: {}",
                o.game_id, o.count, o.threshold, o.reason
            );
            if let Some(evidence) = &o.evidence_ref {
                text.push_str(&format!("\nEvidence: {evidence}"));
            }
            if o.is_escalated() {
                text.push_str("\nBanned: warning threshold reached");
            }
            text
        }
        Outcome::Unwarned(o) => format!(
            "Warning #{} removed from {} by {by} ({} left)",
            o.index, o.game_id, o.remaining
        ),
        Outcome::Banned(o) => {
            let mut text = format!(
                "Member banned by {by}\nGame id: {}\nReason: {}{}",
                o.ban.game_id,
                o.ban.reason,
                identity_line(&o.ban.linked_identity)
            );
            if let Some(evidence) = &o.ban.evidence_ref {
                text.push_str(&format!("\nEvidence: {evidence}"));
            }
            text
        }
        Outcome::Unbanned(o) => {
            let mut text = format!("Ban lifted by {by}\nGame id: {}", o.game_id);
            if let Some(reason) = o.reason.as_deref().filter(|r| !r.is_empty()) {
                text.push_str(&format!("\nReason: {reason}"));
            }
            text.push_str(&identity_line(&o.linked_identity));
            text
        }
        Outcome::Promoted(o) => format!(
            "Promoted by {by}\nGame id: {} -> {}{}",
            o.game_id,
            o.rank,
            identity_line(&o.linked_identity)
        ),
        Outcome::Demoted(o) => format!(
            "Demoted by {by}\nGame id: {} -> {}{}",
            o.game_id,
            o.rank,
            identity_line(&o.linked_identity)
        ),
    }
}

/// Direct message to the warned user, when a linked identity was given
pub fn direct_message(event: &ModerationEvent) -> Option<(&LinkedIdentity, String)> {
    let Outcome::Warned(o) = &event.outcome else {
        return None;
    };
    let identity = o.linked_identity.as_ref()?;
    Some((
        identity,
        format!(
            "You have been warned in the clan\nReason: {}\nStatus: {}/{}",
            o.reason, o.count, o.threshold
        ),
    ))
}

fn identity_suffix(identity: &Option<LinkedIdentity>) -> String {
    identity
        .as_ref()
        .map(|i| format!(" (@{i})"))
        .unwrap_or_default()
}

fn identity_line(identity: &Option<LinkedIdentity>) -> String {
    identity
        .as_ref()
        .map(|i| format!("\nLinked: @{i}"))
        .unwrap_or_default()
}

fn push_note(text: &mut String, note: Option<&str>) {
    if let Some(note) = note.filter(|n| !n.is_empty()) {
        text.push_str(&format!("\n\nNote: {note}"));
    }
}

#[async_trait]
impl EventSubscriber for TracingNotifier {
    fn name(&self) -> &str {
        "notifier"
    }

    async fn handle(&self, event: &ModerationEvent) -> Result<(), BusError> {
        let kind = event.kind();
        match self.channels.destination(kind) {
            Some(channel) => info!(%kind, channel, message = %render(event), "log message"),
            None => debug!(%kind, "no log channel configured"),
        }

        if let Some((identity, message)) = direct_message(event) {
            info!(%identity, %message, "direct message");
        }

        Ok(())
    }
}
