//! Plain-text replies for the operator

use roster_bus::{
    AddOutcome, BanOutcome, RankOutcome, RemoveOutcome, UnbanOutcome, UnwarnOutcome, WarnOutcome,
};
use roster_core::format_day;
use roster_engine::{BanStatus, RosterListing, WarnLog};
use roster_store::BanRecord;

pub fn added(outcome: &AddOutcome) -> String {
    let created = outcome.members.iter().filter(|m| m.created).count();
    format!(
        "Added {} member(s) as {} ({} new, {} already listed)",
        outcome.members.len(),
        outcome.rank,
        created,
        outcome.members.len() - created
    )
}

pub fn removed(outcome: &RemoveOutcome) -> String {
    let mut text = format!("Removed {} of {} id(s)", outcome.removed_count(), outcome.ids.len());
    for id in outcome.ids.iter().filter(|id| !id.existed) {
        text.push_str(&format!("\n- {} (not found)", id.game_id));
    }
    text
}

pub fn listing(roster: &RosterListing) -> String {
    let mut sections = Vec::with_capacity(roster.buckets.len());
    for bucket in &roster.buckets {
        let mut section = format!("[{}]", bucket.rank);
        if bucket.members.is_empty() {
            section.push_str("\n-");
        }
        for member in &bucket.members {
            let linked = member
                .linked_identity
                .as_ref()
                .map(|l| format!(" (@{l})"))
                .unwrap_or_default();
            section.push_str(&format!(
                "\n- {}{linked}, joined {}",
                member.game_id,
                format_day(member.joined_at)
            ));
        }
        sections.push(section);
    }
    sections.join("\n\n")
}

pub fn ban_status(game_id: &str, status: &BanStatus) -> String {
    match status {
        BanStatus::NotBanned => format!("{game_id} is not banned"),
        BanStatus::Banned(ban) => {
            let mut text = format!(
                "{game_id} is BANNED\nReason: {}\nSince: {}\nBy: {}",
                ban.reason,
                format_day(ban.timestamp),
                ban.moderator_id
            );
            if let Some(evidence) = &ban.evidence_ref {
                text.push_str(&format!("\nEvidence: {evidence}"));
            }
            text
        }
    }
}

pub fn ban_list(bans: &[BanRecord]) -> String {
    if bans.is_empty() {
        return "No active bans".to_string();
    }
    bans.iter()
        .map(|b| {
            format!(
                "- {}: {} ({}) by {}",
                b.game_id,
                b.reason,
                format_day(b.timestamp),
                b.moderator_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn warned(outcome: &WarnOutcome) -> String {
    let mut text = format!(
        "Warned {} ({}/{})",
        outcome.game_id, outcome.count, outcome.threshold
    );
    if outcome.is_escalated() {
        text.push_str("\nWarning threshold reached: ban activated");
    }
    text
}

pub fn unwarned(outcome: &UnwarnOutcome) -> String {
    format!(
        "Removed warning #{} of {} ({} left)",
        outcome.index, outcome.game_id, outcome.remaining
    )
}

pub fn warnlog(log: &WarnLog) -> String {
    if log.is_clean() {
        return format!("{}: no warnings on record", log.game_id);
    }
    let mut text = format!("{}: {}/{} warnings", log.game_id, log.count(), log.threshold);
    for (i, entry) in log.entries.iter().enumerate() {
        let evidence = if entry.evidence_ref.is_some() {
            " [evidence]"
        } else {
            ""
        };
        text.push_str(&format!(
            "\n{}) {} ({}) by {}{evidence}",
            i + 1,
            entry.reason,
            format_day(entry.timestamp),
            entry.moderator_id
        ));
    }
    text
}

pub fn banned(outcome: &BanOutcome) -> String {
    format!("Banned {}", outcome.ban.game_id)
}

pub fn unbanned(outcome: &UnbanOutcome) -> String {
    match &outcome.lifted {
        Some(_) => format!("Unbanned {}", outcome.game_id),
        None => format!("Unbanned {} (no active ban)", outcome.game_id),
    }
}

pub fn rank_changed(verb: &str, outcome: &RankOutcome) -> String {
    let created = if outcome.created { " (new member)" } else { "" };
    format!("{verb} {} to {}{created}", outcome.game_id, outcome.rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roster_core::{GameId, Rank};
    use roster_store::{Member, WarningEntry};

    #[test]
    fn test_listing_marks_empty_buckets() {
        let roster = RosterListing::from_sorted(vec![Member {
            game_id: GameId::new("A1").unwrap(),
            linked_identity: None,
            rank: Rank::Sergeant,
            joined_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            notes: String::new(),
            history: Vec::new(),
        }]);

        let text = listing(&roster);
        assert!(text.starts_with("[leader]\n-"));
        assert!(text.contains("[sergeant]\n- A1, joined 01/01/2024"));
    }

    #[test]
    fn test_warnlog_numbering() {
        let log = WarnLog {
            game_id: GameId::new("G1").unwrap(),
            entries: vec![WarningEntry {
                reason: "afk".to_string(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
                moderator_id: "MOD-1".to_string(),
                evidence_ref: Some("https://img.example/a.png".to_string()),
            }],
            threshold: 3,
        };

        let text = warnlog(&log);
        assert!(text.starts_with("G1: 1/3 warnings"));
        assert!(text.contains("1) afk (02/03/2024) by MOD-1 [evidence]"));
    }
}
