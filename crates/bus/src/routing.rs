//! Log channel routing

use serde::{Deserialize, Serialize};

use crate::event::OperationKind;

/// Destination channel per mutating operation
///
/// Unset channels (and `unwarn`, which only replies) route nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChannels {
    #[serde(default)]
    pub add: Option<String>,
    #[serde(default)]
    pub remove: Option<String>,
    #[serde(default)]
    pub warn: Option<String>,
    #[serde(default)]
    pub ban: Option<String>,
    #[serde(default)]
    pub unban: Option<String>,
    #[serde(default)]
    pub promote: Option<String>,
    #[serde(default)]
    pub demote: Option<String>,
}

impl LogChannels {
    pub fn destination(&self, kind: OperationKind) -> Option<&str> {
        let channel = match kind {
            OperationKind::Add => &self.add,
            OperationKind::Remove => &self.remove,
            OperationKind::Warn => &self.warn,
            OperationKind::Ban => &self.ban,
            OperationKind::Unban => &self.unban,
            OperationKind::Promote => &self.promote,
            OperationKind::Demote => &self.demote,
            OperationKind::List
            | OperationKind::BanCheck
            | OperationKind::ListBan
            | OperationKind::Warnlog
            | OperationKind::Unwarn => return None,
        };
        channel.as_deref().filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_lookup() {
        let channels = LogChannels {
            add: Some("chan-add".to_string()),
            warn: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(channels.destination(OperationKind::Add), Some("chan-add"));
        assert_eq!(channels.destination(OperationKind::Warn), None);
        assert_eq!(channels.destination(OperationKind::Ban), None);
        assert_eq!(channels.destination(OperationKind::ListBan), None);
    }

    #[test]
    fn test_partial_json() {
        let channels: LogChannels = serde_json::from_str(r#"{"ban": "chan-ban"}"#).unwrap();
        assert_eq!(channels.destination(OperationKind::Ban), Some("chan-ban"));
        assert_eq!(channels.destination(OperationKind::Unban), None);
    }
}
