use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The three callback families TransmitSMS can deliver.
pub enum CallbackType {
    /// Delivery receipt.
    Dlr,
    /// Inbound reply to a sent message.
    Reply,
    /// Click on a tracked link.
    LinkHits,
}

impl CallbackType {
    pub const ALL: [Self; 3] = [Self::Dlr, Self::Reply, Self::LinkHits];

    /// URL path segment.
    pub fn path(self) -> &'static str {
        match self {
            Self::Dlr => "dlr",
            Self::Reply => "reply",
            Self::LinkHits => "link-hits",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Dlr => "Delivery Receipt",
            Self::Reply => "Reply",
            Self::LinkHits => "Link Hit",
        }
    }

    /// `send-sms` form field that carries this callback URL.
    pub fn field(self) -> &'static str {
        match self {
            Self::Dlr => "dlr_callback",
            Self::Reply => "reply_callback",
            Self::LinkHits => "link_hits_callback",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
