//! Sync acceptance verdicts

use serde::{Deserialize, Serialize};

use crate::Link;

/// One peer's verdict on a sync push for a specific link
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncAcceptance {
    pub link: Link,
    pub accepted: bool,
}

impl SyncAcceptance {
    #[inline]
    pub fn new(link: Link, accepted: bool) -> Self {
        SyncAcceptance { link, accepted }
    }

    #[inline]
    pub fn accepted(link: Link) -> Self {
        SyncAcceptance::new(link, true)
    }

    #[inline]
    pub fn rejected(link: Link) -> Self {
        SyncAcceptance::new(link, false)
    }
}
