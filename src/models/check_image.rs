//! Check image model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BatchId, CheckImageId, DonationId, DonorId};

/// A captured check image stored on disk, linked to its donation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckImage {
    pub id: CheckImageId,
    pub donation_id: DonationId,
    pub batch_id: BatchId,
    /// Cleared when the donor is deleted
    pub donor_id: Option<DonorId>,
    /// Path of the image file
    pub uri: String,
    pub created_at: DateTime<Utc>,
}
