//! Nudge inbox service

use crate::error::ApiError;
use crate::repositories::{NudgeRecord, NudgeRepository};
use engagement_drift_shared::validation::{validate_limit, MAX_NUDGES_LIMIT};
use engagement_drift_shared::{
    Language, MarkReadRequest, MarkReadResponse, NudgesQuery, NudgesResponse, StoredNudge,
    ValidationError, NUDGES_DISCLAIMER,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

impl From<NudgeRecord> for StoredNudge {
    fn from(record: NudgeRecord) -> Self {
        StoredNudge {
            id: record.id,
            message: record.message,
            nudge_type: record.nudge_type,
            tone: record.tone,
            language: Language::from_code(&record.language),
            is_read: record.is_read,
            sent_at: record.sent_at,
        }
    }
}

pub struct NudgeService;

impl NudgeService {
    /// Newest nudges first, with the overall unread count
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: NudgesQuery,
    ) -> Result<NudgesResponse, ApiError> {
        validate_limit(query.limit, MAX_NUDGES_LIMIT).map_err(|m| ValidationError::new("limit", m))?;

        let records = NudgeRepository::list(pool, user_id, query.limit as i64, query.unread)
            .await
            .map_err(ApiError::Internal)?;
        let unread_count = NudgeRepository::count_unread(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .max(0) as u64;

        Ok(NudgesResponse {
            nudges: records.into_iter().map(StoredNudge::from).collect(),
            unread_count,
            disclaimer: NUDGES_DISCLAIMER.to_string(),
        })
    }

    /// Mark nudges read. `updated` counts only rows owned by the caller.
    pub async fn mark_read(
        pool: &PgPool,
        user_id: Uuid,
        req: MarkReadRequest,
    ) -> Result<MarkReadResponse, ApiError> {
        req.validate()?;

        let updated = NudgeRepository::mark_read(pool, user_id, &req.nudge_ids)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, requested = req.nudge_ids.len(), updated, "Nudges marked read");

        Ok(MarkReadResponse {
            success: true,
            updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_record_conversion_resolves_language() {
        let record = NudgeRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            message: "Keep going".to_string(),
            nudge_type: "encouragement".to_string(),
            tone: "warm".to_string(),
            language: "xx".to_string(),
            is_read: false,
            sent_at: Utc::now(),
        };

        let nudge = StoredNudge::from(record);
        assert_eq!(nudge.language, Language::En);
        assert_eq!(nudge.nudge_type, "encouragement");
    }

    #[test]
    fn test_empty_mark_read_rejected() {
        let req = MarkReadRequest { nudge_ids: vec![] };
        assert!(req.validate().is_err());
    }
}
