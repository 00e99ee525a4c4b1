//! Evaluation ledger.
//!
//! One record per evaluation id, written by every rate update, plus an index
//! entry `doc~evaluation / Evaluation / <id>`. Writing an id twice overwrites
//! the earlier record.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::TransactionContext;
use crate::error::ContractError;
use crate::registry::INDEX_MARKER;

pub const EVALUATION_DOC_TYPE: &str = "Evaluation";
pub const EVALUATION_INDEX: &str = "doc~evaluation";

/// Rich query selecting every evaluation record.
pub const EVALUATION_QUERY: &str = r#"{"selector":{"docType":"Evaluation"}}"#;

/// Audit record of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub doc_type: String,
    pub evaluation_id: String,
    pub service_id: String,
    pub agreement_id: String,
    pub tx_id: String,
    /// Caller-supplied digest of the evaluated evidence
    pub hash: String,
}

/// Write the record for an evaluation and its index entry.
pub fn record(
    ctx: &mut TransactionContext<'_>,
    evaluation_id: &str,
    service_id: &str,
    agreement_id: &str,
    hash: &str,
) -> Result<Evaluation, ContractError> {
    let evaluation = Evaluation {
        doc_type: EVALUATION_DOC_TYPE.to_string(),
        evaluation_id: evaluation_id.to_string(),
        service_id: service_id.to_string(),
        agreement_id: agreement_id.to_string(),
        tx_id: ctx.tx_id().to_string(),
        hash: hash.to_string(),
    };

    ctx.put_json(evaluation_id, &evaluation)?;
    let index = ctx.create_composite_key(EVALUATION_INDEX, &[EVALUATION_DOC_TYPE, evaluation_id])?;
    ctx.put_state(&index, INDEX_MARKER.to_vec())?;

    debug!(
        evaluation_id = %evaluation_id,
        service_id = %service_id,
        agreement_id = %agreement_id,
        tx_id = %evaluation.tx_id,
        "Recorded evaluation"
    );
    Ok(evaluation)
}

/// Read an evaluation record; other documents under the same key are not evaluations.
pub fn read(ctx: &mut TransactionContext<'_>, evaluation_id: &str) -> Result<Evaluation, ContractError> {
    let Some(bytes) = ctx.get_state(evaluation_id)? else {
        return Err(ContractError::EvaluationNotFound(evaluation_id.to_string()));
    };

    match serde_json::from_slice::<Evaluation>(&bytes) {
        Ok(evaluation) if evaluation.doc_type == EVALUATION_DOC_TYPE => Ok(evaluation),
        _ => Err(ContractError::EvaluationNotFound(evaluation_id.to_string())),
    }
}

/// Number of evaluations in the first page of `page_size` records.
///
/// The count never exceeds `page_size`.
pub fn count(ctx: &TransactionContext<'_>, page_size: usize) -> Result<usize, ContractError> {
    let page = ctx.query_with_pagination(EVALUATION_QUERY, page_size, "")?;
    Ok(page.fetched_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry;
    use crate::store::{MemoryStore, WorldState};

    #[test]
    fn test_record_and_read() {
        let store = MemoryStore::new();
        let mut ctx = TransactionContext::new(&store, "tx-42");

        let written = record(&mut ctx, "eval-1", "svc-1", "agr-1", "abc").unwrap();
        assert_eq!(written.tx_id, "tx-42");
        assert_eq!(read(&mut ctx, "eval-1").unwrap(), written);
    }

    #[test]
    fn test_service_is_not_an_evaluation() {
        let store = MemoryStore::new();
        let mut ctx = TransactionContext::new(&store, "tx-1");
        registry::create_service(&mut ctx, "svc-1").unwrap();

        assert_eq!(read(&mut ctx, "svc-1").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(read(&mut ctx, "nope").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_count_is_bounded_by_page() {
        let store = MemoryStore::new();
        let mut ctx = TransactionContext::new(&store, "tx-1");
        registry::create_service(&mut ctx, "svc-1").unwrap();
        for id in 0..5 {
            record(&mut ctx, &format!("eval-{id}"), "svc-1", "agr-1", "h").unwrap();
        }
        store.commit(&ctx.into_write_set()).unwrap();

        let ctx = TransactionContext::new(&store, "tx-2");
        assert_eq!(count(&ctx, 2).unwrap(), 2);
        assert_eq!(count(&ctx, 10).unwrap(), 5);
    }
}
