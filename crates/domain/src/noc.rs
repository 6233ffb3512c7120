use serde::{Deserialize, Serialize};

use crate::case::CaseDetails;
use crate::error::DomainError;
use crate::DomainResult;

/// A case carries exactly ten notice-of-change answer positions, one per
/// prospective respondent representative.
pub const NOTICE_OF_CHANGE_SLOTS: usize = 10;

pub fn empty_slots() -> [Option<NoticeOfChangeAnswers>; NOTICE_OF_CHANGE_SLOTS] {
    std::array::from_fn(|_| None)
}

/// Answers supplied by a representative applying to take over a respondent's
/// correspondence on the case.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeOfChangeAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimant_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimant_last_name: Option<String>,
}

/// First populated slot whose respondent name matches, case-insensitively,
/// scanning in ascending slot order.
pub fn find_index_by_respondent_name(case: &CaseDetails, name: &str) -> Option<usize> {
    let needle = name.trim();
    if needle.is_empty() {
        return None;
    }
    case.data
        .notice_of_change_answers
        .iter()
        .position(|slot| match slot {
            Some(answers) => answers
                .respondent_name
                .as_deref()
                .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(needle)),
            None => false,
        })
}

/// Out-of-range reads are "no data", matching an unpopulated slot.
pub fn read_slot(case: &CaseDetails, index: usize) -> Option<&NoticeOfChangeAnswers> {
    case.data.notice_of_change_answers.get(index)?.as_ref()
}

/// Clears one slot. The slot set is closed at ten, so an out-of-range index
/// is a caller defect and raises a distinct fatal error instead of being
/// folded into "not found".
pub fn reset_slot(case: &mut CaseDetails, index: usize) -> DomainResult<()> {
    let Some(slot) = case.data.notice_of_change_answers.get_mut(index) else {
        return Err(DomainError::SlotIndexOutOfRange {
            case_id: case.reference.id,
            index,
        });
    };
    *slot = None;
    Ok(())
}
