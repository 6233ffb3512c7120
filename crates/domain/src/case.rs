use serde::{Deserialize, Serialize};

use crate::noc::{self, NoticeOfChangeAnswers};

/// Jurisdiction partition of the case store. Each shard is queried
/// independently and maps to a fixed case type identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JurisdictionShard {
    EnglandWales,
    Scotland,
}

impl JurisdictionShard {
    /// Shard query ordering reflects relative case volume. Tests depend on
    /// this being England/Wales first, Scotland second.
    pub const SEARCH_ORDER: [JurisdictionShard; 2] =
        [JurisdictionShard::EnglandWales, JurisdictionShard::Scotland];

    pub fn case_type_id(&self) -> &'static str {
        match self {
            JurisdictionShard::EnglandWales => "ET_EnglandWales",
            JurisdictionShard::Scotland => "ET_Scotland",
        }
    }

    pub fn from_case_type_id(value: &str) -> Option<Self> {
        match value {
            "ET_EnglandWales" => Some(JurisdictionShard::EnglandWales),
            "ET_Scotland" => Some(JurisdictionShard::Scotland),
            _ => None,
        }
    }
}

/// Identity of a case as returned by shard search. Immutable once produced;
/// the shard determines which store partition later operations target.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseReference {
    pub id: i64,
    pub shard: JurisdictionShard,
    pub state: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetails {
    pub reference: CaseReference,
    pub data: CaseData,
}

/// A respondent named on the claim. `idam_id` is set once the respondent's
/// own account has been linked to the case.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idam_id: Option<String>,
}

/// The mutable payload carried through the start-event / submit-event
/// protocol. Fields outside this subsystem's concern round-trip untouched
/// through `extra`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseData {
    #[serde(default)]
    pub respondents: Vec<Respondent>,
    #[serde(default = "noc::empty_slots")]
    pub notice_of_change_answers: [Option<NoticeOfChangeAnswers>; noc::NOTICE_OF_CHANGE_SLOTS],
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for CaseData {
    fn default() -> Self {
        Self {
            respondents: Vec::new(),
            notice_of_change_answers: noc::empty_slots(),
            extra: serde_json::Map::new(),
        }
    }
}

impl CaseData {
    pub fn respondent_by_name_mut(&mut self, name: &str) -> Option<&mut Respondent> {
        let needle = name.trim();
        self.respondents
            .iter_mut()
            .find(|respondent| respondent.name.trim().eq_ignore_ascii_case(needle))
    }
}
