//! Draft request types.

use draftboard_core::field::DraftFieldInputs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Fields to change on a draft. Omitted fields keep their value.
///
/// `summary` and `branch` longer than 300 characters fail request
/// validation with `bad_request` before any field is applied.
///
/// `target_groups`, `target_people` and `depends_on` take names or ids
/// separated by commas or spaces, and replace the whole set.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct UpdateDraft {
    #[validate(length(max = 300))]
    pub branch: Option<String>,
    /// Bug identifiers separated by commas. A leading `#` is dropped.
    pub bugs_closed: Option<String>,
    /// Only accepted on drafts of already published review requests.
    pub changedescription: Option<String>,
    pub depends_on: Option<String>,
    pub description: Option<String>,
    /// Publish the draft once every field was accepted.
    pub public: Option<bool>,
    /// A single line of text.
    #[validate(length(max = 300))]
    pub summary: Option<String>,
    pub target_groups: Option<String>,
    pub target_people: Option<String>,
    pub testing_done: Option<String>,
}

impl UpdateDraft {
    /// Returns true if the draft should be published after saving.
    #[inline]
    pub fn publish(&self) -> bool {
        self.public.unwrap_or(false)
    }

    /// Splits off the field input handed to the draft service.
    pub fn into_inputs(self) -> DraftFieldInputs {
        DraftFieldInputs {
            branch: self.branch,
            bugs_closed: self.bugs_closed,
            changedescription: self.changedescription,
            depends_on: self.depends_on,
            description: self.description,
            summary: self.summary,
            target_groups: self.target_groups,
            target_people: self.target_people,
            testing_done: self.testing_done,
        }
    }
}
