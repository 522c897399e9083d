//! Draft fields and the rules for updating them.
//!
//! Every mutable field maps to a [`FieldStrategy`]. A strategy turns the raw
//! input of one field into a [`FieldUpdate`]: the value to store, the side
//! objects that need saving, and the input tokens that were rejected. The
//! [`DraftFieldUpdater`] drives the strategies over a batch of inputs.

mod bugs;
mod reference;
mod updater;

pub use bugs::{bug_list, sanitize_bug_ids};
pub use reference::{ReferenceResolver, Resolution, split_references};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};
pub use updater::{AppliedFields, DraftFieldUpdater, FieldErrors};

use crate::types::{Account, Group, ReviewRequestRef};

/// Rejection message for a change description on a never published request.
pub const CHANGE_DESCRIPTION_ON_NEW_REQUEST: &str =
    "Change descriptions cannot be used for drafts of new review requests";

/// Rejection message for a multi-line summary.
pub const SUMMARY_CONTAINS_NEWLINE: &str = "Summary cannot contain newlines";

/// A mutable field of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DraftField {
    Branch,
    BugsClosed,
    #[serde(rename = "changedescription")]
    #[strum(serialize = "changedescription")]
    ChangeDescription,
    DependsOn,
    Description,
    Summary,
    TargetGroups,
    TargetPeople,
    TestingDone,
}

impl DraftField {
    /// Returns the update strategy of this field.
    pub const fn strategy(self) -> FieldStrategy {
        match self {
            Self::Branch | Self::Description | Self::TestingDone => {
                FieldStrategy::Text { single_line: false }
            }
            Self::Summary => FieldStrategy::Text { single_line: true },
            Self::BugsClosed => FieldStrategy::BugIds,
            Self::ChangeDescription => FieldStrategy::ChangeDescription,
            Self::DependsOn => FieldStrategy::Reference(ReferenceKind::ReviewRequest),
            Self::TargetGroups => FieldStrategy::Reference(ReferenceKind::Group),
            Self::TargetPeople => FieldStrategy::Reference(ReferenceKind::User),
        }
    }
}

/// How raw input of a field is validated and transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Plain text, optionally restricted to a single line.
    Text { single_line: bool },
    /// Comma separated bug identifiers.
    BugIds,
    /// Text of the attached change description.
    ChangeDescription,
    /// A set of entities named by tokens.
    Reference(ReferenceKind),
}

/// The entity a reference token names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Group,
    User,
    ReviewRequest,
}

/// Raw field input of one update request.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DraftFieldInputs {
    pub branch: Option<String>,
    pub bugs_closed: Option<String>,
    pub changedescription: Option<String>,
    pub depends_on: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub target_groups: Option<String>,
    pub target_people: Option<String>,
    pub testing_done: Option<String>,
}

impl DraftFieldInputs {
    /// Returns the raw input of `field`, if supplied.
    pub fn get(&self, field: DraftField) -> Option<&str> {
        let value = match field {
            DraftField::Branch => &self.branch,
            DraftField::BugsClosed => &self.bugs_closed,
            DraftField::ChangeDescription => &self.changedescription,
            DraftField::DependsOn => &self.depends_on,
            DraftField::Description => &self.description,
            DraftField::Summary => &self.summary,
            DraftField::TargetGroups => &self.target_groups,
            DraftField::TargetPeople => &self.target_people,
            DraftField::TestingDone => &self.testing_done,
        };

        value.as_deref()
    }

    /// Sets the raw input of `field`.
    pub fn with(mut self, field: DraftField, value: impl Into<String>) -> Self {
        let slot = match field {
            DraftField::Branch => &mut self.branch,
            DraftField::BugsClosed => &mut self.bugs_closed,
            DraftField::ChangeDescription => &mut self.changedescription,
            DraftField::DependsOn => &mut self.depends_on,
            DraftField::Description => &mut self.description,
            DraftField::Summary => &mut self.summary,
            DraftField::TargetGroups => &mut self.target_groups,
            DraftField::TargetPeople => &mut self.target_people,
            DraftField::TestingDone => &mut self.testing_done,
        };

        *slot = Some(value.into());
        self
    }
}

/// The value a field update produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Leave the field as it is.
    Keep,
    Text(String),
    ChangeDescription(String),
    Groups(Vec<Group>),
    People(Vec<Account>),
    Dependencies(Vec<ReviewRequestRef>),
}

/// An object other than the draft that an update modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffect {
    /// The draft's change description must be saved.
    ChangeDescription,
}

/// Result of applying one field's raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub value: FieldValue,
    pub side_effects: Vec<SideEffect>,
    /// Input tokens or messages that were rejected.
    pub errors: Vec<String>,
}

impl FieldUpdate {
    /// An update that stores `value` without side effects.
    pub fn value(value: FieldValue) -> Self {
        Self {
            value,
            side_effects: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// An update that rejects the input and leaves the field unchanged.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            value: FieldValue::Keep,
            side_effects: Vec::new(),
            errors: vec![error.into()],
        }
    }

    /// Returns true if no input was rejected.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates plain text input.
pub fn apply_text(raw: &str, single_line: bool) -> FieldUpdate {
    if single_line && raw.contains('\n') {
        return FieldUpdate::rejected(SUMMARY_CONTAINS_NEWLINE);
    }

    FieldUpdate::value(FieldValue::Text(raw.to_owned()))
}

/// Normalizes bug identifiers. Never rejects input.
pub fn apply_bug_ids(raw: &str) -> FieldUpdate {
    FieldUpdate::value(FieldValue::Text(sanitize_bug_ids(raw)))
}

/// Sets change description text, if the draft carries a change description.
pub fn apply_change_description(raw: &str, has_change_description: bool) -> FieldUpdate {
    if !has_change_description {
        return FieldUpdate::rejected(CHANGE_DESCRIPTION_ON_NEW_REQUEST);
    }

    FieldUpdate {
        value: FieldValue::ChangeDescription(raw.to_owned()),
        side_effects: vec![SideEffect::ChangeDescription],
        errors: Vec::new(),
    }
}
