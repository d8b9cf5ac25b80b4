//! Template Selector: static (trip category, choice) → template lookup.

use serde::{Deserialize, Serialize};

use crate::composer::paginator::{PaginationPolicy, DEFAULT_PAGE_CAPACITY};
use crate::composer::ComposeError;

/// The four hand-designed page templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateName {
    #[default]
    Default,
    Family,
    Friend,
    Couple,
}

impl TemplateName {
    /// How pages are cut for this template.
    pub fn policy(self) -> PaginationPolicy {
        match self {
            TemplateName::Family | TemplateName::Couple => PaginationPolicy::SinglePage,
            TemplateName::Default | TemplateName::Friend => PaginationPolicy::FixedCapacity {
                capacity: DEFAULT_PAGE_CAPACITY,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateName::Default => "default",
            TemplateName::Family => "family",
            TemplateName::Friend => "friend",
            TemplateName::Couple => "couple",
        }
    }
}

/// Trip categories produced by the layout recommendation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripCategory {
    FamilyTrip,
    FriendTrip,
    CoupleTrip,
    FoodTrip,
    GroupTrip,
    /// Anything the table does not recognise.
    General,
}

impl TripCategory {
    /// Parses the backend's Korean label or the snake_case English name.
    /// Unrecognised input maps to `General`, never an error.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "가족여행" | "family_trip" => TripCategory::FamilyTrip,
            "우정여행" | "friend_trip" => TripCategory::FriendTrip,
            "커플여행" | "couple_trip" => TripCategory::CoupleTrip,
            "맛집탐방여행" | "food_trip" => TripCategory::FoodTrip,
            "단체여행" | "group_trip" => TripCategory::GroupTrip,
            _ => TripCategory::General,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TripCategory::FamilyTrip => "가족여행",
            TripCategory::FriendTrip => "우정여행",
            TripCategory::CoupleTrip => "커플여행",
            TripCategory::FoodTrip => "맛집탐방여행",
            TripCategory::GroupTrip => "단체여행",
            TripCategory::General => "일반",
        }
    }
}

/// The two templates offered for a category, in recommendation order.
pub fn layout_options(category: TripCategory) -> [TemplateName; 2] {
    match category {
        TripCategory::FamilyTrip => [TemplateName::Family, TemplateName::Friend],
        TripCategory::FriendTrip => [TemplateName::Friend, TemplateName::Default],
        TripCategory::CoupleTrip => [TemplateName::Couple, TemplateName::Default],
        TripCategory::FoodTrip => [TemplateName::Family, TemplateName::Couple],
        TripCategory::GroupTrip => [TemplateName::Default, TemplateName::Family],
        TripCategory::General => [TemplateName::Default, TemplateName::Default],
    }
}

/// Resolves the template for a raw category label and the user's choice (0 or 1).
pub fn select_layout(category: &str, choice_index: usize) -> Result<TemplateName, ComposeError> {
    layout_options(TripCategory::parse(category))
        .get(choice_index)
        .copied()
        .ok_or(ComposeError::ChoiceOutOfRange(choice_index))
}
