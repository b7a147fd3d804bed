//! Business logic services.

#![allow(missing_docs)]

pub mod activity;
pub mod board;
pub mod board_pin;
pub mod comment;
pub mod identity;
pub mod member;
pub mod permission;
pub mod pin;
pub mod search;
pub mod social;
pub mod timeline;
pub mod user;

pub use activity::ActivityService;
pub use board::{BoardDetails, BoardService, CreateBoardInput, UpdateBoardInput};
pub use board_pin::{AddBoardPinInput, BoardPinEntry, BoardPinService, UpdateBoardPinInput};
pub use comment::{CommentService, CommentView, CreateCommentInput, ReactionSummary};
pub use identity::{
    HttpIdentityProvider, Identity, IdentityProvider, IdentityService, ProfileAttributes,
};
pub use member::{AddMemberInput, MemberEntry, MemberService};
pub use permission::{Capability, PermissionService, Permissions};
pub use pin::{CreatePinInput, PinDetails, PinService, UpdatePinInput, normalize_tags};
pub use search::{SearchResults, SearchService, SearchType};
pub use social::{PinEngagement, ReportOutcome, ReportPinInput, SocialService};
pub use timeline::{
    CreateDayInput, DayPinEntry, TimelineDayView, TimelineService, UpdateDayInput,
};
pub use user::{UserProfile, UserService, UserSummary};

use serde::{Deserialize, Deserializer};

/// Reads a present field as `Some`, so an explicit `null` becomes `Some(None)`.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
