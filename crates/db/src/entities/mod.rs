//! Database entities.

pub mod board;
pub mod board_activity;
pub mod board_comment;
pub mod board_member;
pub mod board_pin;
pub mod comment_reaction;
pub mod follow;
pub mod pin;
pub mod pin_like;
pub mod pin_report;
pub mod pin_save;
pub mod pin_tag;
pub mod tag;
pub mod timeline_day;
pub mod timeline_pin;
pub mod user;

pub use board::Entity as Board;
pub use board_activity::Entity as BoardActivity;
pub use board_comment::Entity as BoardComment;
pub use board_member::Entity as BoardMember;
pub use board_pin::Entity as BoardPin;
pub use comment_reaction::Entity as CommentReaction;
pub use follow::Entity as Follow;
pub use pin::Entity as Pin;
pub use pin_like::Entity as PinLike;
pub use pin_report::Entity as PinReport;
pub use pin_save::Entity as PinSave;
pub use pin_tag::Entity as PinTag;
pub use tag::Entity as Tag;
pub use timeline_day::Entity as TimelineDay;
pub use timeline_pin::Entity as TimelinePin;
pub use user::Entity as User;
