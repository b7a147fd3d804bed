//! Database repositories.

mod activity;
mod board;
mod board_member;
mod board_pin;
mod comment;
mod ordering;
mod pin;
mod report;
mod tag;
mod timeline;
mod toggle;
mod user;

pub use activity::ActivityRepository;
pub use board::BoardRepository;
pub use board_member::BoardMemberRepository;
pub use board_pin::BoardPinRepository;
pub use comment::{CommentRepository, ReactionCount};
pub use pin::PinRepository;
pub use report::PinReportRepository;
pub use tag::{TagRepository, TagWithCount};
pub use timeline::TimelineRepository;
pub use toggle::{
    CommentReactionRelation, CommentReactionRepository, FollowRelation, FollowRepository,
    PinLikeRelation, PinLikeRepository, PinSaveRelation, PinSaveRepository, ToggleKey,
    ToggleRelation, ToggleRepository,
};
pub use user::UserRepository;

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};

/// Lowercased `%query%` pattern with `%` and `_` escaped.
pub(crate) fn contains_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// `LOWER(col) LIKE pattern`.
pub(crate) fn lower_like<C: IntoColumnRef>(col: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}
