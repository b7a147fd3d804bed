//! Cross-entity search.
//!
//! One query fans out to pins, users, boards and tags. Each list is ordered
//! and capped independently; there is no merged relevance ranking.

use serde::{Deserialize, Serialize};
use travelboard_common::AppResult;
use travelboard_db::entities::{board, pin};
use travelboard_db::repositories::{
    BoardRepository, PinRepository, TagRepository, TagWithCount, UserRepository,
};

use super::user::UserSummary;

/// Shortest query that is searched at all, in characters after trimming.
pub const MIN_QUERY_LENGTH: usize = 2;

const PIN_LIMIT: u64 = 10;
const USER_LIMIT: u64 = 5;
const BOARD_LIMIT: u64 = 5;
const TAG_LIMIT: u64 = 10;

/// Which entity types to search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Pins,
    Users,
    Boards,
    Tags,
}

impl SearchType {
    const fn includes(self, other: Self) -> bool {
        matches!(self, Self::All) || self as u8 == other as u8
    }
}

/// Search results. Types that were not searched are empty, never absent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub pins: Vec<pin::Model>,
    pub users: Vec<UserSummary>,
    pub boards: Vec<board::Model>,
    pub tags: Vec<TagWithCount>,
}

/// Fans a query out across entity repositories.
#[derive(Clone)]
pub struct SearchService {
    pin_repo: PinRepository,
    user_repo: UserRepository,
    board_repo: BoardRepository,
    tag_repo: TagRepository,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(
        pin_repo: PinRepository,
        user_repo: UserRepository,
        board_repo: BoardRepository,
        tag_repo: TagRepository,
    ) -> Self {
        Self {
            pin_repo,
            user_repo,
            board_repo,
            tag_repo,
        }
    }

    /// Search the selected entity types concurrently.
    ///
    /// Boards are limited to public, non-archived ones.
    pub async fn search(&self, query: &str, search_type: SearchType) -> AppResult<SearchResults> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LENGTH {
            return Ok(SearchResults::default());
        }

        let (pins, users, boards, tags) = tokio::try_join!(
            async {
                if search_type.includes(SearchType::Pins) {
                    self.pin_repo.search(query, PIN_LIMIT).await
                } else {
                    Ok(vec![])
                }
            },
            async {
                if search_type.includes(SearchType::Users) {
                    self.user_repo.search(query, USER_LIMIT).await
                } else {
                    Ok(vec![])
                }
            },
            async {
                if search_type.includes(SearchType::Boards) {
                    self.board_repo.search_public(query, BOARD_LIMIT).await
                } else {
                    Ok(vec![])
                }
            },
            async {
                if search_type.includes(SearchType::Tags) {
                    self.tag_repo.search(query, TAG_LIMIT).await
                } else {
                    Ok(vec![])
                }
            },
        )?;

        tracing::debug!(
            query = %query,
            search_type = ?search_type,
            pins = pins.len(),
            users = users.len(),
            boards = boards.len(),
            tags = tags.len(),
            "Search completed"
        );

        Ok(SearchResults {
            pins,
            users: users.into_iter().map(UserSummary::from).collect(),
            boards,
            tags,
        })
    }
}
